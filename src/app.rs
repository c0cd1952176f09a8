use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api;
use crate::auth::gate::AdminGate;
use crate::db::health::DatabaseHealth;
use crate::db::notification_repository::NotificationRepository;
use crate::db::post_repository::PostRepository;
use crate::db::settings_repository::SettingsRepository;

/// Shared state handed to every handler.
///
/// Holds no per-request data; the admin credential travels with each request.
#[derive(Clone)]
pub struct AppState {
    pub post_repo: Arc<dyn PostRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub settings_repo: Arc<dyn SettingsRepository>,
    pub health: Arc<dyn DatabaseHealth>,
    pub admin_gate: AdminGate,
    pub default_author: String,
    pub notification_limit: i64,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health::health_handler))
        .route(
            "/posts",
            get(api::posts::list_posts_handler).post(api::posts::create_post_handler),
        )
        .route(
            "/posts/slug/{slug}",
            get(api::posts::get_post_by_slug_handler),
        )
        .route(
            "/posts/{id}",
            get(api::posts::get_post_handler)
                .put(api::posts::update_post_handler)
                .delete(api::posts::delete_post_handler),
        )
        // Engagement routes address the post by slug in the `{id}` segment
        .route("/posts/{id}/like", post(api::engagement::like_handler))
        .route(
            "/posts/{id}/comment",
            post(api::engagement::comment_handler).delete(api::engagement::delete_comment_handler),
        )
        .route(
            "/posts/{id}/increment-view",
            post(api::engagement::increment_view_handler),
        )
        .route("/admin/posts", get(api::posts::list_all_posts_handler))
        .route(
            "/notifications",
            get(api::notifications::list_notifications_handler)
                .put(api::notifications::mark_all_read_handler),
        )
        .route(
            "/notifications/{id}",
            put(api::notifications::mark_read_handler),
        )
        .route(
            "/verify-password",
            post(api::auth::verify_password_handler),
        )
        .route(
            "/settings",
            get(api::settings::get_settings_handler).put(api::settings::update_settings_handler),
        )
        .method_not_allowed_fallback(api::errors::method_not_allowed)
        .with_state(state)
}
