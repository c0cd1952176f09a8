#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use rawspill::app::{router, AppState};
use rawspill::auth::gate::AdminGate;
use rawspill::db::health::MongoHealth;
use rawspill::db::notification_repository::{MongoNotificationRepository, NotificationRepository};
use rawspill::db::post_repository::{MongoPostRepository, PostRepository};
use rawspill::db::settings_repository::{MongoSettingsRepository, SettingsRepository};

pub const ADMIN_PASS: &str = "test-admin-pass";

/// Holds a running MongoDB container and the router wired to it.
///
/// The container lives as long as this struct; dropping it stops the container.
pub struct TestEnv {
    _mongo: ContainerAsync<Mongo>,
    pub router: Router,
    pub mongo_db: mongodb::Database,
    pub post_repo: Arc<dyn PostRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub settings_repo: Arc<dyn SettingsRepository>,
}

impl TestEnv {
    /// Start MongoDB and build the router against real repositories.
    pub async fn start() -> Self {
        let mongo_container = Mongo::default()
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let mongo_port = mongo_container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");
        let mongo_uri = format!("mongodb://127.0.0.1:{}", mongo_port);
        let mongo_client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("Failed to connect to MongoDB");
        let mongo_db = mongo_client.database("rawspill_test");

        let posts = MongoPostRepository::new(&mongo_db);
        posts
            .ensure_indexes()
            .await
            .expect("Failed to create post indexes");
        let notifications = MongoNotificationRepository::new(&mongo_db);
        notifications
            .ensure_indexes()
            .await
            .expect("Failed to create notification indexes");

        let settings = MongoSettingsRepository::new(&mongo_db);
        settings
            .ensure_indexes()
            .await
            .expect("Failed to create settings indexes");

        let post_repo: Arc<dyn PostRepository> = Arc::new(posts);
        let notification_repo: Arc<dyn NotificationRepository> = Arc::new(notifications);
        let settings_repo: Arc<dyn SettingsRepository> = Arc::new(settings);

        let app_state = AppState {
            post_repo: post_repo.clone(),
            notification_repo: notification_repo.clone(),
            settings_repo: settings_repo.clone(),
            health: Arc::new(MongoHealth::new(&mongo_db)),
            admin_gate: AdminGate::new(ADMIN_PASS),
            default_author: "Admin".to_string(),
            notification_limit: 50,
        };

        Self {
            _mongo: mongo_container,
            router: router(app_state),
            mongo_db,
            post_repo,
            notification_repo,
            settings_repo,
        }
    }

    /// Build a `TestServer` that expects success by default.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }

    /// Helper: create a post via the API and return its JSON representation.
    pub async fn create_post(
        &self,
        server: &axum_test::TestServer,
        title: &str,
        published: bool,
    ) -> serde_json::Value {
        let response = server
            .post("/posts")
            .add_header(admin_header(), admin_value())
            .json(&serde_json::json!({
                "title": title,
                "body": format!("Body of {title}"),
                "published": published
            }))
            .await;
        let body: serde_json::Value = response.json();
        body["data"].clone()
    }
}

pub fn admin_header() -> HeaderName {
    HeaderName::from_static("x-admin-pass")
}

pub fn admin_value() -> HeaderValue {
    HeaderValue::from_static(ADMIN_PASS)
}

/// A title that is unique per call, so tests never collide on slugs.
pub fn unique_title(prefix: &str) -> String {
    format!("{prefix} {}", uuid::Uuid::new_v4().simple())
}
