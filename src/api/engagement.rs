use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::credential::AdminCredential;
use crate::auth::gate::AdminGate;
use crate::db::notification_repository::NotificationRepository;
use crate::db::post_repository::PostRepository;
use crate::error::AppError;
use crate::models::notification::NewNotification;
use crate::models::post::{Comment, Like};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LikeRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentRequest {
    pub name: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    pub comment_index: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsResponse {
    pub success: bool,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsResponse {
    pub views: i64,
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn require_slug(slug: &str) -> Result<(), AppError> {
    if slug.trim().is_empty() {
        return Err(AppError::Validation("Slug is required".into()));
    }
    Ok(())
}

/// Record a notification without letting its failure undo the engagement.
async fn notify(notifications: &dyn NotificationRepository, notification: NewNotification) {
    let kind = notification.kind;
    let slug = notification.post_slug.clone();
    if let Err(e) = notifications.record(notification).await {
        tracing::warn!(%kind, %slug, "Failed to record notification: {e}");
    }
}

/// Like a published post and notify the admin.
///
/// Returns the new number of likes. The like is committed before the
/// notification is written.
pub async fn process_like(
    posts: &dyn PostRepository,
    notifications: &dyn NotificationRepository,
    slug: &str,
    request: LikeRequest,
) -> Result<usize, AppError> {
    require_slug(slug)?;
    let name = required(request.name, "Name")?;

    let like = Like {
        name: name.clone(),
        timestamp: Utc::now(),
    };
    let post = posts
        .push_like(slug, like)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    notify(notifications, NewNotification::like(&post, &name)).await;

    Ok(post.likes.len())
}

/// Comment on a published post and notify the admin.
///
/// Returns the full comment list after the append.
pub async fn process_comment(
    posts: &dyn PostRepository,
    notifications: &dyn NotificationRepository,
    slug: &str,
    request: CommentRequest,
) -> Result<Vec<Comment>, AppError> {
    require_slug(slug)?;
    let name = required(request.name, "Name")?;
    let text = required(request.comment, "Comment")?;

    let comment = Comment {
        name: name.clone(),
        comment: text.clone(),
        timestamp: Utc::now(),
    };
    let post = posts
        .push_comment(slug, comment)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    notify(notifications, NewNotification::comment(&post, &name, &text)).await;

    Ok(post.comments)
}

pub async fn process_increment_view(posts: &dyn PostRepository, slug: &str) -> Result<i64, AppError> {
    require_slug(slug)?;
    posts
        .increment_views(slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

/// Remove the comment at a 0-based position (admin only).
///
/// The write only lands if the comment list is unchanged since it was read;
/// otherwise the call fails with `Conflict` and nothing is removed.
pub async fn process_delete_comment(
    posts: &dyn PostRepository,
    gate: &AdminGate,
    credential: &AdminCredential,
    slug: &str,
    request: DeleteCommentRequest,
) -> Result<Vec<Comment>, AppError> {
    gate.authorize(credential)?;
    require_slug(slug)?;

    let index = request
        .comment_index
        .ok_or_else(|| AppError::Validation("Comment index is required".into()))?;

    let post = posts
        .find_by_slug(slug, false)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let position = usize::try_from(index)
        .ok()
        .filter(|i| *i < post.comments.len())
        .ok_or_else(|| {
            AppError::OutOfRange(format!(
                "Comment index {} is out of range ({} comments)",
                index,
                post.comments.len()
            ))
        })?;

    let mut remaining = post.comments.clone();
    remaining.remove(position);

    let updated = posts
        .replace_comments(slug, &post.comments, remaining)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("Comments changed while deleting; reload and try again".into())
        })?;

    tracing::info!(%slug, index, "comment deleted");
    Ok(updated.comments)
}

/// `POST /posts/{slug}/like`
pub async fn like_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: Result<axum::Json<LikeRequest>, JsonRejection>,
) -> Result<axum::Json<LikeResponse>, AppError> {
    let axum::Json(request) = payload?;
    let likes = process_like(
        state.post_repo.as_ref(),
        state.notification_repo.as_ref(),
        &slug,
        request,
    )
    .await?;
    Ok(axum::Json(LikeResponse {
        success: true,
        likes,
    }))
}

/// `POST /posts/{slug}/comment`
pub async fn comment_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    payload: Result<axum::Json<CommentRequest>, JsonRejection>,
) -> Result<axum::Json<CommentsResponse>, AppError> {
    let axum::Json(request) = payload?;
    let comments = process_comment(
        state.post_repo.as_ref(),
        state.notification_repo.as_ref(),
        &slug,
        request,
    )
    .await?;
    Ok(axum::Json(CommentsResponse {
        success: true,
        comments,
    }))
}

/// `DELETE /posts/{slug}/comment` (admin)
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    credential: AdminCredential,
    payload: Result<axum::Json<DeleteCommentRequest>, JsonRejection>,
) -> Result<axum::Json<CommentsResponse>, AppError> {
    // Credential first, so anonymous callers get 401 whatever the body holds
    state.admin_gate.authorize(&credential)?;
    let axum::Json(request) = payload?;
    let comments = process_delete_comment(
        state.post_repo.as_ref(),
        &state.admin_gate,
        &credential,
        &slug,
        request,
    )
    .await?;
    Ok(axum::Json(CommentsResponse {
        success: true,
        comments,
    }))
}

/// `POST /posts/{slug}/increment-view`
pub async fn increment_view_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<axum::Json<ViewsResponse>, AppError> {
    let views = process_increment_view(state.post_repo.as_ref(), &slug).await?;
    Ok(axum::Json(ViewsResponse { views }))
}
