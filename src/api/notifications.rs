use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::db::notification_repository::NotificationRepository;
use crate::error::AppError;
use crate::models::notification::Notification;

/// Upper bound accepted for the `limit` query parameter.
pub const MAX_NOTIFICATION_LIMIT: i64 = 200;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNotificationsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub success: bool,
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub success: bool,
    pub notification: Notification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub success: bool,
    pub modified: u64,
}

pub async fn process_list_notifications(
    repo: &dyn NotificationRepository,
    query: ListNotificationsQuery,
    default_limit: i64,
) -> Result<NotificationsResponse, AppError> {
    let limit = query.limit.unwrap_or(default_limit);
    if !(1..=MAX_NOTIFICATION_LIMIT).contains(&limit) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_NOTIFICATION_LIMIT
        )));
    }

    let notifications = repo.list_recent(limit).await?;
    let unread_count = repo.count_unread().await?;

    Ok(NotificationsResponse {
        success: true,
        notifications,
        unread_count,
    })
}

pub async fn process_mark_read(
    repo: &dyn NotificationRepository,
    id: &str,
) -> Result<Notification, AppError> {
    repo.mark_read(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".into()))
}

/// `GET /notifications`
pub async fn list_notifications_handler(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<axum::Json<NotificationsResponse>, AppError> {
    let response = process_list_notifications(
        state.notification_repo.as_ref(),
        query,
        state.notification_limit,
    )
    .await?;
    Ok(axum::Json(response))
}

/// `PUT /notifications`: mark everything read.
pub async fn mark_all_read_handler(
    State(state): State<AppState>,
) -> Result<axum::Json<MarkAllReadResponse>, AppError> {
    let modified = state.notification_repo.mark_all_read().await?;
    Ok(axum::Json(MarkAllReadResponse {
        success: true,
        modified,
    }))
}

/// `PUT /notifications/{id}`
pub async fn mark_read_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::Json<NotificationResponse>, AppError> {
    let notification = process_mark_read(state.notification_repo.as_ref(), &id).await?;
    Ok(axum::Json(NotificationResponse {
        success: true,
        notification,
    }))
}
