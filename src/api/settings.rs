use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::credential::AdminCredential;
use crate::db::settings_repository::{SettingsRepository, SiteSettings};
use crate::error::AppError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub trending_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub success: bool,
    pub settings: SiteSettings,
}

pub async fn process_update_settings(
    repo: &dyn SettingsRepository,
    request: UpdateSettingsRequest,
) -> Result<SiteSettings, AppError> {
    let text = request
        .trending_text
        .ok_or_else(|| AppError::Validation("trendingText is required".into()))?;
    repo.set_trending_text(&text).await
}

/// `GET /settings`
pub async fn get_settings_handler(
    State(state): State<AppState>,
) -> Result<axum::Json<SettingsResponse>, AppError> {
    let settings = state.settings_repo.get_settings().await?;
    Ok(axum::Json(SettingsResponse {
        success: true,
        settings,
    }))
}

/// `PUT /settings` (admin)
pub async fn update_settings_handler(
    State(state): State<AppState>,
    credential: AdminCredential,
    payload: Result<axum::Json<UpdateSettingsRequest>, JsonRejection>,
) -> Result<axum::Json<SettingsResponse>, AppError> {
    state.admin_gate.authorize(&credential)?;
    let axum::Json(request) = payload?;
    let settings = process_update_settings(state.settings_repo.as_ref(), request).await?;
    Ok(axum::Json(SettingsResponse {
        success: true,
        settings,
    }))
}
