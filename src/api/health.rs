use axum::extract::State;

use crate::app::AppState;
use crate::error::AppError;

/// `GET /health`: reports whether the database answers a ping.
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    state.health.ping().await?;
    Ok(axum::Json(serde_json::json!({
        "status": "ok",
        "database": "connected"
    })))
}
