use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::AppError;

/// Request body for `POST /verify-password`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `POST /verify-password`: lets the dashboard check the secret before
/// storing it client-side. No session is created.
pub async fn verify_password_handler(
    State(state): State<AppState>,
    payload: Result<axum::Json<VerifyPasswordRequest>, JsonRejection>,
) -> Result<(StatusCode, axum::Json<VerifyPasswordResponse>), AppError> {
    let axum::Json(request) = payload?;
    let reply = if state.admin_gate.verify(&request.password) {
        (
            StatusCode::OK,
            axum::Json(VerifyPasswordResponse {
                success: true,
                error: None,
            }),
        )
    } else {
        tracing::debug!("admin password verification failed");
        (
            StatusCode::UNAUTHORIZED,
            axum::Json(VerifyPasswordResponse {
                success: false,
                error: Some("Wrong password".to_string()),
            }),
        )
    };
    Ok(reply)
}
