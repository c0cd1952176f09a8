use std::sync::Arc;

use crate::auth::credential::AdminCredential;
use crate::error::AppError;

/// Shared-secret check guarding admin-only routes.
///
/// The configured secret is the bearer credential itself: it is presented on
/// every admin request and never exchanged for a session or token.
#[derive(Clone)]
pub struct AdminGate {
    secret: Arc<str>,
}

impl AdminGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
        }
    }

    /// Whether a secret is configured at all. Without one every check fails.
    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Returns `true` only for the exact configured secret.
    pub fn verify(&self, submitted: &str) -> bool {
        self.is_configured() && constant_time_eq(submitted.as_bytes(), self.secret.as_bytes())
    }

    /// Reject the request unless it carries the configured secret.
    pub fn authorize(&self, credential: &AdminCredential) -> Result<(), AppError> {
        match credential.secret() {
            Some(secret) if self.verify(secret) => Ok(()),
            Some(_) => {
                tracing::debug!("rejected admin credential");
                Err(AppError::Unauthorized("Invalid admin password".into()))
            }
            None => {
                tracing::debug!("missing admin credential");
                Err(AppError::Unauthorized("Admin password required".into()))
            }
        }
    }
}

/// Byte comparison that inspects every byte regardless of where they differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
