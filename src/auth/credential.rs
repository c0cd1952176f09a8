use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Header carrying the admin password as sent by the dashboard.
pub const ADMIN_PASS_HEADER: &str = "x-admin-pass";

/// The admin secret presented with a single request, if any.
///
/// Read from `x-admin-pass` or, failing that, from `Authorization: Bearer`.
/// Extraction never fails; [`AdminGate::authorize`](crate::auth::gate::AdminGate::authorize)
/// decides whether the credential is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminCredential(Option<String>);

impl AdminCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Some(secret.into()))
    }

    pub fn missing() -> Self {
        Self(None)
    }

    pub fn secret(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let from_header = headers
            .get(ADMIN_PASS_HEADER)
            .and_then(|value| value.to_str().ok());

        let from_bearer = || {
            headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
        };

        Self(from_header.or_else(from_bearer).map(str::to_string))
    }
}

impl<S> FromRequestParts<S> for AdminCredential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
