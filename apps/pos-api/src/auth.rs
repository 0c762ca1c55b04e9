//! HTTP Basic authentication.
//!
//! Every POS endpoint except the health check requires credentials that
//! match an active row in the users table.
//!
//! ## Flow
//! ```text
//! Authorization: Basic <base64(login:password)>
//!      │
//!      ├── header missing / not Basic / undecodable → 403
//!      │
//!      ▼
//! users.get_by_login(login)
//!      │
//!      ├── unknown login or argon2 mismatch → 401 "Login error"
//!      │
//!      ▼
//! AuthUser { id, login } injected into the handler
//! ```

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use atlas_db::repository::user::verify_password;

use crate::error::ApiError;
use crate::AppState;

/// The authenticated cashier, extracted per request.
///
/// Handlers take `AuthUser` as an argument; the extractor runs the full
/// credential check before the handler body executes.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub login: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::AuthRequired)?;

        let (login, password) = decode_basic(header).ok_or(ApiError::AuthRequired)?;

        let user = state
            .db
            .users()
            .get_by_login(&login)
            .await?
            .filter(|user| verify_password(&password, &user.password_hash))
            .ok_or(ApiError::InvalidCredentials)?;

        debug!(login = %user.login, "Authenticated cashier");

        Ok(AuthUser {
            id: user.id,
            login: user.login,
        })
    }
}

/// Decodes an `Authorization: Basic` header into (login, password).
///
/// Returns None for anything that is not a well-formed Basic header;
/// the caller treats that the same as no credentials at all.
fn decode_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    let (login, password) = decoded.split_once(':')?;
    Some((login.to_string(), password.to_string()))
}
