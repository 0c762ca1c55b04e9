//! Error types for the POS API.
//!
//! ## Status Mapping
//! ```text
//! AuthRequired        → 403  (no credentials presented at all)
//! InvalidCredentials  → 401  (credentials presented, but wrong)
//! NotFound            → 404
//! BadRequest          → 400
//! Conflict            → 409  (sale not in a mutable state, duplicates)
//! Gateway             → 502  (card gateway unreachable/errored)
//! Mail                → 502  (SMTP relay failed)
//! Internal            → 500
//! ```
//! The 403/401 split is deliberate: a missing Authorization header is
//! refused outright, while presented-but-wrong credentials get the 401
//! challenge.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use atlas_core::{CoreError, ValidationError};
use atlas_db::DbError;

/// POS API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Login error")]
    InvalidCredentials,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Email delivery failed: {0}")]
    Mail(String),

    #[error("Internal error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthRequired => StatusCode::FORBIDDEN,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Gateway(_) | ApiError::Mail(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body sent with every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The detail behind Internal stays in the logs, not the response
        if let ApiError::Internal(detail) = &self {
            error!(detail = %detail, "Internal error");
        }

        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Conversions from lower layers
// =============================================================================

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            CoreError::InvalidSaleStatus { .. } => ApiError::Conflict(err.to_string()),
            CoreError::SaleTooLarge { .. }
            | CoreError::InvalidPaymentAmount { .. }
            | CoreError::UnknownPaymentMode(_)
            | CoreError::Validation(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::AuthRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Gateway("down".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_db_not_found_maps_to_404() {
        let err: ApiError = DbError::not_found("Sale", "abc").into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_core_status_maps_to_conflict() {
        let err: ApiError = CoreError::InvalidSaleStatus {
            sale_id: "abc".into(),
            current_status: "voided".into(),
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }
}
