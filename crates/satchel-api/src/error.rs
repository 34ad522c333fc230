//! HTTP-facing error type and status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use satchel::ServiceError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors produced by request handlers, rendered as `{message}` JSON
/// bodies with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid bearer token, or failed login.
    #[error("authentication failed")]
    Unauthenticated,

    /// Caller's role does not allow the operation, or the target is
    /// protected.
    #[error("{0}")]
    Forbidden(String),

    /// The referenced identity, document or token does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with existing state.
    #[error("{0}")]
    Conflict(String),

    /// Malformed request input.
    #[error("{0}")]
    BadRequest(String),

    /// Unexpected server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::BadRequest(e.to_string()),
            ServiceError::IdentityNotFound(_) | ServiceError::UnknownShareToken(_) => {
                ApiError::NotFound("User not found".to_string())
            }
            ServiceError::DocumentNotFound(_) => {
                ApiError::NotFound("Document not found".to_string())
            }
            ServiceError::UsernameTaken(username) => {
                ApiError::Conflict(format!("Username '{}' is already taken", username))
            }
            ServiceError::OperatorProtected => {
                ApiError::Forbidden("Cannot modify the Operator account".to_string())
            }
            ServiceError::OperatorRoleReserved => {
                ApiError::Forbidden("Cannot assign the Operator role".to_string())
            }
            ServiceError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication failed".to_string(),
            ),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type for request handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use satchel::{DocumentId, IdentityId};

    #[test]
    fn test_service_error_mapping() {
        let err: ApiError = ServiceError::IdentityNotFound(IdentityId::new(9)).into();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "User not found"));

        let err: ApiError = ServiceError::DocumentNotFound(DocumentId::new(4)).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = ServiceError::UsernameTaken("rook".to_string()).into();
        assert!(matches!(err, ApiError::Conflict(ref m) if m.contains("rook")));

        let err: ApiError = ServiceError::OperatorProtected.into();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err: ApiError = ServiceError::OperatorRoleReserved.into();
        assert!(matches!(err, ApiError::Forbidden(ref m) if m.contains("Operator role")));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("no".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
