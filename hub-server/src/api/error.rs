//! HTTP error mapping for API handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type wrapping the domain error taxonomy
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain error from hub-common
    #[error(transparent)]
    Domain(#[from] hub_common::Error),

    /// Caller lacks the role required by the route (403)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Malformed request outside domain validation (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use hub_common::Error;

        let (status, error_code, message) = match &self {
            ApiError::Domain(err) => match err {
                Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                Error::Validation(msg) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", msg.clone())
                }
                Error::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
                }
                Error::BudgetExhausted { .. } => {
                    (StatusCode::CONFLICT, "BUDGET_EXHAUSTED", err.to_string())
                }
                Error::PermissionDenied(msg) => {
                    (StatusCode::FORBIDDEN, "PERMISSION_DENIED", msg.clone())
                }
                Error::Database(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE",
                    err.to_string(),
                ),
                Error::Io(_) | Error::Config(_) | Error::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    err.to_string(),
                ),
            },
            ApiError::PermissionDenied(msg) => {
                (StatusCode::FORBIDDEN, "PERMISSION_DENIED", msg.clone())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            status_of(ApiError::Domain(hub_common::Error::NotFound("x".into()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::Domain(hub_common::Error::Validation("x".into()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ApiError::Domain(hub_common::Error::InvalidTransition {
                entity: "submission",
                action: "finalize",
                from: "Paid",
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::Domain(hub_common::Error::BudgetExhausted {
                campaign_id: "c1".into(),
                remaining: 3.5,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::PermissionDenied("admins only".into())),
            StatusCode::FORBIDDEN
        );
    }
}
