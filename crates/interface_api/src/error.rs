//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_billing::BillingError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "Internal server error".to_string())
            }
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone()),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Validation { message, .. } => ApiError::Validation(message),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Connection { .. } | PortError::Timeout { .. } | PortError::ServiceUnavailable { .. } => {
                ApiError::Unavailable(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Port(port) => port.into(),
            err if err.is_not_found() => ApiError::NotFound(err.to_string()),
            err if err.is_validation() => ApiError::Validation(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{TenantId, UnitId};

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_billing_error_status_codes() {
        assert_eq!(status_of(BillingError::UnitNotFound(UnitId::new_v7())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(BillingError::PayerNotAssigned {
                unit: UnitId::new_v7(),
                payer: TenantId::new_v7(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(BillingError::validation("amount must be positive")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(BillingError::Port(PortError::internal("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_engine_faults_are_internal() {
        let start = core_kernel::BillingMonth::new(2024, 1).unwrap();
        assert_eq!(
            status_of(BillingError::AllocationLimitExceeded { start, months: 1200 }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(BillingError::AmountOverflow("total_due")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_port_error_status_codes() {
        assert_eq!(status_of(PortError::conflict("Unit number 3 already exists")), StatusCode::CONFLICT);
        assert_eq!(status_of(PortError::not_found("Tenant", "x")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(PortError::connection("refused")), StatusCode::SERVICE_UNAVAILABLE);
    }
}
