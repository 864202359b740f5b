//! API error handling
//!
//! Domain errors are mapped onto HTTP status codes here: missing records
//! are 404, invalid lifecycle transitions and duplicates 409, rejected
//! input 422, auth failures 401/403 and everything else 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::{CalendarError, PortError};
use domain_billing::BillingError;
use domain_subscription::SubscriptionError;

use crate::auth::AuthError;

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

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request body")]
    InvalidRequest(#[from] validator::ValidationErrors),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

fn field_details(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut details: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    details.sort();
    details
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone(), None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            ApiError::Internal(msg) => {
                error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg.clone(),
                None,
            ),
            ApiError::InvalidRequest(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Invalid request body".to_string(),
                Some(field_details(errors)),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            PortError::Conflict { message } => ApiError::Conflict(message),
            PortError::Validation { message, .. } => ApiError::Validation(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Port(e) => e.into(),
            BillingError::Forbidden(msg) => ApiError::Forbidden(msg),
            BillingError::InstallmentAlreadyPaid(_)
            | BillingError::DocumentAlreadyCancelled(_)
            | BillingError::DocumentAlreadyPaid(_)
            | BillingError::InvalidStatusTransition { .. }
            | BillingError::NotPayable(_) => ApiError::Conflict(err.to_string()),
            BillingError::MissingCancellationReason
            | BillingError::InvariantViolation(_)
            | BillingError::InvalidPlan(_)
            | BillingError::Money(_) => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::Port(e) => e.into(),
            SubscriptionError::Forbidden(msg) => ApiError::Forbidden(msg),
            SubscriptionError::NotAwaitingVerification { .. }
            | SubscriptionError::DuplicatePayment { .. } => ApiError::Conflict(err.to_string()),
            SubscriptionError::MissingRejectionReason
            | SubscriptionError::InvalidPayment(_)
            | SubscriptionError::Money(_) => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPermission(permission) => {
                ApiError::Forbidden(format!("missing permission: {}", permission))
            }
            _ => ApiError::Unauthorized,
        }
    }
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::MoneyError;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_billing_errors_map_to_status() {
        assert_eq!(
            status_of(BillingError::DocumentAlreadyCancelled("NF-1".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(BillingError::MissingCancellationReason), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_of(BillingError::Forbidden("admin only".into())), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(BillingError::Port(PortError::not_found("Parcela", "x"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(BillingError::Money(MoneyError::CurrencyMismatch("BRL".into(), "USD".into()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_subscription_errors_map_to_status() {
        assert_eq!(
            status_of(SubscriptionError::DuplicatePayment {
                company: "c".into(),
                reference_month: "03/2024".into(),
                status: "aprovado".into(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(SubscriptionError::MissingRejectionReason), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_connection_failure_is_internal() {
        assert_eq!(
            status_of(PortError::connection("pool closed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(AuthError::TokenExpired), StatusCode::UNAUTHORIZED);
    }
}
