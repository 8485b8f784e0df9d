//! HTTP error responses.
//!
//! One conversion point from the billing error taxonomy to status codes.
//! Handlers return `Result<_, ApiError>` and let `?` do the mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use validator::ValidationErrors;

use crate::domain::billing::BillingError;

use super::validation::validation_details;

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,

    /// Human-readable error message.
    pub message: String,

    /// Additional details (field errors, when present).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create an error response with details.
    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// API error type that converts failures to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// A failure from the model layer.
    Billing(BillingError),

    /// Aggregate field validation errors.
    Validation(ValidationErrors),

    /// The request body could not be parsed at all.
    Malformed(String),
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        ApiError::Billing(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let body = ErrorResponse::with_details(
                    "VALIDATION_FAILED",
                    "Request validation failed",
                    validation_details(&errors),
                );
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Malformed(message) => {
                let body = ErrorResponse::new("MALFORMED_BODY", message);
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Billing(err) => {
                let (status, error_code) = match &err {
                    BillingError::Validation { .. } => {
                        (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
                    }
                    BillingError::ProviderRejected { .. } => {
                        (StatusCode::BAD_REQUEST, "PROVIDER_REJECTED")
                    }
                    BillingError::NoActiveSubscription => {
                        (StatusCode::BAD_REQUEST, "NO_ACTIVE_SUBSCRIPTION")
                    }
                    BillingError::PlanNotSubscribed { .. } => {
                        (StatusCode::BAD_REQUEST, "PLAN_NOT_SUBSCRIBED")
                    }
                    BillingError::CustomerNotFound(_) => {
                        (StatusCode::NOT_FOUND, "CUSTOMER_NOT_FOUND")
                    }
                    BillingError::NotImplemented { .. } => {
                        (StatusCode::NOT_IMPLEMENTED, "NOT_IMPLEMENTED")
                    }
                    BillingError::ProviderUnavailable { .. } => {
                        (StatusCode::BAD_GATEWAY, "PROVIDER_UNAVAILABLE")
                    }
                    BillingError::Internal(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                    }
                };

                let message = match &err {
                    // Internal detail stays in the logs
                    BillingError::Internal(detail) => {
                        tracing::error!(error = %detail, "request failed");
                        "An internal error occurred".to_string()
                    }
                    other => other.to_string(),
                };

                let body = ErrorResponse::new(error_code, message);
                (status, Json(body)).into_response()
            }
        }
    }
}
