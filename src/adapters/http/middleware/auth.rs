//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` - Validates Bearer tokens and injects the subscriber
//!   into request extensions
//! - `RequireSubscriber` - Extractor that rejects unauthenticated requests
//!
//! The middleware uses the `SessionValidator` port, keeping it
//! provider-agnostic: a JWT issuer in production, a mock in tests.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedSubscriber into extensions
//!                                      ↓
//!                              Handler → RequireSubscriber reads from extensions
//! ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::subscriber::{AuthError, AuthenticatedSubscriber};
use crate::ports::SessionValidator;

use super::super::error::ErrorResponse;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Authentication middleware that validates Bearer tokens.
///
/// On a valid token the subscriber lands in request extensions; with no
/// token the request continues unauthenticated and `RequireSubscriber`
/// rejects it at the handler boundary. An invalid token fails here.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match token {
        Some(token) => match validator.validate(token).await {
            Ok(subscriber) => {
                request.extensions_mut().insert(subscriber);
                next.run(request).await
            }
            Err(error) => {
                let (status, message) = match &error {
                    AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                    AuthError::ServiceUnavailable(detail) => {
                        tracing::error!(error = %detail, "auth service unavailable");
                        (
                            StatusCode::SERVICE_UNAVAILABLE,
                            "Authentication service unavailable",
                        )
                    }
                    _ => (StatusCode::UNAUTHORIZED, "Invalid token"),
                };

                let body = ErrorResponse::new("AUTH_ERROR", message);
                (status, Json(body)).into_response()
            }
        },
        None => next.run(request).await,
    }
}

/// Extractor that requires an authenticated subscriber.
///
/// Returns 401 when the middleware didn't validate a token for this
/// request.
#[derive(Debug, Clone)]
pub struct RequireSubscriber(pub AuthenticatedSubscriber);

/// Rejection type for `RequireSubscriber`.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireSubscriber
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSubscriber>()
            .cloned()
            .map(RequireSubscriber)
            .ok_or(AuthenticationRequired)
    }
}
