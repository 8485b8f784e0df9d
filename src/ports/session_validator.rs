//! Session validator port.
//!
//! The seam for the external authentication layer: given a bearer token,
//! resolve the acting subscriber. Whether tokens come from a JWT issuer or
//! a mock in tests, the middleware doesn't change.

use async_trait::async_trait;

use crate::domain::subscriber::{AuthError, AuthenticatedSubscriber};

/// Port for resolving the acting subscriber from request credentials.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a bearer token and return the subscriber it identifies.
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubscriber, AuthError>;
}
