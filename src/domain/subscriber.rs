//! Subscriber identity types.
//!
//! A subscriber is the acting principal behind a request. Every billing
//! operation is performed on behalf of exactly one subscriber, resolved
//! by the authentication layer before handler logic runs.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier linking a subscriber to their customer record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(String);

impl SubscriberId {
    /// Creates a new SubscriberId, returning an error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, AuthError> {
        let id = id.into();
        if id.is_empty() {
            return Err(AuthError::InvalidSubscriber);
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated subscriber context attached to a request.
#[derive(Debug, Clone)]
pub struct AuthenticatedSubscriber {
    pub id: SubscriberId,

    /// Email claim, when the token carries one.
    pub email: Option<String>,
}

impl AuthenticatedSubscriber {
    pub fn new(id: SubscriberId, email: Option<String>) -> Self {
        Self { id, email }
    }
}

/// Errors produced while resolving the acting subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no credentials provided")]
    MissingCredentials,

    #[error("token is invalid")]
    InvalidToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("subscriber identity is invalid")]
    InvalidSubscriber,

    #[error("authentication service unavailable: {0}")]
    ServiceUnavailable(String),
}
