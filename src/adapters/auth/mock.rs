//! Mock authentication adapter for testing.
//!
//! Implements the `SessionValidator` port without a real token issuer.
//! Tokens are registered up front; everything else is rejected.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::subscriber::{AuthError, AuthenticatedSubscriber, SubscriberId};
use crate::ports::SessionValidator;

/// Mock session validator for testing.
///
/// Stores a map of tokens to subscribers. Tokens not in the map return
/// `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedSubscriber>>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    /// Creates a new empty mock validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a subscriber.
    pub fn with_subscriber(self, token: impl Into<String>, subscriber: AuthenticatedSubscriber) -> Self {
        self.tokens.write().unwrap().insert(token.into(), subscriber);
        self
    }

    /// Adds a valid token for a simple test subscriber with the given id.
    pub fn with_test_subscriber(self, token: impl Into<String>, subscriber_id: impl Into<String>) -> Self {
        let subscriber_id = subscriber_id.into();
        let subscriber = AuthenticatedSubscriber::new(
            SubscriberId::new(&subscriber_id).unwrap(),
            Some(format!("{subscriber_id}@test.example.com")),
        );
        self.with_subscriber(token, subscriber)
    }

    /// Makes every validation fail with the given error.
    pub fn failing_with(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubscriber, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_token_validates() {
        let validator = MockSessionValidator::new().with_test_subscriber("tok", "user-1");
        let subscriber = validator.validate("tok").await.unwrap();
        assert_eq!(subscriber.id.as_str(), "user-1");
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let validator = MockSessionValidator::new();
        assert_eq!(validator.validate("nope").await.unwrap_err(), AuthError::InvalidToken);
    }

    #[tokio::test]
    async fn forced_error_wins() {
        let validator = MockSessionValidator::new()
            .with_test_subscriber("tok", "user-1")
            .failing_with(AuthError::ServiceUnavailable("down".to_string()));
        assert!(matches!(
            validator.validate("tok").await.unwrap_err(),
            AuthError::ServiceUnavailable(_)
        ));
    }
}
