//! JWT session validator.
//!
//! Implements the `SessionValidator` port over HS256 bearer tokens issued
//! by the surrounding platform. The `sub` claim carries the subscriber
//! identity; `email` is optional.

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::domain::subscriber::{AuthError, AuthenticatedSubscriber, SubscriberId};
use crate::ports::SessionValidator;

/// Claims we read from platform-issued tokens.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    email: Option<String>,
    #[allow(dead_code)]
    exp: usize,
}

/// HS256 JWT validator configured from [`AuthConfig`].
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(audience) = &config.audience {
            validation.set_audience(&[audience]);
        } else {
            validation.validate_aud = false;
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedSubscriber, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => {
                    tracing::debug!(error = %e, "bearer token rejected");
                    AuthError::InvalidToken
                }
            }
        })?;

        let id = SubscriberId::new(data.claims.sub)?;
        Ok(AuthenticatedSubscriber::new(id, data.claims.email))
    }
}
