//! Authentication configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Authentication configuration (JWT bearer tokens)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to verify bearer tokens
    #[serde(default)]
    pub jwt_secret: String,

    /// Expected token issuer, when enforced
    pub issuer: Option<String>,

    /// Expected token audience, when enforced
    pub audience: Option<String>,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if self.jwt_secret.len() < 32 {
            return Err(ValidationError::JwtSecretTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            AuthConfig::default().validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn short_secret_is_rejected() {
        let config = AuthConfig {
            jwt_secret: "short".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::JwtSecretTooShort)
        ));
    }

    #[test]
    fn long_secret_is_accepted() {
        let config = AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
