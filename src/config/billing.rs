//! Billing configuration (Stripe)

use serde::Deserialize;

use super::error::ValidationError;

/// Billing configuration.
///
/// The cancellation timing policy and default API key live here rather than
/// in process-wide statics; handlers receive them through request state.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Stripe secret API key
    #[serde(default)]
    pub stripe_api_key: String,

    /// Whether cancellations take effect at period end (vs. immediately)
    #[serde(default = "default_cancel_at_period_end")]
    pub cancel_at_period_end: bool,

    /// Default currency for charges
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Base URL for the Stripe API (overridable for tests)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl BillingConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Validate billing configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("BILLING__STRIPE_API_KEY"));
        }
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            cancel_at_period_end: default_cancel_at_period_end(),
            currency: default_currency(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_cancel_at_period_end() -> bool {
    true
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BillingConfig {
        BillingConfig {
            stripe_api_key: "sk_test_xxx".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mode_detection() {
        let config = valid_config();
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
    }

    #[test]
    fn live_mode_detection() {
        let config = BillingConfig {
            stripe_api_key: "sk_live_xxx".to_string(),
            ..Default::default()
        };
        assert!(config.is_live_mode());
        assert!(!config.is_test_mode());
    }

    #[test]
    fn missing_key_fails_validation() {
        let config = BillingConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }

    #[test]
    fn non_secret_key_fails_validation() {
        let config = BillingConfig {
            stripe_api_key: "pk_test_xxx".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidStripeKey)));
    }

    #[test]
    fn bad_currency_fails_validation() {
        let config = BillingConfig {
            currency: "USD".to_string(),
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidCurrency)));
    }

    #[test]
    fn cancellation_defaults_to_period_end() {
        assert!(BillingConfig::default().cancel_at_period_end);
    }
}
