//! HTTP DTOs for subscription endpoints.
//!
//! Raw payloads keep every field optional so presence rules are checked by
//! the validator together with the rest, producing one aggregate 400
//! instead of failing on the first missing field. Successful validation
//! converts into normalized records; the normalized record is also the
//! 201 echo body.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::adapters::http::validation::required_error;
use crate::domain::billing::{Subscription, SubscriptionStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Raw payload to create a subscription.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateSubscriptionPayload {
    /// Payment-method token from the provider's browser SDK.
    #[validate(
        required(message = "This field is required."),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub stripe_token: Option<String>,

    /// Per-request provider API key override.
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters."))]
    pub api_key: Option<String>,

    /// Plan (price) identifier to subscribe to.
    #[validate(
        required(message = "This field is required."),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub plan: Option<String>,

    /// Connected account to act on behalf of.
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub account: Option<String>,

    /// Tri-state: true/false, or absent-as-null.
    pub charge_immediately: Option<bool>,

    /// Tax percentage, max 5 digits with 2 decimal places.
    #[validate(custom = "crate::adapters::http::validation::validate_money_precision")]
    pub tax_percent: Option<Decimal>,
}

/// Validated, normalized subscription-creation request. Serialized back as
/// the 201 body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSubscription {
    pub stripe_token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub plan: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_immediately: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_percent: Option<Decimal>,
}

impl TryFrom<CreateSubscriptionPayload> for CreateSubscription {
    type Error = ValidationErrors;

    fn try_from(payload: CreateSubscriptionPayload) -> Result<Self, Self::Error> {
        payload.validate()?;

        // `required` above already rejected these; backstop for the unwrap-free path
        let stripe_token = payload.stripe_token.ok_or_else(|| required_error("stripe_token"))?;
        let plan = payload.plan.ok_or_else(|| required_error("plan"))?;

        Ok(Self {
            stripe_token,
            api_key: payload.api_key,
            plan,
            account: payload.account,
            charge_immediately: payload.charge_immediately,
            tax_percent: payload.tax_percent,
        })
    }
}

/// Raw payload to cancel a subscription. An absent body means "cancel the
/// current subscription".
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DeleteSubscriptionPayload {
    /// Plan identifier selecting which subscription to cancel.
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub plan: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Full projection of a subscription entity.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub customer_id: String,
    pub plan: String,
    pub status: SubscriptionStatus,
    pub cancel_at_period_end: bool,
    /// RFC 3339, when cancellation was requested.
    pub canceled_at: Option<String>,
    /// RFC 3339 period boundaries.
    pub current_period_start: String,
    pub current_period_end: String,
    pub created_at: String,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(subscription: Subscription) -> Self {
        Self {
            id: subscription.id,
            customer_id: subscription.customer_id,
            plan: subscription.plan,
            status: subscription.status,
            cancel_at_period_end: subscription.cancel_at_period_end,
            canceled_at: subscription.canceled_at.map(|t| t.to_rfc3339()),
            current_period_start: subscription.current_period_start.to_rfc3339(),
            current_period_end: subscription.current_period_end.to_rfc3339(),
            created_at: subscription.created_at.to_rfc3339(),
        }
    }
}
