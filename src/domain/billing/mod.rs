//! Billing entities consumed from the external customer/subscription model.
//!
//! None of these entities are owned or persisted by this layer. They are
//! projections of provider-side state, materialized per request by a
//! `CustomerModel` implementation and discarded when the response is sent.

mod errors;

pub use errors::BillingError;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::subscriber::SubscriberId;

/// A billable principal linked to a payment-provider account.
///
/// Carries the subscriptions that existed at resolution time. Handlers must
/// not treat this snapshot as current across mutating calls; mutations go
/// through the model layer by customer id.
#[derive(Debug, Clone)]
pub struct Customer {
    /// Provider-side customer id.
    pub id: String,

    /// The subscriber this customer belongs to.
    pub subscriber_id: SubscriberId,

    /// Default payment method token, if one is attached.
    pub default_payment_method: Option<String>,

    /// Subscriptions loaded with the customer.
    pub subscriptions: Vec<Subscription>,
}

impl Customer {
    /// The customer's sole current subscription, if any.
    pub fn active_subscription(&self) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.status.is_active())
    }

    /// The subscription for a specific plan identifier, if any.
    pub fn subscription_for_plan(&self, plan: &str) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.plan == plan)
    }
}

/// A recurring billing agreement tied to a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Provider-side subscription id.
    pub id: String,

    /// Provider-side customer id.
    pub customer_id: String,

    /// Plan (price) identifier.
    pub plan: String,

    /// Current provider status.
    pub status: SubscriptionStatus,

    /// Whether the subscription is set to cancel when the period elapses.
    pub cancel_at_period_end: bool,

    /// When cancellation was requested, if it was.
    pub canceled_at: Option<DateTime<Utc>>,

    /// Start of the current billing period.
    pub current_period_start: DateTime<Utc>,

    /// End of the current billing period.
    pub current_period_end: DateTime<Utc>,

    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
}

/// Subscription status as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Unpaid,
    Incomplete,
    IncompleteExpired,
    Unknown,
}

impl SubscriptionStatus {
    /// Whether the subscription currently grants service.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active
                | SubscriptionStatus::Trialing
                | SubscriptionStatus::PastDue
        )
    }
}

/// A one-off charge against a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Provider-side charge id.
    pub id: String,

    /// Provider-side customer id.
    pub customer_id: String,

    /// Charged amount in major currency units.
    pub amount: Decimal,

    /// ISO currency code.
    pub currency: String,

    /// Whether the charge settled.
    pub paid: bool,

    /// When the charge was created.
    pub created_at: DateTime<Utc>,
}

/// Per-operation payment options threaded from the request into the model
/// layer.
///
/// The API key override, the connected-account override, and the
/// charge-immediately flag always travel together.
#[derive(Debug, Clone, Default)]
pub struct PaymentOptions {
    /// Overrides the configured provider API key for this call.
    pub api_key: Option<SecretString>,

    /// Connected account to act on behalf of.
    pub account: Option<String>,

    /// Whether subscription creation invoices immediately.
    pub charge_immediately: Option<bool>,
}

impl PaymentOptions {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_charge_immediately(mut self, charge_immediately: Option<bool>) -> Self {
        self.charge_immediately = charge_immediately;
        self
    }

    /// Charge-immediately flag with the absent case defaulted to true.
    pub fn charge_immediately_or_default(&self) -> bool {
        self.charge_immediately.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(id: &str, plan: &str, status: SubscriptionStatus) -> Subscription {
        Subscription {
            id: id.to_string(),
            customer_id: "cus_1".to_string(),
            plan: plan.to_string(),
            status,
            cancel_at_period_end: false,
            canceled_at: None,
            current_period_start: Utc::now(),
            current_period_end: Utc::now(),
            created_at: Utc::now(),
        }
    }

    fn customer(subscriptions: Vec<Subscription>) -> Customer {
        Customer {
            id: "cus_1".to_string(),
            subscriber_id: SubscriberId::new("user-1").unwrap(),
            default_payment_method: None,
            subscriptions,
        }
    }

    #[test]
    fn active_subscription_skips_canceled() {
        let c = customer(vec![
            subscription("sub_1", "gold", SubscriptionStatus::Canceled),
            subscription("sub_2", "silver", SubscriptionStatus::Active),
        ]);
        assert_eq!(c.active_subscription().map(|s| s.id.as_str()), Some("sub_2"));
    }

    #[test]
    fn active_subscription_none_when_empty() {
        assert!(customer(vec![]).active_subscription().is_none());
    }

    #[test]
    fn past_due_still_counts_as_active() {
        let c = customer(vec![subscription("sub_1", "gold", SubscriptionStatus::PastDue)]);
        assert!(c.active_subscription().is_some());
    }

    #[test]
    fn subscription_for_plan_matches_exact_identifier() {
        let c = customer(vec![
            subscription("sub_1", "gold", SubscriptionStatus::Active),
            subscription("sub_2", "silver", SubscriptionStatus::Active),
        ]);
        assert_eq!(
            c.subscription_for_plan("silver").map(|s| s.id.as_str()),
            Some("sub_2")
        );
        assert!(c.subscription_for_plan("bronze").is_none());
    }

    #[test]
    fn payment_options_default_charges_immediately() {
        let options = PaymentOptions::default();
        assert!(options.charge_immediately_or_default());
        assert!(options.api_key.is_none());
        assert!(options.account.is_none());
    }

    #[test]
    fn payment_options_explicit_false_is_preserved() {
        let options = PaymentOptions::default().with_charge_immediately(Some(false));
        assert!(!options.charge_immediately_or_default());
    }
}
