//! Customer model port.
//!
//! The contract for the externally-owned customer/subscription model layer.
//! The REST adapter never talks to the payment provider directly; every
//! mutation goes through this seam so the provider integration (and its
//! retry/idempotency semantics) stays out of the HTTP layer.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::billing::{BillingError, Charge, Customer, PaymentOptions, Subscription};
use crate::domain::subscriber::SubscriberId;

/// Port for the external customer/subscription model.
///
/// Implementations resolve customers by subscriber identity and perform
/// all provider-side mutations. `get_or_create` must be safe to call
/// repeatedly for the same subscriber.
#[async_trait]
pub trait CustomerModel: Send + Sync {
    /// Resolve the customer for a subscriber, creating one if absent.
    ///
    /// Returns the customer (with current subscriptions loaded) and whether
    /// it was newly created.
    async fn get_or_create(
        &self,
        subscriber: &SubscriberId,
    ) -> Result<(Customer, bool), BillingError>;

    /// Attach a payment-method token to the customer and make it default.
    async fn add_payment_method(
        &self,
        customer_id: &str,
        token: &str,
    ) -> Result<(), BillingError>;

    /// Create a subscription for the customer.
    async fn subscribe(
        &self,
        customer_id: &str,
        request: SubscribeRequest,
    ) -> Result<Subscription, BillingError>;

    /// Create a one-off charge against the customer.
    async fn charge(
        &self,
        customer_id: &str,
        request: ChargeRequest,
    ) -> Result<Charge, BillingError>;

    /// Cancel a subscription.
    ///
    /// If `at_period_end` is true, the subscription stays active until the
    /// current billing period elapses.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<Subscription, BillingError>;
}

/// Request to create a subscription.
#[derive(Debug, Clone)]
pub struct SubscribeRequest {
    /// Plan (price) identifier to subscribe to.
    pub plan: String,

    /// Tax percentage applied to invoices, when supplied.
    pub tax_percent: Option<Decimal>,

    /// Per-operation payment options.
    pub options: PaymentOptions,
}

/// Request to create a charge.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Amount in major currency units.
    pub amount: Decimal,

    /// Per-operation payment options.
    pub options: PaymentOptions,
}
