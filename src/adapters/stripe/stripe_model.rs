//! Stripe-backed customer model adapter.
//!
//! Implements the `CustomerModel` port against the Stripe API. Customers
//! are correlated to subscribers through a `subscriber_id` metadata entry;
//! no state is persisted on this side.
//!
//! # Request options
//!
//! - Per-operation API key overrides replace the configured key for that
//!   call only.
//! - A connected-account override is forwarded via the `Stripe-Account`
//!   header.
//! - Mutating calls carry an `Idempotency-Key` header so provider-side
//!   retries stay safe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::BillingConfig;
use crate::domain::billing::{
    BillingError, Charge, Customer, PaymentOptions, Subscription, SubscriptionStatus,
};
use crate::domain::subscriber::SubscriberId;
use crate::ports::{ChargeRequest, CustomerModel, SubscribeRequest};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API.
    api_base_url: String,

    /// Currency used for charges.
    currency: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            currency: "usd".to_string(),
        }
    }

    /// Build from the application billing section.
    pub fn from_billing(config: &BillingConfig) -> Self {
        Self {
            api_key: SecretString::new(config.stripe_api_key.clone()),
            api_base_url: config.api_base_url.clone(),
            currency: config.currency.clone(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe implementation of the customer model port.
pub struct StripeCustomerModel {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeCustomerModel {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// API key for a call, honoring the per-operation override.
    fn request_key<'a>(&'a self, options: &'a PaymentOptions) -> &'a str {
        options
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .unwrap_or_else(|| self.config.api_key.expose_secret())
    }

    async fn find_customer(
        &self,
        subscriber: &SubscriberId,
    ) -> Result<Option<StripeCustomer>, BillingError> {
        let url = format!("{}/v1/customers/search", self.config.api_base_url);
        let query = format!("metadata['subscriber_id']:'{}'", subscriber);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(&[("query", query.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status("customer search", response).await?;
        let list: StripeList<StripeCustomer> = parse_body("customer search", response).await?;

        Ok(list.data.into_iter().next())
    }

    async fn create_customer(
        &self,
        subscriber: &SubscriberId,
    ) -> Result<StripeCustomer, BillingError> {
        let url = format!("{}/v1/customers", self.config.api_base_url);
        let params = [("metadata[subscriber_id]", subscriber.as_str())];

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&params)
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status("customer create", response).await?;
        parse_body("customer create", response).await
    }

    async fn load_subscriptions(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Subscription>, BillingError> {
        let url = format!("{}/v1/subscriptions", self.config.api_base_url);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(&[("customer", customer_id), ("status", "all")])
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status("subscription list", response).await?;
        let list: StripeList<StripeSubscription> =
            parse_body("subscription list", response).await?;

        Ok(list.data.into_iter().map(subscription_from_wire).collect())
    }
}

#[async_trait]
impl CustomerModel for StripeCustomerModel {
    async fn get_or_create(
        &self,
        subscriber: &SubscriberId,
    ) -> Result<(Customer, bool), BillingError> {
        if let Some(wire) = self.find_customer(subscriber).await? {
            let subscriptions = self.load_subscriptions(&wire.id).await?;
            let customer = Customer {
                id: wire.id,
                subscriber_id: subscriber.clone(),
                default_payment_method: wire.default_source,
                subscriptions,
            };
            return Ok((customer, false));
        }

        let wire = self.create_customer(subscriber).await?;
        tracing::info!(customer_id = %wire.id, subscriber = %subscriber, "created provider customer");

        let customer = Customer {
            id: wire.id,
            subscriber_id: subscriber.clone(),
            default_payment_method: wire.default_source,
            subscriptions: Vec::new(),
        };
        Ok((customer, true))
    }

    async fn add_payment_method(
        &self,
        customer_id: &str,
        token: &str,
    ) -> Result<(), BillingError> {
        let url = format!(
            "{}/v1/customers/{}/sources",
            self.config.api_base_url, customer_id
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&[("source", token)])
            .send()
            .await
            .map_err(network_error)?;

        check_status("payment method attach", response).await?;
        Ok(())
    }

    async fn subscribe(
        &self,
        customer_id: &str,
        request: SubscribeRequest,
    ) -> Result<Subscription, BillingError> {
        let url = format!("{}/v1/subscriptions", self.config.api_base_url);

        let mut params = vec![
            ("customer", customer_id.to_string()),
            ("items[0][price]", request.plan.clone()),
        ];
        if let Some(tax_percent) = request.tax_percent {
            params.push(("tax_percent", tax_percent.to_string()));
        }
        if !request.options.charge_immediately_or_default() {
            params.push(("payment_behavior", "default_incomplete".to_string()));
        }

        let mut builder = self
            .http_client
            .post(&url)
            .basic_auth(self.request_key(&request.options), Option::<&str>::None)
            .header("Idempotency-Key", Uuid::new_v4().to_string());
        if let Some(account) = &request.options.account {
            builder = builder.header("Stripe-Account", account);
        }

        let response = builder
            .form(&params)
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status("subscription create", response).await?;
        let wire: StripeSubscription = parse_body("subscription create", response).await?;

        tracing::info!(subscription_id = %wire.id, customer_id, "created subscription");
        Ok(subscription_from_wire(wire))
    }

    async fn charge(
        &self,
        customer_id: &str,
        request: ChargeRequest,
    ) -> Result<Charge, BillingError> {
        let url = format!("{}/v1/charges", self.config.api_base_url);
        let amount = amount_to_minor_units(request.amount)?;

        let mut builder = self
            .http_client
            .post(&url)
            .basic_auth(self.request_key(&request.options), Option::<&str>::None)
            .header("Idempotency-Key", Uuid::new_v4().to_string());
        if let Some(account) = &request.options.account {
            builder = builder.header("Stripe-Account", account);
        }

        let response = builder
            .form(&[
                ("amount", amount.to_string()),
                ("currency", self.config.currency.clone()),
                ("customer", customer_id.to_string()),
            ])
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status("charge create", response).await?;
        let wire: StripeCharge = parse_body("charge create", response).await?;

        tracing::info!(charge_id = %wire.id, customer_id, "created charge");
        Ok(charge_from_wire(wire))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<Subscription, BillingError> {
        let url = format!(
            "{}/v1/subscriptions/{}",
            self.config.api_base_url, subscription_id
        );

        let builder = if at_period_end {
            self.http_client
                .post(&url)
                .form(&[("cancel_at_period_end", "true")])
        } else {
            self.http_client.delete(&url)
        };

        let response = builder
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(network_error)?;

        let response = check_status("subscription cancel", response).await?;
        let wire: StripeSubscription = parse_body("subscription cancel", response).await?;

        tracing::info!(subscription_id, at_period_end, "cancelled subscription");
        Ok(subscription_from_wire(wire))
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
struct StripeList<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
    #[serde(default)]
    default_source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripePrice {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeSubscriptionItem {
    price: StripePrice,
}

#[derive(Debug, Deserialize)]
struct StripeSubscription {
    id: String,
    customer: String,
    status: String,
    #[serde(default)]
    cancel_at_period_end: bool,
    #[serde(default)]
    canceled_at: Option<i64>,
    current_period_start: i64,
    current_period_end: i64,
    created: i64,
    items: StripeList<StripeSubscriptionItem>,
}

#[derive(Debug, Deserialize)]
struct StripeCharge {
    id: String,
    #[serde(default)]
    customer: Option<String>,
    amount: i64,
    currency: String,
    paid: bool,
    created: i64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    #[serde(default)]
    message: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Conversions and error translation
// ════════════════════════════════════════════════════════════════════════════════

fn subscription_from_wire(wire: StripeSubscription) -> Subscription {
    let plan = wire
        .items
        .data
        .first()
        .map(|item| item.price.id.clone())
        .unwrap_or_default();

    Subscription {
        id: wire.id,
        customer_id: wire.customer,
        plan,
        status: status_from_wire(&wire.status),
        cancel_at_period_end: wire.cancel_at_period_end,
        canceled_at: wire.canceled_at.map(datetime_from_unix),
        current_period_start: datetime_from_unix(wire.current_period_start),
        current_period_end: datetime_from_unix(wire.current_period_end),
        created_at: datetime_from_unix(wire.created),
    }
}

fn charge_from_wire(wire: StripeCharge) -> Charge {
    Charge {
        id: wire.id,
        customer_id: wire.customer.unwrap_or_default(),
        amount: Decimal::new(wire.amount, 2),
        currency: wire.currency,
        paid: wire.paid,
        created_at: datetime_from_unix(wire.created),
    }
}

fn status_from_wire(status: &str) -> SubscriptionStatus {
    match status {
        "active" => SubscriptionStatus::Active,
        "trialing" => SubscriptionStatus::Trialing,
        "past_due" => SubscriptionStatus::PastDue,
        "canceled" => SubscriptionStatus::Canceled,
        "unpaid" => SubscriptionStatus::Unpaid,
        "incomplete" => SubscriptionStatus::Incomplete,
        "incomplete_expired" => SubscriptionStatus::IncompleteExpired,
        _ => SubscriptionStatus::Unknown,
    }
}

fn datetime_from_unix(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

/// Major units to provider minor units (cents).
fn amount_to_minor_units(amount: Decimal) -> Result<i64, BillingError> {
    (amount * Decimal::ONE_HUNDRED)
        .trunc()
        .to_i64()
        .ok_or_else(|| BillingError::internal(format!("amount {amount} out of range")))
}

fn network_error(error: reqwest::Error) -> BillingError {
    tracing::error!(error = %error, "provider request failed");
    BillingError::provider_unavailable(error.to_string())
}

/// Translate non-success responses into the error taxonomy.
///
/// 5xx and 429 mean the provider couldn't serve the request; anything else
/// non-success is the provider refusing it, with Stripe's own message
/// surfaced when the body parses.
async fn check_status(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, BillingError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        tracing::error!(%status, operation, "provider unavailable");
        return Err(BillingError::provider_unavailable(format!(
            "{operation} failed with HTTP {status}"
        )));
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, operation, "provider rejected request");
    Err(provider_rejection(operation, status.as_u16(), &body))
}

fn provider_rejection(operation: &str, status: u16, body: &str) -> BillingError {
    match serde_json::from_str::<StripeErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            BillingError::provider_rejected(envelope.error.message)
        }
        _ => BillingError::provider_rejected(format!("{operation} failed with HTTP {status}")),
    }
}

async fn parse_body<T: serde::de::DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<T, BillingError> {
    response.json().await.map_err(|e| {
        tracing::error!(error = %e, operation, "unparseable provider response");
        BillingError::internal(format!("{operation}: unparseable provider response"))
    })
}
