//! In-memory customer model for tests and development.
//!
//! Implements the `CustomerModel` port without touching the provider.
//! Failure injection mirrors the error taxonomy so handler mappings can be
//! exercised without a network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::domain::billing::{
    BillingError, Charge, Customer, Subscription, SubscriptionStatus,
};
use crate::domain::subscriber::SubscriberId;
use crate::ports::{ChargeRequest, CustomerModel, SubscribeRequest};

#[derive(Default)]
struct State {
    customers: HashMap<String, Customer>,
    charges: Vec<Charge>,
    /// Journal of operations, in call order, for ordering assertions.
    calls: Vec<String>,
    next_customer: u32,
    next_subscription: u32,
    next_charge: u32,
    resolve_error: Option<BillingError>,
    subscribe_error: Option<BillingError>,
    charge_error: Option<BillingError>,
    cancel_error: Option<BillingError>,
}

/// Mock customer model backed by a process-local map.
#[derive(Default)]
pub struct MockCustomerModel {
    state: Mutex<State>,
}

impl MockCustomerModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-creates a customer for the subscriber.
    pub fn with_customer(self, subscriber_id: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            Self::ensure_customer(&mut state, subscriber_id);
        }
        self
    }

    /// Pre-creates a customer with an active subscription on `plan`.
    pub fn with_subscription(self, subscriber_id: &str, plan: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let customer_id = Self::ensure_customer(&mut state, subscriber_id);
            let subscription = Self::build_subscription(&mut state, &customer_id, plan);
            if let Some(customer) = state.customers.get_mut(subscriber_id) {
                customer.subscriptions.push(subscription);
            }
        }
        self
    }

    /// Makes customer resolution fail with the given error.
    pub fn failing_resolution(self, error: BillingError) -> Self {
        self.state.lock().unwrap().resolve_error = Some(error);
        self
    }

    /// Makes `subscribe` fail as a provider rejection with this message.
    pub fn rejecting_subscribe(self, message: &str) -> Self {
        self.state.lock().unwrap().subscribe_error =
            Some(BillingError::provider_rejected(message));
        self
    }

    /// Makes `charge` fail as a provider rejection with this message.
    pub fn rejecting_charge(self, message: &str) -> Self {
        self.state.lock().unwrap().charge_error = Some(BillingError::provider_rejected(message));
        self
    }

    /// Makes `charge` fail with an arbitrary error.
    pub fn failing_charge(self, error: BillingError) -> Self {
        self.state.lock().unwrap().charge_error = Some(error);
        self
    }

    /// Makes `cancel_subscription` fail with an arbitrary error.
    pub fn failing_cancel(self, error: BillingError) -> Self {
        self.state.lock().unwrap().cancel_error = Some(error);
        self
    }

    /// Operations performed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Charges created so far.
    pub fn charges(&self) -> Vec<Charge> {
        self.state.lock().unwrap().charges.clone()
    }

    /// Snapshot of a subscriber's customer record.
    pub fn customer(&self, subscriber_id: &str) -> Option<Customer> {
        self.state.lock().unwrap().customers.get(subscriber_id).cloned()
    }

    fn ensure_customer(state: &mut State, subscriber_id: &str) -> String {
        if let Some(existing) = state.customers.get(subscriber_id) {
            return existing.id.clone();
        }
        state.next_customer += 1;
        let customer = Customer {
            id: format!("cus_mock_{}", state.next_customer),
            subscriber_id: SubscriberId::new(subscriber_id).expect("subscriber id must be non-empty"),
            default_payment_method: None,
            subscriptions: Vec::new(),
        };
        let id = customer.id.clone();
        state.customers.insert(subscriber_id.to_string(), customer);
        id
    }

    fn build_subscription(state: &mut State, customer_id: &str, plan: &str) -> Subscription {
        state.next_subscription += 1;
        let now = Utc::now();
        Subscription {
            id: format!("sub_mock_{}", state.next_subscription),
            customer_id: customer_id.to_string(),
            plan: plan.to_string(),
            status: SubscriptionStatus::Active,
            cancel_at_period_end: false,
            canceled_at: None,
            current_period_start: now,
            current_period_end: now + Duration::days(30),
            created_at: now,
        }
    }
}

#[async_trait]
impl CustomerModel for MockCustomerModel {
    async fn get_or_create(
        &self,
        subscriber: &SubscriberId,
    ) -> Result<(Customer, bool), BillingError> {
        let mut state = self.state.lock().unwrap();
        if let Some(error) = state.resolve_error.clone() {
            return Err(error);
        }

        state.calls.push(format!("get_or_create:{subscriber}"));

        let created = !state.customers.contains_key(subscriber.as_str());
        Self::ensure_customer(&mut state, subscriber.as_str());
        let customer = state
            .customers
            .get(subscriber.as_str())
            .cloned()
            .ok_or_else(|| BillingError::CustomerNotFound(subscriber.clone()))?;

        Ok((customer, created))
    }

    async fn add_payment_method(
        &self,
        customer_id: &str,
        token: &str,
    ) -> Result<(), BillingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("add_payment_method:{customer_id}:{token}"));

        let customer = state
            .customers
            .values_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| {
                BillingError::provider_rejected(format!("No such customer: {customer_id}"))
            })?;
        customer.default_payment_method = Some(token.to_string());
        Ok(())
    }

    async fn subscribe(
        &self,
        customer_id: &str,
        request: SubscribeRequest,
    ) -> Result<Subscription, BillingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!(
            "subscribe:{customer_id}:{}:charge_immediately={}",
            request.plan,
            request.options.charge_immediately_or_default()
        ));

        if let Some(error) = state.subscribe_error.clone() {
            return Err(error);
        }

        let subscription = Self::build_subscription(&mut state, customer_id, &request.plan);
        let customer = state
            .customers
            .values_mut()
            .find(|c| c.id == customer_id)
            .ok_or_else(|| {
                BillingError::provider_rejected(format!("No such customer: {customer_id}"))
            })?;
        customer.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn charge(
        &self,
        customer_id: &str,
        request: ChargeRequest,
    ) -> Result<Charge, BillingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("charge:{customer_id}:{}", request.amount));

        if let Some(error) = state.charge_error.clone() {
            return Err(error);
        }

        state.next_charge += 1;
        let charge = Charge {
            id: format!("ch_mock_{}", state.next_charge),
            customer_id: customer_id.to_string(),
            amount: request.amount,
            currency: "usd".to_string(),
            paid: true,
            created_at: Utc::now(),
        };
        state.charges.push(charge.clone());
        Ok(charge)
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
        at_period_end: bool,
    ) -> Result<Subscription, BillingError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!(
            "cancel_subscription:{subscription_id}:at_period_end={at_period_end}"
        ));

        if let Some(error) = state.cancel_error.clone() {
            return Err(error);
        }

        let subscription = state
            .customers
            .values_mut()
            .flat_map(|c| c.subscriptions.iter_mut())
            .find(|s| s.id == subscription_id)
            .ok_or_else(|| {
                BillingError::provider_rejected(format!(
                    "No such subscription: {subscription_id}"
                ))
            })?;

        if at_period_end {
            subscription.cancel_at_period_end = true;
        } else {
            subscription.status = SubscriptionStatus::Canceled;
        }
        subscription.canceled_at = Some(Utc::now());
        Ok(subscription.clone())
    }
}
