//! HTTP handlers for subscription endpoints.
//!
//! Each handler is a linear pass-through: validated payload in, one or two
//! customer-model calls, status code out. The model layer owns all billing
//! semantics; nothing is cached between calls.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use secrecy::SecretString;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireSubscriber;
use crate::adapters::http::validation::{JsonPayload, OptionalJsonPayload};
use crate::adapters::http::BillingAppState;
use crate::domain::billing::{BillingError, PaymentOptions};
use crate::ports::SubscribeRequest;
use validator::Validate;

use super::dto::{
    CreateSubscription, CreateSubscriptionPayload, DeleteSubscriptionPayload,
    SubscriptionResponse,
};

/// GET /subscription/ - Current subscription projection, or 204 when the
/// customer has none.
///
/// 204 is reserved for a customer with no active subscription; resolution
/// failures surface with their own error kinds.
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    RequireSubscriber(subscriber): RequireSubscriber,
) -> Result<Response, ApiError> {
    let (customer, _created) = state.customers.get_or_create(&subscriber.id).await?;

    match customer.active_subscription() {
        Some(subscription) => {
            let response = SubscriptionResponse::from(subscription.clone());
            Ok((StatusCode::OK, Json(response)).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// POST /subscription/ - Create a subscription for the caller.
///
/// Attaches the supplied payment token, then subscribes to the plan. The
/// 201 body echoes the validated input.
pub async fn create_subscription(
    State(state): State<BillingAppState>,
    RequireSubscriber(subscriber): RequireSubscriber,
    JsonPayload(payload): JsonPayload<CreateSubscriptionPayload>,
) -> Result<Response, ApiError> {
    let request = CreateSubscription::try_from(payload)?;

    let (customer, _created) = state.customers.get_or_create(&subscriber.id).await?;
    state
        .customers
        .add_payment_method(&customer.id, &request.stripe_token)
        .await?;

    let options = PaymentOptions {
        api_key: request.api_key.clone().map(SecretString::new),
        account: request.account.clone(),
        charge_immediately: request.charge_immediately,
    };
    let subscribe = SubscribeRequest {
        plan: request.plan.clone(),
        tax_percent: request.tax_percent,
        options,
    };
    state.customers.subscribe(&customer.id, subscribe).await?;

    tracing::info!(subscriber = %subscriber.id, plan = %request.plan, "subscription created");
    Ok((StatusCode::CREATED, Json(request)).into_response())
}

/// DELETE /subscription/ - Cancel the caller's subscription.
///
/// With a `plan` in the body, cancels the subscription matching that plan
/// identifier; otherwise the sole active subscription. Timing follows the
/// configured cancellation policy.
pub async fn delete_subscription(
    State(state): State<BillingAppState>,
    RequireSubscriber(subscriber): RequireSubscriber,
    OptionalJsonPayload(payload): OptionalJsonPayload<DeleteSubscriptionPayload>,
) -> Result<Response, ApiError> {
    payload.validate()?;

    let (customer, _created) = state.customers.get_or_create(&subscriber.id).await?;

    let subscription = match payload.plan.as_deref() {
        Some(plan) => customer
            .subscription_for_plan(plan)
            .ok_or_else(|| BillingError::plan_not_subscribed(plan))?,
        None => customer
            .active_subscription()
            .ok_or(BillingError::NoActiveSubscription)?,
    };

    state
        .customers
        .cancel_subscription(&subscription.id, state.billing.cancel_at_period_end)
        .await?;

    tracing::info!(subscriber = %subscriber.id, subscription = %subscription.id, "subscription cancelled");
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::stripe::MockCustomerModel;
    use crate::config::BillingConfig;
    use crate::domain::subscriber::{AuthenticatedSubscriber, SubscriberId};

    fn test_subscriber() -> RequireSubscriber {
        RequireSubscriber(AuthenticatedSubscriber::new(
            SubscriberId::new("test-user").unwrap(),
            None,
        ))
    }

    fn state_with(model: MockCustomerModel) -> (BillingAppState, Arc<MockCustomerModel>) {
        let model = Arc::new(model);
        let state = BillingAppState {
            customers: model.clone(),
            billing: Arc::new(BillingConfig::default()),
        };
        (state, model)
    }

    fn create_payload(token: &str, plan: &str) -> CreateSubscriptionPayload {
        CreateSubscriptionPayload {
            stripe_token: Some(token.to_string()),
            plan: Some(plan.to_string()),
            ..Default::default()
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // GET
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn get_returns_204_without_subscription() {
        let (state, _) = state_with(MockCustomerModel::new());
        let response = get_subscription(State(state), test_subscriber()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn get_returns_200_with_subscription() {
        let (state, _) = state_with(MockCustomerModel::new().with_subscription("test-user", "gold"));
        let response = get_subscription(State(state), test_subscriber()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn get_does_not_mask_resolution_failures() {
        let (state, _) = state_with(
            MockCustomerModel::new()
                .failing_resolution(BillingError::provider_unavailable("timeout")),
        );
        let err = get_subscription(State(state), test_subscriber()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // POST
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_returns_201_and_attaches_token_before_subscribing() {
        let (state, model) = state_with(MockCustomerModel::new());

        let response = create_subscription(
            State(state),
            test_subscriber(),
            JsonPayload(create_payload("tok_visa", "gold")),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let calls = model.calls();
        let attach = calls.iter().position(|c| c.starts_with("add_payment_method"));
        let subscribe = calls.iter().position(|c| c.starts_with("subscribe"));
        assert!(attach.unwrap() < subscribe.unwrap());
        assert!(calls[subscribe.unwrap()].contains("charge_immediately=true"));
    }

    #[tokio::test]
    async fn create_with_invalid_payload_returns_400_without_model_calls() {
        let (state, model) = state_with(MockCustomerModel::new());

        let err = create_subscription(
            State(state),
            test_subscriber(),
            JsonPayload(CreateSubscriptionPayload::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn create_surfaces_provider_rejection_as_400() {
        let (state, _) = state_with(
            MockCustomerModel::new().rejecting_subscribe("No such plan: gold"),
        );

        let err = create_subscription(
            State(state),
            test_subscriber(),
            JsonPayload(create_payload("tok_visa", "gold")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_threads_explicit_charge_immediately_false() {
        let (state, model) = state_with(MockCustomerModel::new());

        let mut payload = create_payload("tok_visa", "gold");
        payload.charge_immediately = Some(false);
        create_subscription(State(state), test_subscriber(), JsonPayload(payload))
            .await
            .unwrap();

        assert!(model
            .calls()
            .iter()
            .any(|c| c.contains("charge_immediately=false")));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // DELETE
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn delete_without_plan_cancels_sole_subscription() {
        let (state, model) = state_with(MockCustomerModel::new().with_subscription("test-user", "gold"));

        let response = delete_subscription(
            State(state),
            test_subscriber(),
            OptionalJsonPayload(DeleteSubscriptionPayload::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(model
            .calls()
            .iter()
            .any(|c| c.starts_with("cancel_subscription") && c.contains("at_period_end=true")));
    }

    #[tokio::test]
    async fn delete_with_plan_cancels_only_that_plan() {
        let model = MockCustomerModel::new()
            .with_subscription("test-user", "gold")
            .with_subscription("test-user", "silver");
        let (state, model) = state_with(model);

        let payload = DeleteSubscriptionPayload {
            plan: Some("silver".to_string()),
        };
        delete_subscription(State(state), test_subscriber(), OptionalJsonPayload(payload))
            .await
            .unwrap();

        let customer = model.customer("test-user").unwrap();
        let gold = customer.subscription_for_plan("gold").unwrap();
        let silver = customer.subscription_for_plan("silver").unwrap();
        assert!(!gold.cancel_at_period_end);
        assert!(silver.cancel_at_period_end);
    }

    #[tokio::test]
    async fn delete_with_unknown_plan_returns_400() {
        let (state, _) = state_with(MockCustomerModel::new().with_subscription("test-user", "gold"));

        let payload = DeleteSubscriptionPayload {
            plan: Some("bronze".to_string()),
        };
        let err = delete_subscription(State(state), test_subscriber(), OptionalJsonPayload(payload))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_without_subscription_returns_400() {
        let (state, _) = state_with(MockCustomerModel::new());

        let err = delete_subscription(
            State(state),
            test_subscriber(),
            OptionalJsonPayload(DeleteSubscriptionPayload::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_honors_immediate_cancellation_policy() {
        let model = Arc::new(MockCustomerModel::new().with_subscription("test-user", "gold"));
        let state = BillingAppState {
            customers: model.clone(),
            billing: Arc::new(BillingConfig {
                cancel_at_period_end: false,
                ..Default::default()
            }),
        };

        delete_subscription(
            State(state),
            test_subscriber(),
            OptionalJsonPayload(DeleteSubscriptionPayload::default()),
        )
        .await
        .unwrap();

        assert!(model
            .calls()
            .iter()
            .any(|c| c.starts_with("cancel_subscription") && c.contains("at_period_end=false")));
    }
}
