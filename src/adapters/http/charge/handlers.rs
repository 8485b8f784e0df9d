//! HTTP handlers for charge endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use secrecy::SecretString;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireSubscriber;
use crate::adapters::http::validation::JsonPayload;
use crate::adapters::http::BillingAppState;
use crate::domain::billing::{BillingError, PaymentOptions};
use crate::ports::ChargeRequest;

use super::dto::{CreateCharge, CreateChargePayload};

/// GET /charge/ - Listing charges is not part of this surface yet.
///
/// Answers 501 deliberately instead of crashing.
pub async fn list_charges(
    State(_state): State<BillingAppState>,
    RequireSubscriber(_subscriber): RequireSubscriber,
) -> Result<Response, ApiError> {
    Err(BillingError::not_implemented("listing charges").into())
}

/// POST /charge/ - Create a one-off charge for the caller.
///
/// Attaches the supplied payment token, then charges the amount. The 201
/// body echoes the validated input.
pub async fn create_charge(
    State(state): State<BillingAppState>,
    RequireSubscriber(subscriber): RequireSubscriber,
    JsonPayload(payload): JsonPayload<CreateChargePayload>,
) -> Result<Response, ApiError> {
    let request = CreateCharge::try_from(payload)?;

    let (customer, _created) = state.customers.get_or_create(&subscriber.id).await?;
    state
        .customers
        .add_payment_method(&customer.id, &request.stripe_token)
        .await?;

    let options = PaymentOptions {
        api_key: request.api_key.clone().map(SecretString::new),
        ..Default::default()
    };
    let charge = ChargeRequest {
        amount: request.amount,
        options,
    };
    state.customers.charge(&customer.id, charge).await?;

    tracing::info!(subscriber = %subscriber.id, amount = %request.amount, "charge created");
    Ok((StatusCode::CREATED, Json(request)).into_response())
}
