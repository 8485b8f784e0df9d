//! HTTP DTOs for charge endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::adapters::http::validation::required_error;

/// Raw payload to create a charge.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateChargePayload {
    /// Payment-method token from the provider's browser SDK.
    #[validate(
        required(message = "This field is required."),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub stripe_token: Option<String>,

    /// Per-request provider API key override.
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters."))]
    pub api_key: Option<String>,

    /// Amount in major currency units, max 5 digits with 2 decimal places.
    #[validate(
        required(message = "This field is required."),
        custom = "crate::adapters::http::validation::validate_money_precision"
    )]
    pub amount: Option<Decimal>,
}

/// Validated, normalized charge-creation request. Serialized back as the
/// 201 body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCharge {
    pub stripe_token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub amount: Decimal,
}

impl TryFrom<CreateChargePayload> for CreateCharge {
    type Error = ValidationErrors;

    fn try_from(payload: CreateChargePayload) -> Result<Self, Self::Error> {
        payload.validate()?;

        let stripe_token = payload.stripe_token.ok_or_else(|| required_error("stripe_token"))?;
        let amount = payload.amount.ok_or_else(|| required_error("amount"))?;

        Ok(Self {
            stripe_token,
            api_key: payload.api_key,
            amount,
        })
    }
}
