//! Request payload validation helpers.
//!
//! The DTOs declare their rules with `validator` derives; this module holds
//! the pieces the derives can't express: the money-precision rule, the
//! field-error projection used in 400 bodies, and a `Json` wrapper that
//! turns undeserializable bodies into 400s instead of axum's default 422.

use std::borrow::Cow;

use axum::async_trait;
use axum::extract::{FromRequest, Request};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use validator::{ValidationError, ValidationErrors};

use super::error::ApiError;

/// Total significant digits allowed in money fields.
const MONEY_MAX_DIGITS: u32 = 5;

/// Fractional digits allowed in money fields.
const MONEY_DECIMAL_PLACES: u32 = 2;

/// Validates the 5-digit / 2-decimal-place money rule.
///
/// Fractional digits beyond the allowed places are rejected rather than
/// rounded, and the whole part may use only the digits the total budget
/// leaves over.
pub fn validate_money_precision(value: &Decimal) -> Result<(), ValidationError> {
    let normalized = value.abs().normalize();

    if normalized.scale() > MONEY_DECIMAL_PLACES {
        let mut error = ValidationError::new("max_decimal_places");
        error.message = Some(Cow::Owned(format!(
            "Ensure that there are no more than {MONEY_DECIMAL_PLACES} decimal places."
        )));
        return Err(error);
    }

    let whole_digits = whole_digit_count(&normalized);
    if whole_digits > MONEY_MAX_DIGITS - MONEY_DECIMAL_PLACES {
        let mut error = ValidationError::new("max_digits");
        error.message = Some(Cow::Owned(format!(
            "Ensure that there are no more than {MONEY_MAX_DIGITS} digits in total."
        )));
        return Err(error);
    }

    Ok(())
}

fn whole_digit_count(value: &Decimal) -> u32 {
    let whole = value.trunc();
    if whole.is_zero() {
        0
    } else {
        whole.normalize().to_string().len() as u32
    }
}

/// Project aggregate validation errors into a `{field: [messages]}` object
/// for the `details` section of a 400 body.
pub fn validation_details(errors: &ValidationErrors) -> serde_json::Value {
    let mut details = serde_json::Map::new();

    for (field, kind) in errors.errors() {
        if let validator::ValidationErrorsKind::Field(field_errors) = kind {
            let messages: Vec<serde_json::Value> = field_errors
                .iter()
                .map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    serde_json::Value::String(message)
                })
                .collect();
            details.insert(field.to_string(), serde_json::Value::Array(messages));
        }
    }

    serde_json::Value::Object(details)
}

/// A single-field "required" error set.
///
/// Backstop for normalization paths that destructure `Option` fields the
/// derive has already checked.
pub fn required_error(field: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let mut error = ValidationError::new("required");
    error.message = Some(Cow::Borrowed("This field is required."));
    errors.add(field, error);
    errors
}

/// JSON extractor that reports parse failures as 400 responses.
pub struct JsonPayload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonPayload(value)),
            Err(rejection) => Err(ApiError::Malformed(rejection.body_text())),
        }
    }
}

/// JSON extractor for requests whose body may be absent entirely.
///
/// An empty body yields `T::default()`; a present-but-unparseable body is
/// still a 400.
pub struct OptionalJsonPayload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJsonPayload<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;

        if bytes.is_empty() {
            return Ok(Self(T::default()));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn decimal(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn accepts_values_within_budget() {
        for ok in ["0", "0.5", "9.99", "123.45", "999.99", "-999.99", "100"] {
            assert!(validate_money_precision(&decimal(ok)).is_ok(), "{ok} should pass");
        }
    }

    #[test]
    fn rejects_three_decimal_places() {
        let err = validate_money_precision(&decimal("10.123")).unwrap_err();
        assert_eq!(err.code, "max_decimal_places");
    }

    #[test]
    fn rejects_four_whole_digits() {
        let err = validate_money_precision(&decimal("1000.00")).unwrap_err();
        assert_eq!(err.code, "max_digits");
    }

    #[test]
    fn rejects_six_total_digits() {
        assert!(validate_money_precision(&decimal("1234.56")).is_err());
    }

    #[test]
    fn trailing_zeros_do_not_count_against_budget() {
        assert!(validate_money_precision(&decimal("1.500")).is_ok());
    }

    #[test]
    fn details_use_message_when_present() {
        let errors = required_error("stripe_token");
        let details = validation_details(&errors);
        assert_eq!(
            details["stripe_token"][0],
            serde_json::Value::String("This field is required.".to_string())
        );
    }

    proptest! {
        #[test]
        fn accepts_any_cents_up_to_five_digits(cents in -99_999i64..=99_999) {
            let value = Decimal::new(cents, 2);
            prop_assert!(validate_money_precision(&value).is_ok());
        }

        #[test]
        fn rejects_any_value_with_milli_precision(
            millis in 1i64..=999_999,
        ) {
            prop_assume!(millis % 10 != 0);
            let value = Decimal::new(millis, 3);
            prop_assert!(validate_money_precision(&value).is_err());
        }
    }
}
