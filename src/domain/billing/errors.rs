//! Billing error taxonomy.
//!
//! The closed set of failure kinds a billing operation can produce. The
//! HTTP layer pattern-matches on these to pick a status code.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | ProviderRejected | 400 |
//! | NoActiveSubscription | 400 |
//! | PlanNotSubscribed | 400 |
//! | CustomerNotFound | 404 |
//! | NotImplemented | 501 |
//! | ProviderUnavailable | 502 |
//! | Internal | 500 |

use thiserror::Error;

use crate::domain::subscriber::SubscriberId;

/// Failures surfaced by the customer/subscription model layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// A request field failed validation.
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// The provider refused the operation (declined card, bad plan, ...).
    /// The message is the provider's own error text.
    #[error("{message}")]
    ProviderRejected { message: String },

    /// The customer has no active subscription to operate on.
    #[error("no active subscription")]
    NoActiveSubscription,

    /// The customer has no subscription for the requested plan.
    #[error("no subscription for plan {plan:?}")]
    PlanNotSubscribed { plan: String },

    /// No customer record could be resolved for the subscriber.
    #[error("no customer for subscriber {0}")]
    CustomerNotFound(SubscriberId),

    /// The operation exists in the API surface but is not implemented.
    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },

    /// The provider could not be reached or answered with a server fault.
    #[error("payment provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// An unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BillingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn provider_rejected(message: impl Into<String>) -> Self {
        BillingError::ProviderRejected {
            message: message.into(),
        }
    }

    pub fn plan_not_subscribed(plan: impl Into<String>) -> Self {
        BillingError::PlanNotSubscribed { plan: plan.into() }
    }

    pub fn not_implemented(operation: &'static str) -> Self {
        BillingError::NotImplemented { operation }
    }

    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        BillingError::ProviderUnavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        BillingError::Internal(message.into())
    }

    /// Whether this failure came from the provider refusing the request,
    /// as opposed to infrastructure trouble on either side.
    pub fn is_provider_rejection(&self) -> bool {
        matches!(self, BillingError::ProviderRejected { .. })
    }
}
