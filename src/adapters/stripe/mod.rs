//! Stripe customer model adapter.
//!
//! Implements the `CustomerModel` port for Stripe integration:
//! - Customer resolution by subscriber metadata
//! - Payment-method attachment
//! - Subscription lifecycle (create, cancel)
//! - One-off charges
//!
//! Secrets are handled via `secrecy::SecretString`; mutating calls carry
//! idempotency keys.

mod mock_customer_model;
mod stripe_model;

pub use mock_customer_model::MockCustomerModel;
pub use stripe_model::{StripeConfig, StripeCustomerModel};
