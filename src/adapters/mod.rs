//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Session validators (JWT, mock)
//! - `http` - REST API surface
//! - `stripe` - Customer model backed by the Stripe API (plus mock)

pub mod auth;
pub mod http;
pub mod stripe;
