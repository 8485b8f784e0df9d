//! Domain layer containing the billing types consumed by the REST adapter.
//!
//! # Module Organization
//!
//! - `billing` - Customer/subscription/charge projections and the error taxonomy
//! - `subscriber` - Acting-principal identity and authentication errors

pub mod billing;
pub mod subscriber;
