//! Axum router configuration for charge endpoints.

use axum::routing::get;
use axum::Router;

use crate::adapters::http::BillingAppState;

use super::handlers::{create_charge, list_charges};

/// Create the charge API router.
///
/// # Routes
///
/// - `GET /` - Not implemented (501)
/// - `POST /` - Create a charge
pub fn charge_routes() -> Router<BillingAppState> {
    Router::new().route("/", get(list_charges).post(create_charge))
}
