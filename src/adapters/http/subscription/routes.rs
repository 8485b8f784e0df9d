//! Axum router configuration for subscription endpoints.

use axum::routing::get;
use axum::Router;

use crate::adapters::http::BillingAppState;

use super::handlers::{create_subscription, delete_subscription, get_subscription};

/// Create the subscription API router.
///
/// # Routes
///
/// - `GET /` - Current subscription projection (204 when none)
/// - `POST /` - Create a subscription
/// - `DELETE /` - Cancel a subscription
pub fn subscription_routes() -> Router<BillingAppState> {
    Router::new().route(
        "/",
        get(get_subscription)
            .post(create_subscription)
            .delete(delete_subscription),
    )
}
