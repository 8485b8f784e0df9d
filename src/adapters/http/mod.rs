//! HTTP adapters - REST API implementations.
//!
//! Each resource has its own module with DTOs, handlers, and routes.
//! `api_router` assembles them behind the auth middleware.

pub mod charge;
pub mod error;
pub mod middleware;
pub mod subscription;
pub mod validation;

use std::sync::Arc;

use axum::Router;

use crate::config::BillingConfig;
use crate::ports::CustomerModel;

pub use charge::charge_routes;
pub use error::{ApiError, ErrorResponse};
pub use middleware::{auth_middleware, AuthState, RequireSubscriber};
pub use subscription::subscription_routes;

/// Shared application state containing all handler dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped. The billing section
/// carries the cancellation policy and provider defaults so handlers never
/// read process-wide state.
#[derive(Clone)]
pub struct BillingAppState {
    pub customers: Arc<dyn CustomerModel>,
    pub billing: Arc<BillingConfig>,
}

/// Create the complete API router.
///
/// Mounts the subscription and charge resources and wraps them in the
/// bearer-token middleware. All endpoints require an authenticated caller.
pub fn api_router(state: BillingAppState, validator: AuthState) -> Router {
    Router::new()
        .nest("/subscription/", subscription_routes())
        .nest("/charge/", charge_routes())
        .layer(axum::middleware::from_fn_with_state(
            validator,
            auth_middleware,
        ))
        .with_state(state)
}
