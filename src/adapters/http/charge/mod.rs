//! Charge REST resource.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::charge_routes;
