//! Billing Gateway - REST adapter for subscription and charge management
//!
//! This crate exposes a thin, stateless HTTP surface over an external
//! customer/subscription model. Handlers validate, delegate, and translate
//! outcomes into status codes; all billing semantics live behind the ports.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
