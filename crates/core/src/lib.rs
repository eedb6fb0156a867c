//! GIVD Core - Domain entities, services, and traits.
//!
//! This crate contains the household inventory business logic: stock,
//! receipts, consumption tracking with its live feed, and subscription plans.
//! It is backend-agnostic and defines traits that are implemented by the
//! `givd-remote` crate.

pub mod constants;
pub mod consumption;
pub mod dashboard;
pub mod errors;
pub mod identity;
pub mod plans;
pub mod products;
pub mod receipts;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
