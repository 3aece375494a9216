//! Application layer - Command and query handlers.
//!
//! Handlers orchestrate domain objects and ports to implement use cases.
//! Each handler owns one operation, takes its dependencies as `Arc<dyn Port>`,
//! and converts every failure into a `BillingError` before it crosses the
//! boundary.

pub mod handlers;
