//! Billing domain module.
//!
//! Seat-based subscription pricing and lifecycle for tenant organizations.
//!
//! # Module Structure
//!
//! - `plan` - Plan definition, organization types, billing cycle
//! - `catalog` - Static plan catalog
//! - `pricing` - Pricing engine (pure seat-based price computation)
//! - `seats` - Seat allocation ledger
//! - `subscription` - Subscription aggregate and status state machine
//! - `errors` - Billing error taxonomy
//! - `events` - Billing domain events

mod catalog;
mod errors;
mod events;
mod plan;
mod pricing;
mod seats;
mod subscription;

pub use catalog::PlanCatalog;
pub use errors::BillingError;
pub use events::BillingEvent;
pub use plan::{BillingCycle, OrganizationType, Plan, PlanId};
pub use pricing::PricingEngine;
pub use seats::SeatAllocation;
pub use subscription::{Subscription, SubscriptionStatus};
