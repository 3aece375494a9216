//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the FleetFlow billing domain.

mod errors;
mod events;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{EventEnvelope, EventId, EventMetadata};
pub use ids::{InvoiceId, OrganizationId, SubscriptionId};
pub use money::Money;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
