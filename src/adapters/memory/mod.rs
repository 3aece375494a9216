//! In-memory repository adapters.
//!
//! Used by tests and local development. These adapters honor the same
//! contracts as the PostgreSQL adapters, including version-checked
//! updates, so handler behavior is identical across backends.

mod organization_repository;
mod subscription_repository;

pub use organization_repository::InMemoryOrganizationRepository;
pub use subscription_repository::InMemorySubscriptionRepository;
