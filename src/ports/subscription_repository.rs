//! Subscription repository port (write side).
//!
//! Defines the contract for persisting and retrieving Subscription
//! aggregates. Implementations handle the actual database operations.
//!
//! # Design
//!
//! - **Write-focused**: Optimized for aggregate persistence
//! - **Unique constraint**: Only one subscription per organization
//! - **Optimistic locking**: `update` is version-checked; lost updates
//!   surface as `BillingError::Conflict` instead of silently winning

use crate::domain::billing::{BillingError, Subscription};
use crate::domain::foundation::{OrganizationId, SubscriptionId};
use async_trait::async_trait;

/// Repository port for Subscription aggregate persistence.
///
/// Implementations must ensure:
/// - Unique organization_id constraint
/// - Version-checked updates (compare-and-swap on `version`)
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Save a new subscription.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the organization already has a subscription
    /// - `Infrastructure` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), BillingError>;

    /// Update an existing subscription.
    ///
    /// The update only applies if the stored version equals
    /// `subscription.version`; on success the stored version is
    /// incremented. Callers should re-read and retry on conflict.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the subscription doesn't exist
    /// - `Conflict` if the stored version differs from the one supplied
    /// - `Infrastructure` on persistence failure
    async fn update(&self, subscription: &Subscription) -> Result<(), BillingError>;

    /// Find a subscription by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, BillingError>;

    /// Find a subscription by organization ID.
    ///
    /// Returns `None` if the organization has no subscription. This is
    /// the primary lookup since each organization has at most one.
    async fn find_by_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Subscription>, BillingError>;

    /// Find a subscription by its Square customer ID.
    ///
    /// Used by webhook processing, where only provider identifiers are
    /// available.
    async fn find_by_square_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, BillingError>;

    /// Delete a subscription (primarily for testing).
    ///
    /// In production, subscriptions are soft-cancelled rather than deleted.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the subscription doesn't exist
    /// - `Infrastructure` on persistence failure
    async fn delete(&self, id: &SubscriptionId) -> Result<(), BillingError>;
}
