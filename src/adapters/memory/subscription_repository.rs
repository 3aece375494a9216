//! In-memory implementation of SubscriptionRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::billing::{BillingError, Subscription};
use crate::domain::foundation::{OrganizationId, SubscriptionId};
use crate::ports::SubscriptionRepository;

/// In-memory subscription store.
///
/// Enforces the one-subscription-per-organization constraint and
/// version-checked updates, mirroring the PostgreSQL adapter.
pub struct InMemorySubscriptionRepository {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
        }
    }

    /// Returns count of stored subscriptions (for test assertions).
    pub fn count(&self) -> usize {
        self.subscriptions
            .read()
            .expect("InMemorySubscriptionRepository: lock poisoned")
            .len()
    }
}

impl Default for InMemorySubscriptionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), BillingError> {
        let mut store = self
            .subscriptions
            .write()
            .map_err(|_| BillingError::infrastructure("Subscription store lock poisoned"))?;

        if store
            .values()
            .any(|s| s.organization_id == subscription.organization_id)
        {
            return Err(BillingError::already_exists(subscription.organization_id));
        }

        store.insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), BillingError> {
        let mut store = self
            .subscriptions
            .write()
            .map_err(|_| BillingError::infrastructure("Subscription store lock poisoned"))?;

        let stored = store
            .get_mut(&subscription.id)
            .ok_or(BillingError::NotFound(subscription.organization_id))?;

        // Compare-and-swap on version; a concurrent writer has already
        // bumped it when the versions differ
        if stored.version != subscription.version {
            return Err(BillingError::conflict(
                subscription.organization_id,
                subscription.version,
            ));
        }

        let mut updated = subscription.clone();
        updated.version += 1;
        *stored = updated;
        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, BillingError> {
        let store = self
            .subscriptions
            .read()
            .map_err(|_| BillingError::infrastructure("Subscription store lock poisoned"))?;
        Ok(store.get(id).cloned())
    }

    async fn find_by_organization(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Option<Subscription>, BillingError> {
        let store = self
            .subscriptions
            .read()
            .map_err(|_| BillingError::infrastructure("Subscription store lock poisoned"))?;
        Ok(store
            .values()
            .find(|s| &s.organization_id == organization_id)
            .cloned())
    }

    async fn find_by_square_customer(
        &self,
        customer_id: &str,
    ) -> Result<Option<Subscription>, BillingError> {
        let store = self
            .subscriptions
            .read()
            .map_err(|_| BillingError::infrastructure("Subscription store lock poisoned"))?;
        Ok(store
            .values()
            .find(|s| s.square_customer_id == customer_id)
            .cloned())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<(), BillingError> {
        let mut store = self
            .subscriptions
            .write()
            .map_err(|_| BillingError::infrastructure("Subscription store lock poisoned"))?;

        match store.remove(id) {
            Some(_) => Ok(()),
            None => Err(BillingError::infrastructure(format!(
                "Subscription {} not found",
                id
            ))),
        }
    }
}
