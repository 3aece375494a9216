//! In-memory implementation of OrganizationRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::billing::BillingError;
use crate::domain::foundation::OrganizationId;
use crate::ports::{OrganizationRecord, OrganizationRepository};

/// In-memory organization lookup.
///
/// Organization management lives outside this service; this store holds
/// whatever records tests and local runs seed into it.
pub struct InMemoryOrganizationRepository {
    organizations: RwLock<HashMap<OrganizationId, OrganizationRecord>>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self {
            organizations: RwLock::new(HashMap::new()),
        }
    }

    /// Seed an organization record.
    pub fn insert(&self, record: OrganizationRecord) {
        self.organizations
            .write()
            .expect("InMemoryOrganizationRepository: lock poisoned")
            .insert(record.id, record);
    }
}

impl Default for InMemoryOrganizationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn find_by_id(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<OrganizationRecord>, BillingError> {
        let store = self
            .organizations
            .read()
            .map_err(|_| BillingError::infrastructure("Organization store lock poisoned"))?;
        Ok(store.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::OrganizationType;

    #[tokio::test]
    async fn find_returns_seeded_record() {
        let repo = InMemoryOrganizationRepository::new();
        let org_id = OrganizationId::new();
        repo.insert(OrganizationRecord {
            id: org_id,
            name: "Acme Logistics".to_string(),
            organization_type: OrganizationType::Brokerage,
            billing_email: "billing@acme.example".to_string(),
        });

        let found = repo.find_by_id(&org_id).await.unwrap().unwrap();
        assert_eq!(found.name, "Acme Logistics");
    }

    #[tokio::test]
    async fn find_returns_none_for_unknown_organization() {
        let repo = InMemoryOrganizationRepository::new();

        let found = repo.find_by_id(&OrganizationId::new()).await.unwrap();
        assert!(found.is_none());
    }
}
