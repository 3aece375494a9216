//! Organization repository port (read side).
//!
//! Billing only needs to confirm an organization exists and learn its
//! type and billing contact; organization management itself lives in a
//! different module. This port exposes the minimal read surface.

use crate::domain::billing::{BillingError, OrganizationType};
use crate::domain::foundation::OrganizationId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Organization facts the billing module needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    /// Organization ID.
    pub id: OrganizationId,

    /// Display name, used on provider customer records and invoices.
    pub name: String,

    /// Type of organization, constrains the plans it may subscribe to.
    pub organization_type: OrganizationType,

    /// Billing contact email.
    pub billing_email: String,
}

/// Read-only port for organization lookups.
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Find an organization by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<OrganizationRecord>, BillingError>;
}
