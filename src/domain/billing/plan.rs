//! Subscription plan definitions.

use crate::domain::foundation::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a subscription plan.
///
/// Plan ids are lowercase snake_case strings (e.g. `team_brokerage_starter`)
/// and double as the naming convention that ties plans to organization
/// types: every id contains its organization type token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(String);

impl PlanId {
    /// Creates a PlanId from a raw string. No catalog lookup is performed;
    /// resolution happens in `PlanCatalog::plan`.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Type of tenant organization.
///
/// A closed enum rather than a free-form string: unknown type strings are
/// rejected at the serde boundary, and the default-plan mapping is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    /// Freight brokerage operation.
    Brokerage,

    /// Dispatch agency managing drivers for carriers.
    DispatchAgency,

    /// Asset-based motor carrier.
    Carrier,
}

impl OrganizationType {
    /// Token that appears in the plan ids belonging to this type.
    pub fn plan_token(&self) -> &'static str {
        match self {
            OrganizationType::Brokerage => "brokerage",
            OrganizationType::DispatchAgency => "dispatch",
            OrganizationType::Carrier => "carrier",
        }
    }

    /// Display name for this organization type.
    pub fn display_name(&self) -> &'static str {
        match self {
            OrganizationType::Brokerage => "Brokerage",
            OrganizationType::DispatchAgency => "Dispatch Agency",
            OrganizationType::Carrier => "Carrier",
        }
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Billing cycle for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Annual,
}

impl BillingCycle {
    /// Length of one billing period in days.
    ///
    /// Months are approximated at 30 days, matching how the billing
    /// anchor date is advanced.
    pub fn period_days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 30,
            BillingCycle::Annual => 365,
        }
    }
}

/// Subscription plan definition.
///
/// Plans are immutable and defined at process start in the `PlanCatalog`.
/// `base_price` covers `included_seats`; every seat beyond that is billed
/// at `additional_seat_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique plan id.
    pub id: PlanId,

    /// Human-readable plan name.
    pub name: String,

    /// Monthly base price, covering `included_seats`.
    pub base_price: Money,

    /// Number of seats covered by the base price. Always positive.
    pub included_seats: u32,

    /// Price per seat beyond the included count.
    pub additional_seat_price: Money,

    /// Marketing feature list. Display-only, no behavioral effect.
    pub features: Vec<String>,
}

impl Plan {
    /// Returns true if this plan's id matches the given organization type's
    /// naming convention.
    pub fn is_for_type(&self, organization_type: OrganizationType) -> bool {
        self.id.as_str().contains(organization_type.plan_token())
    }
}
