//! Static plan catalog.
//!
//! The catalog is built once at process start and never mutated. It is
//! freely shared across concurrent operations without locking.

use once_cell::sync::Lazy;

use crate::domain::foundation::Money;

use super::errors::BillingError;
use super::plan::{OrganizationType, Plan, PlanId};

static BUILTIN_CATALOG: Lazy<PlanCatalog> = Lazy::new(PlanCatalog::builtin);

/// Immutable, in-memory lookup of plan definitions.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    /// Returns the process-wide catalog of built-in plans.
    pub fn global() -> &'static PlanCatalog {
        &BUILTIN_CATALOG
    }

    /// Builds the production plan catalog.
    fn builtin() -> Self {
        let plans = vec![
            Plan {
                id: PlanId::from("team_brokerage_starter"),
                name: "Team Brokerage Starter".to_string(),
                base_price: Money::from_cents(19_900),
                included_seats: 2,
                additional_seat_price: Money::from_cents(4_900),
                features: vec![
                    "Core brokerage tools and platform".to_string(),
                    "Load management and posting capabilities".to_string(),
                    "Basic carrier database management".to_string(),
                    "Up to 2 team members included".to_string(),
                    "Additional team seats: $49/month each".to_string(),
                ],
            },
            Plan {
                id: PlanId::from("team_brokerage_pro"),
                name: "Team Brokerage Pro".to_string(),
                base_price: Money::from_cents(49_900),
                included_seats: 5,
                additional_seat_price: Money::from_cents(3_900),
                features: vec![
                    "Advanced brokerage operations management".to_string(),
                    "Unlimited load management and posting".to_string(),
                    "Advanced analytics and performance reporting".to_string(),
                    "Up to 5 team members included".to_string(),
                    "Additional team seats: $39/month each".to_string(),
                ],
            },
            Plan {
                id: PlanId::from("team_dispatch_starter"),
                name: "Team Dispatch Starter".to_string(),
                base_price: Money::from_cents(14_900),
                included_seats: 2,
                additional_seat_price: Money::from_cents(3_900),
                features: vec![
                    "Core dispatch management platform".to_string(),
                    "Driver assignment and tracking".to_string(),
                    "Route optimization basics".to_string(),
                    "Up to 2 team members included".to_string(),
                    "Additional team seats: $39/month each".to_string(),
                ],
            },
            Plan {
                id: PlanId::from("team_dispatch_pro"),
                name: "Team Dispatch Pro".to_string(),
                base_price: Money::from_cents(34_900),
                included_seats: 5,
                additional_seat_price: Money::from_cents(2_900),
                features: vec![
                    "Advanced dispatch management system".to_string(),
                    "Real-time driver tracking and monitoring".to_string(),
                    "Performance analytics and detailed reporting".to_string(),
                    "Up to 5 team members included".to_string(),
                    "Additional team seats: $29/month each".to_string(),
                ],
            },
            Plan {
                id: PlanId::from("carrier_fleet_starter"),
                name: "Carrier Fleet Starter".to_string(),
                base_price: Money::from_cents(17_900),
                included_seats: 2,
                additional_seat_price: Money::from_cents(3_900),
                features: vec![
                    "Fleet operations dashboard".to_string(),
                    "Driver and vehicle management".to_string(),
                    "Compliance document tracking".to_string(),
                    "Up to 2 team members included".to_string(),
                    "Additional team seats: $39/month each".to_string(),
                ],
            },
        ];

        Self { plans }
    }

    /// Looks up a plan by id.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::InvalidPlan` when the id is unrecognized.
    pub fn plan(&self, plan_id: &PlanId) -> Result<&Plan, BillingError> {
        self.plans
            .iter()
            .find(|p| &p.id == plan_id)
            .ok_or_else(|| BillingError::invalid_plan(plan_id.as_str()))
    }

    /// Returns all plans available to the given organization type.
    ///
    /// Plans are matched by the type token embedded in their ids. Returns
    /// an empty vec (not an error) when nothing matches.
    pub fn plans_for_type(&self, organization_type: OrganizationType) -> Vec<&Plan> {
        self.plans
            .iter()
            .filter(|p| p.is_for_type(organization_type))
            .collect()
    }

    /// Returns the starter plan each organization type begins on.
    ///
    /// The mapping is total because `OrganizationType` is a closed enum;
    /// unknown type strings never get this far.
    pub fn default_plan_for_type(&self, organization_type: OrganizationType) -> PlanId {
        match organization_type {
            OrganizationType::Brokerage => PlanId::from("team_brokerage_starter"),
            OrganizationType::DispatchAgency => PlanId::from("team_dispatch_starter"),
            OrganizationType::Carrier => PlanId::from("carrier_fleet_starter"),
        }
    }

    /// Returns all plans in the catalog.
    pub fn all(&self) -> &[Plan] {
        &self.plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_catalog_resolves_known_plan() {
        let plan = PlanCatalog::global()
            .plan(&PlanId::from("team_brokerage_starter"))
            .unwrap();

        assert_eq!(plan.base_price, Money::from_cents(19_900));
        assert_eq!(plan.included_seats, 2);
        assert_eq!(plan.additional_seat_price, Money::from_cents(4_900));
    }

    #[test]
    fn unknown_plan_id_fails() {
        let result = PlanCatalog::global().plan(&PlanId::from("enterprise_mega"));
        assert!(matches!(result, Err(BillingError::InvalidPlan(_))));
    }

    #[test]
    fn brokerage_type_lists_only_brokerage_plans() {
        let plans = PlanCatalog::global().plans_for_type(OrganizationType::Brokerage);

        assert_eq!(plans.len(), 2);
        assert!(plans
            .iter()
            .all(|p| p.id.as_str().contains("brokerage")));
    }

    #[test]
    fn dispatch_type_lists_only_dispatch_plans() {
        let plans = PlanCatalog::global().plans_for_type(OrganizationType::DispatchAgency);

        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(|p| p.id.as_str().contains("dispatch")));
    }

    #[test]
    fn default_plans_resolve_in_catalog() {
        let catalog = PlanCatalog::global();
        for org_type in [
            OrganizationType::Brokerage,
            OrganizationType::DispatchAgency,
            OrganizationType::Carrier,
        ] {
            let default = catalog.default_plan_for_type(org_type);
            let plan = catalog.plan(&default).unwrap();
            assert!(plan.is_for_type(org_type));
        }
    }

    #[test]
    fn all_plans_have_positive_included_seats() {
        for plan in PlanCatalog::global().all() {
            assert!(plan.included_seats > 0, "plan {} has zero seats", plan.id);
            assert!(!plan.base_price.is_negative());
            assert!(!plan.additional_seat_price.is_negative());
        }
    }
}
