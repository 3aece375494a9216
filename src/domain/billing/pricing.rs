//! Seat-based price computation.
//!
//! Pricing is a pure function of `(plan, total_seats)`. There is no clock,
//! no configuration, and no stored state in here; the same inputs always
//! produce the same price. Callers cache the result on the subscription
//! and must recompute through this engine after every seat or plan change.

use crate::domain::foundation::Money;

use super::errors::BillingError;
use super::plan::Plan;

/// Pure pricing calculator for seat-based plans.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Computes the total monthly price for `total_seats` on `plan`.
    ///
    /// Seats beyond the plan's included count are billed at the plan's
    /// per-seat overage price. Overage is floored at zero: running under
    /// the included count charges the base price alone, never a discount.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::ValidationFailed` when `total_seats` is zero.
    pub fn compute(&self, plan: &Plan, total_seats: u32) -> Result<Money, BillingError> {
        if total_seats == 0 {
            return Err(BillingError::validation(
                "total_seats",
                "must be a positive integer",
            ));
        }

        let extra_seats = total_seats.saturating_sub(plan.included_seats);
        Ok(plan.base_price + plan.additional_seat_price * extra_seats)
    }

    /// Computes the prorated share of `amount` for the remainder of a
    /// billing cycle.
    ///
    /// Rounds down to whole cents. Days remaining are clamped to the cycle
    /// length, so proration never exceeds the full amount.
    ///
    /// Not wired into the seat-update path: updates reinvoice the full new
    /// price instead. See the billing behavior notes in DESIGN.md.
    pub fn prorate(&self, amount: Money, days_remaining: i64, days_in_cycle: i64) -> Money {
        if days_in_cycle <= 0 || days_remaining <= 0 {
            return Money::ZERO;
        }
        let days = days_remaining.min(days_in_cycle);
        Money::from_cents(amount.cents() * days / days_in_cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::plan::PlanId;
    use proptest::prelude::*;

    fn starter_plan() -> Plan {
        Plan {
            id: PlanId::from("team_brokerage_starter"),
            name: "Team Brokerage Starter".to_string(),
            base_price: Money::from_cents(19_900),
            included_seats: 2,
            additional_seat_price: Money::from_cents(4_900),
            features: vec![],
        }
    }

    #[test]
    fn seats_at_included_count_charge_base_price() {
        let engine = PricingEngine::new();
        let price = engine.compute(&starter_plan(), 2).unwrap();
        assert_eq!(price, Money::from_cents(19_900));
    }

    #[test]
    fn seats_below_included_count_charge_base_price() {
        let engine = PricingEngine::new();
        let price = engine.compute(&starter_plan(), 1).unwrap();
        assert_eq!(price, Money::from_cents(19_900));
    }

    #[test]
    fn extra_seats_are_billed_at_overage_price() {
        let engine = PricingEngine::new();
        let price = engine.compute(&starter_plan(), 5).unwrap();
        assert_eq!(price, Money::from_cents(34_600));
    }

    #[test]
    fn zero_seats_is_rejected() {
        let engine = PricingEngine::new();
        let result = engine.compute(&starter_plan(), 0);
        assert!(matches!(result, Err(BillingError::ValidationFailed { .. })));
    }

    #[test]
    fn prorate_half_cycle_halves_amount() {
        let engine = PricingEngine::new();
        let prorated = engine.prorate(Money::from_cents(19_900), 15, 30);
        assert_eq!(prorated, Money::from_cents(9_950));
    }

    #[test]
    fn prorate_rounds_down_to_whole_cents() {
        let engine = PricingEngine::new();
        let prorated = engine.prorate(Money::from_cents(100), 1, 3);
        assert_eq!(prorated, Money::from_cents(33));
    }

    #[test]
    fn prorate_clamps_to_full_amount() {
        let engine = PricingEngine::new();
        let prorated = engine.prorate(Money::from_cents(19_900), 45, 30);
        assert_eq!(prorated, Money::from_cents(19_900));
    }

    #[test]
    fn prorate_with_no_days_remaining_is_zero() {
        let engine = PricingEngine::new();
        assert_eq!(engine.prorate(Money::from_cents(19_900), 0, 30), Money::ZERO);
    }

    proptest! {
        #[test]
        fn compute_is_deterministic(seats in 1u32..1000) {
            let engine = PricingEngine::new();
            let plan = starter_plan();
            let first = engine.compute(&plan, seats).unwrap();
            let second = engine.compute(&plan, seats).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn overage_is_floored_at_zero(seats in 1u32..=2) {
            let engine = PricingEngine::new();
            let plan = starter_plan();
            let price = engine.compute(&plan, seats).unwrap();
            prop_assert_eq!(price, plan.base_price);
        }

        #[test]
        fn overage_is_linear_above_included(seats in 3u32..1000) {
            let engine = PricingEngine::new();
            let plan = starter_plan();
            let price = engine.compute(&plan, seats).unwrap();
            let expected =
                plan.base_price + plan.additional_seat_price * (seats - plan.included_seats);
            prop_assert_eq!(price, expected);
        }

        #[test]
        fn price_never_drops_below_base(seats in 1u32..1000) {
            let engine = PricingEngine::new();
            let plan = starter_plan();
            let price = engine.compute(&plan, seats).unwrap();
            prop_assert!(price >= plan.base_price);
        }

        #[test]
        fn prorate_never_exceeds_amount(
            cents in 0i64..10_000_000,
            days_remaining in 0i64..100,
            days_in_cycle in 1i64..100,
        ) {
            let engine = PricingEngine::new();
            let amount = Money::from_cents(cents);
            let prorated = engine.prorate(amount, days_remaining, days_in_cycle);
            prop_assert!(prorated <= amount);
            prop_assert!(!prorated.is_negative());
        }
    }
}
