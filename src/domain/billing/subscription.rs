//! Subscription aggregate entity.
//!
//! The Subscription aggregate represents an organization's paid seat-based
//! plan. Each organization has at most one Subscription.
//!
//! # Design Decisions
//!
//! - **One per organization**: Unique constraint on organization_id enforced
//!   at the database level
//! - **Money in cents**: All monetary values stored as i64 cents (not floats)
//! - **Cached price**: `price` is recomputed and restored on every seat or
//!   plan mutation, never left stale
//! - **Soft cancel**: cancellation freezes seats and keeps the record;
//!   nothing is hard-deleted

use crate::domain::foundation::{
    DomainError, ErrorCode, InvoiceId, Money, OrganizationId, StateMachine, SubscriptionId,
    Timestamp,
};
use serde::{Deserialize, Serialize};

use super::errors::BillingError;
use super::plan::{BillingCycle, PlanId};
use super::seats::SeatAllocation;

/// Subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid subscription in good standing.
    Active,

    /// Payment failed but within the retry grace period.
    PastDue,

    /// Soft-cancelled. Terminal: there is no reactivation path.
    Cancelled,
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From ACTIVE
            (Active, Active) // Seat update or renewal
                | (Active, PastDue)
                | (Active, Cancelled)
            // From PAST_DUE
                | (PastDue, Active)
                | (PastDue, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Active => vec![Active, PastDue, Cancelled],
            PastDue => vec![Active, Cancelled],
            Cancelled => vec![],
        }
    }
}

/// Subscription aggregate for one organization.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `organization_id` is unique (one subscription per organization)
/// - `seats` always satisfies `used <= total`
/// - `price` equals the pricing engine's output for `(plan_id, seats.total())`
///   after every mutation
/// - Status transitions follow state machine rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier for this subscription.
    pub id: SubscriptionId,

    /// Organization that owns this subscription.
    pub organization_id: OrganizationId,

    /// Plan the organization is subscribed to.
    pub plan_id: PlanId,

    /// Current status in the subscription lifecycle.
    pub status: SubscriptionStatus,

    /// Seat counts for the organization.
    pub seats: SeatAllocation,

    /// Cached total price for the current plan and seat count.
    pub price: Money,

    /// Billing cycle for invoicing.
    pub billing_cycle: BillingCycle,

    /// When the next invoice is due.
    pub next_billing_date: Timestamp,

    /// Square customer ID for this organization.
    pub square_customer_id: String,

    /// Most recent invoice issued for this subscription.
    pub latest_invoice_id: Option<InvoiceId>,

    /// Optimistic locking counter, incremented on every persisted update.
    pub version: u64,

    /// When the subscription was created.
    pub created_at: Timestamp,

    /// When the subscription was last updated.
    pub updated_at: Timestamp,

    /// When the subscription was cancelled (if cancelled).
    pub cancelled_at: Option<Timestamp>,

    /// Caller-supplied reason recorded at cancellation.
    pub cancellation_reason: Option<String>,
}

impl Subscription {
    /// Creates a new active subscription.
    ///
    /// The creating owner consumes one seat immediately, so the allocation
    /// starts at `used = 1`.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::ValidationFailed` when `total_seats` is zero
    /// (a one-seat minimum is implied by the owner's seat).
    pub fn create(
        id: SubscriptionId,
        organization_id: OrganizationId,
        plan_id: PlanId,
        total_seats: u32,
        price: Money,
        square_customer_id: String,
        invoice_id: InvoiceId,
    ) -> Result<Self, BillingError> {
        let seats = SeatAllocation::new(total_seats, 1)?;
        let now = Timestamp::now();
        Ok(Self {
            id,
            organization_id,
            plan_id,
            status: SubscriptionStatus::Active,
            seats,
            price,
            billing_cycle: BillingCycle::Monthly,
            next_billing_date: now.add_days(BillingCycle::Monthly.period_days()),
            square_customer_id,
            latest_invoice_id: Some(invoice_id),
            version: 0,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
            cancellation_reason: None,
        })
    }

    /// Returns the seats still open for new members.
    ///
    /// A cancelled subscription reports zero available seats regardless of
    /// the stored allocation: its seats are frozen.
    pub fn available_seats(&self) -> u32 {
        if self.status == SubscriptionStatus::Cancelled {
            return 0;
        }
        self.seats.available()
    }

    /// Applies a new seat total together with its recomputed price.
    ///
    /// Callers must pass the price produced by the pricing engine for the
    /// new total; the two are stored in the same mutation so the cached
    /// price can never go stale. The invoice for the new price must already
    /// have been issued, which is why its id arrives here.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Cancelled` for cancelled subscriptions and
    /// `BillingError::SeatUnderflow` when the new total is below seats in
    /// use. On error the aggregate is unchanged.
    pub fn update_seats(
        &mut self,
        new_total: u32,
        new_price: Money,
        invoice_id: InvoiceId,
    ) -> Result<(), BillingError> {
        self.ensure_not_cancelled()?;
        self.seats = self.seats.with_total(new_total)?;
        self.price = new_price;
        self.latest_invoice_id = Some(invoice_id);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Applies a used-seat change from the organization-membership side.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::Cancelled` for cancelled subscriptions and
    /// `BillingError::SeatOverflow` when usage would exceed the allocation
    /// or go negative.
    pub fn record_seat_usage(&mut self, delta: i64) -> Result<(), BillingError> {
        self.ensure_not_cancelled()?;
        self.seats = self.seats.with_used_delta(delta)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Soft-cancels this subscription.
    ///
    /// Seats are frozen (`available_seats` reports zero) but counts and
    /// the cached price are preserved for reporting. No provider-side
    /// cancellation happens here.
    ///
    /// # Errors
    ///
    /// Returns error if the current status does not allow cancellation.
    pub fn cancel(&mut self, reason: Option<String>) -> Result<(), BillingError> {
        self.transition_to(SubscriptionStatus::Cancelled)?;
        self.cancelled_at = Some(Timestamp::now());
        self.cancellation_reason = reason;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Marks payment as past due after a failed invoice.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn mark_past_due(&mut self) -> Result<(), BillingError> {
        self.transition_to(SubscriptionStatus::PastDue)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Records a successful invoice payment and advances the billing date.
    ///
    /// Recovers a past-due subscription back to active.
    ///
    /// # Errors
    ///
    /// Returns error if transition from current status is not allowed.
    pub fn record_payment(&mut self, invoice_id: InvoiceId) -> Result<(), BillingError> {
        self.transition_to(SubscriptionStatus::Active)?;
        self.latest_invoice_id = Some(invoice_id);
        self.next_billing_date = Timestamp::now().add_days(self.billing_cycle.period_days());
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Returns true if the subscription has been soft-cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.status == SubscriptionStatus::Cancelled
    }

    fn ensure_not_cancelled(&self) -> Result<(), BillingError> {
        if self.is_cancelled() {
            return Err(BillingError::cancelled(self.organization_id));
        }
        Ok(())
    }

    /// Transition to a new status using the state machine.
    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), BillingError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            BillingError::from(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition subscription from {:?} to {:?}",
                    self.status, target
                ),
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_subscription() -> Subscription {
        Subscription::create(
            SubscriptionId::new(),
            OrganizationId::new(),
            PlanId::from("team_brokerage_starter"),
            5,
            Money::from_cents(34_600),
            "sq-cus-123".to_string(),
            InvoiceId::new("inv-1"),
        )
        .unwrap()
    }

    // Construction tests

    #[test]
    fn create_starts_active_with_owner_seat() {
        let subscription = test_subscription();

        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(subscription.seats.total(), 5);
        assert_eq!(subscription.seats.used(), 1);
        assert_eq!(subscription.available_seats(), 4);
        assert_eq!(subscription.version, 0);
        assert_eq!(
            subscription.latest_invoice_id,
            Some(InvoiceId::new("inv-1"))
        );
    }

    #[test]
    fn create_sets_monthly_billing_thirty_days_out() {
        let subscription = test_subscription();

        assert_eq!(subscription.billing_cycle, BillingCycle::Monthly);
        let days_ahead = subscription.next_billing_date.as_unix_secs()
            - subscription.created_at.as_unix_secs();
        assert_eq!(days_ahead, 30 * 86_400);
    }

    #[test]
    fn create_with_zero_seats_fails() {
        let result = Subscription::create(
            SubscriptionId::new(),
            OrganizationId::new(),
            PlanId::from("team_brokerage_starter"),
            0,
            Money::ZERO,
            "sq-cus-123".to_string(),
            InvoiceId::new("inv-1"),
        );
        assert!(result.is_err());
    }

    // Seat update tests

    #[test]
    fn update_seats_stores_new_total_and_price() {
        let mut subscription = test_subscription();

        subscription
            .update_seats(10, Money::from_cents(59_100), InvoiceId::new("inv-2"))
            .unwrap();

        assert_eq!(subscription.seats.total(), 10);
        assert_eq!(subscription.seats.used(), 1);
        assert_eq!(subscription.available_seats(), 9);
        assert_eq!(subscription.price, Money::from_cents(59_100));
        assert_eq!(
            subscription.latest_invoice_id,
            Some(InvoiceId::new("inv-2"))
        );
    }

    #[test]
    fn update_seats_below_used_fails_and_leaves_state() {
        let mut subscription = test_subscription();
        subscription.record_seat_usage(1).unwrap();

        let before_price = subscription.price;
        let result = subscription.update_seats(1, Money::from_cents(19_900), InvoiceId::new("x"));

        assert!(matches!(result, Err(BillingError::SeatUnderflow { .. })));
        assert_eq!(subscription.seats.total(), 5);
        assert_eq!(subscription.seats.used(), 2);
        assert_eq!(subscription.price, before_price);
    }

    #[test]
    fn update_seats_on_cancelled_subscription_fails() {
        let mut subscription = test_subscription();
        subscription.cancel(None).unwrap();

        let result = subscription.update_seats(10, Money::from_cents(59_100), InvoiceId::new("x"));
        assert!(matches!(result, Err(BillingError::Cancelled(_))));
    }

    // Seat usage tests

    #[test]
    fn record_seat_usage_tracks_joins_and_leaves() {
        let mut subscription = test_subscription();

        subscription.record_seat_usage(2).unwrap();
        assert_eq!(subscription.seats.used(), 3);

        subscription.record_seat_usage(-1).unwrap();
        assert_eq!(subscription.seats.used(), 2);
    }

    #[test]
    fn record_seat_usage_rejects_over_enrollment() {
        let mut subscription = test_subscription();
        let result = subscription.record_seat_usage(5);
        assert!(matches!(result, Err(BillingError::SeatOverflow { .. })));
        assert_eq!(subscription.seats.used(), 1);
    }

    // Cancellation tests

    #[test]
    fn cancel_freezes_available_seats() {
        let mut subscription = test_subscription();

        subscription.cancel(None).unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Cancelled);
        assert_eq!(subscription.available_seats(), 0);
        assert_eq!(subscription.seats.total(), 5);
        assert!(subscription.cancelled_at.is_some());
    }

    #[test]
    fn cancel_preserves_cached_price() {
        let mut subscription = test_subscription();
        let price = subscription.price;

        subscription.cancel(None).unwrap();

        assert_eq!(subscription.price, price);
    }

    #[test]
    fn cancel_twice_fails() {
        let mut subscription = test_subscription();
        subscription.cancel(None).unwrap();
        assert!(subscription.cancel(None).is_err());
    }

    // Payment lifecycle tests

    #[test]
    fn failed_payment_marks_past_due() {
        let mut subscription = test_subscription();
        subscription.mark_past_due().unwrap();
        assert_eq!(subscription.status, SubscriptionStatus::PastDue);
    }

    #[test]
    fn payment_recovers_past_due_to_active() {
        let mut subscription = test_subscription();
        subscription.mark_past_due().unwrap();

        subscription.record_payment(InvoiceId::new("inv-3")).unwrap();

        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(
            subscription.latest_invoice_id,
            Some(InvoiceId::new("inv-3"))
        );
    }

    #[test]
    fn cancelled_subscription_cannot_record_payment() {
        let mut subscription = test_subscription();
        subscription.cancel(None).unwrap();
        assert!(subscription.record_payment(InvoiceId::new("x")).is_err());
    }

    // State machine tests

    #[test]
    fn cancelled_is_terminal() {
        assert!(SubscriptionStatus::Cancelled.is_terminal());
        assert!(!SubscriptionStatus::Active.is_terminal());
        assert!(!SubscriptionStatus::PastDue.is_terminal());
    }

    #[test]
    fn active_self_loop_is_allowed() {
        assert!(SubscriptionStatus::Active.can_transition_to(&SubscriptionStatus::Active));
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Cancelled,
        ] {
            for target in status.valid_transitions() {
                assert!(
                    status.can_transition_to(&target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    status,
                    target
                );
            }
        }
    }
}
