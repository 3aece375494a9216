//! Billing domain events.
//!
//! Events emitted during subscription lifecycle changes. These events are
//! used for:
//! - Audit logging (all state transitions)
//! - Integration with other modules (seat availability changes)
//! - Notifications (payment failed, cancellation confirmations)
//!
//! # Event Naming Convention
//!
//! Events are named in past tense to indicate something that has already
//! happened: `SubscriptionCreated` not `CreateSubscription`.

use crate::domain::foundation::{
    EventEnvelope, InvoiceId, Money, OrganizationId, SubscriptionId, Timestamp,
};
use serde::{Deserialize, Serialize};

use super::PlanId;

/// Events that occur during the subscription lifecycle.
///
/// All state transitions emit events for audit logging and integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingEvent {
    /// A new subscription was created for an organization.
    ///
    /// Emitted after the provider customer exists, the first invoice has
    /// been issued, and the subscription has been persisted.
    SubscriptionCreated {
        subscription_id: SubscriptionId,
        organization_id: OrganizationId,
        plan_id: PlanId,
        total_seats: u32,
        price: Money,
        invoice_id: InvoiceId,
        occurred_at: Timestamp,
    },

    /// The seat total changed and the new price was invoiced.
    ///
    /// State transition: Active → Active (self-loop)
    SeatsUpdated {
        subscription_id: SubscriptionId,
        organization_id: OrganizationId,
        previous_total: u32,
        new_total: u32,
        new_price: Money,
        invoice_id: InvoiceId,
        occurred_at: Timestamp,
    },

    /// A member joined or left and consumed or freed a seat.
    ///
    /// Emitted by the organization-membership integration; does not
    /// change price.
    SeatUsageRecorded {
        subscription_id: SubscriptionId,
        organization_id: OrganizationId,
        delta: i64,
        used_seats: u32,
        available_seats: u32,
        occurred_at: Timestamp,
    },

    /// An invoice payment succeeded.
    ///
    /// State transition: Active → Active (renewal) or PastDue → Active
    /// (recovery). Trigger: `invoice.payment_made` webhook.
    PaymentRecorded {
        subscription_id: SubscriptionId,
        organization_id: OrganizationId,
        invoice_id: InvoiceId,
        next_billing_date: Timestamp,
        occurred_at: Timestamp,
    },

    /// An invoice payment failed, subscription is in grace period.
    ///
    /// State transition: Active → PastDue
    ///
    /// Trigger: `invoice.payment_failed` webhook.
    PaymentFailed {
        subscription_id: SubscriptionId,
        organization_id: OrganizationId,
        invoice_id: Option<InvoiceId>,
        occurred_at: Timestamp,
    },

    /// The subscription was soft-cancelled (seats frozen).
    ///
    /// State transition: Active → Cancelled, or PastDue → Cancelled
    ///
    /// Trigger: User action via cancel endpoint.
    SubscriptionCancelled {
        subscription_id: SubscriptionId,
        organization_id: OrganizationId,
        reason: Option<String>,
        occurred_at: Timestamp,
    },
}

impl BillingEvent {
    /// Returns the event type string for routing and filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            BillingEvent::SubscriptionCreated { .. } => "subscription.created",
            BillingEvent::SeatsUpdated { .. } => "subscription.seats_updated",
            BillingEvent::SeatUsageRecorded { .. } => "subscription.seat_usage_recorded",
            BillingEvent::PaymentRecorded { .. } => "subscription.payment_recorded",
            BillingEvent::PaymentFailed { .. } => "subscription.payment_failed",
            BillingEvent::SubscriptionCancelled { .. } => "subscription.cancelled",
        }
    }

    /// Returns the subscription ID associated with this event.
    pub fn subscription_id(&self) -> &SubscriptionId {
        match self {
            BillingEvent::SubscriptionCreated {
                subscription_id, ..
            }
            | BillingEvent::SeatsUpdated {
                subscription_id, ..
            }
            | BillingEvent::SeatUsageRecorded {
                subscription_id, ..
            }
            | BillingEvent::PaymentRecorded {
                subscription_id, ..
            }
            | BillingEvent::PaymentFailed {
                subscription_id, ..
            }
            | BillingEvent::SubscriptionCancelled {
                subscription_id, ..
            } => subscription_id,
        }
    }

    /// Returns the organization ID associated with this event.
    pub fn organization_id(&self) -> &OrganizationId {
        match self {
            BillingEvent::SubscriptionCreated {
                organization_id, ..
            }
            | BillingEvent::SeatsUpdated {
                organization_id, ..
            }
            | BillingEvent::SeatUsageRecorded {
                organization_id, ..
            }
            | BillingEvent::PaymentRecorded {
                organization_id, ..
            }
            | BillingEvent::PaymentFailed {
                organization_id, ..
            }
            | BillingEvent::SubscriptionCancelled {
                organization_id, ..
            } => organization_id,
        }
    }

    /// Returns when this event occurred.
    pub fn occurred_at(&self) -> Timestamp {
        match self {
            BillingEvent::SubscriptionCreated { occurred_at, .. }
            | BillingEvent::SeatsUpdated { occurred_at, .. }
            | BillingEvent::SeatUsageRecorded { occurred_at, .. }
            | BillingEvent::PaymentRecorded { occurred_at, .. }
            | BillingEvent::PaymentFailed { occurred_at, .. }
            | BillingEvent::SubscriptionCancelled { occurred_at, .. } => *occurred_at,
        }
    }

    /// Wraps this event in a transport envelope for publishing.
    pub fn to_envelope(&self) -> EventEnvelope {
        EventEnvelope {
            event_id: Default::default(),
            event_type: self.event_type().to_string(),
            aggregate_id: self.subscription_id().to_string(),
            aggregate_type: "Subscription".to_string(),
            occurred_at: self.occurred_at(),
            payload: serde_json::to_value(self).unwrap_or_default(),
            metadata: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_subscription_id() -> SubscriptionId {
        SubscriptionId::new()
    }

    fn test_org_id() -> OrganizationId {
        OrganizationId::new()
    }

    fn now() -> Timestamp {
        Timestamp::now()
    }

    #[test]
    fn created_event_carries_plan_and_price() {
        let event = BillingEvent::SubscriptionCreated {
            subscription_id: test_subscription_id(),
            organization_id: test_org_id(),
            plan_id: PlanId::from("team_brokerage_starter"),
            total_seats: 5,
            price: Money::from_cents(34_600),
            invoice_id: InvoiceId::new("inv-1"),
            occurred_at: now(),
        };

        assert_eq!(event.event_type(), "subscription.created");
        if let BillingEvent::SubscriptionCreated {
            total_seats, price, ..
        } = event
        {
            assert_eq!(total_seats, 5);
            assert_eq!(price, Money::from_cents(34_600));
        } else {
            panic!("Expected SubscriptionCreated event");
        }
    }

    #[test]
    fn seats_updated_event_captures_both_totals() {
        let event = BillingEvent::SeatsUpdated {
            subscription_id: test_subscription_id(),
            organization_id: test_org_id(),
            previous_total: 5,
            new_total: 10,
            new_price: Money::from_cents(59_100),
            invoice_id: InvoiceId::new("inv-2"),
            occurred_at: now(),
        };

        assert_eq!(event.event_type(), "subscription.seats_updated");
        if let BillingEvent::SeatsUpdated {
            previous_total,
            new_total,
            ..
        } = event
        {
            assert_eq!(previous_total, 5);
            assert_eq!(new_total, 10);
        } else {
            panic!("Expected SeatsUpdated event");
        }
    }

    #[test]
    fn payment_failed_event_allows_missing_invoice() {
        let event = BillingEvent::PaymentFailed {
            subscription_id: test_subscription_id(),
            organization_id: test_org_id(),
            invoice_id: None,
            occurred_at: now(),
        };

        assert_eq!(event.event_type(), "subscription.payment_failed");
    }

    #[test]
    fn all_event_types_are_namespaced() {
        let subscription_id = test_subscription_id();
        let organization_id = test_org_id();
        let events = vec![
            BillingEvent::SubscriptionCreated {
                subscription_id,
                organization_id,
                plan_id: PlanId::from("team_dispatch_starter"),
                total_seats: 2,
                price: Money::from_cents(14_900),
                invoice_id: InvoiceId::new("inv-1"),
                occurred_at: now(),
            },
            BillingEvent::SeatsUpdated {
                subscription_id,
                organization_id,
                previous_total: 2,
                new_total: 4,
                new_price: Money::from_cents(22_700),
                invoice_id: InvoiceId::new("inv-2"),
                occurred_at: now(),
            },
            BillingEvent::SeatUsageRecorded {
                subscription_id,
                organization_id,
                delta: 1,
                used_seats: 2,
                available_seats: 2,
                occurred_at: now(),
            },
            BillingEvent::PaymentRecorded {
                subscription_id,
                organization_id,
                invoice_id: InvoiceId::new("inv-3"),
                next_billing_date: now().add_days(30),
                occurred_at: now(),
            },
            BillingEvent::PaymentFailed {
                subscription_id,
                organization_id,
                invoice_id: None,
                occurred_at: now(),
            },
            BillingEvent::SubscriptionCancelled {
                subscription_id,
                organization_id,
                reason: None,
                occurred_at: now(),
            },
        ];

        for event in events {
            assert!(
                event.event_type().starts_with("subscription."),
                "Event type {} should be namespaced with 'subscription.'",
                event.event_type()
            );
            assert_eq!(event.subscription_id(), &subscription_id);
            assert_eq!(event.organization_id(), &organization_id);
        }
    }

    #[test]
    fn envelope_routes_on_subscription_aggregate() {
        let subscription_id = test_subscription_id();
        let event = BillingEvent::SubscriptionCancelled {
            subscription_id,
            organization_id: test_org_id(),
            reason: Some("Switching carriers".to_string()),
            occurred_at: now(),
        };

        let envelope = event.to_envelope();

        assert_eq!(envelope.event_type, "subscription.cancelled");
        assert_eq!(envelope.aggregate_id, subscription_id.to_string());
        assert_eq!(envelope.aggregate_type, "Subscription");
        assert!(envelope.payload.get("SubscriptionCancelled").is_some());
    }

    #[test]
    fn billing_event_roundtrips_through_json() {
        let event = BillingEvent::SeatUsageRecorded {
            subscription_id: test_subscription_id(),
            organization_id: test_org_id(),
            delta: -1,
            used_seats: 1,
            available_seats: 4,
            occurred_at: now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        let restored: BillingEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, restored);
    }
}
