//! RecordSeatUsageHandler - Command handler for used-seat changes.
//!
//! Invoked by the organization-membership integration when a member joins
//! or leaves. Usage changes never affect price; they only move seats
//! between used and available.

use std::sync::Arc;

use tracing::info;

use crate::domain::billing::{BillingError, BillingEvent};
use crate::domain::foundation::{OrganizationId, Timestamp};
use crate::ports::{EventPublisher, SubscriptionRepository};

/// Command to record a member joining (`delta = 1`) or leaving
/// (`delta = -1`).
#[derive(Debug, Clone)]
pub struct RecordSeatUsageCommand {
    pub organization_id: OrganizationId,
    pub delta: i64,
}

/// Result of a successful usage change.
#[derive(Debug, Clone)]
pub struct RecordSeatUsageResult {
    pub used_seats: u32,
    pub available_seats: u32,
}

/// Handler for used-seat changes.
pub struct RecordSeatUsageHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl RecordSeatUsageHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordSeatUsageCommand,
    ) -> Result<RecordSeatUsageResult, BillingError> {
        let mut subscription = self
            .repository
            .find_by_organization(&cmd.organization_id)
            .await?
            .ok_or(BillingError::NotFound(cmd.organization_id))?;

        subscription.record_seat_usage(cmd.delta)?;
        self.repository.update(&subscription).await?;

        info!(
            organization_id = %cmd.organization_id,
            delta = cmd.delta,
            used_seats = subscription.seats.used(),
            "Seat usage recorded"
        );

        let event = BillingEvent::SeatUsageRecorded {
            subscription_id: subscription.id,
            organization_id: cmd.organization_id,
            delta: cmd.delta,
            used_seats: subscription.seats.used(),
            available_seats: subscription.available_seats(),
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(RecordSeatUsageResult {
            used_seats: subscription.seats.used(),
            available_seats: subscription.available_seats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::{
        test_subscription, MockEventPublisher, MockSubscriptionRepository,
    };
    use crate::domain::foundation::Money;

    fn test_command(organization_id: OrganizationId, delta: i64) -> RecordSeatUsageCommand {
        RecordSeatUsageCommand {
            organization_id,
            delta,
        }
    }

    #[tokio::test]
    async fn member_join_consumes_seat() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id), // total 5, used 1
        ));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = RecordSeatUsageHandler::new(repo.clone(), publisher);

        let result = handler.handle(test_command(org_id, 1)).await.unwrap();

        assert_eq!(result.used_seats, 2);
        assert_eq!(result.available_seats, 3);
        assert_eq!(repo.stored()[0].seats.used(), 2);
    }

    #[tokio::test]
    async fn member_leave_frees_seat() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id),
        ));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = RecordSeatUsageHandler::new(repo, publisher);

        let result = handler.handle(test_command(org_id, -1)).await.unwrap();

        assert_eq!(result.used_seats, 0);
        assert_eq!(result.available_seats, 5);
    }

    #[tokio::test]
    async fn usage_change_never_touches_price() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id),
        ));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = RecordSeatUsageHandler::new(repo.clone(), publisher);

        handler.handle(test_command(org_id, 2)).await.unwrap();

        assert_eq!(repo.stored()[0].price, Money::from_cents(34_600));
    }

    #[tokio::test]
    async fn publishes_usage_event() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id),
        ));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = RecordSeatUsageHandler::new(repo, publisher.clone());

        handler.handle(test_command(org_id, 1)).await.unwrap();

        let events = publisher.published_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "subscription.seat_usage_recorded");
    }

    #[tokio::test]
    async fn over_enrollment_rejected() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id), // total 5, used 1
        ));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = RecordSeatUsageHandler::new(repo.clone(), publisher);

        let result = handler.handle(test_command(org_id, 5)).await;

        assert!(matches!(result, Err(BillingError::SeatOverflow { .. })));
        assert_eq!(repo.stored()[0].seats.used(), 1);
    }

    #[tokio::test]
    async fn fails_when_subscription_missing() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = RecordSeatUsageHandler::new(repo, publisher);

        let result = handler
            .handle(test_command(OrganizationId::new(), 1))
            .await;

        assert!(matches!(result, Err(BillingError::NotFound(_))));
    }

    #[tokio::test]
    async fn cancelled_subscription_rejects_usage_change() {
        let org_id = OrganizationId::new();
        let mut subscription = test_subscription(org_id);
        subscription.cancel(None).unwrap();

        let repo = Arc::new(MockSubscriptionRepository::with_subscription(subscription));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = RecordSeatUsageHandler::new(repo, publisher);

        let result = handler.handle(test_command(org_id, 1)).await;

        assert!(matches!(result, Err(BillingError::Cancelled(_))));
    }
}
