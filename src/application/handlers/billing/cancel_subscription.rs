//! CancelSubscriptionHandler - Command handler for soft-cancelling a
//! subscription.
//!
//! Cancellation is local only: seats are frozen and the status becomes
//! terminal, but no cancellation call is made to the payment provider.
//! The provider-side customer remains and may continue to exist unbilled
//! (see DESIGN.md).

use std::sync::Arc;

use tracing::info;

use crate::domain::billing::{BillingError, BillingEvent, Subscription};
use crate::domain::foundation::{OrganizationId, Timestamp};
use crate::ports::{EventPublisher, SubscriptionRepository};

/// Command to cancel an organization's subscription.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub organization_id: OrganizationId,
    pub reason: Option<String>,
}

/// Result of a successful cancellation.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
}

/// Handler for subscription cancellation.
pub struct CancelSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CancelSubscriptionHandler {
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
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, BillingError> {
        let mut subscription = self
            .repository
            .find_by_organization(&cmd.organization_id)
            .await?
            .ok_or(BillingError::NotFound(cmd.organization_id))?;

        subscription.cancel(cmd.reason.clone())?;
        self.repository.update(&subscription).await?;

        info!(
            organization_id = %cmd.organization_id,
            subscription_id = %subscription.id,
            reason = cmd.reason.as_deref().unwrap_or("none given"),
            "Subscription cancelled"
        );

        let event = BillingEvent::SubscriptionCancelled {
            subscription_id: subscription.id,
            organization_id: cmd.organization_id,
            reason: cmd.reason,
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(CancelSubscriptionResult { subscription })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::{
        test_subscription, MockEventPublisher, MockSubscriptionRepository,
    };
    use crate::domain::billing::SubscriptionStatus;

    #[tokio::test]
    async fn cancel_freezes_seats_and_keeps_record() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id),
        ));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CancelSubscriptionHandler::new(repo.clone(), publisher);

        let result = handler
            .handle(CancelSubscriptionCommand {
                organization_id: org_id,
                reason: None,
            })
            .await
            .unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Cancelled);
        assert_eq!(result.subscription.available_seats(), 0);

        // Soft cancel: the record stays in the store
        let stored = repo.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, SubscriptionStatus::Cancelled);
        assert_eq!(stored[0].seats.total(), 5);
    }

    #[tokio::test]
    async fn publishes_cancelled_event() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id),
        ));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CancelSubscriptionHandler::new(repo, publisher.clone());

        handler
            .handle(CancelSubscriptionCommand {
                organization_id: org_id,
                reason: None,
            })
            .await
            .unwrap();

        let events = publisher.published_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "subscription.cancelled");
    }

    #[tokio::test]
    async fn fails_when_subscription_missing() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CancelSubscriptionHandler::new(repo, publisher);

        let result = handler
            .handle(CancelSubscriptionCommand {
                organization_id: OrganizationId::new(),
                reason: None,
            })
            .await;

        assert!(matches!(result, Err(BillingError::NotFound(_))));
    }

    #[tokio::test]
    async fn cancelling_twice_fails() {
        let org_id = OrganizationId::new();
        let mut subscription = test_subscription(org_id);
        subscription.cancel(None).unwrap();

        let repo = Arc::new(MockSubscriptionRepository::with_subscription(subscription));
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CancelSubscriptionHandler::new(repo, publisher.clone());

        let result = handler
            .handle(CancelSubscriptionCommand {
                organization_id: org_id,
                reason: None,
            })
            .await;

        assert!(matches!(result, Err(BillingError::InvalidState { .. })));
        assert!(publisher.published_events().is_empty());
    }
}
