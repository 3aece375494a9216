//! GetSubscriptionHandler - Query handler for reading an organization's
//! subscription together with its plan definition.

use std::sync::Arc;

use crate::domain::billing::{BillingError, Plan, PlanCatalog, Subscription};
use crate::domain::foundation::OrganizationId;
use crate::ports::SubscriptionRepository;

/// Read model combining the subscription with its resolved plan.
#[derive(Debug, Clone)]
pub struct SubscriptionView {
    pub subscription: Subscription,
    pub plan: Plan,
}

/// Handler for subscription lookups.
pub struct GetSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        organization_id: OrganizationId,
    ) -> Result<SubscriptionView, BillingError> {
        let subscription = self
            .repository
            .find_by_organization(&organization_id)
            .await?
            .ok_or(BillingError::NotFound(organization_id))?;

        let plan = PlanCatalog::global().plan(&subscription.plan_id)?.clone();

        Ok(SubscriptionView { subscription, plan })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::{
        test_subscription, MockSubscriptionRepository,
    };
    use crate::domain::foundation::Money;

    #[tokio::test]
    async fn returns_subscription_with_plan() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id),
        ));

        let handler = GetSubscriptionHandler::new(repo);

        let view = handler.handle(org_id).await.unwrap();

        assert_eq!(view.subscription.organization_id, org_id);
        assert_eq!(view.plan.id.as_str(), "team_brokerage_starter");
        assert_eq!(view.plan.base_price, Money::from_cents(19_900));
    }

    #[tokio::test]
    async fn fails_when_subscription_missing() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        let handler = GetSubscriptionHandler::new(repo);

        let result = handler.handle(OrganizationId::new()).await;

        assert!(matches!(result, Err(BillingError::NotFound(_))));
    }
}
