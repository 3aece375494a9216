//! CreateSubscriptionHandler - Command handler for creating an
//! organization's subscription.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::{
    BillingError, BillingEvent, PlanCatalog, PlanId, PricingEngine, Subscription,
};
use crate::domain::foundation::{OrganizationId, SubscriptionId, Timestamp};
use crate::ports::{
    CreateCustomerRequest, CreateInvoiceRequest, EventPublisher, OrganizationRepository,
    PaymentProvider, SubscriptionRepository,
};

/// Command to create a subscription for an organization.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub organization_id: OrganizationId,
    pub plan_id: PlanId,
    pub total_seats: u32,
}

/// Result of successful subscription creation.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    pub event: BillingEvent,
}

/// Handler for creating subscriptions.
///
/// Creates the provider customer, invoices the first billing period, then
/// persists the subscription with the owner occupying one seat. If the
/// local save fails after the provider calls succeeded, the provider-side
/// customer is orphaned; there is no compensation step (see DESIGN.md).
pub struct CreateSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    event_publisher: Arc<dyn EventPublisher>,
    pricing: PricingEngine,
}

impl CreateSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            organizations,
            payment_provider,
            event_publisher,
            pricing: PricingEngine::new(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, BillingError> {
        // 1. Resolve the organization
        let organization = self
            .organizations
            .find_by_id(&cmd.organization_id)
            .await?
            .ok_or(BillingError::OrganizationNotFound(cmd.organization_id))?;

        // 2. One subscription per organization
        if self
            .repository
            .find_by_organization(&cmd.organization_id)
            .await?
            .is_some()
        {
            return Err(BillingError::already_exists(cmd.organization_id));
        }

        // 3. Resolve the plan and check it applies to this organization type
        let plan = PlanCatalog::global().plan(&cmd.plan_id)?;
        if !plan.is_for_type(organization.organization_type) {
            return Err(BillingError::invalid_plan(format!(
                "{} is not available to {} organizations",
                cmd.plan_id,
                organization.organization_type.display_name()
            )));
        }

        // 4. Compute the price before touching the provider
        let price = self.pricing.compute(plan, cmd.total_seats)?;

        // 5. Create the provider customer
        let customer = self
            .payment_provider
            .create_customer(CreateCustomerRequest {
                organization_id: cmd.organization_id,
                email: organization.billing_email.clone(),
                name: Some(organization.name.clone()),
                idempotency_key: Some(format!("customer-{}", cmd.organization_id)),
            })
            .await?;

        // 6. Invoice the first billing period in full
        let invoice = self
            .payment_provider
            .create_invoice(CreateInvoiceRequest {
                customer_id: customer.id.clone(),
                amount: price,
                description: format!("{} ({} seats)", plan.name, cmd.total_seats),
                idempotency_key: Some(format!("create-{}", cmd.organization_id)),
            })
            .await
            .map_err(|e| {
                warn!(
                    organization_id = %cmd.organization_id,
                    customer_id = %customer.id,
                    "First invoice failed; provider customer left orphaned"
                );
                BillingError::from(e)
            })?;

        // 7. Persist the subscription; the creating owner takes one seat
        let subscription = Subscription::create(
            SubscriptionId::new(),
            cmd.organization_id,
            plan.id.clone(),
            cmd.total_seats,
            price,
            customer.id,
            invoice.id.clone(),
        )?;
        self.repository.save(&subscription).await?;

        info!(
            organization_id = %cmd.organization_id,
            subscription_id = %subscription.id,
            plan_id = %subscription.plan_id,
            total_seats = cmd.total_seats,
            price_cents = price.cents(),
            "Subscription created"
        );

        // 8. Publish the created event
        let event = BillingEvent::SubscriptionCreated {
            subscription_id: subscription.id,
            organization_id: cmd.organization_id,
            plan_id: subscription.plan_id.clone(),
            total_seats: cmd.total_seats,
            price,
            invoice_id: invoice.id,
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(CreateSubscriptionResult {
            subscription,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::billing::test_support::{
        test_organization, test_subscription, MockEventPublisher, MockOrganizationRepository,
        MockPaymentProvider, MockSubscriptionRepository,
    };
    use crate::domain::billing::SubscriptionStatus;
    use crate::domain::foundation::Money;

    fn test_command(organization_id: OrganizationId) -> CreateSubscriptionCommand {
        CreateSubscriptionCommand {
            organization_id,
            plan_id: PlanId::from("team_brokerage_starter"),
            total_seats: 5,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn creates_active_subscription_with_owner_seat() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler =
            CreateSubscriptionHandler::new(repo.clone(), orgs, payment, publisher);

        let result = handler.handle(test_command(org_id)).await.unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Active);
        assert_eq!(result.subscription.seats.total(), 5);
        assert_eq!(result.subscription.seats.used(), 1);
        assert_eq!(result.subscription.available_seats(), 4);
        assert_eq!(repo.stored().len(), 1);
    }

    #[tokio::test]
    async fn caches_price_matching_pricing_engine() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CreateSubscriptionHandler::new(repo, orgs, payment, publisher);

        let result = handler.handle(test_command(org_id)).await.unwrap();

        // 199.00 base + 3 extra seats at 49.00
        assert_eq!(result.subscription.price, Money::from_cents(34_600));
    }

    #[tokio::test]
    async fn invoices_full_price_on_creation() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler =
            CreateSubscriptionHandler::new(repo, orgs, payment.clone(), publisher);

        handler.handle(test_command(org_id)).await.unwrap();

        let invoices = payment.issued_invoices();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].amount, Money::from_cents(34_600));
    }

    #[tokio::test]
    async fn publishes_subscription_created_event() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler =
            CreateSubscriptionHandler::new(repo, orgs, payment, publisher.clone());

        handler.handle(test_command(org_id)).await.unwrap();

        let events = publisher.published_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "subscription.created");
    }

    // ════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn fails_when_organization_missing() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::empty());
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler =
            CreateSubscriptionHandler::new(repo.clone(), orgs, payment, publisher);

        let result = handler.handle(test_command(org_id)).await;

        assert!(matches!(
            result,
            Err(BillingError::OrganizationNotFound(_))
        ));
        assert!(repo.stored().is_empty());
    }

    #[tokio::test]
    async fn fails_when_subscription_already_exists() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::with_subscription(
            test_subscription(org_id),
        ));
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CreateSubscriptionHandler::new(repo, orgs, payment, publisher);

        let result = handler.handle(test_command(org_id)).await;
        assert!(matches!(result, Err(BillingError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn fails_on_unknown_plan() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CreateSubscriptionHandler::new(repo, orgs, payment, publisher);

        let mut cmd = test_command(org_id);
        cmd.plan_id = PlanId::from("enterprise_mega");

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(BillingError::InvalidPlan(_))));
    }

    #[tokio::test]
    async fn fails_on_plan_for_wrong_organization_type() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id), // Brokerage
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CreateSubscriptionHandler::new(repo, orgs, payment, publisher);

        let mut cmd = test_command(org_id);
        cmd.plan_id = PlanId::from("team_dispatch_starter");

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(BillingError::InvalidPlan(_))));
    }

    #[tokio::test]
    async fn fails_on_zero_seats() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler =
            CreateSubscriptionHandler::new(repo, orgs, payment.clone(), publisher);

        let mut cmd = test_command(org_id);
        cmd.total_seats = 0;

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(BillingError::ValidationFailed { .. })));
        assert!(payment.issued_invoices().is_empty());
    }

    #[tokio::test]
    async fn fails_when_customer_creation_fails() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::failing_customer());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler =
            CreateSubscriptionHandler::new(repo.clone(), orgs, payment, publisher);

        let result = handler.handle(test_command(org_id)).await;

        assert!(matches!(result, Err(BillingError::PaymentFailed { .. })));
        assert!(repo.stored().is_empty());
    }

    #[tokio::test]
    async fn fails_when_invoice_fails_without_persisting() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::new());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::failing_invoice());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler =
            CreateSubscriptionHandler::new(repo.clone(), orgs, payment, publisher.clone());

        let result = handler.handle(test_command(org_id)).await;

        assert!(matches!(result, Err(BillingError::PaymentFailed { .. })));
        assert!(repo.stored().is_empty());
        assert!(publisher.published_events().is_empty());
    }

    #[tokio::test]
    async fn fails_when_repository_save_fails() {
        let org_id = OrganizationId::new();
        let repo = Arc::new(MockSubscriptionRepository::failing_save());
        let orgs = Arc::new(MockOrganizationRepository::with_organization(
            test_organization(org_id),
        ));
        let payment = Arc::new(MockPaymentProvider::new());
        let publisher = Arc::new(MockEventPublisher::new());

        let handler = CreateSubscriptionHandler::new(repo, orgs, payment, publisher.clone());

        let result = handler.handle(test_command(org_id)).await;

        assert!(result.is_err());
        assert!(publisher.published_events().is_empty());
    }
}
