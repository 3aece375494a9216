//! UpdateSeatsHandler - Command handler for changing a subscription's
//! seat total.
//!
//! The seat update is all-or-nothing: the invoice for the new price is
//! issued before any local state changes, so a provider failure leaves
//! the stored seat count and cached price untouched. Seat updates bill
//! the full new price, not a prorated delta.

use std::sync::Arc;

use tracing::info;

use crate::domain::billing::{BillingError, BillingEvent, PlanCatalog, PricingEngine};
use crate::domain::foundation::{InvoiceId, Money, OrganizationId, Timestamp};
use crate::ports::{
    CreateInvoiceRequest, EventPublisher, PaymentProvider, SubscriptionRepository,
};

/// Command to change an organization's seat total.
#[derive(Debug, Clone)]
pub struct UpdateSeatsCommand {
    pub organization_id: OrganizationId,
    pub new_total_seats: u32,
}

/// Result of a successful seat update.
#[derive(Debug, Clone)]
pub struct UpdateSeatsResult {
    pub new_total_seats: u32,
    pub new_price: Money,
    pub invoice_id: InvoiceId,
}

/// Handler for seat-count updates.
pub struct UpdateSeatsHandler {
    repository: Arc<dyn SubscriptionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    event_publisher: Arc<dyn EventPublisher>,
    pricing: PricingEngine,
}

impl UpdateSeatsHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            payment_provider,
            event_publisher,
            pricing: PricingEngine::new(),
        }
    }

    pub async fn handle(&self, cmd: UpdateSeatsCommand) -> Result<UpdateSeatsResult, BillingError> {
        // 1. Load the subscription
        let mut subscription = self
            .repository
            .find_by_organization(&cmd.organization_id)
            .await?
            .ok_or(BillingError::NotFound(cmd.organization_id))?;

        if subscription.is_cancelled() {
            return Err(BillingError::cancelled(cmd.organization_id));
        }

        // 2. Validate the new total against seats in use before invoicing
        let previous_total = subscription.seats.total();
        if cmd.new_total_seats < subscription.seats.used() {
            return Err(BillingError::seat_underflow(
                cmd.new_total_seats,
                subscription.seats.used(),
            ));
        }

        // 3. Recompute the price for the new total
        let plan = PlanCatalog::global().plan(&subscription.plan_id)?;
        let new_price = self.pricing.compute(plan, cmd.new_total_seats)?;

        // 4. Invoice before commit: no seats are granted until billed
        let invoice = self
            .payment_provider
            .create_invoice(CreateInvoiceRequest {
                customer_id: subscription.square_customer_id.clone(),
                amount: new_price,
                description: format!("{} ({} seats)", plan.name, cmd.new_total_seats),
                idempotency_key: Some(format!(
                    "seats-{}-{}-v{}",
                    cmd.organization_id, cmd.new_total_seats, subscription.version
                )),
            })
            .await?;

        // 5. Apply and persist; version check rejects concurrent writers
        subscription.update_seats(cmd.new_total_seats, new_price, invoice.id.clone())?;
        self.repository.update(&subscription).await?;

        info!(
            organization_id = %cmd.organization_id,
            previous_total,
            new_total = cmd.new_total_seats,
            price_cents = new_price.cents(),
            "Seat total updated"
        );

        // 6. Publish the seats-updated event
        let event = BillingEvent::SeatsUpdated {
            subscription_id: subscription.id,
            organization_id: cmd.organization_id,
            previous_total,
            new_total: cmd.new_total_seats,
            new_price,
            invoice_id: invoice.id.clone(),
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(UpdateSeatsResult {
            new_total_seats: cmd.new_total_seats,
            new_price,
            invoice_id: invoice.id,
        })
    }
}
