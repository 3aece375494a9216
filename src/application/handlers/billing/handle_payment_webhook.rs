//! HandlePaymentWebhookHandler - Command handler for provider webhooks.
//!
//! Verifies the webhook signature through the payment provider port, then
//! applies the invoice outcome to the matching subscription. Unknown event
//! types and unmatched customers are acknowledged without side effects so
//! the provider stops redelivering them.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::billing::{BillingError, BillingEvent, SubscriptionStatus};
use crate::domain::foundation::{InvoiceId, Timestamp};
use crate::ports::{
    EventPublisher, PaymentProvider, SubscriptionRepository, WebhookEventData, WebhookEventType,
};

/// Command carrying the raw webhook request.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    pub payload: Vec<u8>,
    pub signature: String,
}

/// Outcome of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// An invoice payment was recorded against a subscription.
    PaymentRecorded { invoice_id: InvoiceId },

    /// A failed payment moved a subscription to past due.
    PaymentFailed { invoice_id: Option<InvoiceId> },

    /// The event carried nothing actionable; acknowledged and dropped.
    Ignored { reason: String },
}

/// Handler for payment provider webhooks.
pub struct HandlePaymentWebhookHandler {
    repository: Arc<dyn SubscriptionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            payment_provider,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<WebhookOutcome, BillingError> {
        // Signature verification happens before anything else
        let event = self
            .payment_provider
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await?;

        let (invoice_id, customer_id) = match &event.data {
            WebhookEventData::Invoice {
                invoice_id,
                customer_id,
                ..
            } => (InvoiceId::new(invoice_id.clone()), customer_id.clone()),
            WebhookEventData::Raw { .. } => {
                return Ok(WebhookOutcome::Ignored {
                    reason: "Event carries no invoice data".to_string(),
                })
            }
        };

        match event.event_type {
            WebhookEventType::InvoicePaymentMade => {
                self.record_payment(&customer_id, invoice_id).await
            }
            WebhookEventType::InvoicePaymentFailed => {
                self.record_failure(&customer_id, invoice_id).await
            }
            WebhookEventType::Unknown(event_type) => {
                info!(event_type, "Ignoring unhandled webhook event type");
                Ok(WebhookOutcome::Ignored {
                    reason: format!("Unhandled event type: {}", event_type),
                })
            }
        }
    }

    async fn record_payment(
        &self,
        customer_id: &str,
        invoice_id: InvoiceId,
    ) -> Result<WebhookOutcome, BillingError> {
        let Some(mut subscription) =
            self.repository.find_by_square_customer(customer_id).await?
        else {
            warn!(customer_id, "Payment webhook for unknown customer");
            return Ok(WebhookOutcome::Ignored {
                reason: format!("No subscription for customer {}", customer_id),
            });
        };

        // A paid invoice for a cancelled subscription is acknowledged but
        // not applied; cancelled is terminal.
        if subscription.is_cancelled() {
            return Ok(WebhookOutcome::Ignored {
                reason: "Subscription is cancelled".to_string(),
            });
        }

        subscription.record_payment(invoice_id.clone())?;
        self.repository.update(&subscription).await?;

        info!(
            subscription_id = %subscription.id,
            invoice_id = %invoice_id,
            "Invoice payment recorded"
        );

        let event = BillingEvent::PaymentRecorded {
            subscription_id: subscription.id,
            organization_id: subscription.organization_id,
            invoice_id: invoice_id.clone(),
            next_billing_date: subscription.next_billing_date,
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(WebhookOutcome::PaymentRecorded { invoice_id })
    }

    async fn record_failure(
        &self,
        customer_id: &str,
        invoice_id: InvoiceId,
    ) -> Result<WebhookOutcome, BillingError> {
        let Some(mut subscription) =
            self.repository.find_by_square_customer(customer_id).await?
        else {
            warn!(customer_id, "Failure webhook for unknown customer");
            return Ok(WebhookOutcome::Ignored {
                reason: format!("No subscription for customer {}", customer_id),
            });
        };

        if subscription.is_cancelled() {
            return Ok(WebhookOutcome::Ignored {
                reason: "Subscription is cancelled".to_string(),
            });
        }

        // Repeated failure webhooks while already past due are duplicates;
        // acknowledge without touching state so the provider stops retrying
        if subscription.status == SubscriptionStatus::PastDue {
            return Ok(WebhookOutcome::Ignored {
                reason: "Subscription is already past due".to_string(),
            });
        }

        subscription.mark_past_due()?;
        self.repository.update(&subscription).await?;

        warn!(
            subscription_id = %subscription.id,
            invoice_id = %invoice_id,
            "Invoice payment failed; subscription past due"
        );

        let event = BillingEvent::PaymentFailed {
            subscription_id: subscription.id,
            organization_id: subscription.organization_id,
            invoice_id: Some(invoice_id.clone()),
            occurred_at: Timestamp::now(),
        };
        self.event_publisher.publish(event.to_envelope()).await?;

        Ok(WebhookOutcome::PaymentFailed {
            invoice_id: Some(invoice_id),
        })
    }
}
