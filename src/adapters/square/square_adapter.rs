//! Square payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Square API.
//! Handles customer creation, invoice issuance, and webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Event timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! Square signs webhooks over the notification URL concatenated with the
//! raw body, and sends the signature base64-encoded in the
//! `x-square-hmacsha256-signature` header.

use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::InvoiceId;
use crate::ports::{
    CreateCustomerRequest, CreateInvoiceRequest, Customer, Invoice, InvoiceStatus, PaymentError,
    PaymentErrorCode, PaymentProvider, WebhookEvent, WebhookEventData, WebhookEventType,
};

use super::square_types::{
    parse_rfc3339, CreateCustomerResponse, CreateInvoiceResponse, SquareWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Square API configuration.
#[derive(Clone)]
pub struct SquareConfig {
    /// Square access token.
    access_token: SecretString,

    /// Webhook signature key from the Square developer dashboard.
    webhook_signature_key: SecretString,

    /// Base URL for the Square API.
    api_base_url: String,

    /// Notification URL registered for the webhook subscription.
    ///
    /// Square includes this URL in the signed payload, so it must match
    /// the registered value exactly.
    notification_url: String,
}

impl SquareConfig {
    /// Create a new Square configuration.
    pub fn new(
        access_token: impl Into<String>,
        webhook_signature_key: impl Into<String>,
        notification_url: impl Into<String>,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            webhook_signature_key: SecretString::new(webhook_signature_key.into()),
            api_base_url: "https://connect.squareup.com".to_string(),
            notification_url: notification_url.into(),
        }
    }

    /// Set a custom API base URL (sandbox or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Square payment provider adapter.
pub struct SquarePaymentAdapter {
    config: SquareConfig,
    http_client: reqwest::Client,
}

impl SquarePaymentAdapter {
    /// Create a new Square adapter with the given configuration.
    pub fn new(config: SquareConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Verify the webhook signature using HMAC-SHA256.
    ///
    /// The signed payload is the notification URL followed by the raw
    /// request body; the provided signature is base64-encoded.
    fn verify_signature(&self, payload: &[u8], signature: &str) -> Result<(), PaymentError> {
        let provided = base64::engine::general_purpose::STANDARD
            .decode(signature.trim())
            .map_err(|_| {
                tracing::warn!("Webhook signature is not valid base64");
                PaymentError::invalid_webhook("Signature is not valid base64")
            })?;

        let mut mac = HmacSha256::new_from_slice(
            self.config.webhook_signature_key.expose_secret().as_bytes(),
        )
        .expect("HMAC can take key of any size");

        mac.update(self.config.notification_url.as_bytes());
        mac.update(payload);
        let expected = mac.finalize().into_bytes();

        // Constant-time comparison
        let expected_bytes: &[u8] = expected.as_slice();
        if expected_bytes.ct_eq(provided.as_slice()).unwrap_u8() != 1 {
            tracing::warn!("Invalid webhook signature");
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Reject events outside the freshness window.
    ///
    /// Square puts the event timestamp in the body rather than the
    /// signature header, so this runs after signature verification.
    fn check_timestamp(&self, event: &SquareWebhookEvent) -> Result<(), PaymentError> {
        let created = event.created_at_unix().ok_or_else(|| {
            PaymentError::invalid_webhook(format!("Invalid event timestamp: {}", event.created_at))
        })?;

        let now = chrono::Utc::now().timestamp();
        let age = now - created;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = created,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = created,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        Ok(())
    }

    /// Parse a Square event and convert it to the port types.
    fn parse_event(&self, payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
        let square_event: SquareWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        self.check_timestamp(&square_event)?;

        let event_type = match square_event.event_type.as_str() {
            "invoice.payment_made" => WebhookEventType::InvoicePaymentMade,
            "invoice.scheduled_charge_failed" => WebhookEventType::InvoicePaymentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        };

        let data = match square_event.invoice() {
            Some(invoice) => {
                let (amount, currency) = invoice
                    .amount()
                    .map(|m| (m.amount, m.currency.clone()))
                    .unwrap_or((0, "USD".to_string()));
                WebhookEventData::Invoice {
                    invoice_id: invoice.id,
                    customer_id: invoice.primary_recipient.customer_id,
                    amount,
                    currency,
                }
            }
            None => WebhookEventData::Raw {
                json: serde_json::to_string(&square_event.data.object).unwrap_or_default(),
            },
        };

        Ok(WebhookEvent {
            id: square_event.event_id.clone(),
            event_type,
            data,
            created_at: square_event.created_at_unix().unwrap_or_default(),
        })
    }

    fn map_invoice_status(status: &str) -> InvoiceStatus {
        match status {
            "PAID" | "PARTIALLY_PAID" => InvoiceStatus::Paid,
            "DRAFT" | "UNPAID" | "SCHEDULED" => InvoiceStatus::Unpaid,
            "FAILED" => InvoiceStatus::PaymentFailed,
            "CANCELED" | "REFUNDED" | "PARTIALLY_REFUNDED" => InvoiceStatus::Canceled,
            _ => InvoiceStatus::Unknown,
        }
    }
}

#[async_trait]
impl PaymentProvider for SquarePaymentAdapter {
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let url = format!("{}/v2/customers", self.config.api_base_url);

        let body = json!({
            "idempotency_key": request.idempotency_key,
            "email_address": request.email,
            "company_name": request.name,
            "reference_id": request.organization_id.to_string(),
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Square create_customer failed");
            return Err(PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Square API error: {}", error_text),
            ));
        }

        let created: CreateCustomerResponse = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Square response: {}", e),
            )
        })?;

        Ok(Customer {
            id: created.customer.id,
            email: created.customer.email_address.unwrap_or(request.email),
            name: created.customer.company_name.or(request.name),
            created_at: created
                .customer
                .created_at
                .as_deref()
                .and_then(parse_rfc3339)
                .unwrap_or_default(),
        })
    }

    async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<Invoice, PaymentError> {
        let url = format!("{}/v2/invoices", self.config.api_base_url);

        let body = json!({
            "idempotency_key": request.idempotency_key,
            "invoice": {
                "primary_recipient": {
                    "customer_id": request.customer_id,
                },
                "payment_requests": [{
                    "request_type": "BALANCE",
                    "automatic_payment_source": "CARD_ON_FILE",
                    "computed_amount_money": {
                        "amount": request.amount.cents(),
                        "currency": "USD",
                    },
                }],
                "title": request.description,
                "delivery_method": "EMAIL",
            },
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Square create_invoice failed");
            return Err(PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Square API error: {}", error_text),
            ));
        }

        let created: CreateInvoiceResponse = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Square response: {}", e),
            )
        })?;

        Ok(Invoice {
            id: InvoiceId::new(created.invoice.id),
            customer_id: request.customer_id,
            amount: request.amount,
            status: Self::map_invoice_status(&created.invoice.status),
            created_at: created
                .invoice
                .created_at
                .as_deref()
                .and_then(parse_rfc3339)
                .unwrap_or_default(),
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        // 1. Verify signature before touching the payload
        self.verify_signature(payload, signature)?;

        // 2. Parse and convert the event (includes timestamp validation)
        let event = self.parse_event(payload)?;

        tracing::info!(
            event_id = %event.id,
            event_type = ?event.event_type,
            "Webhook signature verified"
        );

        Ok(event)
    }
}
