//! Payment provider port for external payment processing.
//!
//! Defines the contract for payment gateway integrations (e.g., Square).
//! Implementations handle customer management, invoicing, and webhook
//! verification.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any payment provider
//! - **Invoice-based**: Seat-based billing issues a full invoice per change
//! - **Idempotent**: Operations can be safely retried

use crate::domain::billing::BillingError;
use crate::domain::foundation::{InvoiceId, Money, OrganizationId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for payment provider integrations.
///
/// Handles customer creation, invoice issuance, and webhook verification.
/// Implementations must ensure idempotency for all operations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer in the payment system.
    ///
    /// Returns the provider's customer record for future reference.
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError>;

    /// Issue an invoice for the full subscription price.
    ///
    /// Called on subscription creation and on every seat-count change.
    /// Seat updates bill the entire new price, not a prorated delta.
    async fn create_invoice(&self, request: CreateInvoiceRequest)
        -> Result<Invoice, PaymentError>;

    /// Verify a webhook signature and parse the event.
    ///
    /// Returns the parsed event if valid, error if signature invalid.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Internal organization ID (stored as provider metadata).
    pub organization_id: OrganizationId,

    /// Billing contact email address.
    pub email: String,

    /// Organization display name.
    pub name: Option<String>,

    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// Customer in the payment system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Provider's customer ID.
    pub id: String,

    /// Billing contact email.
    pub email: String,

    /// Organization display name.
    pub name: Option<String>,

    /// When the customer was created (provider Unix timestamp).
    pub created_at: i64,
}

/// Request to issue an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Provider's customer ID.
    pub customer_id: String,

    /// Amount to bill.
    pub amount: Money,

    /// Line-item description shown on the invoice.
    pub description: String,

    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// Invoice in the payment system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Provider's invoice ID.
    pub id: InvoiceId,

    /// Provider's customer ID.
    pub customer_id: String,

    /// Invoiced amount.
    pub amount: Money,

    /// Current invoice status.
    pub status: InvoiceStatus,

    /// When the invoice was created (provider Unix timestamp).
    pub created_at: i64,
}

/// Invoice status from the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice issued, payment not yet collected.
    Unpaid,

    /// Payment collected in full.
    Paid,

    /// Payment attempt failed.
    PaymentFailed,

    /// Invoice was canceled by the provider.
    Canceled,

    /// Unknown status from provider.
    Unknown,
}

/// Webhook event from the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider.
    pub id: String,

    /// Event type.
    pub event_type: WebhookEventType,

    /// Event payload (provider-specific).
    pub data: WebhookEventData,

    /// When the event occurred (Unix timestamp).
    pub created_at: i64,
}

/// Types of webhook events we handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Invoice was paid successfully.
    InvoicePaymentMade,

    /// Invoice payment failed.
    InvoicePaymentFailed,

    /// Unknown event type, preserved for logging.
    Unknown(String),
}

/// Webhook event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEventData {
    /// Invoice data.
    #[serde(rename = "invoice")]
    Invoice {
        invoice_id: String,
        customer_id: String,
        amount: i64,
        currency: String,
    },

    /// Raw/unknown event data.
    #[serde(rename = "raw")]
    Raw { json: String },
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create a payment declined error.
    pub fn declined(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::PaymentDeclined, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            PaymentErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    /// Create an invalid webhook error.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

// Every provider failure surfaces as PaymentFailed, timeouts and rate
// limits included; only a bad webhook signature gets its own variant.
impl From<PaymentError> for BillingError {
    fn from(err: PaymentError) -> Self {
        match err.code {
            PaymentErrorCode::InvalidWebhook => BillingError::invalid_webhook_signature(),
            _ => BillingError::payment_failed(err.message),
        }
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Payment method was declined.
    PaymentDeclined,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature.
    InvalidWebhook,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::PaymentDeclined => "payment_declined",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}
