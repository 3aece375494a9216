//! Square-specific types for API responses and webhook payloads.
//!
//! These types represent Square API objects as they arrive over the wire
//! and map onto the provider-agnostic port types.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Event Types
// ════════════════════════════════════════════════════════════════════════════════

/// Raw Square webhook event as received from the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquareWebhookEvent {
    /// Merchant the event belongs to.
    pub merchant_id: Option<String>,

    /// Event type (e.g. "invoice.payment_made").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unique event identifier.
    pub event_id: String,

    /// RFC 3339 timestamp when the event was created.
    pub created_at: String,

    /// Event payload containing the affected object.
    pub data: SquareEventData,
}

/// Event data container.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquareEventData {
    /// Type of the affected object (e.g. "invoice").
    #[serde(rename = "type", default)]
    pub object_type: String,

    /// ID of the affected object.
    #[serde(default)]
    pub id: String,

    /// The affected object itself.
    pub object: serde_json::Value,
}

impl SquareWebhookEvent {
    /// Extract the invoice from the event payload, if present.
    ///
    /// Square nests the invoice under `data.object.invoice`.
    pub fn invoice(&self) -> Option<SquareInvoice> {
        let value = self.data.object.get("invoice")?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Event creation time as a Unix timestamp.
    pub fn created_at_unix(&self) -> Option<i64> {
        parse_rfc3339(&self.created_at)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Square Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Square Invoice object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquareInvoice {
    /// Unique invoice identifier.
    pub id: String,

    /// Invoice status (DRAFT, UNPAID, SCHEDULED, PAID, CANCELED, FAILED, ...).
    #[serde(default)]
    pub status: String,

    /// Who the invoice is addressed to.
    pub primary_recipient: SquareInvoiceRecipient,

    /// Payment requests carrying the amounts due.
    #[serde(default)]
    pub payment_requests: Vec<SquarePaymentRequest>,

    /// Invoice title shown to the customer.
    pub title: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: Option<String>,
}

impl SquareInvoice {
    /// Total invoiced amount in the smallest currency unit.
    pub fn amount(&self) -> Option<&SquareMoney> {
        self.payment_requests
            .first()
            .and_then(|r| r.computed_amount_money.as_ref())
    }
}

/// Invoice recipient reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquareInvoiceRecipient {
    /// Square customer ID.
    pub customer_id: String,
}

/// Single payment request on an invoice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquarePaymentRequest {
    /// Request type (BALANCE, DEPOSIT, INSTALLMENT).
    #[serde(default)]
    pub request_type: String,

    /// Computed total for this request.
    pub computed_amount_money: Option<SquareMoney>,
}

/// Square money amount.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquareMoney {
    /// Amount in the smallest currency unit (cents for USD).
    pub amount: i64,

    /// ISO currency code.
    pub currency: String,
}

/// Square Customer object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SquareCustomer {
    /// Unique customer identifier.
    pub id: String,

    /// Billing contact email.
    pub email_address: Option<String>,

    /// Company name on the customer record.
    pub company_name: Option<String>,

    /// Caller-supplied reference, holds our organization ID.
    pub reference_id: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// API Response Wrappers
// ════════════════════════════════════════════════════════════════════════════════

/// Response from POST /v2/customers.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomerResponse {
    pub customer: SquareCustomer,
}

/// Response from POST /v2/invoices.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceResponse {
    pub invoice: SquareInvoice,
}

/// Parse an RFC 3339 timestamp into Unix seconds.
pub fn parse_rfc3339(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}
