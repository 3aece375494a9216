//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing API.
//! They serve as the boundary between HTTP and the application layer.

use crate::application::handlers::billing::SubscriptionView;
use crate::domain::billing::{BillingCycle, Plan, Subscription, SubscriptionStatus};
use crate::domain::foundation::OrganizationId;
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a subscription for an organization.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    /// Organization taking out the subscription.
    pub organization_id: OrganizationId,
    /// Plan to subscribe to.
    pub plan_id: String,
    /// Seat total for the subscription.
    pub total_seats: u32,
}

/// Request to change the seat total.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSeatsRequest {
    /// New seat total. Billed at the full new price.
    pub total_seats: u32,
}

/// Request to record a used-seat change from the membership side.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatUsageRequest {
    /// +1 when a member joins, -1 when a member leaves.
    pub delta: i64,
}

/// Optional body for the cancel endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelSubscriptionRequest {
    /// Free-text cancellation reason, kept on the record.
    #[serde(default)]
    pub reason: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Subscription details for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    /// Subscription ID.
    pub id: String,
    /// Owning organization ID.
    pub organization_id: String,
    /// Plan the organization is on.
    pub plan_id: String,
    /// Current lifecycle status.
    pub status: SubscriptionStatus,
    /// Total seats in the allocation.
    pub total_seats: u32,
    /// Seats consumed by members.
    pub used_seats: u32,
    /// Seats open for new members (zero once cancelled).
    pub available_seats: u32,
    /// Current price in cents.
    pub price_cents: i64,
    /// Billing cycle.
    pub billing_cycle: BillingCycle,
    /// Next invoice date (ISO 8601).
    pub next_billing_date: String,
    /// Most recent invoice ID, if any.
    pub latest_invoice_id: Option<String>,
    /// Optimistic locking version.
    pub version: u64,
    /// When the subscription was created (ISO 8601).
    pub created_at: String,
    /// When the subscription was cancelled (ISO 8601), if cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    /// Reason given at cancellation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id.to_string(),
            organization_id: subscription.organization_id.to_string(),
            plan_id: subscription.plan_id.as_str().to_string(),
            status: subscription.status,
            total_seats: subscription.seats.total(),
            used_seats: subscription.seats.used(),
            available_seats: subscription.available_seats(),
            price_cents: subscription.price.cents(),
            billing_cycle: subscription.billing_cycle,
            next_billing_date: subscription.next_billing_date.as_datetime().to_rfc3339(),
            latest_invoice_id: subscription
                .latest_invoice_id
                .as_ref()
                .map(|i| i.as_str().to_string()),
            version: subscription.version,
            created_at: subscription.created_at.as_datetime().to_rfc3339(),
            cancelled_at: subscription
                .cancelled_at
                .map(|t| t.as_datetime().to_rfc3339()),
            cancellation_reason: subscription.cancellation_reason.clone(),
        }
    }
}

/// Plan definition for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    /// Plan ID.
    pub id: String,
    /// Human-readable plan name.
    pub name: String,
    /// Base price in cents, covering the included seats.
    pub base_price_cents: i64,
    /// Seats covered by the base price.
    pub included_seats: u32,
    /// Price per seat beyond the included count, in cents.
    pub additional_seat_price_cents: i64,
    /// Marketing feature list.
    pub features: Vec<String>,
}

impl From<&Plan> for PlanResponse {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.as_str().to_string(),
            name: plan.name.clone(),
            base_price_cents: plan.base_price.cents(),
            included_seats: plan.included_seats,
            additional_seat_price_cents: plan.additional_seat_price.cents(),
            features: plan.features.clone(),
        }
    }
}

/// Subscription together with its resolved plan.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionDetailResponse {
    /// The subscription.
    pub subscription: SubscriptionResponse,
    /// The plan it is on.
    pub plan: PlanResponse,
}

impl From<&SubscriptionView> for SubscriptionDetailResponse {
    fn from(view: &SubscriptionView) -> Self {
        Self {
            subscription: SubscriptionResponse::from(&view.subscription),
            plan: PlanResponse::from(&view.plan),
        }
    }
}

/// Response for a seat total change.
#[derive(Debug, Clone, Serialize)]
pub struct SeatUpdateResponse {
    /// The new seat total.
    pub total_seats: u32,
    /// The new price in cents.
    pub price_cents: i64,
    /// Invoice issued for the new price.
    pub invoice_id: String,
}

/// Response for a used-seat change.
#[derive(Debug, Clone, Serialize)]
pub struct SeatUsageResponse {
    /// Seats consumed after the change.
    pub used_seats: u32,
    /// Seats still open after the change.
    pub available_seats: u32,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }
}
