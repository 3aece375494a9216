//! Billing-specific error types.
//!
//! Errors raised by subscription lifecycle, seat management, pricing, and
//! payment processing.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | OrganizationNotFound | 404 |
//! | AlreadyExists | 409 |
//! | Conflict | 409 |
//! | Cancelled | 409 |
//! | InvalidPlan | 400 |
//! | SeatUnderflow | 400 |
//! | SeatOverflow | 400 |
//! | InvalidSeatState | 500 |
//! | InvalidState | 409 |
//! | PaymentFailed | 402 |
//! | InvalidWebhookSignature | 401 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, OrganizationId};

/// Billing-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// No subscription exists for this organization.
    NotFound(OrganizationId),

    /// Organization was not found.
    OrganizationNotFound(OrganizationId),

    /// Organization already has a subscription.
    AlreadyExists(OrganizationId),

    /// Subscription is cancelled and cannot be modified.
    Cancelled(OrganizationId),

    /// Unknown or inapplicable plan id.
    InvalidPlan(String),

    /// Requested seat total is below the seats currently in use.
    SeatUnderflow {
        requested_total: u32,
        used_seats: u32,
    },

    /// A used-seat change would push usage above the allocation or below zero.
    SeatOverflow {
        attempted_used: i64,
        total_seats: u32,
    },

    /// Stored seat counts violate the ledger invariant.
    InvalidSeatState { total_seats: u32, used_seats: u32 },

    /// Invalid status for the requested operation.
    InvalidState { current: String, attempted: String },

    /// Optimistic lock failure: the subscription changed underneath us.
    Conflict {
        organization_id: OrganizationId,
        expected_version: u64,
    },

    /// Payment processing failed.
    PaymentFailed { reason: String },

    /// Webhook signature verification failed.
    InvalidWebhookSignature,

    /// Validation failed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure error.
    Infrastructure(String),
}

impl BillingError {
    // Constructor functions for cleaner error creation

    pub fn not_found(organization_id: OrganizationId) -> Self {
        BillingError::NotFound(organization_id)
    }

    pub fn organization_not_found(organization_id: OrganizationId) -> Self {
        BillingError::OrganizationNotFound(organization_id)
    }

    pub fn already_exists(organization_id: OrganizationId) -> Self {
        BillingError::AlreadyExists(organization_id)
    }

    pub fn cancelled(organization_id: OrganizationId) -> Self {
        BillingError::Cancelled(organization_id)
    }

    pub fn invalid_plan(plan_id: impl Into<String>) -> Self {
        BillingError::InvalidPlan(plan_id.into())
    }

    pub fn seat_underflow(requested_total: u32, used_seats: u32) -> Self {
        BillingError::SeatUnderflow {
            requested_total,
            used_seats,
        }
    }

    pub fn seat_overflow(attempted_used: i64, total_seats: u32) -> Self {
        BillingError::SeatOverflow {
            attempted_used,
            total_seats,
        }
    }

    pub fn invalid_seat_state(total_seats: u32, used_seats: u32) -> Self {
        BillingError::InvalidSeatState {
            total_seats,
            used_seats,
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        BillingError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn conflict(organization_id: OrganizationId, expected_version: u64) -> Self {
        BillingError::Conflict {
            organization_id,
            expected_version,
        }
    }

    pub fn payment_failed(reason: impl Into<String>) -> Self {
        BillingError::PaymentFailed {
            reason: reason.into(),
        }
    }

    pub fn invalid_webhook_signature() -> Self {
        BillingError::InvalidWebhookSignature
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::NotFound(_) => ErrorCode::SubscriptionNotFound,
            BillingError::OrganizationNotFound(_) => ErrorCode::OrganizationNotFound,
            BillingError::AlreadyExists(_) => ErrorCode::SubscriptionExists,
            BillingError::Cancelled(_) => ErrorCode::SubscriptionCancelled,
            BillingError::InvalidPlan(_) => ErrorCode::PlanNotFound,
            BillingError::SeatUnderflow { .. } => ErrorCode::SeatUnderflow,
            BillingError::SeatOverflow { .. } => ErrorCode::SeatOverflow,
            BillingError::InvalidSeatState { .. } => ErrorCode::InvalidSeatState,
            BillingError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            BillingError::Conflict { .. } => ErrorCode::VersionConflict,
            BillingError::PaymentFailed { .. } => ErrorCode::PaymentFailed,
            BillingError::InvalidWebhookSignature => ErrorCode::InvalidWebhookSignature,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BillingError::NotFound(org_id) => {
                format!("No subscription found for organization: {}", org_id)
            }
            BillingError::OrganizationNotFound(org_id) => {
                format!("Organization not found: {}", org_id)
            }
            BillingError::AlreadyExists(org_id) => {
                format!("Organization {} already has a subscription", org_id)
            }
            BillingError::Cancelled(org_id) => {
                format!("Subscription for organization {} is cancelled", org_id)
            }
            BillingError::InvalidPlan(plan_id) => format!("Invalid plan: {}", plan_id),
            BillingError::SeatUnderflow {
                requested_total,
                used_seats,
            } => format!(
                "Cannot reduce seats to {}: {} seats are in use",
                requested_total, used_seats
            ),
            BillingError::SeatOverflow {
                attempted_used,
                total_seats,
            } => format!(
                "Used seats cannot become {}: allocation has {} total seats",
                attempted_used, total_seats
            ),
            BillingError::InvalidSeatState {
                total_seats,
                used_seats,
            } => format!(
                "Invalid seat state: {} seats used but only {} allocated",
                used_seats, total_seats
            ),
            BillingError::InvalidState { current, attempted } => {
                format!("Cannot {} subscription in {} state", attempted, current)
            }
            BillingError::Conflict {
                organization_id,
                expected_version,
            } => format!(
                "Subscription for organization {} was modified concurrently (expected version {})",
                organization_id, expected_version
            ),
            BillingError::PaymentFailed { reason } => format!("Payment failed: {}", reason),
            BillingError::InvalidWebhookSignature => "Invalid webhook signature".to_string(),
            BillingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BillingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    ///
    /// Conflict is retryable by re-reading the subscription and reapplying
    /// the change against the fresh version.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::Infrastructure(_)
                | BillingError::PaymentFailed { .. }
                | BillingError::Conflict { .. }
        )
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PlanNotFound => BillingError::InvalidPlan(err.to_string()),
            ErrorCode::PaymentFailed => BillingError::PaymentFailed {
                reason: err.to_string(),
            },
            ErrorCode::InvalidStateTransition => BillingError::InvalidState {
                current: "unknown".to_string(),
                attempted: err.to_string(),
            },
            ErrorCode::ValidationFailed => BillingError::ValidationFailed {
                field: "unknown".to_string(),
                message: err.to_string(),
            },
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}
