//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::handlers::billing::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CreateSubscriptionCommand,
    CreateSubscriptionHandler, GetSubscriptionHandler, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, RecordSeatUsageCommand, RecordSeatUsageHandler,
    UpdateSeatsCommand, UpdateSeatsHandler,
};
use crate::domain::billing::{BillingError, PlanId};
use crate::domain::foundation::OrganizationId;
use crate::ports::{
    EventPublisher, OrganizationRepository, PaymentProvider, SubscriptionRepository,
};

use super::dto::{
    CancelSubscriptionRequest, CreateSubscriptionRequest, ErrorResponse, SeatUpdateResponse,
    SeatUsageRequest, SeatUsageResponse, SubscriptionDetailResponse, SubscriptionResponse,
    UpdateSeatsRequest,
};

/// Header carrying the Square webhook signature.
const SQUARE_SIGNATURE_HEADER: &str = "x-square-hmacsha256-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct BillingAppState {
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    pub organization_repository: Arc<dyn OrganizationRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub event_publisher: Arc<dyn EventPublisher>,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn create_subscription_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.organization_repository.clone(),
            self.payment_provider.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn get_subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscription_repository.clone())
    }

    pub fn update_seats_handler(&self) -> UpdateSeatsHandler {
        UpdateSeatsHandler::new(
            self.subscription_repository.clone(),
            self.payment_provider.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(
            self.subscription_repository.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn record_seat_usage_handler(&self) -> RecordSeatUsageHandler {
        RecordSeatUsageHandler::new(
            self.subscription_repository.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.subscription_repository.clone(),
            self.payment_provider.clone(),
            self.event_publisher.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST/PUT endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/subscriptions - Create a subscription for an organization
pub async fn create_subscription(
    State(state): State<BillingAppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.create_subscription_handler();
    let cmd = CreateSubscriptionCommand {
        organization_id: request.organization_id,
        plan_id: PlanId::new(request.plan_id),
        total_seats: request.total_seats,
    };

    let result = handler.handle(cmd).await?;

    let response = SubscriptionResponse::from(&result.subscription);
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/subscriptions/:organization_id/seats - Change the seat total
pub async fn update_seats(
    State(state): State<BillingAppState>,
    Path(organization_id): Path<Uuid>,
    Json(request): Json<UpdateSeatsRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.update_seats_handler();
    let cmd = UpdateSeatsCommand {
        organization_id: OrganizationId::from_uuid(organization_id),
        new_total_seats: request.total_seats,
    };

    let result = handler.handle(cmd).await?;

    let response = SeatUpdateResponse {
        total_seats: result.new_total_seats,
        price_cents: result.new_price.cents(),
        invoice_id: result.invoice_id.to_string(),
    };
    Ok(Json(response))
}

/// POST /api/subscriptions/:organization_id/cancel - Soft-cancel the subscription
///
/// The body is optional; when present it may carry a cancellation reason.
pub async fn cancel_subscription(
    State(state): State<BillingAppState>,
    Path(organization_id): Path<Uuid>,
    request: Option<Json<CancelSubscriptionRequest>>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.cancel_subscription_handler();
    let cmd = CancelSubscriptionCommand {
        organization_id: OrganizationId::from_uuid(organization_id),
        reason: request.and_then(|Json(r)| r.reason),
    };

    let result = handler.handle(cmd).await?;

    let response = SubscriptionResponse::from(&result.subscription);
    Ok(Json(response))
}

/// POST /api/subscriptions/:organization_id/seat-usage - Record a member
/// joining or leaving
pub async fn record_seat_usage(
    State(state): State<BillingAppState>,
    Path(organization_id): Path<Uuid>,
    Json(request): Json<SeatUsageRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.record_seat_usage_handler();
    let cmd = RecordSeatUsageCommand {
        organization_id: OrganizationId::from_uuid(organization_id),
        delta: request.delta,
    };

    let result = handler.handle(cmd).await?;

    let response = SeatUsageResponse {
        used_seats: result.used_seats,
        available_seats: result.available_seats,
    };
    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscriptions/:organization_id - Get the organization's
/// subscription with its plan
pub async fn get_subscription(
    State(state): State<BillingAppState>,
    Path(organization_id): Path<Uuid>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.get_subscription_handler();

    let view = handler
        .handle(OrganizationId::from_uuid(organization_id))
        .await?;

    Ok(Json(SubscriptionDetailResponse::from(&view)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Handler
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/square - Handle Square webhook events
pub async fn handle_square_webhook(
    State(state): State<BillingAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let signature = headers
        .get(SQUARE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            BillingError::validation(SQUARE_SIGNATURE_HEADER, "Missing signature header")
        })?;

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    handler.handle(cmd).await?;

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            BillingError::NotFound(_) => (StatusCode::NOT_FOUND, "SUBSCRIPTION_NOT_FOUND"),
            BillingError::OrganizationNotFound(_) => {
                (StatusCode::NOT_FOUND, "ORGANIZATION_NOT_FOUND")
            }
            BillingError::AlreadyExists(_) => (StatusCode::CONFLICT, "SUBSCRIPTION_EXISTS"),
            BillingError::Cancelled(_) => (StatusCode::CONFLICT, "SUBSCRIPTION_CANCELLED"),
            BillingError::InvalidPlan(_) => (StatusCode::BAD_REQUEST, "INVALID_PLAN"),
            BillingError::SeatUnderflow { .. } => (StatusCode::BAD_REQUEST, "SEAT_UNDERFLOW"),
            BillingError::SeatOverflow { .. } => (StatusCode::BAD_REQUEST, "SEAT_OVERFLOW"),
            BillingError::InvalidSeatState { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_SEAT_STATE")
            }
            BillingError::InvalidState { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATE_TRANSITION")
            }
            BillingError::Conflict { .. } => (StatusCode::CONFLICT, "VERSION_CONFLICT"),
            BillingError::PaymentFailed { .. } => {
                (StatusCode::PAYMENT_REQUIRED, "PAYMENT_FAILED")
            }
            BillingError::InvalidWebhookSignature => {
                (StatusCode::UNAUTHORIZED, "INVALID_WEBHOOK_SIGNATURE")
            }
            BillingError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            BillingError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        // Use the error's built-in message() method for consistent messaging
        let message = self.0.message();
        let body = ErrorResponse::new(error_code, message);
        (status, Json(body)).into_response()
    }
}
