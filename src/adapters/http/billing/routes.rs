//! Axum router configuration for billing endpoints.
//!
//! This module defines the route structure for subscription-related API
//! endpoints and wires them to their corresponding handlers.

use axum::{
    routing::{get, post, put},
    Router,
};
use http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    cancel_subscription, create_subscription, get_subscription, handle_square_webhook,
    record_seat_usage, update_seats, BillingAppState,
};
use crate::config::ServerConfig;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the subscription API router.
///
/// # Routes
///
/// - `POST /` - Create a subscription for an organization
/// - `GET /:organization_id` - Get the organization's subscription and plan
/// - `PUT /:organization_id/seats` - Change the seat total (full reinvoice)
/// - `POST /:organization_id/cancel` - Soft-cancel the subscription
/// - `POST /:organization_id/seat-usage` - Record a member join or leave
pub fn subscription_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/", post(create_subscription))
        .route("/:organization_id", get(get_subscription))
        .route("/:organization_id/seats", put(update_seats))
        .route("/:organization_id/cancel", post(cancel_subscription))
        .route("/:organization_id/seat-usage", post(record_seat_usage))
}

/// Create the Square webhook router.
///
/// This is separate from the main subscription routes because webhooks
/// don't require user authentication (they're verified via signature).
///
/// # Routes
/// - `POST /square` - Handle Square webhooks
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/square", post(handle_square_webhook))
}

/// Create the complete billing module router.
///
/// Combines subscription routes and webhook routes into a single router
/// suitable for mounting at `/api`.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use crate::adapters::http::billing::{billing_router, BillingAppState};
///
/// let app_state = BillingAppState { /* ... */ };
/// let app = Router::new()
///     .nest("/api", billing_router())
///     .with_state(app_state);
/// ```
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/subscriptions", subscription_routes())
        .nest("/webhooks", webhook_routes())
}

/// Build the deployable application: the billing router mounted at
/// `/api` with request ids, tracing, the configured request timeout,
/// and CORS for the configured origins.
///
/// Layer order matters: the request id is assigned outermost so the
/// trace span and the response header both carry it.
pub fn billing_app(state: BillingAppState, config: &ServerConfig) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .nest("/api", billing_router())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(cors_layer(config))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // No configured origins means no cross-origin access; the webhook
    // endpoint is server-to-server and does not need CORS.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
}
