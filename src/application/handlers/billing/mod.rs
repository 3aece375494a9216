//! Billing handlers - subscription lifecycle operations.
//!
//! One handler per exposed operation:
//! - `CreateSubscriptionHandler` - create an organization's subscription
//! - `UpdateSeatsHandler` - change the seat total (full reinvoice)
//! - `CancelSubscriptionHandler` - soft cancel
//! - `GetSubscriptionHandler` - read-side lookup
//! - `RecordSeatUsageHandler` - member join/leave integration
//! - `HandlePaymentWebhookHandler` - provider webhook processing

mod cancel_subscription;
mod create_subscription;
mod get_subscription;
mod handle_payment_webhook;
mod record_seat_usage;
mod update_seats;

pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use create_subscription::{
    CreateSubscriptionCommand, CreateSubscriptionHandler, CreateSubscriptionResult,
};
pub use get_subscription::{GetSubscriptionHandler, SubscriptionView};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, WebhookOutcome,
};
pub use record_seat_usage::{
    RecordSeatUsageCommand, RecordSeatUsageHandler, RecordSeatUsageResult,
};
pub use update_seats::{UpdateSeatsCommand, UpdateSeatsHandler, UpdateSeatsResult};
