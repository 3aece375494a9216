//! Square payment provider adapter.

mod square_adapter;
mod square_types;

pub use square_adapter::{SquareConfig, SquarePaymentAdapter};
pub use square_types::{SquareInvoice, SquareWebhookEvent};
