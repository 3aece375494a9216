//! Domain layer - Billing business logic.
//!
//! Pure domain types and rules. No I/O happens here; everything that
//! touches the outside world goes through `ports`.

pub mod billing;
pub mod foundation;
