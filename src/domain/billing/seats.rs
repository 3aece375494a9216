//! Seat allocation ledger.
//!
//! Tracks total and used seats for one subscription. Available seats are
//! always derived from the other two counts and never stored, so they
//! cannot drift.

use serde::{Deserialize, Serialize};

use super::errors::BillingError;

/// Seat counts for one organization subscription.
///
/// Invariant: `used_seats <= total_seats` at all times. Operations that
/// would break it return an error and leave the allocation untouched;
/// all mutators return a fresh allocation rather than updating in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAllocation {
    total_seats: u32,
    used_seats: u32,
}

impl SeatAllocation {
    /// Creates an allocation, validating the seat invariant.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::ValidationFailed` when `total_seats` is zero
    /// and `BillingError::InvalidSeatState` when `used_seats` exceeds
    /// `total_seats`.
    pub fn new(total_seats: u32, used_seats: u32) -> Result<Self, BillingError> {
        if total_seats == 0 {
            return Err(BillingError::validation(
                "total_seats",
                "must be a positive integer",
            ));
        }
        if used_seats > total_seats {
            return Err(BillingError::invalid_seat_state(total_seats, used_seats));
        }
        Ok(Self {
            total_seats,
            used_seats,
        })
    }

    /// Returns the total seats in the allocation.
    pub fn total(&self) -> u32 {
        self.total_seats
    }

    /// Returns the seats currently consumed by organization members.
    pub fn used(&self) -> u32 {
        self.used_seats
    }

    /// Returns the seats still open, recomputed on every call.
    pub fn available(&self) -> u32 {
        self.total_seats - self.used_seats
    }

    /// Returns an allocation resized to `new_total`, used seats unchanged.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::SeatUnderflow` when `new_total` is below the
    /// seats already in use. Shrinking below usage is rejected outright,
    /// never clamped; members must be removed first.
    pub fn with_total(&self, new_total: u32) -> Result<Self, BillingError> {
        if new_total < self.used_seats {
            return Err(BillingError::seat_underflow(new_total, self.used_seats));
        }
        Self::new(new_total, self.used_seats)
    }

    /// Returns an allocation with `delta` applied to the used-seat count.
    ///
    /// Called when a member joins (`+1`) or leaves (`-1`) the organization.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::SeatOverflow` when the resulting used count
    /// would exceed the total or go negative.
    pub fn with_used_delta(&self, delta: i64) -> Result<Self, BillingError> {
        let attempted = i64::from(self.used_seats) + delta;
        if attempted < 0 || attempted > i64::from(self.total_seats) {
            return Err(BillingError::seat_overflow(attempted, self.total_seats));
        }
        Self::new(self.total_seats, attempted as u32)
    }
}
