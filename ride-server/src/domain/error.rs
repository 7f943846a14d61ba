//! Booking error types.
//!
//! `ValidationError` and `StateTransitionError` are raised by the booking
//! model itself. `BookingError` is the umbrella type returned by the
//! orchestrator, which also carries collaborator failures.

use crate::maps::DistanceError;
use crate::store::StoreError;

use super::{BookingId, BookingStatus};

/// A booking form field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    /// Wire name of the offending field (e.g. `passengerCount`).
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A status change that the booking lifecycle does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move booking from {from} to {to}")]
pub struct StateTransitionError {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

/// Errors surfaced by booking operations.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Malformed or inconsistent booking input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The distance provider could not price the route
    #[error("distance unavailable: {0}")]
    DistanceUnavailable(#[from] DistanceError),

    /// Illegal status change
    #[error(transparent)]
    StateTransition(#[from] StateTransitionError),

    /// The fare cannot change once the booking has left `pending`
    #[error("fare is locked once a booking is {0}")]
    FareLocked(BookingStatus),

    /// Payment signal disagrees with the booking total
    #[error(
        "payment amount mismatch for booking {booking_id}: expected {expected_minor}, received {received_minor}"
    )]
    AmountMismatch {
        booking_id: BookingId,
        expected_minor: u64,
        received_minor: u64,
    },

    /// The processor reports the payment as not captured
    #[error("payment {intent_id} has not been captured")]
    PaymentNotCaptured { intent_id: String },

    /// Unknown booking identifier
    #[error("booking {0} not found")]
    NotFound(BookingId),

    /// Data store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    /// Whether the caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BookingError::DistanceUnavailable(_) | BookingError::Store(StoreError::Unavailable(_))
        )
    }
}
