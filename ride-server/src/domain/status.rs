//! Booking lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StateTransitionError;

/// Where a booking is in its lifecycle.
///
/// Bookings move forward along
/// `Pending -> Confirmed -> InProgress -> Completed`, and may be cancelled
/// from any state that is not terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// All states, in lifecycle order.
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    /// No transitions leave a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Whether `self -> to` is an edge of the lifecycle.
    pub fn can_transition_to(self, to: BookingStatus) -> bool {
        use BookingStatus::*;

        matches!(
            (self, to),
            (Pending, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Pending | Confirmed | InProgress, Cancelled)
        )
    }

    /// Return `to` if the transition is legal.
    pub fn transition(self, to: BookingStatus) -> Result<BookingStatus, StateTransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(StateTransitionError { from: self, to })
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
