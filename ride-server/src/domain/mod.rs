//! Booking model.
//!
//! Journeys, stops, booking records and the booking status lifecycle.
//! Booking records are only constructed from a form that passed
//! validation, and only change status along the legal lifecycle edges.

mod booking;
mod booking_id;
mod error;
mod form;
mod journey;
mod status;

pub use booking::{BookingDetails, MINOR_UNITS, build_booking};
pub use booking_id::BookingId;
pub use error::{BookingError, StateTransitionError, ValidationError};
pub use form::{BookingFormData, BookingRules, DEFAULT_MAX_PASSENGERS, StopInput};
pub use journey::{Coordinates, Journey, Stop};
pub use status::BookingStatus;

#[cfg(test)]
pub(crate) use form::fixtures;
