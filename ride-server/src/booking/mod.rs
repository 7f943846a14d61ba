//! Booking orchestration.
//!
//! Sits between the HTTP layer and the booking model: builds and prices
//! bookings, stores them, and applies payment confirmations and status
//! changes through the store's compare-and-swap.

mod config;
mod service;

pub use config::BookingConfig;
pub use service::BookingService;
