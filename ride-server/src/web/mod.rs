//! Web layer for ride booking.
//!
//! Provides the booking entry page, a JSON API for bookings, fares and
//! payments, and the session-guarded confirmation and tracking pages.

mod dto;
mod error;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use error::AppError;
pub use routes::{USER_ID_HEADER, create_router};
pub use state::AppState;
pub use templates::*;
