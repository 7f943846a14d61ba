//! Session guard for the post-payment views.
//!
//! A short-lived, HMAC-signed token in an `HttpOnly` cookie records that
//! this browser completed payment for a booking and, later, that its
//! journey started. The confirmation and tracking views require the
//! matching flag and re-check the booking's status on every request.
//!
//! This is access control for views, not authentication: user identity
//! comes from the upstream identity provider.

mod claims;
mod error;
mod guard;

pub use claims::SessionClaims;
pub use error::SessionError;
pub use guard::{GuardDecision, GuardedView, SessionConfig, SessionGuard};
