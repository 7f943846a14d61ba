//! Session token contents.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::BookingId;

/// Claims carried by the signed session cookie.
///
/// The two flags are write-once: setting one that is already set, or
/// setting one for a different booking than the session is bound to,
/// returns the session unchanged. Only clearing the cookie resets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Booking the flags refer to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default)]
    pub payment_confirmed: bool,

    #[serde(default)]
    pub journey_in_progress: bool,

    /// Issued at (Unix seconds)
    pub iat: i64,

    /// Expiry (Unix seconds)
    pub exp: i64,
}

impl SessionClaims {
    /// A fresh session with no flags set.
    pub fn new(user_id: Option<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            booking_id: None,
            user_id,
            payment_confirmed: false,
            journey_in_progress: false,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Record a confirmed payment for `booking_id`.
    pub fn with_payment_confirmed(self, booking_id: &BookingId) -> Self {
        if self.payment_confirmed || !self.can_bind(booking_id) {
            return self;
        }
        Self {
            booking_id: Some(booking_id.clone()),
            payment_confirmed: true,
            ..self
        }
    }

    /// Record that the journey for `booking_id` has started.
    pub fn with_journey_in_progress(self, booking_id: &BookingId) -> Self {
        if self.journey_in_progress || !self.can_bind(booking_id) {
            return self;
        }
        Self {
            booking_id: Some(booking_id.clone()),
            journey_in_progress: true,
            ..self
        }
    }

    fn can_bind(&self, booking_id: &BookingId) -> bool {
        self.booking_id.as_ref().is_none_or(|bound| bound == booking_id)
    }

    /// Whether the session refers to `booking_id`.
    pub fn is_for(&self, booking_id: &BookingId) -> bool {
        self.booking_id.as_ref() == Some(booking_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fresh() -> SessionClaims {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        SessionClaims::new(Some("user-1".into()), now, Duration::minutes(30))
    }

    #[test]
    fn new_session_expires_after_ttl() {
        let claims = fresh();
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert!(!claims.payment_confirmed);
        assert!(!claims.journey_in_progress);
        assert_eq!(claims.booking_id, None);
    }

    #[test]
    fn flags_bind_the_session_to_a_booking() {
        let id = BookingId::new("B1");
        let claims = fresh().with_payment_confirmed(&id);

        assert!(claims.payment_confirmed);
        assert!(claims.is_for(&id));

        let claims = claims.with_journey_in_progress(&id);
        assert!(claims.journey_in_progress);
        assert!(claims.payment_confirmed);
    }

    #[test]
    fn flags_are_write_once() {
        let id = BookingId::new("B1");
        let claims = fresh().with_payment_confirmed(&id);

        assert_eq!(claims.clone().with_payment_confirmed(&id), claims);
    }

    #[test]
    fn bound_session_ignores_other_bookings() {
        let claims = fresh().with_payment_confirmed(&BookingId::new("B1"));
        let other = BookingId::new("B2");

        assert_eq!(claims.clone().with_journey_in_progress(&other), claims);
        assert!(!claims.is_for(&other));
    }
}
