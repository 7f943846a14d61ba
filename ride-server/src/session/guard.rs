//! Signed session cookies and the view gates built on them.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use crate::domain::{BookingId, BookingStatus};

use super::claims::SessionClaims;
use super::error::SessionError;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC key for signing tokens.
    pub secret: String,

    /// Token lifetime in minutes.
    pub ttl_mins: i64,

    /// Add the `Secure` attribute (requires HTTPS).
    pub secure_cookie: bool,

    pub cookie_name: String,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    pub fn with_ttl_mins(mut self, mins: i64) -> Self {
        self.ttl_mins = mins;
        self
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::minutes(self.ttl_mins)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_mins: 30,
            secure_cookie: false,
            cookie_name: "ride_session".to_string(),
        }
    }
}

/// A view that only some sessions may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedView {
    /// Shown after a successful payment.
    Confirmation,

    /// Live journey tracking.
    Tracking,
}

impl GuardedView {
    fn flag_set(self, claims: &SessionClaims) -> bool {
        match self {
            GuardedView::Confirmation => claims.payment_confirmed,
            GuardedView::Tracking => claims.journey_in_progress,
        }
    }

    /// Whether a booking in `status` may be shown in this view.
    pub fn admits(self, status: BookingStatus) -> bool {
        match self {
            GuardedView::Confirmation => {
                matches!(status, BookingStatus::Confirmed | BookingStatus::InProgress)
            }
            GuardedView::Tracking => status == BookingStatus::InProgress,
        }
    }

    /// Decide access once the booking's current status is known.
    pub fn decide(self, booking_id: BookingId, status: BookingStatus) -> GuardDecision {
        if self.admits(status) {
            GuardDecision::Allow(booking_id)
        } else {
            GuardDecision::Redirect {
                clear: status.is_terminal(),
            }
        }
    }
}

/// Outcome of a guarded view check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the view for this booking.
    Allow(BookingId),

    /// Send the user back to the booking-entry view, removing the cookie if `clear`.
    Redirect { clear: bool },
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionGuard {
    config: SessionConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionGuard {
    pub fn new(config: SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A fresh, flagless session.
    pub fn start(&self, user_id: Option<String>, now: DateTime<Utc>) -> SessionClaims {
        SessionClaims::new(user_id, now, self.config.ttl())
    }

    pub fn issue(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Token(e),
            })
    }

    /// The valid session carried by a request, if any.
    pub fn current(&self, headers: &HeaderMap) -> Option<SessionClaims> {
        let token = cookie_value(headers, &self.config.cookie_name)?;
        match self.verify(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!(error = %e, "ignoring session cookie");
                None
            }
        }
    }

    /// The current session, or a new one for `user_id`.
    pub fn current_or_start(
        &self,
        headers: &HeaderMap,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> SessionClaims {
        self.current(headers)
            .unwrap_or_else(|| self.start(user_id, now))
    }

    /// Booking to show in `view`, if the request's session has the flag for it.
    ///
    /// The caller must still check the booking's status with
    /// [`GuardedView::decide`].
    pub fn gate(&self, view: GuardedView, headers: &HeaderMap) -> Option<BookingId> {
        let claims = self.current(headers)?;
        if !view.flag_set(&claims) {
            return None;
        }
        claims.booking_id
    }

    /// `Set-Cookie` value storing `claims`.
    pub fn set_cookie(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        let token = self.issue(claims)?;
        Ok(self.cookie(&token, self.config.ttl().num_seconds()))
    }

    /// `Set-Cookie` value that removes the session.
    pub fn clear_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let secure = if self.config.secure_cookie { "; Secure" } else { "" };
        format!(
            "{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}",
            self.config.cookie_name
        )
    }
}

/// Value of the named cookie in a request.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn guard() -> SessionGuard {
        SessionGuard::new(SessionConfig::new("test-secret"))
    }

    fn headers_with(set_cookie: &str) -> HeaderMap {
        // Echo the name=value part back as a request cookie
        let pair = set_cookie.split(';').next().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {pair}")).unwrap(),
        );
        headers
    }

    fn confirmed_session(guard: &SessionGuard, id: &str) -> SessionClaims {
        guard
            .start(None, Utc::now())
            .with_payment_confirmed(&BookingId::new(id))
    }

    #[test]
    fn token_round_trips() {
        let guard = guard();
        let claims = confirmed_session(&guard, "B1");

        let token = guard.issue(&claims).unwrap();
        assert_eq!(guard.verify(&token).unwrap(), claims);
    }

    #[test]
    fn missing_cookie_is_rejected() {
        let guard = guard();
        assert_eq!(guard.current(&HeaderMap::new()), None);
        assert_eq!(guard.gate(GuardedView::Confirmation, &HeaderMap::new()), None);
    }

    #[test]
    fn forged_token_is_rejected() {
        let guard = guard();
        let forger = SessionGuard::new(SessionConfig::new("not-the-secret"));
        let cookie = forger
            .set_cookie(&confirmed_session(&forger, "B1"))
            .unwrap();

        assert_eq!(guard.gate(GuardedView::Confirmation, &headers_with(&cookie)), None);
        assert!(matches!(
            guard.verify(cookie.split(['=', ';']).nth(1).unwrap()),
            Err(SessionError::Token(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let guard = guard();
        let claims = guard
            .start(None, Utc::now() - Duration::hours(2))
            .with_payment_confirmed(&BookingId::new("B1"));
        let token = guard.issue(&claims).unwrap();

        assert!(matches!(guard.verify(&token), Err(SessionError::Expired)));

        let cookie = guard.set_cookie(&claims).unwrap();
        assert_eq!(guard.gate(GuardedView::Confirmation, &headers_with(&cookie)), None);
    }

    #[test]
    fn gate_requires_the_view_flag() {
        let guard = guard();
        let cookie = guard.set_cookie(&confirmed_session(&guard, "B1")).unwrap();
        let headers = headers_with(&cookie);

        assert_eq!(
            guard.gate(GuardedView::Confirmation, &headers),
            Some(BookingId::new("B1"))
        );
        assert_eq!(guard.gate(GuardedView::Tracking, &headers), None);
    }

    #[test]
    fn cookie_attributes() {
        let guard = SessionGuard::new(SessionConfig::new("s").with_secure_cookie(true));
        let cookie = guard.set_cookie(&guard.start(None, Utc::now())).unwrap();

        assert!(cookie.starts_with("ride_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=1800"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn cleared_cookie_drops_both_flags() {
        let guard = guard();
        let claims = confirmed_session(&guard, "B1").with_journey_in_progress(&BookingId::new("B1"));
        let cookie = guard.set_cookie(&claims).unwrap();
        assert!(guard.gate(GuardedView::Tracking, &headers_with(&cookie)).is_some());

        let cleared = guard.clear_cookie();
        assert!(cleared.contains("Max-Age=0"));

        let headers = headers_with(&cleared);
        assert_eq!(guard.current(&headers), None);
        assert_eq!(guard.gate(GuardedView::Confirmation, &headers), None);
        assert_eq!(guard.gate(GuardedView::Tracking, &headers), None);
    }

    #[test]
    fn views_admit_live_bookings_only() {
        let id = BookingId::new("B1");

        assert_eq!(
            GuardedView::Confirmation.decide(id.clone(), BookingStatus::Confirmed),
            GuardDecision::Allow(id.clone())
        );
        assert_eq!(
            GuardedView::Confirmation.decide(id.clone(), BookingStatus::Pending),
            GuardDecision::Redirect { clear: false }
        );
        assert_eq!(
            GuardedView::Tracking.decide(id.clone(), BookingStatus::Confirmed),
            GuardDecision::Redirect { clear: false }
        );
        assert_eq!(
            GuardedView::Tracking.decide(id.clone(), BookingStatus::InProgress),
            GuardDecision::Allow(id.clone())
        );
        assert_eq!(
            GuardedView::Tracking.decide(id, BookingStatus::Completed),
            GuardDecision::Redirect { clear: true }
        );
    }
}
