//! Configuration for the booking orchestrator.

use std::time::Duration;

use crate::domain::BookingRules;
use crate::fare::FareRates;

/// Tunables for [`BookingService`](super::BookingService).
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Form validation limits.
    pub rules: BookingRules,

    /// Fare rates applied to new bookings.
    pub rates: FareRates,

    /// Attempts at building a booking while the distance provider is failing.
    pub distance_attempts: u32,

    /// Pause between distance attempts; doubles after each failure.
    pub retry_backoff: Duration,

    /// Identifiers tried before giving up on a booking whose ids keep colliding.
    pub id_attempts: u32,
}

impl BookingConfig {
    pub fn with_rules(mut self, rules: BookingRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_rates(mut self, rates: FareRates) -> Self {
        self.rates = rates;
        self
    }

    /// Set the number of distance attempts (at least one is always made).
    pub fn with_distance_attempts(mut self, attempts: u32) -> Self {
        self.distance_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Backoff before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(1 << attempt.saturating_sub(1).min(8))
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            rules: BookingRules::default(),
            rates: FareRates::default(),
            distance_attempts: 3,
            retry_backoff: Duration::from_millis(200),
            id_attempts: 5,
        }
    }
}
