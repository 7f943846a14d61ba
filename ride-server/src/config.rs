//! Server configuration from environment variables.
//!
//! Every setting has a default, logged when used. Credentials are
//! optional: without a maps or payment key the server runs against the
//! in-memory providers.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{info, warn};

use crate::booking::BookingConfig;
use crate::domain::BookingRules;
use crate::fare::FareRates;
use crate::maps::{CacheConfig, MapsConfig};
use crate::payment::PaymentConfig;
use crate::session::SessionConfig;

/// Error from reading configuration.
#[derive(Debug, thiserror::Error)]
#[error("invalid {key} value {value:?}: {message}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub message: String,
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,

    /// Live maps API settings; `None` without an API key.
    pub maps: Option<MapsConfig>,

    /// Live payment processor settings; `None` without a secret key.
    pub payment: Option<PaymentConfig>,

    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let maps = match env.secret("MAPS_API_KEY") {
            Some(key) => {
                let mut maps = MapsConfig::new(key)
                    .with_timeout(env.parse_or("MAPS_TIMEOUT_SECS", 10)?);
                if let Some(url) = env.get("MAPS_BASE_URL") {
                    maps = maps.with_base_url(url);
                }
                Some(maps)
            }
            None => None,
        };

        let payment = match env.secret("PAYMENT_SECRET_KEY") {
            Some(key) => {
                let mut payment = PaymentConfig::new(key)
                    .with_currency(env.parse_or::<String>("PAYMENT_CURRENCY", "inr".into())?)
                    .with_timeout(env.parse_or("PAYMENT_TIMEOUT_SECS", 10)?);
                if let Some(url) = env.get("PAYMENT_BASE_URL") {
                    payment = payment.with_base_url(url);
                }
                Some(payment)
            }
            None => None,
        };

        let cache = CacheConfig {
            ttl: Duration::from_secs(env.parse_or("DISTANCE_CACHE_TTL_SECS", 600)?),
            ..CacheConfig::default()
        };

        let secret = env.secret("SESSION_SECRET").unwrap_or_else(|| {
            warn!("SESSION_SECRET not set, sessions will not survive a restart");
            random_secret()
        });
        let session = SessionConfig::new(secret)
            .with_ttl_mins(env.parse_or("SESSION_TTL_MINS", 30)?)
            .with_secure_cookie(env.parse_or("SESSION_SECURE_COOKIE", false)?);

        let rates = FareRates::new(
            env.parse_or("FARE_PER_KM", 15.0)?,
            env.parse_or("FARE_PER_STOP", 25.0)?,
            env.parse_or("FARE_RETURN_DISCOUNT", 0.15)?,
        );
        check_rates(&rates)?;

        let max_passengers: u8 = env.parse_or("MAX_PASSENGERS", 7)?;
        if max_passengers == 0 {
            return Err(ConfigError {
                key: "MAX_PASSENGERS",
                value: "0".into(),
                message: "must allow at least one passenger".into(),
            });
        }

        let booking = BookingConfig::default()
            .with_rules(BookingRules { max_passengers })
            .with_rates(rates)
            .with_distance_attempts(env.parse_or("DISTANCE_ATTEMPTS", 3)?);

        Ok(Self {
            bind_addr: env.parse_or("RIDE_BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            maps,
            payment,
            cache,
            session,
            booking,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// A credential; its value is never logged.
    fn secret(&self, key: &str) -> Option<String> {
        let value = self.get(key);
        if value.is_none() {
            warn!("{key} not set");
        }
        value
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + Display,
        T::Err: Display,
    {
        match self.get(key) {
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError {
                key,
                message: e.to_string(),
                value,
            }),
            None => {
                info!("{key} not set, using default: {default}");
                Ok(default)
            }
        }
    }
}

fn check_rates(rates: &FareRates) -> Result<(), ConfigError> {
    let invalid = |key, value: f64, message: &str| ConfigError {
        key,
        value: value.to_string(),
        message: message.to_string(),
    };

    if !(rates.per_km.is_finite() && rates.per_km >= 0.0) {
        return Err(invalid("FARE_PER_KM", rates.per_km, "must be a non-negative number"));
    }
    if !(rates.per_stop.is_finite() && rates.per_stop >= 0.0) {
        return Err(invalid("FARE_PER_STOP", rates.per_stop, "must be a non-negative number"));
    }
    if !(0.0..1.0).contains(&rates.return_discount) {
        return Err(invalid(
            "FARE_RETURN_DISCOUNT",
            rates.return_discount,
            "must be a fraction in [0, 1)",
        ));
    }
    Ok(())
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
