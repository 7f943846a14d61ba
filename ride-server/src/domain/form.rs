//! Booking request input and its validation.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::journey::{Coordinates, Stop};

/// Default maximum passengers per vehicle.
pub const DEFAULT_MAX_PASSENGERS: u8 = 7;

/// A stop as entered on the booking form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopInput {
    pub location: String,

    #[serde(default)]
    pub coordinates: Option<Coordinates>,

    #[serde(default)]
    pub estimated_arrival: Option<NaiveTime>,

    #[serde(default)]
    pub waiting_minutes: Option<u32>,
}

impl StopInput {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            coordinates: None,
            estimated_arrival: None,
            waiting_minutes: None,
        }
    }

    pub fn with_waiting(mut self, minutes: u32) -> Self {
        self.waiting_minutes = Some(minutes);
        self
    }

    /// Turn the input into a journey stop with the given identifier.
    pub fn to_stop(&self, id: String) -> Stop {
        Stop {
            id,
            location: self.location.trim().to_string(),
            coordinates: self.coordinates,
            estimated_arrival: self.estimated_arrival,
            waiting_minutes: self.waiting_minutes,
        }
    }
}

/// A ride request as submitted by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFormData {
    pub pickup: String,
    pub destination: String,

    #[serde(default)]
    pub stops: Vec<StopInput>,

    pub date: NaiveDate,
    pub time: NaiveTime,

    pub passenger_count: u8,
    pub contact_number: String,

    #[serde(default)]
    pub is_return_journey: bool,

    #[serde(default)]
    pub return_date: Option<NaiveDate>,

    #[serde(default)]
    pub return_time: Option<NaiveTime>,

    /// Stops for the return leg. Defaults to the forward stops reversed.
    #[serde(default)]
    pub return_stops: Option<Vec<StopInput>>,

    /// Minimum hours between forward departure and return departure.
    #[serde(default)]
    pub min_return_gap_hours: Option<u32>,
}

/// Limits applied when validating a booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRules {
    /// Vehicle capacity.
    pub max_passengers: u8,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            max_passengers: DEFAULT_MAX_PASSENGERS,
        }
    }
}

impl BookingFormData {
    pub fn departure(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Return-leg departure, if both date and time were given.
    pub fn return_departure(&self) -> Option<NaiveDateTime> {
        Some(self.return_date?.and_time(self.return_time?))
    }

    /// Check the form, reporting the first violation found.
    ///
    /// Checks run in a fixed order: endpoints, passengers, contact number,
    /// return leg timing, then stops.
    pub fn validate(&self, rules: &BookingRules) -> Result<(), ValidationError> {
        let pickup = self.pickup.trim();
        let destination = self.destination.trim();

        if pickup.is_empty() {
            return Err(ValidationError::new("pickup", "pickup location is required"));
        }
        if destination.is_empty() {
            return Err(ValidationError::new(
                "destination",
                "destination is required",
            ));
        }
        if same_place(pickup, destination) {
            return Err(ValidationError::new(
                "destination",
                "destination must differ from pickup",
            ));
        }

        if self.passenger_count == 0 || self.passenger_count > rules.max_passengers {
            return Err(ValidationError::new(
                "passengerCount",
                format!("must be between 1 and {}", rules.max_passengers),
            ));
        }

        if !is_phone_number(&self.contact_number) {
            return Err(ValidationError::new(
                "contactNumber",
                "must be a phone number of 7 to 15 digits",
            ));
        }

        if self.is_return_journey {
            self.validate_return_leg()?;
        }

        let return_stops = self.return_stops.iter().flatten();
        for stop in self.stops.iter().chain(return_stops) {
            if stop.location.trim().is_empty() {
                return Err(ValidationError::new("stops", "stop location is required"));
            }
            if stop.coordinates.is_some_and(|c| !c.is_valid()) {
                return Err(ValidationError::new(
                    "stops",
                    format!("coordinates for {} are out of range", stop.location.trim()),
                ));
            }
        }

        Ok(())
    }

    fn validate_return_leg(&self) -> Result<(), ValidationError> {
        if self.return_date.is_none() {
            return Err(ValidationError::new(
                "returnDate",
                "return date is required for a return journey",
            ));
        }
        let Some(return_departure) = self.return_departure() else {
            return Err(ValidationError::new(
                "returnTime",
                "return time is required for a return journey",
            ));
        };

        let gap = Duration::hours(i64::from(self.min_return_gap_hours.unwrap_or(0)));
        let earliest = self.departure() + gap;
        if return_departure < earliest {
            let message = match self.min_return_gap_hours {
                Some(h) if h > 0 => format!("return must depart at least {h}h after pickup"),
                _ => "return cannot depart before pickup".to_string(),
            };
            return Err(ValidationError::new("returnDate", message));
        }

        Ok(())
    }
}

/// Place names compared ignoring case and runs of whitespace.
fn same_place(a: &str, b: &str) -> bool {
    a.split_whitespace()
        .map(str::to_lowercase)
        .eq(b.split_whitespace().map(str::to_lowercase))
}

/// Loose phone-number shape: optional leading `+`, then digits separated by
/// spaces, dashes or parentheses, with 7 to 15 digits in total.
fn is_phone_number(s: &str) -> bool {
    let s = s.trim();
    let body = s.strip_prefix('+').unwrap_or(s);

    if !body.starts_with(|c: char| c.is_ascii_digit() || c == '(') {
        return false;
    }
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return false;
    }

    let digits = body.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}
