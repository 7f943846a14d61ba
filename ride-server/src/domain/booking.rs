//! Booking records and their construction from a validated form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fare::{FareBreakdown, FareRates};
use crate::maps::{DistanceError, DistanceProvider};

use super::error::{BookingError, StateTransitionError, ValidationError};
use super::form::{BookingFormData, BookingRules, StopInput};
use super::journey::{Journey, Stop};
use super::{BookingId, BookingStatus};

/// Minor currency units per whole unit (payment processors bill in minor units).
pub const MINOR_UNITS: u64 = 100;

/// A user's ride request and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    pub id: BookingId,

    /// Opaque identifier from the identity provider, if the user was signed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    pub status: BookingStatus,

    pub passenger_count: u8,
    pub contact_number: String,

    pub forward_journey: Journey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_journey: Option<Journey>,

    /// Sum of the leg fares, in whole currency units.
    pub total_fare: u64,

    /// Breakdown of the forward leg.
    pub fare_breakdown: FareBreakdown,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_fare_breakdown: Option<FareBreakdown>,

    /// Processor payment identifier, recorded on confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Store revision, bumped on every successful update.
    #[serde(default)]
    pub version: u64,
}

impl BookingDetails {
    /// The total in the processor's minor units.
    pub fn total_fare_minor(&self) -> u64 {
        self.total_fare.saturating_mul(MINOR_UNITS)
    }

    /// A copy of this booking moved to `to`.
    pub fn transitioned(
        &self,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> Result<BookingDetails, StateTransitionError> {
        let status = self.status.transition(to)?;
        Ok(BookingDetails {
            status,
            updated_at: now,
            ..self.clone()
        })
    }

    /// A copy of this booking confirmed against the given payment.
    pub fn confirmed_by(
        &self,
        payment_reference: &str,
        now: DateTime<Utc>,
    ) -> Result<BookingDetails, StateTransitionError> {
        let mut confirmed = self.transitioned(BookingStatus::Confirmed, now)?;
        confirmed.payment_reference = Some(payment_reference.to_string());
        Ok(confirmed)
    }

    /// This booking under a new identifier, with journey and stop ids renamed to match.
    pub fn with_id(mut self, id: BookingId) -> BookingDetails {
        let old = self.id.as_str().to_string();
        let rename = |s: &mut String| {
            if let Some(rest) = s.strip_prefix(old.as_str()) {
                *s = format!("{id}{rest}");
            }
        };

        for journey in std::iter::once(&mut self.forward_journey).chain(self.return_journey.as_mut()) {
            rename(&mut journey.id);
            for stop in &mut journey.stops {
                rename(&mut stop.id);
            }
        }

        self.id = id;
        self
    }

    /// Recompute leg fares from the stored distances.
    ///
    /// Only pending bookings can be repriced; once confirmed the fare is fixed.
    pub fn reprice(&mut self, rates: &FareRates, now: DateTime<Utc>) -> Result<(), BookingError> {
        if self.status != BookingStatus::Pending {
            return Err(BookingError::FareLocked(self.status));
        }

        let forward = price_from_distance(&mut self.forward_journey, rates)?;
        let mut total = forward.final_fare;
        self.fare_breakdown = forward;

        if let Some(ret) = self.return_journey.as_mut() {
            let breakdown = price_from_distance(ret, rates)?;
            total += breakdown.final_fare;
            self.return_fare_breakdown = Some(breakdown);
        }

        self.total_fare = total;
        self.updated_at = now;
        Ok(())
    }
}

/// Validate a form, resolve leg distances and price the booking.
///
/// The returned booking is `Pending` and not yet persisted.
pub async fn build_booking<D>(
    form: &BookingFormData,
    id: BookingId,
    user_id: Option<String>,
    distances: &D,
    rules: &BookingRules,
    rates: &FareRates,
    now: DateTime<Utc>,
) -> Result<BookingDetails, BookingError>
where
    D: DistanceProvider + ?Sized,
{
    form.validate(rules)?;

    let forward_stops = number_stops(&id, "F", form.stops.iter());
    let mut forward = Journey::new(
        format!("{id}-F"),
        form.pickup.trim(),
        form.destination.trim(),
        forward_stops,
        form.date,
        form.time,
        false,
    );
    let fare_breakdown = price_journey(&mut forward, distances, rates).await?;
    let mut total_fare = fare_breakdown.final_fare;

    let mut return_journey = None;
    let mut return_fare_breakdown = None;

    if form.is_return_journey {
        // validate() guarantees both are present for a return journey
        let (Some(date), Some(time)) = (form.return_date, form.return_time) else {
            return Err(BookingError::Validation(ValidationError::new(
                "returnDate",
                "return date and time are required for a return journey",
            )));
        };

        let mut ret = forward.reversed(format!("{id}-R"), date, time);
        ret.stops = match &form.return_stops {
            Some(stops) => number_stops(&id, "R", stops.iter()),
            None => renumber_stops(&id, "R", ret.stops),
        };

        let breakdown = price_journey(&mut ret, distances, rates).await?;
        total_fare += breakdown.final_fare;
        return_fare_breakdown = Some(breakdown);
        return_journey = Some(ret);
    }

    Ok(BookingDetails {
        id,
        user_id,
        status: BookingStatus::Pending,
        passenger_count: form.passenger_count,
        contact_number: form.contact_number.trim().to_string(),
        forward_journey: forward,
        return_journey,
        total_fare,
        fare_breakdown,
        return_fare_breakdown,
        payment_reference: None,
        created_at: now,
        updated_at: now,
        version: 0,
    })
}

/// Resolve a journey's distance and fill in its distance, fare and duration.
async fn price_journey<D>(
    journey: &mut Journey,
    distances: &D,
    rates: &FareRates,
) -> Result<FareBreakdown, BookingError>
where
    D: DistanceProvider + ?Sized,
{
    let estimate = distances
        .resolve_distance(&journey.origin, &journey.destination, &journey.stop_locations())
        .await?;

    if !estimate.distance_km.is_finite() || estimate.distance_km <= 0.0 {
        return Err(DistanceError::InvalidResponse(format!(
            "non-positive distance {} km from {} to {}",
            estimate.distance_km, journey.origin, journey.destination
        ))
        .into());
    }

    journey.distance_km = Some(estimate.distance_km);
    journey.estimated_duration_mins = journey.estimate_duration(estimate.duration_mins);
    price_from_distance(journey, rates)
}

fn price_from_distance(journey: &mut Journey, rates: &FareRates) -> Result<FareBreakdown, BookingError> {
    let distance = journey.distance_km.unwrap_or(0.0);
    let breakdown = rates
        .quote(distance, journey.stop_count(), journey.is_return_journey)
        .map_err(|e| DistanceError::InvalidResponse(e.to_string()))?;

    journey.fare = Some(breakdown.final_fare);
    Ok(breakdown)
}

fn number_stops<'a>(
    id: &BookingId,
    leg: &str,
    inputs: impl Iterator<Item = &'a StopInput>,
) -> Vec<Stop> {
    inputs
        .enumerate()
        .map(|(i, s)| s.to_stop(format!("{id}-{leg}-S{}", i + 1)))
        .collect()
}

fn renumber_stops(id: &BookingId, leg: &str, stops: Vec<Stop>) -> Vec<Stop> {
    stops
        .into_iter()
        .enumerate()
        .map(|(i, s)| Stop {
            id: format!("{id}-{leg}-S{}", i + 1),
            ..s
        })
        .collect()
}
