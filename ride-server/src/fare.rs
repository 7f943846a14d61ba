//! Fare computation.
//!
//! Fares are a linear function of route distance and the number of
//! intermediate stops. Return journeys get a flat percentage discount,
//! applied once to the unrounded total before the single rounding step.
//!
//! Arithmetic is done in [`Decimal`] so that totals which are exactly
//! half a unit (e.g. 4.1 km at 15/km) round up as written.

use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Default charge per kilometre, in whole currency units.
pub const PER_KM_RATE: f64 = 15.0;

/// Default charge per intermediate stop, in whole currency units.
pub const STOP_RATE: f64 = 25.0;

/// Default discount applied to a return journey (15%).
pub const RETURN_DISCOUNT: f64 = 0.15;

/// Error returned when fare inputs are out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FareError {
    /// Distance must be a finite number of kilometres greater than zero.
    #[error("distance must be greater than 0 km (got {0})")]
    InvalidDistance(f64),
}

/// Itemised fare for a single journey leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareBreakdown {
    /// Distance the fare was computed from (km).
    pub base_distance: f64,

    /// `base_distance * per_km_rate`
    pub base_fare: f64,

    /// `total_stops * stop_rate`
    pub stop_charges: f64,

    pub total_stops: u32,

    /// Fraction taken off the total. Only present for return journeys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_discount: Option<f64>,

    /// Amount payable, rounded to whole currency units.
    pub final_fare: u64,

    pub per_km_rate: f64,
    pub stop_rate: f64,
}

impl FareBreakdown {
    /// The discount as a fraction, treating one-way journeys as 0.
    pub fn discount_or_zero(&self) -> f64 {
        self.return_discount.unwrap_or(0.0)
    }
}

/// Rates used to price a journey.
#[derive(Debug, Clone, PartialEq)]
pub struct FareRates {
    pub per_km: f64,
    pub per_stop: f64,
    pub return_discount: f64,
}

impl FareRates {
    /// Create rates from explicit values.
    pub fn new(per_km: f64, per_stop: f64, return_discount: f64) -> Self {
        Self {
            per_km,
            per_stop,
            return_discount,
        }
    }

    /// Price a journey.
    ///
    /// The caller is responsible for rejecting non-positive distances;
    /// use [`FareRates::quote`] when the distance is untrusted.
    pub fn compute(&self, distance_km: f64, stop_count: u32, is_return_journey: bool) -> FareBreakdown {
        let base_fare = decimal(distance_km).saturating_mul(decimal(self.per_km));
        let stop_charges = Decimal::from(stop_count).saturating_mul(decimal(self.per_stop));

        let return_discount = is_return_journey.then_some(self.return_discount);
        let payable = Decimal::ONE - decimal(return_discount.unwrap_or(0.0));
        let raw = base_fare.saturating_add(stop_charges).saturating_mul(payable);

        FareBreakdown {
            base_distance: distance_km,
            base_fare: base_fare.to_f64().unwrap_or(f64::MAX),
            stop_charges: stop_charges.to_f64().unwrap_or(f64::MAX),
            total_stops: stop_count,
            return_discount,
            final_fare: round_half_up(raw),
            per_km_rate: self.per_km,
            stop_rate: self.per_stop,
        }
    }

    /// Validate the distance, then price the journey.
    pub fn quote(
        &self,
        distance_km: f64,
        stop_count: u32,
        is_return_journey: bool,
    ) -> Result<FareBreakdown, FareError> {
        if !distance_km.is_finite() || distance_km <= 0.0 {
            return Err(FareError::InvalidDistance(distance_km));
        }
        Ok(self.compute(distance_km, stop_count, is_return_journey))
    }
}

impl Default for FareRates {
    fn default() -> Self {
        Self {
            per_km: PER_KM_RATE,
            per_stop: STOP_RATE,
            return_discount: RETURN_DISCOUNT,
        }
    }
}

/// Price a journey using the default rates.
pub fn compute_fare(distance_km: f64, stop_count: u32, is_return_journey: bool) -> FareBreakdown {
    FareRates::default().compute(distance_km, stop_count, is_return_journey)
}

/// The decimal a float is written as, so `4.1` becomes exactly 4.1.
///
/// Falls back to the nearest representable decimal when the shortest
/// written form does not fit (very large or very small magnitudes).
fn decimal(value: f64) -> Decimal {
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .unwrap_or_default()
}

/// Round to the nearest whole unit, halves going up. Negative input clamps to 0.
fn round_half_up(value: Decimal) -> u64 {
    value
        .max(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(u64::MAX)
}
