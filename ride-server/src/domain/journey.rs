//! Journeys and their intermediate stops.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Whether both components lie within their valid ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// An intermediate waypoint on a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: String,
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_arrival: Option<NaiveTime>,

    /// How long the vehicle waits at this stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waiting_minutes: Option<u32>,
}

/// One directional trip leg, forward or return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub id: String,
    pub origin: String,
    pub destination: String,

    /// Stops in route order.
    pub stops: Vec<Stop>,

    pub date: NaiveDate,
    pub time: NaiveTime,

    pub is_return_journey: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fare: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_mins: Option<u32>,
}

impl Journey {
    /// Create an unpriced journey.
    pub fn new(
        id: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        stops: Vec<Stop>,
        date: NaiveDate,
        time: NaiveTime,
        is_return_journey: bool,
    ) -> Self {
        Self {
            id: id.into(),
            origin: origin.into(),
            destination: destination.into(),
            stops,
            date,
            time,
            is_return_journey,
            distance_km: None,
            fare: None,
            estimated_duration_mins: None,
        }
    }

    pub fn departure(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Number of intermediate stops.
    pub fn stop_count(&self) -> u32 {
        u32::try_from(self.stops.len()).unwrap_or(u32::MAX)
    }

    /// Stop locations in route order, as passed to the distance provider.
    pub fn stop_locations(&self) -> Vec<String> {
        self.stops.iter().map(|s| s.location.clone()).collect()
    }

    /// Total minutes spent waiting at stops.
    pub fn total_waiting_mins(&self) -> u32 {
        self.stops
            .iter()
            .filter_map(|s| s.waiting_minutes)
            .fold(0u32, u32::saturating_add)
    }

    /// Driving time plus waiting time at every stop.
    ///
    /// Returns `None` when the driving time is unknown.
    pub fn estimate_duration(&self, travel_mins: Option<f64>) -> Option<u32> {
        let travel = travel_mins.filter(|m| m.is_finite() && *m >= 0.0)?;
        Some((travel.round() as u32).saturating_add(self.total_waiting_mins()))
    }

    /// The return leg of this journey: endpoints swapped, stops reversed.
    pub fn reversed(&self, id: impl Into<String>, date: NaiveDate, time: NaiveTime) -> Journey {
        let stops = self.stops.iter().rev().cloned().collect();
        Journey::new(
            id,
            self.destination.clone(),
            self.origin.clone(),
            stops,
            date,
            time,
            true,
        )
    }
}
