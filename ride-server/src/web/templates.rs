//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{BookingDetails, Journey};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Booking entry page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub per_km: f64,
    pub per_stop: f64,
    /// Return discount as a whole percentage
    pub return_discount_pct: u32,
    pub max_passengers: u8,
}

/// Shown after a successful payment.
#[derive(Template)]
#[template(path = "confirmation.html")]
pub struct ConfirmationTemplate {
    pub booking: BookingView,
}

/// Live journey tracking.
#[derive(Template)]
#[template(path = "tracking.html")]
pub struct TrackingTemplate {
    pub booking: BookingView,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Booking view model for templates.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub id: String,
    pub status: String,
    pub passenger_count: u8,
    pub contact_number: String,
    pub total_fare: u64,
    pub forward: LegView,
    pub return_leg: Option<LegView>,
}

impl BookingView {
    pub fn from_booking(booking: &BookingDetails) -> Self {
        Self {
            id: booking.id.to_string(),
            status: booking.status.to_string(),
            passenger_count: booking.passenger_count,
            contact_number: booking.contact_number.clone(),
            total_fare: booking.total_fare,
            forward: LegView::from_journey(&booking.forward_journey),
            return_leg: booking.return_journey.as_ref().map(LegView::from_journey),
        }
    }
}

/// One leg of a booking.
#[derive(Debug, Clone)]
pub struct LegView {
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub stops: Vec<String>,
    pub distance_km: Option<f64>,
    pub fare: Option<u64>,
    pub duration_mins: Option<u32>,
}

impl LegView {
    pub fn from_journey(journey: &Journey) -> Self {
        Self {
            origin: journey.origin.clone(),
            destination: journey.destination.clone(),
            departure: journey.departure().format("%a %-d %b %Y, %H:%M").to_string(),
            stops: journey.stop_locations(),
            distance_km: journey.distance_km,
            fare: journey.fare,
            duration_mins: journey.estimated_duration_mins,
        }
    }

    /// Returns a summary of the stops, e.g. "Via City Mall, Old Town, and Tech Park"
    pub fn stops_summary(&self) -> String {
        match self.stops.as_slice() {
            [] => "Direct".to_string(),
            [only] => format!("Via {only}"),
            [a, b] => format!("Via {a} and {b}"),
            [rest @ .., last] => format!("Via {}, and {last}", rest.join(", ")),
        }
    }

    /// Distance rounded to one decimal place, e.g. "20.4 km"
    pub fn distance_display(&self) -> String {
        self.distance_km
            .map(|d| format!("{d:.1} km"))
            .unwrap_or_default()
    }

    /// Duration as hours and minutes, e.g. "1h 05m" or "45 min"
    pub fn duration_display(&self) -> String {
        match self.duration_mins {
            Some(m) if m >= 60 => format!("{}h {:02}m", m / 60, m % 60),
            Some(m) => format!("{m} min"),
            None => String::new(),
        }
    }
}
