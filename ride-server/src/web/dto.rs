//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{BookingDetails, BookingStatus};
use crate::maps::PlaceSuggestion;
use crate::payment::PaymentIntent;

/// Request to search for places.
#[derive(Debug, Deserialize)]
pub struct PlaceSearchRequest {
    /// Partial place name
    pub q: String,

    /// Maximum suggestions to return
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PlaceSearchResponse {
    pub places: Vec<PlaceSuggestion>,
}

/// Query for a fare estimate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareEstimateRequest {
    pub distance_km: f64,

    /// Number of intermediate stops (default 0)
    pub stops: Option<u32>,

    /// Price as the return leg of a round trip
    pub return_journey: Option<bool>,
}

/// Request to create a payment intent for a booking.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub booking_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub payment_intent_id: String,

    /// Passed to the processor's browser SDK
    pub client_secret: String,

    /// Amount to be charged, in minor currency units
    pub amount: u64,
}

impl From<PaymentIntent> for CreateIntentResponse {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            amount: intent.amount_minor,
        }
    }
}

/// Request to confirm a booking once the browser reports payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub payment_intent_id: String,
    pub booking_id: String,
}

/// Outcome of a payment confirmation.
#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,

    /// Booking status after the attempt, if the booking exists
    pub status: Option<BookingStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConfirmPaymentResponse {
    pub fn confirmed(booking: BookingDetails) -> Self {
        Self {
            success: true,
            status: Some(booking.status),
            booking: Some(booking),
            error: None,
        }
    }

    pub fn failed(status: Option<BookingStatus>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            booking: None,
            error: Some(error.into()),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Offending request field, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}
