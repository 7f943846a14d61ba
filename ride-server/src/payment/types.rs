//! Payment processor data types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A payment intent created for a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,

    /// Handed to the browser to complete payment.
    pub client_secret: String,

    pub amount_minor: u64,
}

/// The processor's report on a payment for a booking.
///
/// Only these fields are consumed by the booking orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSignal {
    /// Processor-assigned payment identifier.
    pub intent_id: String,

    /// Amount captured, in minor units.
    pub amount_minor: u64,

    /// Booking the payment was created for, if the processor recorded it.
    pub booking_id: Option<String>,

    /// Whether funds were captured.
    pub succeeded: bool,
}

impl PaymentSignal {
    /// A successful capture of `amount_minor`.
    pub fn captured(intent_id: impl Into<String>, amount_minor: u64) -> Self {
        Self {
            intent_id: intent_id.into(),
            amount_minor,
            booking_id: None,
            succeeded: true,
        }
    }

    /// A payment that did not go through.
    pub fn failed(intent_id: impl Into<String>, amount_minor: u64) -> Self {
        Self {
            succeeded: false,
            ..Self::captured(intent_id, amount_minor)
        }
    }

    pub fn for_booking(mut self, booking_id: impl Into<String>) -> Self {
        self.booking_id = Some(booking_id.into());
        self
    }
}

/// Payment intent as returned by the processor API.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentResponse {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub amount: u64,
    #[serde(default)]
    pub amount_received: u64,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Error body returned by the processor API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl IntentResponse {
    pub fn into_signal(self) -> PaymentSignal {
        PaymentSignal {
            succeeded: self.status == "succeeded",
            amount_minor: self.amount_received,
            booking_id: self.metadata.get("booking_id").cloned(),
            intent_id: self.id,
        }
    }
}
