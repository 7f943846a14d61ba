//! Payment processor integration.
//!
//! The booking orchestrator never talks to the processor itself: the web
//! layer creates intents and fetches [`PaymentSignal`]s, and hands the
//! signal to the orchestrator for confirmation.

mod client;
mod error;
mod mock;
mod types;

use async_trait::async_trait;

pub use client::{PaymentConfig, StripeClient};
pub use error::PaymentError;
pub use mock::MockPaymentProcessor;
pub use types::{PaymentIntent, PaymentSignal};

/// A third-party payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create an intent to collect `amount_minor` for a booking.
    async fn create_intent(
        &self,
        booking_id: &str,
        amount_minor: u64,
    ) -> Result<PaymentIntent, PaymentError>;

    /// Report what the processor has captured for an intent.
    async fn retrieve_signal(&self, intent_id: &str) -> Result<PaymentSignal, PaymentError>;
}
