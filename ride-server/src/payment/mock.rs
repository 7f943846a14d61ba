//! In-memory payment processor for development and testing.
//!
//! Intents are captured immediately on creation unless told otherwise,
//! so the full booking flow can run without processor credentials.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::PaymentError;
use super::types::{PaymentIntent, PaymentSignal};
use super::PaymentProcessor;

/// Mock processor that records intents in memory.
#[derive(Clone, Default)]
pub struct MockPaymentProcessor {
    signals: Arc<RwLock<HashMap<String, PaymentSignal>>>,
    next_id: Arc<AtomicU64>,
    /// When set, newly created intents are left uncaptured.
    hold_new_intents: bool,
}

impl MockPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave created intents uncaptured until [`capture`](Self::capture) is called.
    pub fn holding_new_intents(mut self) -> Self {
        self.hold_new_intents = true;
        self
    }

    /// Register a signal directly, e.g. one with a tampered amount.
    pub async fn insert(&self, signal: PaymentSignal) {
        let mut signals = self.signals.write().await;
        signals.insert(signal.intent_id.clone(), signal);
    }

    /// Mark an intent as captured.
    pub async fn capture(&self, intent_id: &str) -> Result<(), PaymentError> {
        let mut signals = self.signals.write().await;
        let signal = signals
            .get_mut(intent_id)
            .ok_or_else(|| PaymentError::IntentNotFound(intent_id.to_string()))?;
        signal.succeeded = true;
        Ok(())
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_intent(
        &self,
        booking_id: &str,
        amount_minor: u64,
    ) -> Result<PaymentIntent, PaymentError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("pi_mock_{n}");

        let mut signal = PaymentSignal::captured(&id, amount_minor).for_booking(booking_id);
        signal.succeeded = !self.hold_new_intents;
        self.insert(signal).await;

        Ok(PaymentIntent {
            client_secret: format!("{id}_secret"),
            id,
            amount_minor,
        })
    }

    async fn retrieve_signal(&self, intent_id: &str) -> Result<PaymentSignal, PaymentError> {
        let signals = self.signals.read().await;
        signals
            .get(intent_id)
            .cloned()
            .ok_or_else(|| PaymentError::IntentNotFound(intent_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_intent_is_captured() {
        let processor = MockPaymentProcessor::new();
        let intent = processor.create_intent("B1", 35_000).await.unwrap();

        assert_eq!(intent.id, "pi_mock_1");
        assert_eq!(intent.client_secret, "pi_mock_1_secret");

        let signal = processor.retrieve_signal(&intent.id).await.unwrap();
        assert!(signal.succeeded);
        assert_eq!(signal.amount_minor, 35_000);
        assert_eq!(signal.booking_id.as_deref(), Some("B1"));
    }

    #[tokio::test]
    async fn held_intent_needs_capture() {
        let processor = MockPaymentProcessor::new().holding_new_intents();
        let intent = processor.create_intent("B1", 100).await.unwrap();

        assert!(!processor.retrieve_signal(&intent.id).await.unwrap().succeeded);
        processor.capture(&intent.id).await.unwrap();
        assert!(processor.retrieve_signal(&intent.id).await.unwrap().succeeded);
    }

    #[tokio::test]
    async fn unknown_intent() {
        let processor = MockPaymentProcessor::new();
        assert!(matches!(
            processor.retrieve_signal("pi_nope").await,
            Err(PaymentError::IntentNotFound(_))
        ));
        assert!(processor.capture("pi_nope").await.is_err());
    }
}
