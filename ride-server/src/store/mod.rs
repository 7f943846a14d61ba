//! Booking persistence.
//!
//! The store enforces identifier uniqueness on insert and offers a
//! conditional update on the record's version, which is how concurrent
//! changes (e.g. duplicate payment webhooks racing a reprice) are
//! serialised.

mod memory;

use async_trait::async_trait;

use crate::domain::{BookingDetails, BookingId};

pub use memory::InMemoryBookingStore;

/// Errors from the booking store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A booking with this identifier already exists
    #[error("booking {0} already exists")]
    Duplicate(BookingId),

    /// Transient backend failure
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of a conditional update.
#[derive(Debug, Clone, PartialEq)]
pub enum SwapOutcome {
    /// The record was replaced; holds the stored record with its new version.
    Swapped(BookingDetails),

    /// The record changed since `updated` was read; holds the current record.
    Conflict(BookingDetails),

    /// No booking with that identifier.
    Missing,
}

/// Persistent storage for booking records.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Store a new booking. Fails with `Duplicate` if the identifier is taken.
    async fn insert(&self, booking: &BookingDetails) -> Result<(), StoreError>;

    async fn get(&self, id: &BookingId) -> Result<Option<BookingDetails>, StoreError>;

    /// Replace the stored record with `updated` only if the stored version
    /// still equals `updated.version`. The stored copy gets the next version.
    async fn compare_and_swap(&self, updated: &BookingDetails) -> Result<SwapOutcome, StoreError>;
}
