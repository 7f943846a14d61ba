//! In-memory booking store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{BookingDetails, BookingId};

use super::{BookingStore, StoreError, SwapOutcome};

/// Thread-safe in-memory store.
///
/// Each operation holds the lock for its own duration only, so a
/// compare-and-swap is atomic with respect to every other operation.
#[derive(Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<BookingId, BookingDetails>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bookings.
    pub async fn len(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bookings.read().await.is_empty()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: &BookingDetails) -> Result<(), StoreError> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(StoreError::Duplicate(booking.id.clone()));
        }
        bookings.insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn get(&self, id: &BookingId) -> Result<Option<BookingDetails>, StoreError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(id).cloned())
    }

    async fn compare_and_swap(&self, updated: &BookingDetails) -> Result<SwapOutcome, StoreError> {
        let mut bookings = self.bookings.write().await;
        let Some(current) = bookings.get_mut(&updated.id) else {
            return Ok(SwapOutcome::Missing);
        };

        if current.version != updated.version {
            return Ok(SwapOutcome::Conflict(current.clone()));
        }

        *current = BookingDetails {
            version: updated.version + 1,
            ..updated.clone()
        };
        Ok(SwapOutcome::Swapped(current.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingRules, BookingStatus, build_booking, fixtures::one_way_form};
    use crate::fare::FareRates;
    use crate::maps::{RouteEstimate, StaticDistanceProvider};
    use chrono::Utc;

    async fn booking(id: &str) -> BookingDetails {
        let distances = StaticDistanceProvider::new(RouteEstimate::new(20.0, None));
        build_booking(
            &one_way_form(),
            BookingId::new(id),
            None,
            &distances,
            &BookingRules::default(),
            &FareRates::default(),
            Utc::now(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn insert_then_get() {
        let store = InMemoryBookingStore::new();
        let b = booking("B1").await;

        store.insert(&b).await.unwrap();

        assert_eq!(store.get(&b.id).await.unwrap(), Some(b));
        assert_eq!(store.get(&BookingId::new("nope")).await.unwrap(), None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = InMemoryBookingStore::new();
        let b = booking("B1").await;

        store.insert(&b).await.unwrap();
        assert_eq!(
            store.insert(&b).await,
            Err(StoreError::Duplicate(BookingId::new("B1")))
        );
    }

    #[tokio::test]
    async fn swap_only_when_version_matches() {
        let store = InMemoryBookingStore::new();
        let b = booking("B1").await;
        store.insert(&b).await.unwrap();

        let confirmed = b.confirmed_by("pi_1", Utc::now()).unwrap();
        let SwapOutcome::Swapped(stored) = store.compare_and_swap(&confirmed).await.unwrap() else {
            panic!("expected swap");
        };
        assert_eq!(stored.version, 1);
        assert_eq!(stored.status, BookingStatus::Confirmed);

        // A second write from the same stale read sees the newer record
        let outcome = store.compare_and_swap(&confirmed).await.unwrap();
        assert_eq!(outcome, SwapOutcome::Conflict(stored));
    }

    #[tokio::test]
    async fn same_status_writes_do_not_overwrite_each_other() {
        let store = InMemoryBookingStore::new();
        let b = booking("B1").await;
        store.insert(&b).await.unwrap();

        let mut first = b.clone();
        first.total_fare = 450;
        let mut second = b.clone();
        second.total_fare = 500;

        assert!(matches!(
            store.compare_and_swap(&first).await.unwrap(),
            SwapOutcome::Swapped(_)
        ));
        let SwapOutcome::Conflict(latest) = store.compare_and_swap(&second).await.unwrap() else {
            panic!("expected conflict");
        };
        assert_eq!(latest.total_fare, 450);
        assert_eq!(store.get(&b.id).await.unwrap().unwrap().total_fare, 450);
    }

    #[tokio::test]
    async fn swap_on_unknown_booking() {
        let store = InMemoryBookingStore::new();
        let b = booking("B1").await;

        let outcome = store.compare_and_swap(&b).await.unwrap();
        assert_eq!(outcome, SwapOutcome::Missing);
        assert!(store.is_empty().await);
    }
}
