//! The booking orchestrator.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    BookingDetails, BookingError, BookingFormData, BookingId, BookingStatus, ValidationError,
    build_booking,
};
use crate::fare::FareRates;
use crate::maps::DistanceProvider;
use crate::payment::PaymentSignal;
use crate::store::{BookingStore, StoreError, SwapOutcome};

use super::config::BookingConfig;

/// Creates bookings and moves them through their lifecycle.
///
/// Every status change is a compare-and-swap against the store, so any
/// number of service instances (or duplicate webhook deliveries) can act
/// on the same booking without an in-process lock.
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    distances: Arc<dyn DistanceProvider>,
    config: BookingConfig,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn BookingStore>,
        distances: Arc<dyn DistanceProvider>,
        config: BookingConfig,
    ) -> Self {
        Self {
            store,
            distances,
            config,
        }
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    /// Rates applied to new bookings.
    pub fn rates(&self) -> &FareRates {
        &self.config.rates
    }

    /// Validate, price and store a new booking.
    ///
    /// Returns the stored `pending` booking. Transient distance failures
    /// are retried with backoff; an identifier that collides with an
    /// existing booking is replaced with a fresh one.
    pub async fn submit_booking(
        &self,
        form: &BookingFormData,
        user_id: Option<String>,
    ) -> Result<BookingDetails, BookingError> {
        let booking = self.build_with_retry(form, user_id).await?;
        let booking = self.insert_unique(booking).await?;

        info!(
            booking_id = %booking.id,
            total_fare = booking.total_fare,
            return_journey = booking.return_journey.is_some(),
            "booking created"
        );
        Ok(booking)
    }

    async fn build_with_retry(
        &self,
        form: &BookingFormData,
        user_id: Option<String>,
    ) -> Result<BookingDetails, BookingError> {
        let mut attempt = 1;
        loop {
            let now = Utc::now();
            let result = build_booking(
                form,
                fresh_id(now),
                user_id.clone(),
                self.distances.as_ref(),
                &self.config.rules,
                &self.config.rates,
                now,
            )
            .await;

            match result {
                Err(BookingError::DistanceUnavailable(e))
                    if e.is_transient() && attempt < self.config.distance_attempts =>
                {
                    let backoff = self.config.backoff_for(attempt);
                    warn!(attempt, error = %e, ?backoff, "distance lookup failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn insert_unique(
        &self,
        mut booking: BookingDetails,
    ) -> Result<BookingDetails, BookingError> {
        let mut attempt = 1;
        loop {
            match self.store.insert(&booking).await {
                Ok(()) => return Ok(booking),
                Err(StoreError::Duplicate(id)) if attempt < self.config.id_attempts => {
                    debug!(booking_id = %id, "booking id taken, regenerating");
                    booking = booking.with_id(fresh_id(Utc::now()));
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub async fn get_booking(&self, id: &BookingId) -> Result<BookingDetails, BookingError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(id.clone()))
    }

    /// Confirm a booking against the processor's payment signal.
    ///
    /// Confirming an already confirmed booking with the payment that
    /// confirmed it returns it unchanged. A signal that names another
    /// booking, was not captured, or carries the wrong amount leaves the
    /// booking as it was.
    pub async fn confirm_payment(
        &self,
        id: &BookingId,
        signal: &PaymentSignal,
    ) -> Result<BookingDetails, BookingError> {
        let mut booking = self.get_booking(id).await?;

        loop {
            if booking.status == BookingStatus::Confirmed {
                return already_confirmed(booking, signal);
            }

            check_signal(&booking, signal)?;

            let confirmed = booking.confirmed_by(&signal.intent_id, Utc::now())?;
            match self.store.compare_and_swap(&confirmed).await? {
                SwapOutcome::Swapped(stored) => {
                    info!(booking_id = %id, intent_id = %signal.intent_id, "booking confirmed");
                    return Ok(stored);
                }
                // Another write won; the signal is checked again against it
                SwapOutcome::Conflict(latest) => {
                    debug!(booking_id = %id, version = latest.version, "booking changed during confirmation");
                    booking = latest;
                }
                SwapOutcome::Missing => return Err(BookingError::NotFound(id.clone())),
            }
        }
    }

    pub async fn cancel_booking(&self, id: &BookingId) -> Result<BookingDetails, BookingError> {
        self.transition(id, BookingStatus::Cancelled).await
    }

    /// Mark a confirmed booking's journey as under way.
    pub async fn start_journey(&self, id: &BookingId) -> Result<BookingDetails, BookingError> {
        self.transition(id, BookingStatus::InProgress).await
    }

    pub async fn complete_journey(&self, id: &BookingId) -> Result<BookingDetails, BookingError> {
        self.transition(id, BookingStatus::Completed).await
    }

    /// Recompute a pending booking's fare at the current rates.
    pub async fn reprice_booking(&self, id: &BookingId) -> Result<BookingDetails, BookingError> {
        let mut current = self.get_booking(id).await?;
        loop {
            let mut updated = current.clone();
            updated.reprice(&self.config.rates, Utc::now())?;

            match self.store.compare_and_swap(&updated).await? {
                SwapOutcome::Swapped(stored) => {
                    info!(booking_id = %id, total_fare = stored.total_fare, "booking repriced");
                    return Ok(stored);
                }
                SwapOutcome::Conflict(latest) => current = latest,
                SwapOutcome::Missing => return Err(BookingError::NotFound(id.clone())),
            }
        }
    }

    async fn transition(
        &self,
        id: &BookingId,
        to: BookingStatus,
    ) -> Result<BookingDetails, BookingError> {
        let mut current = self.get_booking(id).await?;

        loop {
            let updated = current.transitioned(to, Utc::now())?;

            match self.store.compare_and_swap(&updated).await? {
                SwapOutcome::Swapped(stored) => {
                    info!(booking_id = %id, from = %current.status, %to, "booking status changed");
                    return Ok(stored);
                }
                SwapOutcome::Conflict(latest) => {
                    debug!(booking_id = %id, status = %latest.status, "booking changed concurrently");
                    current = latest;
                }
                SwapOutcome::Missing => return Err(BookingError::NotFound(id.clone())),
            }
        }
    }
}

fn fresh_id(now: DateTime<Utc>) -> BookingId {
    BookingId::generate(now, &mut rand::thread_rng())
}

/// A confirmed booking is only handed back for the payment that confirmed it.
fn already_confirmed(
    booking: BookingDetails,
    signal: &PaymentSignal,
) -> Result<BookingDetails, BookingError> {
    let same_payment = booking.payment_reference.as_deref() == Some(signal.intent_id.as_str());
    if signal.succeeded && same_payment {
        debug!(booking_id = %booking.id, intent_id = %signal.intent_id, "booking already confirmed");
        return Ok(booking);
    }

    warn!(
        booking_id = %booking.id,
        intent_id = %signal.intent_id,
        "confirmed booking presented with a different payment"
    );
    Err(ValidationError::new(
        "paymentIntentId",
        format!("payment {} did not confirm booking {}", signal.intent_id, booking.id),
    )
    .into())
}

/// Check that a signal pays for this pending booking in full.
fn check_signal(booking: &BookingDetails, signal: &PaymentSignal) -> Result<(), BookingError> {
    if !signal.succeeded {
        return Err(BookingError::PaymentNotCaptured {
            intent_id: signal.intent_id.clone(),
        });
    }

    match signal.booking_id.as_deref() {
        Some(paid_for) if paid_for == booking.id.as_str() => {}
        Some(other) => {
            return Err(ValidationError::new(
                "bookingId",
                format!("payment {} was made for booking {other}", signal.intent_id),
            )
            .into());
        }
        None => {
            return Err(ValidationError::new(
                "bookingId",
                format!("payment {} does not name a booking", signal.intent_id),
            )
            .into());
        }
    }

    let expected_minor = booking.total_fare_minor();
    if signal.amount_minor != expected_minor {
        warn!(
            booking_id = %booking.id,
            intent_id = %signal.intent_id,
            expected_minor,
            received_minor = signal.amount_minor,
            "payment amount does not match booking total"
        );
        return Err(BookingError::AmountMismatch {
            booking_id: booking.id.clone(),
            expected_minor,
            received_minor: signal.amount_minor,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use tokio::sync::{Mutex, Notify};

    use crate::domain::StateTransitionError;
    use crate::domain::fixtures::{one_way_form, return_form};
    use crate::maps::{RouteEstimate, StaticDistanceProvider};
    use crate::store::InMemoryBookingStore;

    fn service_with(store: Arc<dyn BookingStore>, distances: StaticDistanceProvider) -> BookingService {
        let config = BookingConfig::default().with_retry_backoff(Duration::ZERO);
        BookingService::new(store, Arc::new(distances), config)
    }

    fn service(distances: StaticDistanceProvider) -> (BookingService, InMemoryBookingStore) {
        let store = InMemoryBookingStore::new();
        (service_with(Arc::new(store.clone()), distances), store)
    }

    fn twenty_km() -> StaticDistanceProvider {
        StaticDistanceProvider::new(RouteEstimate::new(20.0, Some(40.0)))
    }

    #[tokio::test]
    async fn one_way_fare_is_350() {
        let (service, store) = service(twenty_km());
        let booking = service.submit_booking(&one_way_form(), None).await.unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.fare_breakdown.base_fare, 300.0);
        assert_eq!(booking.fare_breakdown.stop_charges, 50.0);
        assert_eq!(booking.total_fare, 350);
        assert_eq!(store.get(&booking.id).await.unwrap(), Some(booking));
    }

    #[tokio::test]
    async fn return_leg_fare_is_298() {
        let (service, _) = service(twenty_km());
        let booking = service
            .submit_booking(&return_form(), Some("user-1".into()))
            .await
            .unwrap();

        let ret = booking.return_fare_breakdown.as_ref().unwrap();
        assert_eq!(ret.final_fare, 298);
        assert_eq!(ret.return_discount, Some(0.15));
        assert_eq!(booking.total_fare, 648);
        assert_eq!(booking.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn invalid_form_is_not_stored() {
        let (service, store) = service(twenty_km());
        let mut form = one_way_form();
        form.destination = " airport terminal 1 ".into();

        let err = service.submit_booking(&form, None).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref v) if v.field == "destination"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn transient_distance_failures_are_retried() {
        let distances = twenty_km().fail_times(2);
        let (service, _) = service(distances.clone());

        let booking = service.submit_booking(&one_way_form(), None).await.unwrap();
        assert_eq!(booking.total_fare, 350);
        assert_eq!(distances.calls(), 3);
    }

    #[tokio::test]
    async fn distance_retries_are_bounded() {
        let distances = twenty_km().fail_times(10);
        let (service, store) = service(distances.clone());

        let err = service.submit_booking(&one_way_form(), None).await.unwrap_err();
        assert!(matches!(err, BookingError::DistanceUnavailable(_)));
        assert!(err.is_retryable());
        assert_eq!(distances.calls(), 3);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unusable_distances_are_not_retried() {
        let distances = StaticDistanceProvider::new(RouteEstimate::new(0.0, None));
        let (service, _) = service(distances.clone());

        let err = service.submit_booking(&one_way_form(), None).await.unwrap_err();
        assert!(matches!(err, BookingError::DistanceUnavailable(_)));
        assert_eq!(distances.calls(), 1);
    }

    /// Store that reports the first `collisions` inserts as duplicates.
    struct CollidingStore {
        inner: InMemoryBookingStore,
        collisions: Mutex<u32>,
    }

    #[async_trait]
    impl BookingStore for CollidingStore {
        async fn insert(&self, booking: &BookingDetails) -> Result<(), StoreError> {
            let mut collisions = self.collisions.lock().await;
            if *collisions > 0 {
                *collisions -= 1;
                return Err(StoreError::Duplicate(booking.id.clone()));
            }
            self.inner.insert(booking).await
        }

        async fn get(&self, id: &BookingId) -> Result<Option<BookingDetails>, StoreError> {
            self.inner.get(id).await
        }

        async fn compare_and_swap(&self, updated: &BookingDetails) -> Result<SwapOutcome, StoreError> {
            self.inner.compare_and_swap(updated).await
        }
    }

    #[tokio::test]
    async fn colliding_ids_are_regenerated() {
        let inner = InMemoryBookingStore::new();
        let store = CollidingStore {
            inner: inner.clone(),
            collisions: Mutex::new(2),
        };
        let service = service_with(Arc::new(store), twenty_km());

        let booking = service.submit_booking(&one_way_form(), None).await.unwrap();
        assert_eq!(inner.len().await, 1);
        assert!(booking.forward_journey.id.starts_with(booking.id.as_str()));
        assert_eq!(inner.get(&booking.id).await.unwrap(), Some(booking));
    }

    #[tokio::test]
    async fn id_regeneration_gives_up() {
        let store = CollidingStore {
            inner: InMemoryBookingStore::new(),
            collisions: Mutex::new(100),
        };
        let service = service_with(Arc::new(store), twenty_km());

        let err = service.submit_booking(&one_way_form(), None).await.unwrap_err();
        assert!(matches!(err, BookingError::Store(StoreError::Duplicate(_))));
    }

    async fn pending(service: &BookingService) -> BookingDetails {
        service.submit_booking(&one_way_form(), None).await.unwrap()
    }

    fn payment_for(booking: &BookingDetails) -> PaymentSignal {
        PaymentSignal::captured("pi_1", booking.total_fare_minor()).for_booking(booking.id.as_str())
    }

    #[tokio::test]
    async fn confirm_records_payment() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;

        let confirmed = service
            .confirm_payment(&booking.id, &payment_for(&booking))
            .await
            .unwrap();

        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.payment_reference.as_deref(), Some("pi_1"));
        assert_eq!(service.get_booking(&booking.id).await.unwrap(), confirmed);
    }

    #[tokio::test]
    async fn confirm_is_idempotent() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        let signal = payment_for(&booking);

        let first = service.confirm_payment(&booking.id, &signal).await.unwrap();
        let second = service.confirm_payment(&booking.id, &signal).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn concurrent_confirmations_apply_once() {
        let (service, _) = service(twenty_km());
        let service = Arc::new(service);
        let booking = pending(&service).await;
        let signal = payment_for(&booking);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                let id = booking.id.clone();
                let signal = signal.clone();
                tokio::spawn(async move { service.confirm_payment(&id, &signal).await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        let stored = service.get_booking(&booking.id).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert!(results.iter().all(|r| *r == stored));
    }

    #[tokio::test]
    async fn amount_mismatch_leaves_booking_pending() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        // Paid the discounted return-leg fare for a one-way trip
        let signal = PaymentSignal::captured("pi_1", 29_800).for_booking(booking.id.as_str());

        let err = service.confirm_payment(&booking.id, &signal).await.unwrap_err();
        match err {
            BookingError::AmountMismatch {
                expected_minor,
                received_minor,
                ..
            } => {
                assert_eq!(expected_minor, 35_000);
                assert_eq!(received_minor, 29_800);
            }
            other => panic!("expected amount mismatch, got {other:?}"),
        }
        assert!(!BookingError::AmountMismatch {
            booking_id: booking.id.clone(),
            expected_minor: 35_000,
            received_minor: 29_800,
        }
        .is_retryable());

        let stored = service.get_booking(&booking.id).await.unwrap();
        assert_eq!(stored, booking);
    }

    #[tokio::test]
    async fn uncaptured_payment_is_rejected() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        let signal = PaymentSignal::failed("pi_1", booking.total_fare_minor());

        let err = service.confirm_payment(&booking.id, &signal).await.unwrap_err();
        assert!(matches!(err, BookingError::PaymentNotCaptured { ref intent_id } if intent_id == "pi_1"));
        assert_eq!(service.get_booking(&booking.id).await.unwrap().status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn payment_for_another_booking_is_rejected() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        let signal = PaymentSignal::captured("pi_1", booking.total_fare_minor()).for_booking("OTHER");

        let err = service.confirm_payment(&booking.id, &signal).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref v) if v.field == "bookingId"));
    }

    #[tokio::test]
    async fn payment_without_booking_is_rejected() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        let signal = PaymentSignal::captured("pi_1", booking.total_fare_minor());

        let err = service.confirm_payment(&booking.id, &signal).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref v) if v.field == "bookingId"));
        assert_eq!(service.get_booking(&booking.id).await.unwrap(), booking);
    }

    #[tokio::test]
    async fn confirmed_booking_rejects_other_payments() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        let confirmed = service
            .confirm_payment(&booking.id, &payment_for(&booking))
            .await
            .unwrap();

        let declined = PaymentSignal::failed("pi_2", 100).for_booking("SOMETHING-ELSE");
        let err = service.confirm_payment(&booking.id, &declined).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref v) if v.field == "paymentIntentId"));

        // Captured in full for this booking, but not the payment that confirmed it
        let other = PaymentSignal::captured("pi_2", booking.total_fare_minor())
            .for_booking(booking.id.as_str());
        let err = service.confirm_payment(&booking.id, &other).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref v) if v.field == "paymentIntentId"));

        // The confirming payment reported as failed later is not accepted either
        let reversed = PaymentSignal::failed("pi_1", booking.total_fare_minor());
        assert!(service.confirm_payment(&booking.id, &reversed).await.is_err());

        assert_eq!(service.get_booking(&booking.id).await.unwrap(), confirmed);
    }

    /// Store that holds the first confirming swap until released.
    struct PausingStore {
        inner: InMemoryBookingStore,
        paused: AtomicBool,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl BookingStore for PausingStore {
        async fn insert(&self, booking: &BookingDetails) -> Result<(), StoreError> {
            self.inner.insert(booking).await
        }

        async fn get(&self, id: &BookingId) -> Result<Option<BookingDetails>, StoreError> {
            self.inner.get(id).await
        }

        async fn compare_and_swap(&self, updated: &BookingDetails) -> Result<SwapOutcome, StoreError> {
            if updated.status == BookingStatus::Confirmed && !self.paused.swap(true, Ordering::SeqCst) {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.compare_and_swap(updated).await
        }
    }

    #[tokio::test]
    async fn reprice_during_confirmation_is_not_lost() {
        let store = Arc::new(PausingStore {
            inner: InMemoryBookingStore::new(),
            paused: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        });
        let cheap = Arc::new(service_with(store.clone(), twenty_km()));
        let booking = pending(&cheap).await;

        let confirming = {
            let cheap = Arc::clone(&cheap);
            let id = booking.id.clone();
            let signal = payment_for(&booking);
            tokio::spawn(async move { cheap.confirm_payment(&id, &signal).await })
        };
        store.entered.notified().await;

        let config = BookingConfig::default().with_rates(FareRates::new(20.0, 25.0, 0.15));
        let dear = BookingService::new(store.clone(), Arc::new(twenty_km()), config);
        let repriced = dear.reprice_booking(&booking.id).await.unwrap();
        assert_eq!(repriced.total_fare, 450);

        store.release.notify_one();
        let err = confirming.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            BookingError::AmountMismatch {
                expected_minor: 45_000,
                received_minor: 35_000,
                ..
            }
        ));

        let stored = store.inner.get(&booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);
        assert_eq!(stored.total_fare, 450);
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let (service, _) = service(twenty_km());
        let id = BookingId::new("NOPE");

        let err = service
            .confirm_payment(&id, &PaymentSignal::captured("pi_1", 100))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(ref missing) if *missing == id));

        assert!(matches!(
            service.cancel_booking(&id).await,
            Err(BookingError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn cancelled_booking_cannot_be_confirmed() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        service.cancel_booking(&booking.id).await.unwrap();

        let err = service
            .confirm_payment(&booking.id, &payment_for(&booking))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::StateTransition(_)));
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        service
            .confirm_payment(&booking.id, &payment_for(&booking))
            .await
            .unwrap();

        let started = service.start_journey(&booking.id).await.unwrap();
        assert_eq!(started.status, BookingStatus::InProgress);

        let completed = service.complete_journey(&booking.id).await.unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert_eq!(completed.payment_reference.as_deref(), Some("pi_1"));
    }

    #[tokio::test]
    async fn cannot_start_unpaid_journey() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;

        let err = service.start_journey(&booking.id).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::StateTransition(StateTransitionError {
                from: BookingStatus::Pending,
                to: BookingStatus::InProgress,
            })
        ));
    }

    #[tokio::test]
    async fn cancel_completed_booking_fails_without_change() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;
        service
            .confirm_payment(&booking.id, &payment_for(&booking))
            .await
            .unwrap();
        service.start_journey(&booking.id).await.unwrap();
        let completed = service.complete_journey(&booking.id).await.unwrap();

        let err = service.cancel_booking(&booking.id).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::StateTransition(StateTransitionError {
                from: BookingStatus::Completed,
                to: BookingStatus::Cancelled,
            })
        ));
        assert_eq!(service.get_booking(&booking.id).await.unwrap(), completed);
    }

    #[tokio::test]
    async fn cancel_twice_fails() {
        let (service, _) = service(twenty_km());
        let booking = pending(&service).await;

        let cancelled = service.cancel_booking(&booking.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert!(matches!(
            service.cancel_booking(&booking.id).await,
            Err(BookingError::StateTransition(_))
        ));
    }

    #[tokio::test]
    async fn reprice_applies_current_rates_until_confirmed() {
        let store = InMemoryBookingStore::new();
        let cheap = service_with(Arc::new(store.clone()), twenty_km());
        let booking = pending(&cheap).await;

        let config = BookingConfig::default().with_rates(FareRates::new(20.0, 25.0, 0.15));
        let dear = BookingService::new(Arc::new(store.clone()), Arc::new(twenty_km()), config);

        let repriced = dear.reprice_booking(&booking.id).await.unwrap();
        assert_eq!(repriced.total_fare, 450);

        let signal = PaymentSignal::captured("pi_1", 45_000).for_booking(booking.id.as_str());
        dear.confirm_payment(&booking.id, &signal).await.unwrap();
        let err = cheap.reprice_booking(&booking.id).await.unwrap_err();
        assert!(matches!(err, BookingError::FareLocked(BookingStatus::Confirmed)));
        assert_eq!(store.get(&booking.id).await.unwrap().unwrap().total_fare, 450);
    }
}
