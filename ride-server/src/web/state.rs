//! Application state for the web layer.

use std::sync::Arc;

use crate::booking::BookingService;
use crate::maps::PlaceSearch;
use crate::payment::PaymentProcessor;
use crate::session::SessionGuard;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Booking orchestrator
    pub bookings: Arc<BookingService>,

    /// Place autocomplete
    pub places: Arc<dyn PlaceSearch>,

    /// Payment processor
    pub payments: Arc<dyn PaymentProcessor>,

    /// Session cookie issuer and view gates
    pub sessions: Arc<SessionGuard>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        bookings: BookingService,
        places: Arc<dyn PlaceSearch>,
        payments: Arc<dyn PaymentProcessor>,
        sessions: SessionGuard,
    ) -> Self {
        Self {
            bookings: Arc::new(bookings),
            places,
            payments,
            sessions: Arc::new(sessions),
        }
    }
}
