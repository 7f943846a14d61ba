use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ride_server::booking::BookingService;
use ride_server::config::AppConfig;
use ride_server::maps::{
    CachedDistanceProvider, DistanceProvider, MapsClient, PlaceSearch, PlaceSuggestion,
    RouteEstimate, StaticDistanceProvider,
};
use ride_server::payment::{MockPaymentProcessor, PaymentProcessor, StripeClient};
use ride_server::session::SessionGuard;
use ride_server::store::InMemoryBookingStore;
use ride_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ride_server=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Maps provider: live API with a route cache, or canned data without a key
    let (distances, places): (Arc<dyn DistanceProvider>, Arc<dyn PlaceSearch>) = match &config.maps {
        Some(maps_config) => {
            let client = MapsClient::new(maps_config.clone()).expect("Failed to create maps client");
            let cached: Arc<dyn DistanceProvider> =
                Arc::new(CachedDistanceProvider::new(client.clone(), &config.cache));
            let places: Arc<dyn PlaceSearch> = Arc::new(client);
            (cached, places)
        }
        None => {
            warn!("MAPS_API_KEY not set, using static distances");
            let provider = StaticDistanceProvider::new(RouteEstimate::new(12.0, Some(30.0)))
                .with_places(demo_places());
            let distances: Arc<dyn DistanceProvider> = Arc::new(provider.clone());
            let places: Arc<dyn PlaceSearch> = Arc::new(provider);
            (distances, places)
        }
    };

    // Payment processor: live API, or one that captures every payment immediately
    let payments: Arc<dyn PaymentProcessor> = match &config.payment {
        Some(payment_config) => Arc::new(
            StripeClient::new(payment_config.clone()).expect("Failed to create payment client"),
        ),
        None => {
            warn!("PAYMENT_SECRET_KEY not set, payments are simulated");
            Arc::new(MockPaymentProcessor::new())
        }
    };

    let store = Arc::new(InMemoryBookingStore::new());
    let bookings = BookingService::new(store, distances, config.booking.clone());
    let sessions = SessionGuard::new(config.session.clone());

    let state = AppState::new(bookings, places, payments, sessions);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    info!("Ride booking listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}

fn demo_places() -> Vec<PlaceSuggestion> {
    [
        "Airport Terminal 1",
        "Airport Terminal 2",
        "Central Station",
        "City Mall",
        "Tech Park",
        "Old Town Square",
    ]
    .into_iter()
    .enumerate()
    .map(|(i, name)| PlaceSuggestion {
        description: name.to_string(),
        place_id: format!("demo-{i}"),
    })
    .collect()
}
