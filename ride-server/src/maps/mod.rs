//! Distance and geocoding provider.
//!
//! The booking model only sees the [`DistanceProvider`] trait. This module
//! supplies the HTTP client for the live maps API, a caching wrapper, and
//! a static provider for development without an API key.

mod cache;
mod client;
mod error;
mod mock;
mod types;

use async_trait::async_trait;

pub use cache::{CacheConfig, CachedDistanceProvider};
pub use client::{MapsClient, MapsConfig};
pub use error::DistanceError;
pub use mock::StaticDistanceProvider;
pub use types::{
    AutocompleteResponse, DirectionsResponse, PlaceSuggestion, Prediction, Route, RouteEstimate,
    RouteLeg, TextValue,
};

/// Resolves driving distance for a route.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    /// Distance from `origin` to `destination`, visiting `stops` in order.
    async fn resolve_distance(
        &self,
        origin: &str,
        destination: &str,
        stops: &[String],
    ) -> Result<RouteEstimate, DistanceError>;
}

/// Suggests places for a partially typed location.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_places(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceSuggestion>, DistanceError>;
}
