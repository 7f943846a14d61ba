//! Maps HTTP client.
//!
//! Provides async methods for route distances (Directions API) and
//! location autocomplete (Places Autocomplete API).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;

use super::error::DistanceError;
use super::types::{AutocompleteResponse, DirectionsResponse, PlaceSuggestion, RouteEstimate};
use super::{DistanceProvider, PlaceSearch};

/// Default base URL for the maps API.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the maps client.
#[derive(Debug, Clone)]
pub struct MapsConfig {
    /// API key sent with every request
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl MapsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Maps API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct MapsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl MapsClient {
    /// Create a new maps client with the given configuration.
    pub fn new(config: MapsConfig) -> Result<Self, DistanceError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Driving route from `origin` to `destination` through `stops` in order.
    pub async fn directions(
        &self,
        origin: &str,
        destination: &str,
        stops: &[String],
    ) -> Result<RouteEstimate, DistanceError> {
        let mut query = vec![
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("mode", "driving".to_string()),
            ("key", self.api_key.clone()),
        ];
        if !stops.is_empty() {
            query.push(("waypoints", stops.join("|")));
        }

        let url = format!("{}/directions/json", self.base_url);
        let response: DirectionsResponse = self.get_json(&url, &query).await?;

        let what = format!("{origin} to {destination}");
        let estimate = response.into_estimate(&what)?;
        debug!(
            origin,
            destination,
            stops = stops.len(),
            distance_km = estimate.distance_km,
            "resolved route"
        );
        Ok(estimate)
    }

    /// Place suggestions for a partially typed location.
    pub async fn autocomplete(
        &self,
        input: &str,
        limit: usize,
    ) -> Result<Vec<PlaceSuggestion>, DistanceError> {
        let query = [("input", input.to_string()), ("key", self.api_key.clone())];
        let url = format!("{}/place/autocomplete/json", self.base_url);

        let response: AutocompleteResponse = self.get_json(&url, &query).await?;
        response.into_suggestions(limit)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, DistanceError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DistanceError::Unavailable("semaphore closed".to_string()))?;

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DistanceError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DistanceError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DistanceError::Api {
                status: status.as_u16().to_string(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| DistanceError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

#[async_trait]
impl DistanceProvider for MapsClient {
    async fn resolve_distance(
        &self,
        origin: &str,
        destination: &str,
        stops: &[String],
    ) -> Result<RouteEstimate, DistanceError> {
        self.directions(origin, destination, stops).await
    }
}

#[async_trait]
impl PlaceSearch for MapsClient {
    async fn search_places(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceSuggestion>, DistanceError> {
        self.autocomplete(query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = MapsConfig::new("key")
            .with_base_url("http://localhost:9000/")
            .with_max_concurrent(2)
            .with_timeout(3);

        assert_eq!(config.api_key, "key");
        assert_eq!(config.base_url, "http://localhost:9000/");
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = MapsClient::new(MapsConfig::new("key").with_base_url("http://localhost:9000/"))
            .unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        // Port 9 (discard) on localhost is almost never listening
        let config = MapsConfig::new("key")
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(2);
        let client = MapsClient::new(config).unwrap();

        let err = client.directions("A", "B", &[]).await.unwrap_err();
        assert!(matches!(err, DistanceError::Http(_)));
    }
}
