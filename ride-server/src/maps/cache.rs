//! Caching layer for route distance lookups.
//!
//! Users frequently re-price the same route while editing a booking, so
//! successful lookups are cached for a short TTL. Failures are not cached.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use super::error::DistanceError;
use super::types::RouteEstimate;
use super::DistanceProvider;

/// Cache key: normalised (origin, destination, stops).
type RouteKey = (String, String, Vec<String>);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_capacity: 10_000,
        }
    }
}

/// Distance provider with caching.
///
/// Wraps any `DistanceProvider` and caches successful route estimates.
pub struct CachedDistanceProvider<P> {
    inner: P,
    routes: MokaCache<RouteKey, RouteEstimate>,
}

impl<P: DistanceProvider> CachedDistanceProvider<P> {
    /// Create a new cached provider.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, routes }
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}

/// Place names are matched case-insensitively, ignoring surrounding whitespace.
fn route_key(origin: &str, destination: &str, stops: &[String]) -> RouteKey {
    let norm = |s: &str| s.trim().to_lowercase();
    (
        norm(origin),
        norm(destination),
        stops.iter().map(|s| norm(s)).collect(),
    )
}

#[async_trait]
impl<P: DistanceProvider> DistanceProvider for CachedDistanceProvider<P> {
    async fn resolve_distance(
        &self,
        origin: &str,
        destination: &str,
        stops: &[String],
    ) -> Result<RouteEstimate, DistanceError> {
        let key = route_key(origin, destination, stops);

        if let Some(cached) = self.routes.get(&key).await {
            return Ok(cached);
        }

        let estimate = self
            .inner
            .resolve_distance(origin, destination, stops)
            .await?;
        self.routes.insert(key, estimate).await;

        Ok(estimate)
    }
}
