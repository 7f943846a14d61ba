//! Static maps provider for development and testing without API access.
//!
//! Serves fixed route estimates and place suggestions as if they came
//! from the live API.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::error::DistanceError;
use super::types::{PlaceSuggestion, RouteEstimate};
use super::{DistanceProvider, PlaceSearch};

/// Maps provider that serves canned data.
///
/// Clones share call counters, so a test can keep one handle while the
/// code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct StaticDistanceProvider {
    /// Estimate for any route without a specific entry. `None` fails every lookup.
    default: Option<RouteEstimate>,

    /// Per-route estimates, keyed by (origin, destination).
    routes: HashMap<(String, String), RouteEstimate>,

    places: Vec<PlaceSuggestion>,

    /// Number of upcoming lookups that fail before lookups succeed.
    failures_remaining: Arc<AtomicUsize>,

    calls: Arc<AtomicUsize>,
}

impl StaticDistanceProvider {
    /// Serve `estimate` for every route.
    pub fn new(estimate: RouteEstimate) -> Self {
        Self {
            default: Some(estimate),
            ..Self::default()
        }
    }

    /// A provider whose lookups always fail.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Serve a specific estimate for one route.
    pub fn with_route(
        mut self,
        origin: impl Into<String>,
        destination: impl Into<String>,
        estimate: RouteEstimate,
    ) -> Self {
        self.routes.insert((origin.into(), destination.into()), estimate);
        self
    }

    /// Fail the next `n` lookups.
    pub fn fail_times(self, n: usize) -> Self {
        self.failures_remaining.store(n, Ordering::SeqCst);
        self
    }

    /// Suggestions returned by place search (filtered by substring).
    pub fn with_places(mut self, places: Vec<PlaceSuggestion>) -> Self {
        self.places = places;
        self
    }

    /// Number of distance lookups made so far, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistanceProvider for StaticDistanceProvider {
    async fn resolve_distance(
        &self,
        origin: &str,
        destination: &str,
        _stops: &[String],
    ) -> Result<RouteEstimate, DistanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(DistanceError::Unavailable("simulated outage".to_string()));
        }

        self.routes
            .get(&(origin.to_string(), destination.to_string()))
            .copied()
            .or(self.default)
            .ok_or_else(|| DistanceError::Unavailable(format!("no static route {origin} to {destination}")))
    }
}

#[async_trait]
impl PlaceSearch for StaticDistanceProvider {
    async fn search_places(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PlaceSuggestion>, DistanceError> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|p| p.description.to_lowercase().contains(&needle))
            .take(limit)
            .cloned()
            .collect())
    }
}
