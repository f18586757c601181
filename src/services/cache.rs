use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::time::Duration;
use crate::models::{GeoPoint, TravelMode};
use crate::services::routing::{Route, RoutingError, RoutingProvider};

/// Routing provider decorator with an in-memory lookup cache
///
/// Reverse-geocode and directions results are cached per key for the
/// configured TTL. Only successful lookups are cached; errors always reach
/// the caller and the next call goes back to the provider.
pub struct CachedRoutingProvider<P> {
    inner: P,
    addresses: Cache<String, Option<String>>,
    routes: Cache<String, Vec<Route>>,
}

impl<P: RoutingProvider> CachedRoutingProvider<P> {
    /// Create a new caching wrapper around `inner`
    pub fn new(inner: P, capacity: u64, ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);

        Self {
            inner,
            addresses: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
            routes: Cache::builder().max_capacity(capacity).time_to_live(ttl).build(),
        }
    }
}

#[async_trait]
impl<P: RoutingProvider> RoutingProvider for CachedRoutingProvider<P> {
    async fn reverse_geocode(&self, point: &GeoPoint) -> Result<Option<String>, RoutingError> {
        let key = CacheKey::reverse_geocode(point);

        if let Some(address) = self.addresses.get(&key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(address);
        }

        let address = self.inner.reverse_geocode(point).await?;
        self.addresses.insert(key, address.clone()).await;
        Ok(address)
    }

    async fn directions(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> Result<Vec<Route>, RoutingError> {
        let key = CacheKey::directions(origin, destination, mode, departure_time);

        if let Some(routes) = self.routes.get(&key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(routes);
        }

        let routes = self
            .inner
            .directions(origin, destination, mode, departure_time)
            .await?;
        self.routes.insert(key, routes.clone()).await;
        Ok(routes)
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a reverse-geocode lookup
    pub fn reverse_geocode(point: &GeoPoint) -> String {
        format!("geocode:{:.6},{:.6}", point.latitude(), point.longitude())
    }

    /// Build a cache key for a directions lookup
    pub fn directions(
        origin: &GeoPoint,
        destination: &GeoPoint,
        mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> String {
        format!(
            "directions:{:.6},{:.6}:{:.6},{:.6}:{}:{}",
            origin.latitude(),
            origin.longitude(),
            destination.latitude(),
            destination.longitude(),
            mode,
            departure_time.timestamp()
        )
    }
}
