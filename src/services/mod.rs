// Service exports
pub mod cache;
pub mod google;
pub mod routing;

pub use cache::{CachedRoutingProvider, CacheKey};
pub use google::GoogleMapsClient;
pub use routing::{Route, RouteLeg, RoutingError, RoutingProvider};

use std::sync::Arc;
use crate::config::{CacheSettings, RoutingSettings};

/// Build the routing provider described by the settings
///
/// Fails when credentials are missing, which callers treat as a
/// configuration error before any run starts.
pub fn build_routing_provider(
    routing: &RoutingSettings,
    cache: &CacheSettings,
) -> Result<Arc<dyn RoutingProvider>, RoutingError> {
    let client = GoogleMapsClient::new(routing)?;

    if cache.enabled {
        tracing::info!(
            "Routing lookups cached (capacity: {}, TTL: {}s)",
            cache.capacity,
            cache.ttl_secs
        );
        Ok(Arc::new(CachedRoutingProvider::new(client, cache.capacity, cache.ttl_secs)))
    } else {
        Ok(Arc::new(client))
    }
}
