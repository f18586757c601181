use chrono::{DateTime, Utc};
use std::sync::Arc;
use crate::core::distance::meters_to_miles;
use crate::models::{GeoPoint, TravelMode};
use crate::services::RoutingProvider;

/// Outcome of resolving one matched pair
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoadDistance {
    /// Primary route length in miles, `None` when no route could be obtained
    pub miles: Option<f64>,
    /// Nearest address to the origin (diagnostic only)
    pub origin_address: Option<String>,
    /// Nearest address to the destination (diagnostic only)
    pub destination_address: Option<String>,
}

/// Resolves travel distance for matched pairs through a routing provider
///
/// Never fails: provider errors and empty route lists both yield
/// `miles: None`. Snapped addresses are recorded but routing is always
/// requested between the original, unsnapped coordinates.
#[derive(Clone)]
pub struct RoadDistanceResolver {
    provider: Arc<dyn RoutingProvider>,
}

impl RoadDistanceResolver {
    pub fn new(provider: Arc<dyn RoutingProvider>) -> Self {
        Self { provider }
    }

    /// Resolve the road distance from `origin` to `destination`
    ///
    /// The three provider calls run in order: snap origin, snap destination,
    /// directions.
    pub async fn resolve(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> RoadDistance {
        let origin_address = self.snap(origin).await;
        let destination_address = self.snap(destination).await;

        let miles = match self
            .provider
            .directions(origin, destination, mode, departure_time)
            .await
        {
            Ok(routes) => match routes.first() {
                Some(route) => {
                    let meters = route.total_distance_meters();
                    if meters.is_finite() && meters >= 0.0 {
                        Some(meters_to_miles(meters))
                    } else {
                        tracing::warn!("Discarding invalid route distance {} for {} -> {}", meters, origin, destination);
                        None
                    }
                }
                None => {
                    tracing::info!("No {} route found for {} -> {}", mode, origin, destination);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Directions lookup failed for {} -> {}: {}", origin, destination, e);
                None
            }
        };

        RoadDistance {
            miles,
            origin_address,
            destination_address,
        }
    }

    async fn snap(&self, point: &GeoPoint) -> Option<String> {
        match self.provider.reverse_geocode(point).await {
            Ok(address) => {
                tracing::debug!("Nearest address for {}: {:?}", point, address);
                address
            }
            Err(e) => {
                tracing::warn!("Reverse geocode failed for {}: {}", point, e);
                None
            }
        }
    }
}
