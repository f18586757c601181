use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::{GeoPoint, TravelMode};

/// Errors that can occur when talking to a routing provider
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Over query limit")]
    OverQueryLimit,

    #[error("Rate limit retries exhausted after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl RoutingError {
    /// Whether a retry of the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RoutingError::OverQueryLimit => true,
            RoutingError::RequestError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// One leg of a route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_meters: f64,
}

/// A route returned by the provider, made of one or more legs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub legs: Vec<RouteLeg>,
}

impl Route {
    pub fn total_distance_meters(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance_meters).sum()
    }
}

/// Capabilities required from an external routing provider
///
/// Implementations are expected to absorb rate limiting themselves
/// (retry-over-limit) and only report it once retries are exhausted.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Nearest address for a coordinate, `None` if the provider knows none
    async fn reverse_geocode(&self, point: &GeoPoint) -> Result<Option<String>, RoutingError>;

    /// Routes between two points, primary route first; empty when no route exists
    async fn directions(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> Result<Vec<Route>, RoutingError>;
}

#[async_trait]
impl<P> RoutingProvider for std::sync::Arc<P>
where
    P: RoutingProvider + ?Sized,
{
    async fn reverse_geocode(&self, point: &GeoPoint) -> Result<Option<String>, RoutingError> {
        (**self).reverse_geocode(point).await
    }

    async fn directions(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> Result<Vec<Route>, RoutingError> {
        (**self).directions(origin, destination, mode, departure_time).await
    }
}
