//! Nearmatch - nearest-destination matching with road-distance resolution
//!
//! For every origin, the geometrically nearest eligible destination is found
//! by great-circle distance, then the travel distance between the pair is
//! looked up through an external routing provider. Pairs the provider cannot
//! route are reported with a null distance instead of failing the run.

pub mod config;
pub mod core;
pub mod loader;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{distance, find_nearest, DestinationIndex, EligibilityFilter, Pipeline, PipelineError, PipelineOptions, RoadDistanceResolver, MILES_PER_METER};
pub use models::{GeoPoint, Origin, Destination, OriginResult, TravelMode, NearestDistanceRequest, NearestDistanceResponse};
pub use services::{RoutingProvider, RoutingError};
