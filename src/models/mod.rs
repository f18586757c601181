// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GeoPoint, GeoError, Destination, Origin, MatchedPair, TravelMode, OriginResult, RejectedRecord};
pub use requests::{NearestDistanceRequest, RawOrigin, RawDestination};
pub use responses::{NearestDistanceResponse, HealthResponse, ErrorResponse};
