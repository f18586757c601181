use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while constructing or parsing coordinates
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Latitude out of range [-90, 90]: {0}")]
    LatitudeOutOfRange(f64),

    #[error("Longitude out of range [-180, 180]: {0}")]
    LongitudeOutOfRange(f64),

    #[error("Invalid point: {0}")]
    InvalidPoint(String),
}

/// A validated latitude/longitude pair in degrees
///
/// Both components are finite and within their valid ranges. The only way to
/// obtain a `GeoPoint` is through [`GeoPoint::new`], so every point downstream
/// of loading is known to be well formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }

        Ok(Self { latitude, longitude })
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.longitude, point.latitude)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Candidate destination with the category used for eligibility filtering
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub id: String,
    pub name: Option<String>,
    pub point: GeoPoint,
    pub category: String,
}

/// Point whose nearest destination and travel distance are computed
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub id: String,
    pub point: GeoPoint,
}

/// An origin associated with its geometrically nearest eligible destination
#[derive(Debug, Clone, Copy)]
pub struct MatchedPair<'a> {
    pub origin: &'a Origin,
    pub destination: &'a Destination,
    pub distance_meters: f64,
}

/// Travel mode requested from the routing provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finalized result row for one origin
///
/// Rows are emitted in the same order as the input origins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginResult {
    #[serde(rename = "originId")]
    pub origin_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "matchedDestinationId")]
    pub matched_destination_id: String,
    #[serde(rename = "destinationLatitude")]
    pub destination_latitude: f64,
    #[serde(rename = "destinationLongitude")]
    pub destination_longitude: f64,
    #[serde(rename = "geometricDistanceMeters")]
    pub geometric_distance_meters: f64,
    #[serde(rename = "drivingDistanceMiles")]
    pub driving_distance_miles: Option<f64>,
    #[serde(rename = "originAddress", default)]
    pub origin_address: Option<String>,
    #[serde(rename = "destinationAddress", default)]
    pub destination_address: Option<String>,
}

/// Input record excluded during loading, with the reason it was rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub id: String,
    pub reason: String,
}
