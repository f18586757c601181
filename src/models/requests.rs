use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::TravelMode;

/// Raw origin row as supplied by the caller
///
/// The location is either a `POINT (lon lat)` string or explicit
/// latitude/longitude fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrigin {
    #[serde(alias = "origin_id")]
    pub id: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Raw destination row as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDestination {
    #[serde(alias = "destination_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub category: String,
}

/// Request to resolve nearest destinations and road distances
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearestDistanceRequest {
    #[validate(length(min = 1))]
    pub origins: Vec<RawOrigin>,
    #[validate(length(min = 1))]
    pub destinations: Vec<RawDestination>,
    #[serde(alias = "travel_mode", rename = "travelMode", default)]
    pub travel_mode: Option<TravelMode>,
    #[serde(alias = "departure_time", rename = "departureTime", default)]
    pub departure_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(alias = "excluded_categories", rename = "excludedCategories", default)]
    pub excluded_categories: Option<Vec<String>>,
}
