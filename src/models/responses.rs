use serde::{Deserialize, Serialize};
use crate::models::domain::{OriginResult, RejectedRecord};

/// Response for the nearest-distance endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestDistanceResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    pub results: Vec<OriginResult>,
    #[serde(rename = "rejectedOrigins")]
    pub rejected_origins: Vec<RejectedRecord>,
    #[serde(rename = "rejectedDestinations")]
    pub rejected_destinations: Vec<RejectedRecord>,
    #[serde(rename = "eligibleDestinations")]
    pub eligible_destinations: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
