//! Conversion of raw input rows into validated origins and destinations.
//!
//! Rows whose coordinates are missing, unparseable or out of range are
//! excluded from processing and listed in the [`LoadReport`].

use crate::models::{Destination, GeoError, GeoPoint, Origin, RawDestination, RawOrigin, RejectedRecord};

/// Records accepted from an input table, plus the ones that were rejected
#[derive(Debug, Clone)]
pub struct LoadReport<T> {
    pub records: Vec<T>,
    pub rejected: Vec<RejectedRecord>,
}

/// Parse a `POINT (lon lat)` string into a [`GeoPoint`]
///
/// Longitude comes first. The `POINT` prefix is optional and case-insensitive,
/// and the pair may be wrapped in parentheses or square brackets. Components
/// may be separated by whitespace or a comma.
pub fn parse_point(raw: &str) -> Result<GeoPoint, GeoError> {
    let invalid = || GeoError::InvalidPoint(raw.to_string());

    let mut body = raw.trim();
    if body.get(..5).is_some_and(|prefix| prefix.eq_ignore_ascii_case("point")) {
        body = body[5..].trim_start();
    }

    let body = body
        .strip_prefix(&['(', '['][..])
        .and_then(|b| b.strip_suffix(&[')', ']'][..]))
        .unwrap_or(body);

    let mut parts = body
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty());

    let lon = parts.next().ok_or_else(invalid)?;
    let lat = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    let lon: f64 = lon.parse().map_err(|_| invalid())?;
    let lat: f64 = lat.parse().map_err(|_| invalid())?;

    GeoPoint::new(lat, lon)
}

fn resolve_point(
    location: Option<&str>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<GeoPoint, GeoError> {
    match (location, latitude, longitude) {
        (_, Some(lat), Some(lon)) => GeoPoint::new(lat, lon),
        (Some(location), _, _) => parse_point(location),
        _ => Err(GeoError::InvalidPoint("missing location".to_string())),
    }
}

fn reject(index: usize, id: &str, error: GeoError) -> RejectedRecord {
    tracing::warn!("Excluding record {} ({}): {}", index, id, error);
    RejectedRecord {
        index,
        id: id.to_string(),
        reason: error.to_string(),
    }
}

/// Convert raw origin rows, preserving input order of accepted rows
pub fn load_origins(rows: &[RawOrigin]) -> LoadReport<Origin> {
    let mut records = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match resolve_point(row.location.as_deref(), row.latitude, row.longitude) {
            Ok(point) => records.push(Origin {
                id: row.id.clone(),
                point,
            }),
            Err(e) => rejected.push(reject(index, &row.id, e)),
        }
    }

    LoadReport { records, rejected }
}

/// Convert raw destination rows, preserving input order of accepted rows
pub fn load_destinations(rows: &[RawDestination]) -> LoadReport<Destination> {
    let mut records = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match resolve_point(row.location.as_deref(), row.latitude, row.longitude) {
            Ok(point) => records.push(Destination {
                id: row.id.clone(),
                name: row.name.clone(),
                point,
                category: row.category.clone(),
            }),
            Err(e) => rejected.push(reject(index, &row.id, e)),
        }
    }

    LoadReport { records, rejected }
}
