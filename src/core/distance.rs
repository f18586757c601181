use geo::HaversineDistance;
use crate::models::GeoPoint;

/// Miles per meter, used to convert routed leg distances
pub const MILES_PER_METER: f64 = 0.000621371;

/// Great-circle distance between two points in meters
///
/// Uses the haversine formula on a spherical earth (mean radius). Operands
/// are put in a canonical order first, so `distance(a, b)` and
/// `distance(b, a)` are bit-for-bit equal.
///
/// # Arguments
/// * `a` - First point
/// * `b` - Second point
///
/// # Returns
/// Non-negative distance in meters, `0.0` when `a == b`
#[inline]
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (first, second) = if (a.latitude(), a.longitude()) <= (b.latitude(), b.longitude()) {
        (a, b)
    } else {
        (b, a)
    };

    let first: geo::Point<f64> = (*first).into();
    let second: geo::Point<f64> = (*second).into();

    first.haversine_distance(&second)
}

/// Convert a distance in meters to miles
#[inline]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters * MILES_PER_METER
}
