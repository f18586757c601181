use crate::core::{distance::distance, filters::DestinationIndex, pipeline::PipelineError};
use crate::models::{Destination, GeoPoint, MatchedPair, Origin};

/// Find the destination in `index` nearest to `origin` by great-circle distance
///
/// Linear scan keeping a running minimum. A candidate only replaces the
/// current best on strict improvement, so among equally distant
/// destinations the one seen first in the index wins.
///
/// # Returns
/// The nearest destination and its distance in meters, or
/// `PipelineError::NoEligibleDestination` when the index is empty
pub fn find_nearest<'a>(
    origin: &GeoPoint,
    index: &DestinationIndex<'a>,
) -> Result<(&'a Destination, f64), PipelineError> {
    let mut best: Option<&'a Destination> = None;
    let mut min_dist = f64::INFINITY;

    for candidate in index.iter() {
        let d = distance(origin, &candidate.point);
        if d < min_dist {
            min_dist = d;
            best = Some(candidate);
        }
    }

    best.map(|destination| (destination, min_dist))
        .ok_or(PipelineError::NoEligibleDestination {
            candidates: index.candidate_count(),
        })
}

/// Match an origin against the index, producing a [`MatchedPair`]
pub fn match_origin<'a>(
    origin: &'a Origin,
    index: &DestinationIndex<'a>,
) -> Result<MatchedPair<'a>, PipelineError> {
    let (destination, distance_meters) = find_nearest(&origin.point, index)?;

    tracing::trace!(
        "Matched origin {} to destination {} ({:.1} m)",
        origin.id,
        destination.id,
        distance_meters
    );

    Ok(MatchedPair {
        origin,
        destination,
        distance_meters,
    })
}
