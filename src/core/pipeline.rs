use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;
use crate::core::{
    filters::{DestinationIndex, EligibilityFilter},
    matcher::match_origin,
    resolver::{RoadDistance, RoadDistanceResolver},
};
use crate::models::{Destination, MatchedPair, Origin, OriginResult, TravelMode};

/// Errors that abort a whole run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("No eligible destination: all {candidates} candidates were filtered out")]
    NoEligibleDestination { candidates: usize },

    #[error("Missing routing credentials: {0}")]
    MissingCredentials(String),

    #[error("Routing provider setup failed: {0}")]
    ProviderSetup(String),
}

impl PipelineError {
    /// Whether this error comes from configuration rather than input data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PipelineError::NoEligibleDestination { .. }
                | PipelineError::MissingCredentials(_)
                | PipelineError::ProviderSetup(_)
        )
    }
}

/// Per-run options
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub travel_mode: TravelMode,
    /// Held constant for every lookup in the run; `None` means the run's
    /// start time
    pub departure_time: Option<DateTime<Utc>>,
    /// Maximum number of origins resolved concurrently (at least 1)
    pub max_concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            travel_mode: TravelMode::Driving,
            departure_time: None,
            max_concurrency: 1,
        }
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run_id: Uuid,
    /// One row per input origin, in input order
    pub results: Vec<OriginResult>,
    pub eligible_destinations: usize,
}

impl PipelineOutput {
    /// Number of origins with a resolved road distance
    pub fn resolved(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.driving_distance_miles.is_some())
            .count()
    }

    /// Number of origins left with a null road distance
    pub fn unresolved(&self) -> usize {
        self.results.len() - self.resolved()
    }
}

/// End-to-end orchestrator: filter, match, resolve, assemble
///
/// # Pipeline Stages
/// 1. Filter destinations into a [`DestinationIndex`]
/// 2. Match every origin to its nearest eligible destination
/// 3. Resolve road distance per matched pair (bounded concurrency)
/// 4. Assemble one [`OriginResult`] per origin, in input order
///
/// Dropping the future returned by [`Pipeline::run`] cancels the run.
/// Nothing is returned until every origin is finalized, so a cancelled run
/// leaves no partial results behind.
#[derive(Clone)]
pub struct Pipeline {
    resolver: RoadDistanceResolver,
    filter: EligibilityFilter,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(resolver: RoadDistanceResolver, filter: EligibilityFilter, options: PipelineOptions) -> Self {
        Self {
            resolver,
            filter,
            options,
        }
    }

    pub async fn run(
        &self,
        origins: &[Origin],
        destinations: &[Destination],
    ) -> Result<PipelineOutput, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_run", run_id = %run_id);

        self.run_inner(run_id, origins, destinations)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        origins: &[Origin],
        destinations: &[Destination],
    ) -> Result<PipelineOutput, PipelineError> {
        let departure_time = self.options.departure_time.unwrap_or_else(Utc::now);
        let index = DestinationIndex::from_filter(destinations, &self.filter);

        if index.is_empty() {
            tracing::error!(
                "No eligible destinations among {} candidates",
                destinations.len()
            );
            return Err(PipelineError::NoEligibleDestination {
                candidates: destinations.len(),
            });
        }

        tracing::info!(
            "Matching {} origins against {} eligible destinations ({} filtered out)",
            origins.len(),
            index.len(),
            destinations.len() - index.len()
        );

        let pairs = origins
            .iter()
            .map(|origin| match_origin(origin, &index))
            .collect::<Result<Vec<MatchedPair<'_>>, _>>()?;

        let concurrency = self.options.max_concurrency.max(1);

        // `buffered` yields in input order regardless of completion order
        let distances: Vec<RoadDistance> = stream::iter(pairs.iter())
            .map(|pair| {
                self.resolver.resolve(
                    &pair.origin.point,
                    &pair.destination.point,
                    self.options.travel_mode,
                    departure_time,
                )
            })
            .buffered(concurrency)
            .collect()
            .await;

        let results: Vec<OriginResult> = pairs
            .iter()
            .zip(distances)
            .map(|(pair, road)| {
                if road.miles.is_none() {
                    tracing::warn!(
                        "No road distance for origin {} -> destination {}",
                        pair.origin.id,
                        pair.destination.id
                    );
                }
                build_result(pair, road)
            })
            .collect();

        let output = PipelineOutput {
            run_id,
            results,
            eligible_destinations: index.len(),
        };

        tracing::info!(
            "Run complete: {} origins, {} resolved, {} unresolved",
            output.results.len(),
            output.resolved(),
            output.unresolved()
        );

        Ok(output)
    }
}

fn build_result(pair: &MatchedPair<'_>, road: RoadDistance) -> OriginResult {
    OriginResult {
        origin_id: pair.origin.id.clone(),
        latitude: pair.origin.point.latitude(),
        longitude: pair.origin.point.longitude(),
        matched_destination_id: pair.destination.id.clone(),
        destination_latitude: pair.destination.point.latitude(),
        destination_longitude: pair.destination.point.longitude(),
        geometric_distance_meters: pair.distance_meters,
        driving_distance_miles: road.miles,
        origin_address: road.origin_address,
        destination_address: road.destination_address,
    }
}
