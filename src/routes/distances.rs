use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;
use crate::config::Settings;
use crate::core::{EligibilityFilter, Pipeline, PipelineError, PipelineOptions, RoadDistanceResolver};
use crate::loader::{load_destinations, load_origins};
use crate::models::{ErrorResponse, HealthResponse, NearestDistanceRequest, NearestDistanceResponse, TravelMode};
use crate::services::{build_routing_provider, RoutingError, RoutingProvider};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn RoutingProvider>,
    pub filter: EligibilityFilter,
    pub travel_mode: TravelMode,
    pub max_concurrency: usize,
}

impl AppState {
    /// Build state from settings, validating routing credentials up front
    pub fn from_settings(settings: &Settings) -> Result<Self, PipelineError> {
        let provider = build_routing_provider(&settings.routing, &settings.cache).map_err(|e| match e {
            RoutingError::MissingCredentials(msg) => PipelineError::MissingCredentials(msg),
            other => PipelineError::ProviderSetup(other.to_string()),
        })?;

        Ok(Self {
            provider,
            filter: EligibilityFilter::new(&settings.filtering.excluded_categories),
            travel_mode: settings.routing.travel_mode,
            max_concurrency: settings.routing.max_concurrency,
        })
    }
}

/// Configure all distance-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/distances/nearest", web::post().to(nearest_distances));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Nearest destination + road distance endpoint
///
/// POST /api/v1/distances/nearest
///
/// Request body:
/// ```json
/// {
///   "origins": [{"id": "O1", "location": "POINT (-75.188230 40.426614)"}],
///   "destinations": [{"id": "D1", "latitude": 40.690754, "longitude": -75.201923, "category": "Recreational"}],
///   "travelMode": "driving",
///   "departureTime": "2024-05-01T12:00:00Z"
/// }
/// ```
async fn nearest_distances(
    state: web::Data<AppState>,
    req: web::Json<NearestDistanceRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for nearest_distances request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let req = req.into_inner();

    let origins = load_origins(&req.origins);
    let destinations = load_destinations(&req.destinations);

    let filter = req
        .excluded_categories
        .as_ref()
        .map(EligibilityFilter::new)
        .unwrap_or_else(|| state.filter.clone());

    let options = PipelineOptions {
        travel_mode: req.travel_mode.unwrap_or(state.travel_mode),
        departure_time: req.departure_time,
        max_concurrency: state.max_concurrency,
    };

    tracing::info!(
        "Resolving {} origins against {} destinations ({} + {} rows rejected)",
        origins.records.len(),
        destinations.records.len(),
        origins.rejected.len(),
        destinations.rejected.len()
    );

    let pipeline = Pipeline::new(RoadDistanceResolver::new(state.provider.clone()), filter, options);

    match pipeline.run(&origins.records, &destinations.records).await {
        Ok(output) => {
            let resolved = output.resolved();
            let unresolved = output.unresolved();

            HttpResponse::Ok().json(NearestDistanceResponse {
                run_id: output.run_id.to_string(),
                results: output.results,
                rejected_origins: origins.rejected,
                rejected_destinations: destinations.rejected,
                eligible_destinations: output.eligible_destinations,
                resolved,
                unresolved,
            })
        }
        Err(e) => {
            tracing::error!("Run aborted: {}", e);
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: "Configuration error".to_string(),
                message: e.to_string(),
                status_code: 422,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_rejected_at_startup() {
        let mut settings: Settings = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        settings.routing.api_key = String::new();

        let result = AppState::from_settings(&settings);
        assert!(matches!(result, Err(PipelineError::MissingCredentials(_))));
        assert!(result.err().map(|e| e.is_configuration()).unwrap_or(false));
    }

    #[test]
    fn test_state_from_settings() {
        let mut settings: Settings = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        settings.routing.api_key = "key".to_string();
        settings.routing.max_concurrency = 3;

        let state = AppState::from_settings(&settings).unwrap();
        assert_eq!(state.max_concurrency, 3);
        assert_eq!(state.travel_mode, TravelMode::Driving);
        assert_eq!(state.filter, EligibilityFilter::default());
    }
}
