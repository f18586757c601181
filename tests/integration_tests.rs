// Integration tests for Nearmatch

use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use nearmatch::config::RoutingSettings;
use nearmatch::core::{EligibilityFilter, Pipeline, PipelineError, PipelineOptions, RoadDistanceResolver};
use nearmatch::models::{Destination, GeoPoint, NearestDistanceResponse, Origin, TravelMode};
use nearmatch::routes::{self, AppState};
use nearmatch::services::{GoogleMapsClient, Route, RouteLeg, RoutingError, RoutingProvider};
use std::sync::{Arc, Mutex};

/// Provider that routes every pair with a fixed distance, except pairs
/// whose destination id is listed as unreachable (matched by point).
struct FixedProvider {
    meters: f64,
    unreachable: Vec<GeoPoint>,
    requested_times: Mutex<Vec<DateTime<Utc>>>,
}

impl FixedProvider {
    fn new(meters: f64) -> Self {
        Self {
            meters,
            unreachable: vec![],
            requested_times: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl RoutingProvider for FixedProvider {
    async fn reverse_geocode(&self, point: &GeoPoint) -> Result<Option<String>, RoutingError> {
        Ok(Some(format!("Road near {}", point)))
    }

    async fn directions(
        &self,
        _origin: &GeoPoint,
        destination: &GeoPoint,
        _mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> Result<Vec<Route>, RoutingError> {
        self.requested_times.lock().unwrap().push(departure_time);
        if self.unreachable.contains(destination) {
            return Ok(vec![]);
        }
        Ok(vec![Route {
            legs: vec![RouteLeg { distance_meters: self.meters }],
        }])
    }
}

fn create_destination(id: &str, lat: f64, lon: f64, category: &str) -> Destination {
    Destination {
        id: id.to_string(),
        name: Some(format!("Store {}", id)),
        point: GeoPoint::new(lat, lon).unwrap(),
        category: category.to_string(),
    }
}

fn create_origin(id: &str, lat: f64, lon: f64) -> Origin {
    Origin {
        id: id.to_string(),
        point: GeoPoint::new(lat, lon).unwrap(),
    }
}

fn departure() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn options(max_concurrency: usize) -> PipelineOptions {
    PipelineOptions {
        travel_mode: TravelMode::Driving,
        departure_time: Some(departure()),
        max_concurrency,
    }
}

#[tokio::test]
async fn test_integration_end_to_end_pipeline() {
    let provider = Arc::new(FixedProvider::new(15000.0));
    let pipeline = Pipeline::new(
        RoadDistanceResolver::new(provider.clone()),
        EligibilityFilter::default(),
        options(1),
    );

    let destinations = vec![
        create_destination("D1", 40.690754, -75.201923, "Recreational"),
        create_destination("D2", 40.040754, -74.912595, "Recreational"),
        create_destination("D3", 40.43, -75.19, "Medicinal cannabis only"),
    ];
    let origins = vec![
        create_origin("O1", 40.426614, -75.188230),
        create_origin("O2", 40.05, -74.92),
    ];

    let output = pipeline.run(&origins, &destinations).await.unwrap();

    assert_eq!(output.results.len(), 2);
    assert_eq!(output.eligible_destinations, 2);

    let o1 = &output.results[0];
    assert_eq!(o1.origin_id, "O1");
    assert_eq!(o1.matched_destination_id, "D1");
    assert!((o1.driving_distance_miles.unwrap() - 9.32).abs() < 0.01);
    assert_eq!(o1.origin_address.as_deref(), Some("Road near 40.426614,-75.18823"));

    let o2 = &output.results[1];
    assert_eq!(o2.matched_destination_id, "D2");

    // Departure time is held constant across the batch
    let times = provider.requested_times.lock().unwrap();
    assert_eq!(times.len(), 2);
    assert!(times.iter().all(|t| *t == departure()));
}

#[tokio::test]
async fn test_integration_unreachable_pair_is_null() {
    let unreachable = GeoPoint::new(21.3069, -157.8583).unwrap();
    let provider = FixedProvider {
        unreachable: vec![unreachable],
        ..FixedProvider::new(5000.0)
    };
    let pipeline = Pipeline::new(
        RoadDistanceResolver::new(Arc::new(provider)),
        EligibilityFilter::allow_all(),
        options(4),
    );

    let destinations = vec![
        create_destination("mainland", 40.0, -75.0, "Recreational"),
        create_destination("island", 21.3069, -157.8583, "Recreational"),
    ];
    let origins = vec![
        create_origin("first", 40.1, -75.1),
        create_origin("honolulu", 21.3, -157.85),
        create_origin("last", 39.9, -74.9),
    ];

    let output = pipeline.run(&origins, &destinations).await.unwrap();

    let ids: Vec<&str> = output.results.iter().map(|r| r.origin_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "honolulu", "last"]);
    assert!(output.results[0].driving_distance_miles.is_some());
    assert_eq!(output.results[1].matched_destination_id, "island");
    assert_eq!(output.results[1].driving_distance_miles, None);
    assert!(output.results[2].driving_distance_miles.is_some());
    assert_eq!(output.resolved(), 2);
    assert_eq!(output.unresolved(), 1);
}

#[tokio::test]
async fn test_integration_empty_index_is_configuration_error() {
    let pipeline = Pipeline::new(
        RoadDistanceResolver::new(Arc::new(FixedProvider::new(1.0))),
        EligibilityFilter::default(),
        options(1),
    );
    let destinations = vec![create_destination("med", 40.0, -75.0, "Medicinal cannabis only")];
    let origins = vec![create_origin("a", 40.0, -75.0)];

    let err = pipeline.run(&origins, &destinations).await.unwrap_err();

    assert_eq!(err, PipelineError::NoEligibleDestination { candidates: 1 });
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_integration_google_client_through_pipeline() {
    let mut server = mockito::Server::new_async().await;
    let geocode = server
        .mock("GET", "/maps/api/geocode/json")
        .match_query(mockito::Matcher::Any)
        .with_body(r#"{"status":"OK","results":[{"formatted_address":"Route 202, Flemington, NJ"}]}"#)
        .expect(2)
        .create_async()
        .await;
    let directions = server
        .mock("GET", "/maps/api/directions/json")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("origin".into(), "40.426614,-75.18823".into()),
            mockito::Matcher::UrlEncoded("destination".into(), "40.690754,-75.201923".into()),
            mockito::Matcher::UrlEncoded("mode".into(), "driving".into()),
        ]))
        .with_body(r#"{"status":"OK","routes":[{"legs":[{"distance":{"text":"9.3 mi","value":15000}}]}]}"#)
        .create_async()
        .await;

    let settings = RoutingSettings {
        base_url: server.url(),
        api_key: "integration".to_string(),
        retry_base_delay_ms: 1,
        ..RoutingSettings::default()
    };
    let client = GoogleMapsClient::new(&settings).unwrap();
    let pipeline = Pipeline::new(
        RoadDistanceResolver::new(Arc::new(client)),
        EligibilityFilter::default(),
        options(1),
    );

    let destinations = vec![
        create_destination("D1", 40.690754, -75.201923, "Recreational"),
        create_destination("D2", 40.040754, -74.912595, "Recreational"),
    ];
    let origins = vec![create_origin("O1", 40.426614, -75.188230)];

    let output = pipeline.run(&origins, &destinations).await.unwrap();

    let row = &output.results[0];
    assert_eq!(row.matched_destination_id, "D1");
    assert_eq!(row.driving_distance_miles, Some(15000.0 * 0.000621371));
    assert_eq!(row.destination_address.as_deref(), Some("Route 202, Flemington, NJ"));

    geocode.assert_async().await;
    directions.assert_async().await;
}

fn app_state(provider: FixedProvider) -> AppState {
    AppState {
        provider: Arc::new(provider),
        filter: EligibilityFilter::default(),
        travel_mode: TravelMode::Driving,
        max_concurrency: 2,
    }
}

#[actix_web::test]
async fn test_http_nearest_distances() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(FixedProvider::new(15000.0))))
            .configure(routes::configure_routes),
    )
    .await;

    let body = serde_json::json!({
        "origins": [
            {"id": "O1", "location": "POINT (-75.188230 40.426614)"},
            {"id": "bad", "latitude": 95.0, "longitude": -75.0},
            {"id": "O2", "latitude": 40.05, "longitude": -74.92}
        ],
        "destinations": [
            {"id": "D1", "location": "POINT (-75.201923 40.690754)", "category": "Recreational"},
            {"id": "D2", "latitude": 40.040754, "longitude": -74.912595, "category": "Recreational"},
            {"id": "D3", "latitude": 40.43, "longitude": -75.19, "category": "Medicinal cannabis only"}
        ],
        "departureTime": "2024-05-01T12:00:00Z"
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/distances/nearest")
        .set_json(&body)
        .to_request();
    let resp: NearestDistanceResponse = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<&str> = resp.results.iter().map(|r| r.origin_id.as_str()).collect();
    assert_eq!(ids, vec!["O1", "O2"]);
    assert_eq!(resp.results[0].matched_destination_id, "D1");
    assert_eq!(resp.results[1].matched_destination_id, "D2");
    assert_eq!(resp.rejected_origins.len(), 1);
    assert_eq!(resp.rejected_origins[0].id, "bad");
    assert_eq!(resp.rejected_origins[0].index, 1);
    assert!(resp.rejected_destinations.is_empty());
    assert_eq!(resp.eligible_destinations, 2);
    assert_eq!(resp.resolved, 2);
    assert_eq!(resp.unresolved, 0);
}

#[actix_web::test]
async fn test_http_all_destinations_excluded() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(FixedProvider::new(1.0))))
            .configure(routes::configure_routes),
    )
    .await;

    let body = serde_json::json!({
        "origins": [{"id": "O1", "latitude": 40.0, "longitude": -75.0}],
        "destinations": [{"id": "D1", "latitude": 40.1, "longitude": -75.0, "category": "Closed"}],
        "excludedCategories": ["closed"]
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/distances/nearest")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 422);
}

#[actix_web::test]
async fn test_http_empty_origins_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(FixedProvider::new(1.0))))
            .configure(routes::configure_routes),
    )
    .await;

    let body = serde_json::json!({
        "origins": [],
        "destinations": [{"id": "D1", "latitude": 40.1, "longitude": -75.0, "category": "Recreational"}]
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/distances/nearest")
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn test_http_health() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(app_state(FixedProvider::new(1.0))))
            .configure(routes::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
}
