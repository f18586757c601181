use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use crate::config::RoutingSettings;
use crate::models::{GeoPoint, TravelMode};
use crate::services::routing::{Route, RouteLeg, RoutingError, RoutingProvider};

/// Upper bound for a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Google Maps web services client (Geocoding + Directions)
///
/// Over-query-limit responses (status `OVER_QUERY_LIMIT` or HTTP 429) and
/// transport timeouts are retried with exponential backoff when
/// `retry_over_query_limit` is enabled, bounded by both `max_retries` and
/// `retry_timeout`.
pub struct GoogleMapsClient {
    base_url: String,
    api_key: String,
    client: Client,
    retry_over_query_limit: bool,
    max_retries: u32,
    retry_base_delay: Duration,
    retry_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<ApiRoute>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    #[serde(default)]
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    distance: ApiDistance,
}

#[derive(Debug, Deserialize)]
struct ApiDistance {
    value: f64,
}

/// Status envelope shared by all web service responses
trait ApiStatus {
    fn status(&self) -> &str;
    fn error_message(&self) -> Option<&str>;
}

impl ApiStatus for GeocodeResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl ApiStatus for DirectionsResponse {
    fn status(&self) -> &str {
        &self.status
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

impl GoogleMapsClient {
    /// Create a new client from routing settings
    ///
    /// Fails with `MissingCredentials` when no API key is configured.
    pub fn new(settings: &RoutingSettings) -> Result<Self, RoutingError> {
        if settings.api_key.trim().is_empty() {
            return Err(RoutingError::MissingCredentials(
                "routing.api_key is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            client,
            retry_over_query_limit: settings.retry_over_query_limit,
            max_retries: settings.max_retries,
            retry_base_delay: Duration::from_millis(settings.retry_base_delay_ms),
            retry_timeout: Duration::from_secs(settings.retry_timeout_secs),
        })
    }

    fn geocode_url(&self, point: &GeoPoint) -> String {
        format!(
            "{}/maps/api/geocode/json?latlng={},{}&key={}",
            self.base_url,
            point.latitude(),
            point.longitude(),
            urlencoding::encode(&self.api_key)
        )
    }

    fn directions_url(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> String {
        format!(
            "{}/maps/api/directions/json?origin={},{}&destination={},{}&mode={}&departure_time={}&key={}",
            self.base_url,
            origin.latitude(),
            origin.longitude(),
            destination.latitude(),
            destination.longitude(),
            mode.as_str(),
            departure_time.timestamp(),
            urlencoding::encode(&self.api_key)
        )
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_base_delay
            .checked_mul(factor)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }

    /// GET `url`, retrying transient failures per the retry policy
    async fn fetch<T>(&self, url: &str) -> Result<T, RoutingError>
    where
        T: DeserializeOwned + ApiStatus,
    {
        let started = Instant::now();
        let mut attempt = 0u32;

        loop {
            match self.fetch_once::<T>(url).await {
                Err(e) if e.is_transient() => {
                    let delay = self.backoff(attempt);
                    if !self.retry_over_query_limit
                        || attempt >= self.max_retries
                        || started.elapsed() + delay > self.retry_timeout
                    {
                        tracing::warn!(
                            "Giving up after {} attempts: {}",
                            attempt + 1,
                            e
                        );
                        return Err(give_up(e, attempt + 1));
                    }

                    tracing::debug!(
                        "Transient provider failure ({}), retrying in {:?} (attempt {})",
                        e,
                        delay,
                        attempt + 1
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn fetch_once<T>(&self, url: &str) -> Result<T, RoutingError>
    where
        T: DeserializeOwned + ApiStatus,
    {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutingError::OverQueryLimit);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RoutingError::Unauthorized(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(RoutingError::ApiError(format!("HTTP {}", status)));
        }

        let body: T = response
            .json()
            .await
            .map_err(|e| RoutingError::InvalidResponse(e.to_string()))?;

        let detail = || {
            body.error_message()
                .map(|m| format!("{}: {}", body.status(), m))
                .unwrap_or_else(|| body.status().to_string())
        };

        let failure = match body.status() {
            "OK" | "ZERO_RESULTS" | "NOT_FOUND" => None,
            "OVER_QUERY_LIMIT" => Some(RoutingError::OverQueryLimit),
            "REQUEST_DENIED" => Some(RoutingError::Unauthorized(detail())),
            _ => Some(RoutingError::ApiError(detail())),
        };

        match failure {
            Some(e) => Err(e),
            None => Ok(body),
        }
    }
}

/// Final error once retrying stops; only throttling is reported as `RateLimited`
fn give_up(error: RoutingError, attempts: u32) -> RoutingError {
    match error {
        RoutingError::OverQueryLimit => RoutingError::RateLimited { attempts },
        other => other,
    }
}

/// Departure time actually sent to the provider
///
/// Traffic-aware routing rejects departure times in the past, which a long
/// batch or a backoff can reach. Past times are moved forward to now.
fn effective_departure(departure_time: DateTime<Utc>) -> DateTime<Utc> {
    departure_time.max(Utc::now())
}

#[async_trait]
impl RoutingProvider for GoogleMapsClient {
    async fn reverse_geocode(&self, point: &GeoPoint) -> Result<Option<String>, RoutingError> {
        tracing::debug!("Reverse geocoding {}", point);

        let response: GeocodeResponse = self.fetch(&self.geocode_url(point)).await?;

        Ok(response
            .results
            .into_iter()
            .next()
            .map(|r| r.formatted_address))
    }

    async fn directions(
        &self,
        origin: &GeoPoint,
        destination: &GeoPoint,
        mode: TravelMode,
        departure_time: DateTime<Utc>,
    ) -> Result<Vec<Route>, RoutingError> {
        tracing::debug!("Requesting {} directions {} -> {}", mode, origin, destination);

        let url = self.directions_url(origin, destination, mode, effective_departure(departure_time));
        let response: DirectionsResponse = self.fetch(&url).await?;

        Ok(response
            .routes
            .into_iter()
            .map(|route| Route {
                legs: route
                    .legs
                    .into_iter()
                    .map(|leg| RouteLeg {
                        distance_meters: leg.distance.value,
                    })
                    .collect(),
            })
            .collect())
    }
}
