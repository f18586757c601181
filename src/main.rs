use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use nearmatch::config::{LoggingSettings, Settings};
use nearmatch::routes::{self, AppState};
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Initialize logging; `LOG_LEVEL` / `LOG_FORMAT` override the config file
fn init_logging(settings: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.format.clone());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nearmatch={},actix_web=info", log_level)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_logging(&logging);

    let settings = settings.unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    let app_state = AppState::from_settings(&settings).unwrap_or_else(|e| {
        error!("Failed to initialize routing provider: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!(
        "Routing provider initialized (mode: {}, concurrency: {})",
        app_state.travel_mode, app_state.max_concurrency
    );

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
