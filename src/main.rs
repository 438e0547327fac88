mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use routes::search::AppState;
use services::{
    ActiveSearchCache, CriteriaExtractor, EmailSink, InboxSink, MatchEvaluator,
    NotificationDispatcher, NotificationSink, PgNotificationStore, ProfileStore,
    StandingSearchRegistry,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

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
            .body(serde_json::to_string(self).unwrap())
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

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Quadra Match service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Connect to PostgreSQL and run migrations
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let pool = services::connect_pool(&settings.database.url, db_max_conn, db_min_conn)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            panic!("PostgreSQL connection error: {}", e);
        });

    info!("PostgreSQL pool initialized (max: {} connections)", db_max_conn);

    // Active standing-search working set, bounded staleness window
    let cache_ttl = settings.cache.active_ttl_secs.unwrap_or(5);
    let cache_capacity = settings.cache.capacity.unwrap_or(8);
    let cache = ActiveSearchCache::new(cache_capacity, cache_ttl);

    let registry = Arc::new(StandingSearchRegistry::new(pool.clone(), cache));
    info!("Standing search registry initialized (cache TTL: {}s)", cache_ttl);

    let fetch_window = settings.search.fetch_window.unwrap_or(500);
    let profiles = Arc::new(ProfileStore::new(pool.clone(), fetch_window));

    // Criteria extractor is optional; the pipeline degrades to empty
    // criteria without it.
    let extractor = Arc::new(CriteriaExtractor::new(
        settings.extractor.endpoint.clone(),
        settings.extractor.api_key.clone(),
        settings.extractor.timeout_secs,
    ));

    if extractor.is_configured() {
        info!("Criteria extractor configured (timeout: {}s)", settings.extractor.timeout_secs);
    } else {
        info!("Criteria extractor not configured; searches run with empty criteria");
    }

    // Notification channels: in-platform inbox always, email when configured
    let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(InboxSink::new(pool.clone()))];

    if let Some(email_endpoint) = settings.notifier.email_endpoint.clone() {
        info!("Email notification sink configured");
        sinks.push(Arc::new(EmailSink::new(email_endpoint, 10)));
    }

    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(PgNotificationStore::new(pool.clone())),
        sinks,
        settings.notifier.max_attempts.unwrap_or(3),
        Duration::from_millis(settings.notifier.base_backoff_ms.unwrap_or(200)),
    ));

    let evaluator = Arc::new(MatchEvaluator::new(Arc::clone(&registry), dispatcher));

    info!("Match evaluator initialized");

    // Build application state
    let app_state = AppState {
        registry,
        profiles,
        extractor,
        evaluator,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
