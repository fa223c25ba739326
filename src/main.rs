use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use filament_match::config::Settings;
use filament_match::core::{MatcherSettings, SupplierMatcher};
use filament_match::routes::{self, AppState};
use filament_match::services::{CacheManager, NominatimClient, PostgresClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; logging defaults apply if it fails
    let settings = Settings::load();
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();

    // Initialize logging (LOG_LEVEL / LOG_FORMAT override the config file)
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Filament Match service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    // Initialize PostgreSQL client (catalog + ledger)
    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
        })?,
    );

    info!("PostgreSQL client initialized");

    // Initialize geocode cache; Redis is optional
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(86_400);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let cache = match CacheManager::new(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to connect to Redis ({}), using in-memory geocode cache only", e);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };

    info!(
        "Geocode cache initialized (L1: {} entries, TTL: {}s, Redis: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_l2()
    );

    // Initialize geocoding client
    let geocoder = NominatimClient::new(
        settings.geocoding.endpoint.clone(),
        &settings.geocoding.user_agent,
        Duration::from_secs(settings.geocoding.timeout_secs),
    )
    .map_err(|e| {
        error!("Failed to create geocoding client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?
    .with_cache(Arc::new(cache));

    info!("Geocoding client initialized ({})", settings.geocoding.endpoint);

    // Initialize matcher
    let matcher_settings = MatcherSettings::from(&settings.matching);
    let matcher = SupplierMatcher::new(postgres.clone(), Arc::new(geocoder), matcher_settings);

    info!("Matcher initialized with settings: {:?}", matcher_settings);

    // Build application state
    let app_state = AppState {
        catalog: postgres.clone(),
        ledger: postgres,
        matcher,
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
            .app_data(routes::json_config())
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
