use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use osteo_triage::config::Settings;
use osteo_triage::core::TriageRanker;
use osteo_triage::routes::{self, triage::{AppState, RankingLimits}};
use osteo_triage::services::PathologyCatalogue;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so the configured level can apply
    let settings = Settings::load()
        .map_err(|e| std::io::Error::other(format!("Configuration error: {}", e)))?;

    // Initialize logging; LOG_LEVEL and LOG_FORMAT take precedence over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting OsteoUpgrade triage service...");

    let catalogue = match &settings.catalogue.path {
        Some(path) => PathologyCatalogue::load(path).await.map_err(|e| {
            error!("Failed to load pathology catalogue: {}", e);
            std::io::Error::other(format!("Catalogue error: {}", e))
        })?,
        None => {
            warn!("No catalogue configured; only inline pathologies can be scored");
            PathologyCatalogue::empty()
        }
    };

    let constants = settings.scoring_constants();
    let ranker = TriageRanker::new(constants);

    info!("Ranker initialized with constants: {:?}", constants);

    let app_state = AppState {
        catalogue: Arc::new(catalogue),
        ranker,
        limits: RankingLimits {
            default_limit: settings.ranking.default_limit,
            max_limit: settings.ranking.max_limit,
        },
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
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
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
