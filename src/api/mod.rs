use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

pub mod config;
pub mod handlers;
pub mod models;
pub mod workers;

use crate::api::config::ApiConfig;
use crate::api::handlers::{
    clear_screenshots, health_check, json_error_handler, list_screenshots, save_screenshot,
};
use crate::api::models::StoreJob;
use crate::api::workers::start_writer;
use crate::store::{JsonFileBackend, ScreenshotStore};

/// Registers the HTTP routes exposed by the service
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::resource("/screenshots")
                .route(web::post().to(save_screenshot))
                .route(web::get().to(list_screenshots))
                .route(web::delete().to(clear_screenshots)),
        )
        .service(web::resource("/health").route(web::get().to(health_check)));
}

/// The dashboard UI runs on a different origin, so every route must be
/// callable cross-origin. Restricted to one origin when configured,
/// otherwise open.
fn cors_for(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header(),
        None => Cors::permissive(),
    }
}

/// Starts the API server with the specified configuration
///
/// Builds the file-backed store, spawns the writer task that serializes all
/// store operations, and starts the HTTP server with the configured
/// endpoints.
///
/// # Arguments
/// * `host` - Host address to bind to (e.g., "127.0.0.1")
/// * `port` - Port to listen on
/// * `config` - Optional API configuration (uses defaults if None)
#[instrument(skip(config))]
pub async fn start_server(host: &str, port: u16, config: Option<ApiConfig>) -> Result<()> {
    info!("Starting screenshot store server on {}:{}", host, port);

    let config = config.unwrap_or_else(|| {
        debug!("Using default API configuration");
        ApiConfig::default()
    });

    debug!("Persisting screenshot collection to {}", config.data_file.display());
    let store = ScreenshotStore::new(Box::new(JsonFileBackend::new(config.data_file.clone())));

    debug!("Creating writer job queue with capacity: {}", config.queue_size);
    let (job_tx, job_rx) = mpsc::channel::<StoreJob>(config.queue_size);
    start_writer(job_rx, store);

    let job_tx_data = web::Data::new(job_tx);
    let config_data = web::Data::new(config);

    info!("Starting HTTP server at {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .wrap(cors_for(config_data.allowed_origin.as_deref()))
            .app_data(config_data.clone())
            .app_data(job_tx_data.clone())
            .configure(routes)
    })
    .bind((host, port))
    .map_err(|e| {
        error!("Failed to bind to {}:{}: {}", host, port, e);
        e
    })?
    .run()
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
