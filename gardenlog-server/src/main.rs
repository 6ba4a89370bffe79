use actix_web::{web, App, HttpServer};
use gardenlog::corrections::CorrectionCatalog;
use gardenlog::dashboard::DashboardResolver;
use gardenlog::photos::PhotoStore;
use gardenlog::{Config, PlantStore};
use std::path::PathBuf;

mod handlers;

/// Shared application state
pub struct AppState {
    pub store: PlantStore,
    pub resolver: DashboardResolver,
    pub corrections: CorrectionCatalog,
    pub photos: PhotoStore,
    pub meta_file: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    log::info!("Starting gardenlog server");

    let config = Config::from_env().expect("Failed to load gardenlog configuration");
    let host = std::env::var("GARDENLOG_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("GARDENLOG_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    log::info!("Using data directory: {}", config.data_dir.display());
    let state = web::Data::new(AppState {
        store: PlantStore::new(config.plants_dir()),
        resolver: DashboardResolver::new(config.dashboard_order_file()),
        corrections: CorrectionCatalog::new(config.corrections_file()),
        photos: PhotoStore::new(&config.photos_dir),
        meta_file: config.meta_file(),
    });

    log::info!("Listening on {host}:{port}");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
