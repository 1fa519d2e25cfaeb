use actix_files::Files;
use actix_web::{web, App, HttpServer};
use std::io;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use glowreview::api;
use glowreview::config::Config;
use glowreview::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().map_err(|e| {
        error!("Invalid configuration: {e}");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize the database
    let state = AppState::new(config).await.map_err(|e| {
        error!("Could not open the database: {e}");
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;
    let state = web::Data::new(state);
    let addr = state.config.addr.clone();
    info!("listening on http://{}", addr);

    HttpServer::new(move || {
        let config = &state.config;
        App::new()
            .app_data(state.clone())
            // Review photos, videos and receipts
            .service(Files::new(&config.media_url, &config.media_root))
            .configure(api::configure)
    })
    .bind(&addr)?
    .run()
    .await
}
