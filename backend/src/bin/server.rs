//! Venue finder HTTP server binary.
//!
//! Loads configuration, builds the venue catalog and weather resolver, and
//! serves the JSON API.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin venue-server
//!
//! # Explicit dataset and a fixed seed for reproducible synthesized values
//! VENUE_CSV="data/finding_move_2.csv" VENUE_SEED=7 cargo run --bin venue-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `VENUE_CSV`: Venue table, tried before the configured paths
//! - `WEATHER_JSON`: Forecast payload, tried before the configured paths
//! - `VENUE_SEED`: Seed for synthesized prices and ratings
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use venue_finder::config::AppConfig;
use venue_finder::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Also forwards `log` records from the library
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting venue finder HTTP server");

    let config = AppConfig::load_or_default();
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Catalog load is blocking file I/O
    let state = tokio::task::spawn_blocking(move || AppState::from_config(config)).await?;
    info!(
        "Catalog ready with {} venues; weather for {} districts",
        state.catalog().len(),
        state.weather.districts().len()
    );

    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
