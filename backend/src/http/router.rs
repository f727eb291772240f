//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The UI is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Venues
        .route("/venues", get(handlers::list_venues))
        .route("/venues/search", get(handlers::search_venues))
        .route("/venues/filter", get(handlers::filter_venues))
        .route("/venues/recommended", get(handlers::recommended_venues))
        .route("/venues/{venue_id}", get(handlers::get_venue))
        .route("/venues/{venue_id}/bookings", get(handlers::venue_bookings))
        // Catalog
        .route("/catalog/values/{field}", get(handlers::catalog_values))
        .route("/catalog/stats", get(handlers::catalog_stats))
        .route("/catalog/popular-searches", get(handlers::popular_searches))
        .route("/catalog/reload", post(handlers::reload_catalog))
        // Geo
        .route("/geo/centroid/{district}", get(handlers::district_centroid))
        .route("/geo/nearest", get(handlers::nearest_venue))
        // Weather
        .route("/weather/icon", get(handlers::weather_icon))
        .route("/weather/{district}", get(handlers::district_weather))
        // Bookings
        .route("/bookings/availability", get(handlers::check_availability))
        .route("/bookings", post(handlers::create_booking))
        // Favorites
        .route(
            "/favorites",
            get(handlers::list_favorites).post(handlers::add_favorite),
        )
        .route("/favorites/{venue_id}", delete(handlers::remove_favorite));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VenueCatalog;
    use crate::config::AppConfig;
    use crate::services::WeatherResolver;
    use chrono::FixedOffset;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(
            Arc::new(VenueCatalog::empty()),
            WeatherResolver::empty(FixedOffset::east_opt(8 * 3600).unwrap()),
            AppConfig::default(),
        );
        let _router = create_router(state);
    }
}
