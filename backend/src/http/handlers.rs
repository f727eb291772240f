//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer. Empty results are successful responses with empty lists.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AddFavoriteRequest, AvailabilityQuery, AvailabilityResponse, CatalogStatsResponse,
    CentroidResponse, CreateBookingRequest, CreateBookingResponse, FavoriteChangeResponse,
    FavoritesQuery, FilterQuery, HealthResponse, IconQuery, IconResponse, ListQuery,
    NearestQuery, NearestResponse, RecommendQuery, ReloadResponse, SearchQuery, SearchResponse,
    ValuesResponse, VenueDetailResponse, VenueListResponse, WeatherResponse,
};
use super::dto::{parse_date, parse_time, BookingRecord, FavoriteEntry, Page, VenueRecord};
use super::error::AppError;
use super::state::AppState;
use crate::catalog::{CacheStatus, CatalogField};
use crate::models::VenueId;
use crate::services::{self, geo, weather, FavoriteOrder};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Sort (when requested) and paginate borrowed records.
fn paged(
    state: &AppState,
    mut records: Vec<&VenueRecord>,
    list: &ListQuery,
) -> Result<Page<VenueRecord>, AppError> {
    if let Some(key) = list.sort_key().map_err(AppError::BadRequest)? {
        services::sort_venues(&mut records, key);
    }
    let per_page = list.per_page.unwrap_or(state.config.query.page_size);
    let page = services::paginate(&records, list.page.unwrap_or(1), per_page);
    Ok(Page {
        items: page.items.into_iter().cloned().collect(),
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages: page.total_pages,
    })
}

fn venue_or_404(state: &AppState, venue_id: i64) -> Result<VenueRecord, AppError> {
    state
        .catalog()
        .get_by_id(VenueId::new(venue_id))
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Venue {} not found", venue_id)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        venues: state.catalog().len(),
        weather_districts: state.weather.districts().len(),
    }))
}

// =============================================================================
// Venues
// =============================================================================

/// GET /v1/venues
///
/// All venues, optionally sorted, one page at a time.
pub async fn list_venues(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Page<VenueRecord>> {
    let catalog = state.catalog();
    let records: Vec<&VenueRecord> = catalog.get_all().iter().collect();
    Ok(Json(paged(&state, records, &query)?))
}

/// GET /v1/venues/search?q=
pub async fn search_venues(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<SearchResponse> {
    let catalog = state.catalog();
    let text = query.q.clone().unwrap_or_default();
    let (filtered, records) = match services::search(catalog.get_all(), &text) {
        Some(hits) => (true, hits),
        None => (false, catalog.get_all().iter().collect()),
    };
    Ok(Json(SearchResponse {
        query: text.trim().to_string(),
        filtered,
        results: paged(&state, records, &query.list())?,
    }))
}

/// GET /v1/venues/filter
pub async fn filter_venues(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> HandlerResult<Page<VenueRecord>> {
    let catalog = state.catalog();
    let records = services::filter(catalog.get_all(), &query.to_filter());
    Ok(Json(paged(&state, records, &query.list())?))
}

/// GET /v1/venues/recommended?n=
pub async fn recommended_venues(
    State(state): State<AppState>,
    Query(query): Query<RecommendQuery>,
) -> HandlerResult<VenueListResponse> {
    let catalog = state.catalog();
    let n = query.n.unwrap_or(state.config.query.recommend_count);
    let seed = query.seed.unwrap_or(state.config.query.recommend_seed);
    let picks = services::recommend(catalog.get_all(), n, seed);
    Ok(Json(VenueListResponse::from_refs(&picks)))
}

/// GET /v1/venues/{venue_id}
pub async fn get_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<i64>,
) -> HandlerResult<VenueDetailResponse> {
    let venue = venue_or_404(&state, venue_id)?;
    Ok(Json(VenueDetailResponse {
        map_url: geo::map_url(venue.latitude, venue.longitude),
        is_favorite: state.favorites.contains(venue.id),
        venue,
    }))
}

/// GET /v1/venues/{venue_id}/bookings
pub async fn venue_bookings(
    State(state): State<AppState>,
    Path(venue_id): Path<i64>,
) -> HandlerResult<Vec<BookingRecord>> {
    let venue = venue_or_404(&state, venue_id)?;
    Ok(Json(state.ledger.bookings_for_venue(venue.id)))
}

// =============================================================================
// Catalog
// =============================================================================

/// GET /v1/catalog/values/{field}
pub async fn catalog_values(
    State(state): State<AppState>,
    Path(field): Path<String>,
) -> HandlerResult<ValuesResponse> {
    let parsed: CatalogField = field.parse().map_err(AppError::BadRequest)?;
    Ok(Json(ValuesResponse {
        values: state.catalog().enumerate(parsed),
        field,
    }))
}

/// GET /v1/catalog/stats
pub async fn catalog_stats(State(state): State<AppState>) -> HandlerResult<CatalogStatsResponse> {
    let catalog = state.catalog();
    Ok(Json(CatalogStatsResponse {
        stats: catalog.stats(),
        source: catalog.source().cloned(),
    }))
}

/// GET /v1/catalog/popular-searches
pub async fn popular_searches(State(state): State<AppState>) -> HandlerResult<Vec<String>> {
    Ok(Json(state.catalog().popular_searches()))
}

/// POST /v1/catalog/reload
///
/// Re-reads the configured source through the catalog cache. An unchanged
/// file keeps the current catalog and its synthesized values.
pub async fn reload_catalog(State(state): State<AppState>) -> HandlerResult<ReloadResponse> {
    let worker = state.clone();
    let (catalog, status) = tokio::task::spawn_blocking(move || {
        worker
            .cache
            .get_or_load(&worker.config.dataset, &worker.config.normalizer)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Reload task failed: {}", e)))??;

    state.replace_catalog(catalog.clone());
    Ok(Json(ReloadResponse {
        cached: status == CacheStatus::Hit,
        venues: catalog.len(),
        checksum: catalog.source().map(|s| s.checksum.clone()),
    }))
}

// =============================================================================
// Geo
// =============================================================================

/// GET /v1/geo/centroid/{district}
pub async fn district_centroid(Path(district): Path<String>) -> HandlerResult<CentroidResponse> {
    let known = geo::lookup_centroid(&district).is_some();
    let (latitude, longitude) = geo::district_centroid(&district);
    Ok(Json(CentroidResponse {
        district,
        latitude,
        longitude,
        known,
    }))
}

/// GET /v1/geo/nearest?lat=&lon=
pub async fn nearest_venue(
    State(state): State<AppState>,
    Query(query): Query<NearestQuery>,
) -> HandlerResult<NearestResponse> {
    let catalog = state.catalog();
    geo::nearest_with_distance(catalog.get_all(), query.lat, query.lon)
        .map(|(venue, distance_km)| {
            Json(NearestResponse {
                venue: venue.clone(),
                distance_km,
            })
        })
        .ok_or_else(|| AppError::NotFound("No venue with usable coordinates".to_string()))
}

// =============================================================================
// Weather
// =============================================================================

/// GET /v1/weather/{district}
pub async fn district_weather(
    State(state): State<AppState>,
    Path(district): Path<String>,
) -> HandlerResult<WeatherResponse> {
    let snapshot = state.weather.snapshot(&district);
    let icon = weather::icon_for(&snapshot.weather_description, snapshot.temperature);
    Ok(Json(WeatherResponse {
        comfort_label: snapshot.comfort_index.label().to_string(),
        emoji: icon.emoji().to_string(),
        icon,
        snapshot,
    }))
}

/// GET /v1/weather/icon?description=&temperature=
pub async fn weather_icon(Query(query): Query<IconQuery>) -> HandlerResult<IconResponse> {
    let icon = weather::icon_for(
        query.description.as_deref().unwrap_or(""),
        query.temperature.unwrap_or(weather::DEFAULT_TEMPERATURE),
    );
    Ok(Json(IconResponse {
        icon,
        emoji: icon.emoji().to_string(),
    }))
}

// =============================================================================
// Bookings
// =============================================================================

/// GET /v1/bookings/availability
pub async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> HandlerResult<AvailabilityResponse> {
    let date = parse_date(&query.date).map_err(AppError::BadRequest)?;
    let start = parse_time(&query.start).map_err(AppError::BadRequest)?;
    let end = parse_time(&query.end).map_err(AppError::BadRequest)?;
    let available = state
        .ledger
        .check_availability(VenueId::new(query.venue_id), date, start, end);
    Ok(Json(AvailabilityResponse {
        venue_id: query.venue_id,
        available,
    }))
}

/// POST /v1/bookings
///
/// Returns 201 with the booking id, 409 when the slot is taken.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let request = body.into_request().map_err(AppError::BadRequest)?;
    venue_or_404(&state, request.venue_id.value())?;

    let booking_id = state.ledger.create_booking(request)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            message: format!("Booking confirmed: {}", booking_id),
            booking_id: booking_id.to_string(),
        }),
    ))
}

// =============================================================================
// Favorites
// =============================================================================

/// GET /v1/favorites?order=
pub async fn list_favorites(
    State(state): State<AppState>,
    Query(query): Query<FavoritesQuery>,
) -> HandlerResult<Vec<FavoriteEntry>> {
    let order = match query.order.as_deref() {
        Some(o) if !o.trim().is_empty() => o.parse::<FavoriteOrder>().map_err(AppError::BadRequest)?,
        _ => FavoriteOrder::default(),
    };
    Ok(Json(state.favorites.list(order)))
}

/// POST /v1/favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(body): Json<AddFavoriteRequest>,
) -> HandlerResult<FavoriteChangeResponse> {
    let venue = venue_or_404(&state, body.venue_id)?;
    let changed = state.favorites.add(&venue);
    Ok(Json(FavoriteChangeResponse {
        venue_id: body.venue_id,
        changed,
        total: state.favorites.len(),
    }))
}

/// DELETE /v1/favorites/{venue_id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(venue_id): Path<i64>,
) -> HandlerResult<FavoriteChangeResponse> {
    let changed = state.favorites.remove(VenueId::new(venue_id));
    Ok(Json(FavoriteChangeResponse {
        venue_id,
        changed,
        total: state.favorites.len(),
    }))
}
