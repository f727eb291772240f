//! Data Transfer Objects for the HTTP API.
//!
//! Query-string DTOs keep list parameters as comma-separated strings and are
//! converted into the service-layer types here, so handlers only deal with
//! validated values. Query structs stay flat: `serde(flatten)` does not mix
//! with numeric fields in url-encoded input.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub use crate::catalog::{CatalogSource, CatalogStats};
pub use crate::models::{BookingRecord, VenueRecord, WeatherIcon, WeatherSnapshot};
pub use crate::services::{FavoriteEntry, Page};

use crate::models::{BookingRequest, VenueId};
use crate::services::{SortKey, VenueFilter};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Number of venues in the loaded catalog
    pub venues: usize,
    /// Number of districts with weather data
    pub weather_districts: usize,
}

/// Split a comma-separated query value, dropping blanks.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Parse `HH:MM:SS` or `HH:MM`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| format!("Invalid time '{}', expected HH:MM", raw))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", raw))
}

/// Paging and ordering shared by the list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListQuery {
    /// `rating`, `price` or `name`; catalog order when absent
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl ListQuery {
    /// Sort key if one was requested.
    pub fn sort_key(&self) -> Result<Option<SortKey>, String> {
        match self.sort.as_deref() {
            Some(s) if !s.trim().is_empty() => s.parse().map(Some),
            _ => Ok(None),
        }
    }
}

/// Query parameters for free-text search.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl SearchQuery {
    pub fn list(&self) -> ListQuery {
        ListQuery {
            sort: self.sort.clone(),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Search response; `filtered` is false when the query was blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub filtered: bool,
    pub results: Page<VenueRecord>,
}

/// Query parameters for the multi-predicate filter.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-separated sport types
    #[serde(default)]
    pub sport_types: Option<String>,
    /// Comma-separated districts
    #[serde(default)]
    pub districts: Option<String>,
    /// Comma-separated facilities, all required
    #[serde(default)]
    pub facilities: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub per_page: Option<usize>,
}

impl FilterQuery {
    pub fn list(&self) -> ListQuery {
        ListQuery {
            sort: self.sort.clone(),
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Convert into a service-layer filter.
    ///
    /// A single price bound leaves the other side open.
    pub fn to_filter(&self) -> VenueFilter {
        let price_range = match (self.min_price, self.max_price) {
            (None, None) => None,
            (lo, hi) => Some((lo.unwrap_or(f64::NEG_INFINITY), hi.unwrap_or(f64::INFINITY))),
        };
        VenueFilter {
            text: self.q.clone(),
            sport_types: split_list(self.sport_types.as_deref()),
            districts: split_list(self.districts.as_deref()),
            price_range,
            facilities: split_list(self.facilities.as_deref()),
            min_rating: self.min_rating.filter(|r| *r > 0.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecommendQuery {
    #[serde(default)]
    pub n: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueListResponse {
    pub venues: Vec<VenueRecord>,
    pub total: usize,
}

impl VenueListResponse {
    pub fn from_refs(venues: &[&VenueRecord]) -> Self {
        let venues: Vec<VenueRecord> = venues.iter().map(|v| (*v).clone()).collect();
        let total = venues.len();
        Self { venues, total }
    }
}

/// A venue with links the detail page shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueDetailResponse {
    #[serde(flatten)]
    pub venue: VenueRecord,
    pub map_url: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuesResponse {
    pub field: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStatsResponse {
    #[serde(flatten)]
    pub stats: CatalogStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CatalogSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    /// True when the source was unchanged and the cached catalog kept
    pub cached: bool,
    pub venues: usize,
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidResponse {
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
    /// False when the district fell back to the city default
    pub known: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestResponse {
    pub venue: VenueRecord,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherResponse {
    #[serde(flatten)]
    pub snapshot: WeatherSnapshot,
    pub comfort_label: String,
    pub icon: WeatherIcon,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IconQuery {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconResponse {
    pub icon: WeatherIcon,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub venue_id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub venue_id: i64,
    pub available: bool,
}

/// Request body for creating a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub venue_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl CreateBookingRequest {
    /// Validate required contact fields and parse date and times.
    pub fn into_request(self) -> Result<BookingRequest, String> {
        let missing: Vec<&str> = [
            ("user_name", &self.user_name),
            ("user_email", &self.user_email),
            ("user_phone", &self.user_phone),
        ]
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| *k)
        .collect();
        if !missing.is_empty() {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        }

        Ok(BookingRequest {
            venue_id: VenueId::new(self.venue_id),
            date: parse_date(&self.date)?,
            start_time: parse_time(&self.start_time)?,
            end_time: parse_time(&self.end_time)?,
            user_name: self.user_name.trim().to_string(),
            user_email: self.user_email.trim().to_string(),
            user_phone: self.user_phone.trim().to_string(),
            special_requests: self.special_requests.filter(|s| !s.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingResponse {
    pub booking_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FavoritesQuery {
    /// `added`, `rating` or `price`
    #[serde(default)]
    pub order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFavoriteRequest {
    pub venue_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteChangeResponse {
    pub venue_id: i64,
    /// False when the request made no change
    pub changed: bool,
    pub total: usize,
}
