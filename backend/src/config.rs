//! Application configuration file support.
//!
//! Settings are read from a TOML file. Every field carries a serde default so
//! a partial (or absent) file yields a working configuration, and a handful of
//! environment variables override the file for deployment.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DataError, DataResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub normalizer: NormalizerSettings,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub weather: WeatherSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Where the venue table lives and how it is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSettings {
    /// Candidate locations, probed in order.
    #[serde(default = "default_dataset_paths")]
    pub paths: Vec<PathBuf>,
    /// Seed for synthesized prices and ratings. Entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            paths: default_dataset_paths(),
            seed: None,
            header_scan_rows: default_header_scan_rows(),
        }
    }
}

/// A price-range label and the hourly price it stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub label: String,
    pub price: f64,
}

impl PriceBucket {
    pub fn new(label: impl Into<String>, price: f64) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }
}

/// Constants used when filling in prices and ratings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerSettings {
    #[serde(default = "default_price_buckets")]
    pub price_buckets: Vec<PriceBucket>,
    /// Inclusive integer range drawn from when the price text is blank.
    #[serde(default = "default_blank_price_range")]
    pub blank_price_range: (u32, u32),
    /// Inclusive integer range drawn from when the price text is unreadable.
    #[serde(default = "default_unparsed_price_range")]
    pub unparsed_price_range: (u32, u32),
    #[serde(default = "default_rating_bounds")]
    pub rating_bounds: (f64, f64),
    #[serde(default = "default_synth_rating_range")]
    pub synthesized_rating_range: (f64, f64),
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            price_buckets: default_price_buckets(),
            blank_price_range: default_blank_price_range(),
            unparsed_price_range: default_unparsed_price_range(),
            rating_bounds: default_rating_bounds(),
            synthesized_rating_range: default_synth_rating_range(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_recommend_count")]
    pub recommend_count: usize,
    #[serde(default = "default_recommend_seed")]
    pub recommend_seed: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            recommend_count: default_recommend_count(),
            recommend_seed: default_recommend_seed(),
        }
    }
}

/// Forecast payload location and interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSettings {
    #[serde(default = "default_weather_paths")]
    pub paths: Vec<PathBuf>,
    /// `LocationsName` values accepted as the city group.
    #[serde(default = "default_city_names")]
    pub city_names: Vec<String>,
    /// Offset applied to timestamps that carry none.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            paths: default_weather_paths(),
            city_names: default_city_names(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_dataset_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("attached_assets/finding move 2.csv"),
        PathBuf::from("data/finding_move_2.csv"),
        PathBuf::from("finding move 2.csv"),
    ]
}

fn default_header_scan_rows() -> usize {
    10
}

fn default_price_buckets() -> Vec<PriceBucket> {
    vec![
        PriceBucket::new("0-200", 150.0),
        PriceBucket::new("200-500", 350.0),
        PriceBucket::new("500以上", 700.0),
        PriceBucket::new("500+", 700.0),
    ]
}

fn default_blank_price_range() -> (u32, u32) {
    (100, 500)
}

fn default_unparsed_price_range() -> (u32, u32) {
    (200, 400)
}

fn default_rating_bounds() -> (f64, f64) {
    (0.0, 5.0)
}

fn default_synth_rating_range() -> (f64, f64) {
    (3.5, 5.0)
}

fn default_page_size() -> usize {
    9
}

fn default_recommend_count() -> usize {
    6
}

fn default_recommend_seed() -> u64 {
    42
}

fn default_weather_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("response_1758531461872.json"),
        PathBuf::from("attached_assets/response_1758531461872.json"),
    ]
}

fn default_city_names() -> Vec<String> {
    vec!["臺北市".to_string(), "台北市".to_string()]
}

fn default_utc_offset_hours() -> i32 {
    8
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            DataError::Configuration(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            DataError::Configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `venue_finder.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> DataResult<Self> {
        let search_paths = [
            PathBuf::from("venue_finder.toml"),
            PathBuf::from("backend/venue_finder.toml"),
            PathBuf::from("../venue_finder.toml"),
        ];

        for path in &search_paths {
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
                return Self::from_file(path);
            }
        }

        Err(DataError::Configuration(
            "No venue_finder.toml found in standard locations".to_string(),
        ))
    }

    /// Default-location config if present, built-in defaults otherwise,
    /// then environment overrides.
    pub fn load_or_default() -> Self {
        let mut config = match Self::from_default_location() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("{}; using built-in defaults", e);
                Self::default()
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `VENUE_CSV`, `WEATHER_JSON`, `VENUE_SEED`, `HOST` and `PORT`.
    ///
    /// The lookup is injected so tests need not touch process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("VENUE_CSV").filter(|v| !v.trim().is_empty()) {
            self.dataset.paths.insert(0, PathBuf::from(path));
        }
        if let Some(path) = lookup("WEATHER_JSON").filter(|v| !v.trim().is_empty()) {
            self.weather.paths.insert(0, PathBuf::from(path));
        }
        if let Some(seed) = lookup("VENUE_SEED") {
            match seed.trim().parse::<u64>() {
                Ok(seed) => self.dataset.seed = Some(seed),
                Err(_) => log::warn!("Ignoring non-numeric VENUE_SEED={:?}", seed),
            }
        }
        if let Some(host) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT={:?}", port),
            }
        }
    }
}
