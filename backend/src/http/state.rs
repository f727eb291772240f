//! Application state for the HTTP server.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::{CatalogCache, VenueCatalog};
use crate::config::AppConfig;
use crate::services::{BookingLedger, FavoritesStore, WeatherResolver};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Current catalog; swapped wholesale on reload, never mutated in place
    catalog: Arc<RwLock<Arc<VenueCatalog>>>,
    pub ledger: BookingLedger,
    pub favorites: FavoritesStore,
    pub weather: Arc<WeatherResolver>,
    pub cache: CatalogCache,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(catalog: Arc<VenueCatalog>, weather: WeatherResolver, config: AppConfig) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            ledger: BookingLedger::new(),
            favorites: FavoritesStore::new(),
            weather: Arc::new(weather),
            cache: CatalogCache::new(),
            config: Arc::new(config),
        }
    }

    /// Build state from configuration, loading the catalog through the cache.
    ///
    /// Missing or unreadable sources degrade to empty data.
    pub fn from_config(config: AppConfig) -> Self {
        let cache = CatalogCache::new();
        let catalog = match cache.get_or_load(&config.dataset, &config.normalizer) {
            Ok((catalog, _)) => catalog,
            Err(e) => {
                log::warn!("Venue catalog unavailable ({}); serving an empty catalog", e);
                Arc::new(VenueCatalog::empty())
            }
        };
        let weather = WeatherResolver::load_or_empty(&config.weather);

        let mut state = Self::new(catalog, weather, config);
        state.cache = cache;
        state
    }

    /// Snapshot of the current catalog.
    pub fn catalog(&self) -> Arc<VenueCatalog> {
        Arc::clone(&*self.catalog.read())
    }

    pub fn replace_catalog(&self, catalog: Arc<VenueCatalog>) {
        *self.catalog.write() = catalog;
    }
}
