//! Public API surface for library callers.
//!
//! This file consolidates the record types and entry points a UI layer needs
//! without reaching into the module tree.

pub use crate::catalog::{
    load_catalog, CacheStatus, CatalogCache, CatalogField, CatalogSource, CatalogStats,
    VenueCatalog,
};
pub use crate::config::AppConfig;
pub use crate::error::{DataError, DataResult};
pub use crate::models::{
    BookingId, BookingRecord, BookingRequest, ComfortIndex, FieldProvenance, Provenance,
    VenueId, VenueRecord, WeatherIcon, WeatherSnapshot,
};
pub use crate::services::{
    BookingError, BookingLedger, FavoriteEntry, FavoriteOrder, FavoritesStore, Page, SortKey,
    VenueFilter, WeatherResolver,
};
