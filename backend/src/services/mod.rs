//! Service layer: queries over the catalog and the mutable side-stores.
//!
//! `query`, `geo` and `weather` are pure reads and never fail for foreseeable
//! input. `booking` and `favorites` hold per-process state behind
//! `parking_lot` locks.

pub mod booking;
pub mod favorites;
pub mod geo;
pub mod query;
pub mod weather;

pub use booking::{BookingError, BookingLedger};
pub use favorites::{FavoriteEntry, FavoriteOrder, FavoritesStore};
pub use geo::{district_centroid, haversine_km, nearest, nearest_with_distance};
pub use query::{filter, paginate, recommend, search, sort_venues, Page, SortKey, VenueFilter};
pub use weather::{comfort_index, icon_for, WeatherResolver};
