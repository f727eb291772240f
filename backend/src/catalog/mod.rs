//! Venue catalog: source loading, schema normalization and the in-memory store.
//!
//! ```text
//! candidate paths ─► source (locate, decode, header row, CSV)
//!                       │
//!                       ▼
//!                  normalizer (aliases, sport/facility folding,
//!                       │      price/rating/coordinate backfill, ids)
//!                       ▼
//!                  VenueCatalog (immutable, shared via Arc)
//! ```
//!
//! [`CatalogCache`] sits in front of the pipeline and reuses a catalog while
//! the source checksum is unchanged.

pub mod cache;
pub mod checksum;
pub mod normalizer;
pub mod source;
pub mod store;

pub use cache::{CacheStatus, CatalogCache};
pub use store::{load_catalog, CatalogField, CatalogSource, CatalogStats, VenueCatalog};
