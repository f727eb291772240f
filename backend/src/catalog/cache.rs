//! Session-lifetime catalog cache.
//!
//! Normalization synthesizes random values, so rebuilding a catalog from the
//! same file would change them. The cache hands back the already-built catalog
//! while the source content is unchanged and rebuilds only when its checksum
//! moves.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use super::source;
use super::store::VenueCatalog;
use crate::config::{DatasetSettings, NormalizerSettings};
use crate::error::DataResult;

struct CacheEntry {
    checksum: String,
    catalog: Arc<VenueCatalog>,
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Loaded,
}

/// Catalogs keyed by source path, invalidated by content checksum.
#[derive(Clone, Default)]
pub struct CatalogCache {
    entries: Arc<Mutex<HashMap<PathBuf, CacheEntry>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached catalog for the first existing candidate path, or
    /// build it when absent or stale.
    pub fn get_or_load(
        &self,
        dataset: &DatasetSettings,
        normalizer: &NormalizerSettings,
    ) -> DataResult<(Arc<VenueCatalog>, CacheStatus)> {
        let path = source::locate(&dataset.paths)?;
        let bytes = source::read_source(&path)?;

        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(&path) {
            if entry.checksum == bytes.checksum {
                log::debug!("Catalog cache hit for {}", path.display());
                return Ok((Arc::clone(&entry.catalog), CacheStatus::Hit));
            }
            log::info!("Source {} changed; rebuilding catalog", path.display());
        }

        let catalog = Arc::new(VenueCatalog::from_source(&bytes, dataset, normalizer)?);
        entries.insert(
            path,
            CacheEntry {
                checksum: bytes.checksum,
                catalog: Arc::clone(&catalog),
            },
        );
        Ok((catalog, CacheStatus::Loaded))
    }

    /// Drop every cached catalog.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
