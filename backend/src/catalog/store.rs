//! The immutable, in-memory venue catalog.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::normalizer::Normalizer;
use super::source::{self, SourceBytes};
use crate::config::{DatasetSettings, NormalizerSettings};
use crate::error::DataResult;
use crate::models::{VenueId, VenueRecord};

/// Search terms always offered after the catalog-derived ones.
pub const FIXED_POPULAR_SEARCHES: &[&str] = &["室內", "戶外", "便宜", "高評分", "停車場", "24小時"];

const POPULAR_SEARCH_LIMIT: usize = 10;

/// Fields whose distinct values can be enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogField {
    SportType,
    District,
    Facility,
}

impl std::str::FromStr for CatalogField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sport_type" | "sport_types" | "sport" => Ok(Self::SportType),
            "district" | "districts" => Ok(Self::District),
            "facility" | "facilities" => Ok(Self::Facility),
            other => Err(format!("Unknown catalog field: {}", other)),
        }
    }
}

/// Where a catalog was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSource {
    pub path: PathBuf,
    pub checksum: String,
    pub loaded_at: DateTime<Utc>,
}

/// Summary counters shown on the landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_venues: usize,
    pub sport_types: usize,
    pub districts: usize,
    pub avg_price: f64,
}

/// Normalized venues in source order, with an id index.
#[derive(Debug, Clone, Default)]
pub struct VenueCatalog {
    records: Vec<VenueRecord>,
    index: HashMap<VenueId, usize>,
    source: Option<CatalogSource>,
}

impl VenueCatalog {
    /// Build a catalog from already-normalized records.
    ///
    /// When ids repeat, lookups resolve to the first occurrence.
    pub fn from_records(records: Vec<VenueRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            index.entry(record.id).or_insert(i);
        }
        Self {
            records,
            index,
            source: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize an in-memory source into a catalog.
    pub fn from_source(
        source: &SourceBytes,
        dataset: &DatasetSettings,
        normalizer: &NormalizerSettings,
    ) -> DataResult<Self> {
        let table = source::parse_table(&source.bytes, dataset.header_scan_rows)?;
        let records = Normalizer::new(normalizer, dataset.seed).normalize(&table)?;
        log::info!(
            "Loaded {} venues from {}",
            records.len(),
            source.path.display()
        );
        let mut catalog = Self::from_records(records);
        catalog.source = Some(CatalogSource {
            path: source.path.clone(),
            checksum: source.checksum.clone(),
            loaded_at: Utc::now(),
        });
        Ok(catalog)
    }

    /// Load from the configured candidates, degrading to an empty catalog.
    pub fn load_or_empty(dataset: &DatasetSettings, normalizer: &NormalizerSettings) -> Self {
        match load_catalog(dataset, normalizer) {
            Ok(catalog) => catalog,
            Err(e) if e.is_absence() => {
                log::warn!("{}; starting with an empty catalog", e);
                Self::empty()
            }
            Err(e) => {
                log::error!("Failed to load venue catalog: {}; starting empty", e);
                Self::empty()
            }
        }
    }

    pub fn get_all(&self) -> &[VenueRecord] {
        &self.records
    }

    pub fn get_by_id(&self, id: VenueId) -> Option<&VenueRecord> {
        self.index.get(&id).map(|&i| &self.records[i])
    }

    /// Records whose id is in `ids`, in catalog order.
    pub fn get_by_ids(&self, ids: &[VenueId]) -> Vec<&VenueRecord> {
        self.records.iter().filter(|r| ids.contains(&r.id)).collect()
    }

    /// Sorted distinct values of a field. Empty on an empty catalog.
    pub fn enumerate(&self, field: CatalogField) -> Vec<String> {
        let mut values: BTreeSet<&str> = BTreeSet::new();
        for record in &self.records {
            match field {
                CatalogField::SportType => {
                    values.insert(record.sport_type.as_str());
                }
                CatalogField::District => {
                    values.insert(record.district.as_str());
                }
                CatalogField::Facility => values.extend(record.facility_tokens()),
            }
        }
        values
            .into_iter()
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let total = self.records.len();
        let avg_price = if total == 0 {
            0.0
        } else {
            self.records.iter().map(|r| r.price_per_hour).sum::<f64>() / total as f64
        };
        CatalogStats {
            total_venues: total,
            sport_types: self.enumerate(CatalogField::SportType).len(),
            districts: self.enumerate(CatalogField::District).len(),
            avg_price,
        }
    }

    /// Suggested search terms: a few sport types and districts, then fixed terms.
    pub fn popular_searches(&self) -> Vec<String> {
        let mut items: Vec<String> = Vec::new();
        items.extend(self.enumerate(CatalogField::SportType).into_iter().take(5));
        items.extend(self.enumerate(CatalogField::District).into_iter().take(3));
        items.extend(FIXED_POPULAR_SEARCHES.iter().map(|s| s.to_string()));
        items.truncate(POPULAR_SEARCH_LIMIT);
        items
    }

    pub fn source(&self) -> Option<&CatalogSource> {
        self.source.as_ref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Locate, read and normalize the venue source.
pub fn load_catalog(dataset: &DatasetSettings, normalizer: &NormalizerSettings) -> DataResult<VenueCatalog> {
    let path = source::locate(&dataset.paths)?;
    let bytes = source::read_source(&path)?;
    VenueCatalog::from_source(&bytes, dataset, normalizer)
}
