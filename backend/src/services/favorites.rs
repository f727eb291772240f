//! Per-session favorites list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::models::{VenueId, VenueRecord};

/// Snapshot of a venue taken when it was favorited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: VenueId,
    pub name: String,
    pub address: String,
    pub sport_type: String,
    pub rating: f64,
    pub price_per_hour: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub added_at: DateTime<Utc>,
}

impl From<&VenueRecord> for FavoriteEntry {
    fn from(v: &VenueRecord) -> Self {
        Self {
            id: v.id,
            name: v.name.clone(),
            address: v.address.clone(),
            sport_type: v.sport_type.clone(),
            rating: v.rating,
            price_per_hour: v.price_per_hour,
            latitude: v.latitude,
            longitude: v.longitude,
            added_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteOrder {
    /// Most recently added first.
    #[default]
    Added,
    RatingDesc,
    PriceAsc,
}

impl std::str::FromStr for FavoriteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "added" | "recent" => Ok(Self::Added),
            "rating" | "rating_desc" => Ok(Self::RatingDesc),
            "price" | "price_asc" => Ok(Self::PriceAsc),
            other => Err(format!("Unknown favorites order: {}", other)),
        }
    }
}

#[derive(Clone, Default)]
pub struct FavoritesStore {
    entries: Arc<RwLock<Vec<FavoriteEntry>>>,
}

impl FavoritesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the venue is already a favorite.
    pub fn add(&self, venue: &VenueRecord) -> bool {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.id == venue.id) {
            return false;
        }
        entries.push(FavoriteEntry::from(venue));
        true
    }

    pub fn remove(&self, id: VenueId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    pub fn contains(&self, id: VenueId) -> bool {
        self.entries.read().iter().any(|e| e.id == id)
    }

    pub fn list(&self, order: FavoriteOrder) -> Vec<FavoriteEntry> {
        let mut entries = self.entries.read().clone();
        match order {
            FavoriteOrder::Added => entries.reverse(),
            FavoriteOrder::RatingDesc => entries.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            FavoriteOrder::PriceAsc => {
                entries.sort_by(|a, b| a.price_per_hour.total_cmp(&b.price_per_hour))
            }
        }
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::venue::sample_venue;

    #[test]
    fn test_add_is_idempotent_and_remove_reports() {
        let store = FavoritesStore::new();
        let v = sample_venue(1, "A");
        assert!(store.add(&v));
        assert!(!store.add(&v));
        assert!(store.contains(v.id));
        assert!(store.remove(v.id));
        assert!(!store.remove(v.id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_orders() {
        let store = FavoritesStore::new();
        let mut a = sample_venue(1, "A");
        a.rating = 3.9;
        a.price_per_hour = 500.0;
        let mut b = sample_venue(2, "B");
        b.rating = 4.8;
        b.price_per_hour = 200.0;
        let mut c = sample_venue(3, "C");
        c.rating = 4.1;
        c.price_per_hour = 300.0;
        for v in [&a, &b, &c] {
            store.add(v);
        }

        let ids = |order| -> Vec<i64> { store.list(order).iter().map(|e| e.id.value()).collect() };
        assert_eq!(ids(FavoriteOrder::Added), vec![3, 2, 1]);
        assert_eq!(ids(FavoriteOrder::RatingDesc), vec![2, 3, 1]);
        assert_eq!(ids(FavoriteOrder::PriceAsc), vec![2, 3, 1]);
    }
}
