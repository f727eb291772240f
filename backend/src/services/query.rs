//! Free-text search, multi-criterion filtering, sorting and paging.
//!
//! All functions borrow records from the catalog and keep catalog order unless
//! they explicitly sort. Empty predicates never restrict the result.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::models::VenueRecord;

/// Conjunctive filter over the catalog. `Default` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueFilter {
    /// Free-text query applied before every other predicate.
    #[serde(default)]
    pub text: Option<String>,
    /// Exact sport-type membership.
    #[serde(default)]
    pub sport_types: Vec<String>,
    /// Exact district membership.
    #[serde(default)]
    pub districts: Vec<String>,
    /// Inclusive `(lo, hi)` on hourly price. Not reordered when `lo > hi`.
    #[serde(default)]
    pub price_range: Option<(f64, f64)>,
    /// Every entry must appear (case-insensitively) in the facilities text.
    #[serde(default)]
    pub facilities: Vec<String>,
    /// Inclusive lower bound on rating.
    #[serde(default)]
    pub min_rating: Option<f64>,
}

impl VenueFilter {
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.sport_types.is_empty()
            && self.districts.is_empty()
            && self.price_range.is_none()
            && self.facilities.is_empty()
            && self.min_rating.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    RatingDesc,
    PriceAsc,
    NameAsc,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rating" | "rating_desc" => Ok(Self::RatingDesc),
            "price" | "price_asc" => Ok(Self::PriceAsc),
            "name" | "name_asc" => Ok(Self::NameAsc),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Case-insensitive substring search.
///
/// Returns `None` for a blank query ("no filter applied") and `Some(vec![])`
/// when nothing matches.
pub fn search<'a>(records: &'a [VenueRecord], text: &str) -> Option<Vec<&'a VenueRecord>> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    Some(
        records
            .iter()
            .filter(|r| {
                r.searchable_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect(),
    )
}

/// Apply every non-empty predicate of `filter`, in catalog order.
pub fn filter<'a>(records: &'a [VenueRecord], filter: &VenueFilter) -> Vec<&'a VenueRecord> {
    let base: Vec<&VenueRecord> = match filter.text.as_deref().and_then(|t| search(records, t)) {
        Some(hits) => hits,
        None => records.iter().collect(),
    };

    let facilities: Vec<String> = filter
        .facilities
        .iter()
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
        .collect();

    base.into_iter()
        .filter(|r| filter.sport_types.is_empty() || filter.sport_types.contains(&r.sport_type))
        .filter(|r| filter.districts.is_empty() || filter.districts.contains(&r.district))
        .filter(|r| match filter.price_range {
            Some((lo, hi)) => r.price_per_hour >= lo && r.price_per_hour <= hi,
            None => true,
        })
        .filter(|r| {
            if facilities.is_empty() {
                return true;
            }
            let text = r.facilities.to_lowercase();
            facilities.iter().all(|f| text.contains(f.as_str()))
        })
        .filter(|r| match filter.min_rating {
            Some(min) => r.rating >= min,
            None => true,
        })
        .collect()
}

/// NaN sorts after every number regardless of direction.
fn cmp_nan_last(a: f64, b: f64, descending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.total_cmp(&b);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

/// Stable sort of borrowed records.
pub fn sort_venues(records: &mut [&VenueRecord], key: SortKey) {
    match key {
        SortKey::RatingDesc => records.sort_by(|a, b| cmp_nan_last(a.rating, b.rating, true)),
        SortKey::PriceAsc => {
            records.sort_by(|a, b| cmp_nan_last(a.price_per_hour, b.price_per_hour, false))
        }
        SortKey::NameAsc => records.sort_by(|a, b| match (a.name.is_empty(), b.name.is_empty()) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            _ => a.name.cmp(&b.name),
        }),
    }
}

/// Slice out a 1-based page. Page 0 is treated as page 1; pages past the end
/// are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);
    let start = (page - 1).saturating_mul(per_page);
    let slice = if start < total {
        &items[start..(start + per_page).min(total)]
    } else {
        &[]
    };
    Page {
        items: slice.to_vec(),
        page,
        per_page,
        total,
        total_pages,
    }
}

/// Up to `n` distinct records sampled with a seeded RNG, in catalog order.
pub fn recommend(records: &[VenueRecord], n: usize, seed: u64) -> Vec<&VenueRecord> {
    let amount = n.min(records.len());
    if amount == 0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, records.len(), amount).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| &records[i]).collect()
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod query_tests;
