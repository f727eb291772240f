//! Schema normalization: raw spreadsheet rows to [`VenueRecord`]s.
//!
//! Column names are matched against an alias table, sport and facility text is
//! folded onto a small vocabulary, and missing prices, ratings and coordinates
//! are filled in. Every filled-in value is tagged with its [`Provenance`].
//!
//! Randomness comes from a single `StdRng` per load, drawn in row order (price
//! first, then rating), so a fixed seed reproduces the same catalog.

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::source::RawTable;
use crate::config::NormalizerSettings;
use crate::error::{DataError, DataResult};
use crate::models::{FieldProvenance, Provenance, VenueId, VenueRecord};
use crate::services::geo::{lookup_centroid, DEFAULT_CENTROID};

/// Canonical fields and the header names accepted for each, in priority order.
pub const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    ("name", &["name", "名稱", "場地名稱", "地點"]),
    ("district", &["district", "行政區", "區", "地區"]),
    ("address", &["address", "地址", "地點地址"]),
    ("sport_type", &["sport_type", "sport", "運動", "運動類型"]),
    ("price_range", &["price_range", "價格區間", "價格範圍", "價位"]),
    ("price_per_hour", &["price_per_hour", "每小時價格", "價格", "收費"]),
    ("opening_hours", &["opening_hours", "營業時間", "開放時間"]),
    ("facilities", &["facilities", "設施"]),
    ("venue_scale", &["venue_scale", "場地規模"]),
    ("courses", &["courses", "課程"]),
    ("description", &["description", "描述"]),
    ("other", &["other", "其他"]),
    ("website", &["website", "官網", "網站"]),
    ("contact_phone", &["contact_phone", "電話", "聯絡電話"]),
    ("photos", &["photos", "圖片", "相片"]),
    ("latitude", &["latitude", "lat", "緯度"]),
    ("longitude", &["longitude", "lon", "經度"]),
    ("rating", &["rating", "評分", "stars"]),
    ("id", &["id", "場地ID", "場館ID"]),
];

/// Column order of the legacy thirteen-column export that has no usable header.
pub const POSITIONAL_COLUMNS: [&str; 13] = [
    "name",
    "district",
    "price_range",
    "sport_type",
    "opening_hours",
    "facilities",
    "venue_scale",
    "courses",
    "other",
    "website",
    "address",
    "contact_phone",
    "photos",
];

/// Substring → canonical sport category. Order matters: first hit wins.
pub const SPORT_SYNONYMS: &[(&str, &str)] = &[
    ("羽球", "羽毛球"),
    ("羽毛球", "羽毛球"),
    ("游泳", "游泳"),
    ("健身", "健身"),
    ("重訓", "健身"),
    ("有氧", "有氧運動"),
    ("瑜珈", "瑜伽"),
    ("瑜伽", "瑜伽"),
    ("球類", "球類運動"),
    ("籃球", "籃球"),
    ("足球", "足球"),
    ("網球", "網球"),
    ("桌球", "桌球"),
    ("撞球", "撞球"),
    ("排球", "排球"),
    ("戶外運動", "戶外運動"),
];

pub const DEFAULT_SPORT: &str = "綜合運動";

/// Substring → canonical facility name, in output order.
pub const FACILITY_VOCABULARY: &[(&str, &str)] = &[
    ("淋浴間", "淋浴間"),
    ("置物櫃", "置物櫃"),
    ("停車場", "停車場"),
    ("Wi-Fi", "Wi-Fi"),
    ("WiFi", "Wi-Fi"),
    ("無障礙設施", "無障礙設施"),
    ("性別友善設施", "性別友善設施"),
    ("寵物友善", "寵物友善"),
    ("女性專用", "女性專用"),
];

pub const DEFAULT_FACILITIES: &str = "基本設施";

/// Resolved mapping from canonical field to column index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: BTreeMap<&'static str, usize>,
}

impl ColumnMap {
    /// Match headers against [`COLUMN_ALIASES`].
    ///
    /// For each alias an exact match is tried before a case-insensitive one.
    /// A column claimed by an earlier canonical field is not reused.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut columns = BTreeMap::new();
        let mut claimed: HashSet<usize> = HashSet::new();

        for (canonical, aliases) in COLUMN_ALIASES {
            let hit = aliases.iter().find_map(|alias| {
                let free = |i: &usize| !claimed.contains(i);
                headers
                    .iter()
                    .position(|h| h == alias)
                    .filter(free)
                    .or_else(|| {
                        let lower = alias.to_lowercase();
                        headers
                            .iter()
                            .enumerate()
                            .find(|(i, h)| !claimed.contains(i) && h.to_lowercase() == lower)
                            .map(|(i, _)| i)
                    })
            });
            if let Some(idx) = hit {
                claimed.insert(idx);
                columns.insert(*canonical, idx);
            }
        }

        Self { columns }
    }

    /// Assign the thirteen legacy columns by position.
    pub fn positional() -> Self {
        Self {
            columns: POSITIONAL_COLUMNS
                .iter()
                .enumerate()
                .map(|(i, name)| (*name, i))
                .collect(),
        }
    }

    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.columns.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.columns.contains_key(field)
    }

    fn is_mapped_column(&self, idx: usize) -> bool {
        self.columns.values().any(|&i| i == idx)
    }
}

/// Pick the column mapping for a table, applying the positional fallback.
pub fn resolve_columns(headers: &[String]) -> ColumnMap {
    let map = ColumnMap::from_headers(headers);
    if !map.contains("name") && headers.len() == POSITIONAL_COLUMNS.len() {
        log::info!("No name column recognised; applying 13-column positional layout");
        return ColumnMap::positional();
    }
    map
}

/// Fold free-text sport names onto the canonical categories.
pub fn normalize_sport_type(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return DEFAULT_SPORT.to_string();
    }
    let lookup = |segment: &str| {
        SPORT_SYNONYMS
            .iter()
            .find(|(key, _)| segment.contains(key))
            .map(|(_, canonical)| canonical.to_string())
    };
    let hit = if s.contains('/') {
        s.split('/').map(str::trim).find_map(lookup)
    } else {
        lookup(s)
    };
    hit.unwrap_or_else(|| s.to_string())
}

/// Fold facility text onto the vocabulary, de-duplicated and `/`-joined.
pub fn normalize_facilities(raw: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        return DEFAULT_FACILITIES.to_string();
    }
    let mut found: Vec<&str> = Vec::new();
    for (key, canonical) in FACILITY_VOCABULARY {
        if s.contains(key) && !found.contains(canonical) {
            found.push(canonical);
        }
    }
    if found.is_empty() {
        s.to_string()
    } else {
        found.join("/")
    }
}

fn normalize_dashes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '–' | '—' | '~' | '～' | '－' => '-',
            other => other,
        })
        .collect()
}

/// First run of digits in `s`, ignoring thousands separators inside the run.
pub fn first_number(s: &str) -> Option<f64> {
    let chars: Vec<char> = s.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;
    let mut digits = String::new();
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            digits.push(c);
        } else if c == ',' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
            // thousands separator
        } else {
            break;
        }
        i += 1;
    }
    digits.parse().ok()
}

fn parse_finite(s: &str) -> Option<f64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn draw_int(rng: &mut StdRng, (lo, hi): (u32, u32)) -> f64 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    f64::from(rng.gen_range(lo..=hi))
}

/// Turns raw rows into canonical records.
pub struct Normalizer<'a> {
    settings: &'a NormalizerSettings,
    rng: StdRng,
}

impl<'a> Normalizer<'a> {
    /// Seeded normalizer; `None` seeds from entropy.
    pub fn new(settings: &'a NormalizerSettings, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { settings, rng }
    }

    /// Hourly price from price-range text.
    pub fn price_from_range(&mut self, raw: Option<&str>) -> (f64, Provenance) {
        let text = raw.map(str::trim).unwrap_or("");
        if text.is_empty() {
            return (
                draw_int(&mut self.rng, self.settings.blank_price_range),
                Provenance::Estimated,
            );
        }
        let text = normalize_dashes(text);
        if let Some(bucket) = self
            .settings
            .price_buckets
            .iter()
            .find(|b| text.contains(b.label.as_str()))
        {
            return (bucket.price, Provenance::Derived);
        }
        if let Some(value) = first_number(&text) {
            return (value, Provenance::Derived);
        }
        (
            draw_int(&mut self.rng, self.settings.unparsed_price_range),
            Provenance::Estimated,
        )
    }

    /// Rating clamped to the configured bounds, or a synthesized one.
    pub fn rating(&mut self, raw: Option<&str>) -> (f64, Provenance) {
        if let Some(value) = raw.and_then(parse_finite) {
            let (lo, hi) = self.settings.rating_bounds;
            return (value.clamp(lo, hi), Provenance::Observed);
        }
        let (lo, hi) = self.settings.synthesized_rating_range;
        let value = if lo < hi { self.rng.gen_range(lo..=hi) } else { lo };
        ((value * 10.0).round() / 10.0, Provenance::Estimated)
    }

    /// Normalize a whole table.
    ///
    /// Fails with [`DataError::MissingColumn`] when no name column can be
    /// resolved; every other deficiency is repaired in place.
    pub fn normalize(&mut self, table: &RawTable) -> DataResult<Vec<VenueRecord>> {
        let columns = resolve_columns(&table.headers);
        let name_idx = columns
            .index_of("name")
            .ok_or_else(|| DataError::MissingColumn("name".to_string()))?;

        let mut records = Vec::with_capacity(table.rows.len());
        let mut raw_ids: Vec<Option<i64>> = Vec::new();
        let mut dropped = 0usize;

        for row in &table.rows {
            let cell = |field: &str| columns.index_of(field).and_then(|i| row.get(i)).map(|s| s.trim());
            let text = |field: &str| cell(field).unwrap_or("").to_string();

            let name = row.get(name_idx).map(|s| s.trim()).unwrap_or("");
            if name.is_empty() {
                dropped += 1;
                continue;
            }

            let (price, price_provenance) = match cell("price_per_hour").and_then(parse_finite) {
                Some(value) => (value, Provenance::Observed),
                None => self.price_from_range(cell("price_range")),
            };
            let (rating, rating_provenance) = self.rating(cell("rating"));

            let district = text("district");
            let observed = cell("latitude")
                .and_then(parse_finite)
                .zip(cell("longitude").and_then(parse_finite));
            let ((latitude, longitude), coordinates_provenance) = match observed {
                Some(coords) => (coords, Provenance::Observed),
                None => match lookup_centroid(&district) {
                    Some(coords) => (coords, Provenance::Derived),
                    None => (DEFAULT_CENTROID, Provenance::Estimated),
                },
            };

            let description = if columns.contains("description") {
                text("description")
            } else {
                text("other")
            };

            let extra = table
                .headers
                .iter()
                .enumerate()
                .filter(|(i, h)| !h.is_empty() && !columns.is_mapped_column(*i))
                .filter_map(|(i, h)| {
                    row.get(i)
                        .filter(|v| !v.is_empty())
                        .map(|v| (h.clone(), v.clone()))
                })
                .collect();

            if columns.contains("id") {
                raw_ids.push(cell("id").and_then(parse_id));
            }

            records.push(VenueRecord {
                id: VenueId::new(0),
                name: name.to_string(),
                address: text("address"),
                district,
                sport_type: normalize_sport_type(cell("sport_type").unwrap_or("")),
                price_per_hour: price,
                rating,
                facilities: normalize_facilities(cell("facilities").unwrap_or("")),
                description,
                opening_hours: text("opening_hours"),
                website: text("website"),
                contact_phone: text("contact_phone"),
                venue_scale: text("venue_scale"),
                courses: text("courses"),
                photos: text("photos"),
                latitude,
                longitude,
                provenance: FieldProvenance {
                    price: price_provenance,
                    rating: rating_provenance,
                    coordinates: coordinates_provenance,
                },
                extra,
            });
        }

        if dropped > 0 {
            log::info!("Dropped {} rows without a name", dropped);
        }
        assign_ids(&mut records, columns.contains("id").then_some(raw_ids));
        Ok(records)
    }
}

fn parse_id(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

/// Use source ids when all are present and unique, otherwise number `1..=N`.
fn assign_ids(records: &mut [VenueRecord], source_ids: Option<Vec<Option<i64>>>) {
    if let Some(ids) = source_ids {
        let mut seen = HashSet::with_capacity(ids.len());
        let usable = ids.iter().all(|id| matches!(id, Some(v) if seen.insert(*v)));
        if usable {
            for (record, id) in records.iter_mut().zip(ids.into_iter().flatten()) {
                record.id = VenueId::new(id);
            }
            return;
        }
        log::warn!("Source id column has missing or duplicate values; renumbering all venues");
    }
    for (i, record) in records.iter_mut().enumerate() {
        record.id = VenueId::new(i as i64 + 1);
    }
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod normalizer_tests;
