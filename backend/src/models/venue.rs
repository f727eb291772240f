//! Canonical venue record produced by the schema normalizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, VenueId);

/// Where a field value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Read directly from the source column.
    Observed,
    /// Computed from another source field or a fixed lookup table.
    Derived,
    /// Fabricated because the source carried no usable signal.
    Estimated,
}

impl Provenance {
    pub fn is_observed(self) -> bool {
        self == Self::Observed
    }
}

/// Provenance of the fields the normalizer may fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub price: Provenance,
    pub rating: Provenance,
    pub coordinates: Provenance,
}

impl Default for FieldProvenance {
    fn default() -> Self {
        Self {
            price: Provenance::Observed,
            rating: Provenance::Observed,
            coordinates: Provenance::Observed,
        }
    }
}

/// One row of the venue catalog.
///
/// After load, `price_per_hour` and `rating` are always finite and the
/// coordinates are always populated, either from the source or from the
/// district centroid table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRecord {
    pub id: VenueId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub district: String,
    pub sport_type: String,
    pub price_per_hour: f64,
    pub rating: f64,
    pub facilities: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub opening_hours: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub venue_scale: String,
    #[serde(default)]
    pub courses: String,
    #[serde(default)]
    pub photos: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub provenance: FieldProvenance,
    /// Source columns that did not map onto a canonical field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl VenueRecord {
    /// Facility tokens split on the normalizer's join delimiter.
    pub fn facility_tokens(&self) -> impl Iterator<Item = &str> {
        self.facilities
            .split('/')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// The text fields free-text search looks at.
    pub fn searchable_fields(&self) -> [&str; 6] {
        [
            &self.name,
            &self.address,
            &self.district,
            &self.sport_type,
            &self.facilities,
            &self.description,
        ]
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

#[cfg(test)]
pub(crate) fn sample_venue(id: i64, name: &str) -> VenueRecord {
    VenueRecord {
        id: VenueId::new(id),
        name: name.to_string(),
        address: String::new(),
        district: String::new(),
        sport_type: "綜合運動".to_string(),
        price_per_hour: 300.0,
        rating: 4.0,
        facilities: "基本設施".to_string(),
        description: String::new(),
        opening_hours: String::new(),
        website: String::new(),
        contact_phone: String::new(),
        venue_scale: String::new(),
        courses: String::new(),
        photos: String::new(),
        latitude: 25.0478,
        longitude: 121.5319,
        provenance: FieldProvenance::default(),
        extra: BTreeMap::new(),
    }
}
