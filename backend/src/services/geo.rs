//! District centroids and nearest-venue lookup.
//!
//! There is no geocoder: districts resolve through a fixed table of Taipei
//! administrative-district centres, and anything unknown lands on the
//! city-wide default.

use crate::models::VenueRecord;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// City-wide fallback centroid.
pub const DEFAULT_CENTROID: (f64, f64) = (25.0478, 121.5319);

/// Centres of the twelve Taipei districts.
pub const DISTRICT_CENTROIDS: &[(&str, (f64, f64))] = &[
    ("士林區", (25.0881, 121.5256)),
    ("大安區", (25.0266, 121.5484)),
    ("中山區", (25.0633, 121.5267)),
    ("大同區", (25.0633, 121.5154)),
    ("中正區", (25.0364, 121.5161)),
    ("信義區", (25.0336, 121.5751)),
    ("萬華區", (25.0327, 121.5060)),
    ("文山區", (24.9906, 121.5420)),
    ("松山區", (25.0501, 121.5776)),
    ("內湖區", (25.0838, 121.5948)),
    ("南港區", (25.0415, 121.6073)),
    ("北投區", (25.1372, 121.5018)),
];

/// Exact lookup in the district table (surrounding whitespace ignored).
pub fn lookup_centroid(district: &str) -> Option<(f64, f64)> {
    let key = district.trim();
    DISTRICT_CENTROIDS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, c)| *c)
}

/// Centroid for a district name, or the city default when unknown.
pub fn district_centroid(district: &str) -> (f64, f64) {
    lookup_centroid(district).unwrap_or(DEFAULT_CENTROID)
}

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// External map link for a coordinate pair.
pub fn map_url(lat: f64, lon: f64) -> String {
    format!("https://www.google.com/maps?q={},{}", lat, lon)
}

/// Closest candidate to `(lat, lon)` together with its distance.
///
/// Candidates with non-finite coordinates are skipped. Ties keep the first
/// candidate in iteration order.
pub fn nearest_with_distance<'a, I>(candidates: I, lat: f64, lon: f64) -> Option<(&'a VenueRecord, f64)>
where
    I: IntoIterator<Item = &'a VenueRecord>,
{
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }

    let mut best: Option<(&VenueRecord, f64)> = None;
    for venue in candidates {
        if !venue.has_valid_coordinates() {
            continue;
        }
        let d = haversine_km(lat, lon, venue.latitude, venue.longitude);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((venue, d)),
        }
    }
    best
}

/// Closest candidate to `(lat, lon)`, or `None` when no candidate has
/// usable coordinates.
pub fn nearest<'a, I>(candidates: I, lat: f64, lon: f64) -> Option<&'a VenueRecord>
where
    I: IntoIterator<Item = &'a VenueRecord>,
{
    nearest_with_distance(candidates, lat, lon).map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::venue::sample_venue;

    #[test]
    fn test_known_and_unknown_districts() {
        assert_eq!(district_centroid("大安區"), (25.0266, 121.5484));
        assert_eq!(district_centroid(" 北投區 "), (25.1372, 121.5018));
        assert_eq!(district_centroid("板橋區"), DEFAULT_CENTROID);
        assert_eq!(district_centroid(""), DEFAULT_CENTROID);
    }

    #[test]
    fn test_haversine_zero_and_symmetric() {
        assert_eq!(haversine_km(25.0, 121.5, 25.0, 121.5), 0.0);
        let ab = haversine_km(25.0266, 121.5484, 25.1372, 121.5018);
        let ba = haversine_km(25.1372, 121.5018, 25.0266, 121.5484);
        assert!((ab - ba).abs() < 1e-9);
        // Da'an to Beitou is roughly 13 km.
        assert!(ab > 12.0 && ab < 14.0, "{}", ab);
    }

    #[test]
    fn test_nearest_skips_invalid_and_prefers_first_on_tie() {
        let mut bad = sample_venue(1, "無座標");
        bad.latitude = f64::NAN;
        let mut a = sample_venue(2, "A");
        a.latitude = 25.03;
        a.longitude = 121.56;
        let mut b = sample_venue(3, "B");
        b.latitude = 25.03;
        b.longitude = 121.56;
        let mut far = sample_venue(4, "遠");
        far.latitude = 25.13;
        far.longitude = 121.50;

        let venues = [bad, a, b, far];
        let (hit, d) = nearest_with_distance(venues.iter(), 25.03, 121.56).unwrap();
        assert_eq!(hit.name, "A");
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_nearest_on_empty_input() {
        let venues: Vec<VenueRecord> = Vec::new();
        assert!(nearest(venues.iter(), 25.0, 121.5).is_none());
    }

    #[test]
    fn test_nearest_rejects_non_finite_query() {
        let venues = [sample_venue(1, "A")];
        assert!(nearest(venues.iter(), f64::NAN, 121.5).is_none());
    }
}
