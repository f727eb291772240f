mod support;

use std::path::PathBuf;

use tempfile::TempDir;
use venue_finder::api::{
    CacheStatus, CatalogCache, CatalogField, Provenance, VenueCatalog, VenueFilter, VenueId,
};
use venue_finder::catalog::load_catalog;
use venue_finder::config::AppConfig;
use venue_finder::services::{self, geo};

use support::{
    dataset_settings, normalizer_settings, with_scoped_env, write_csv, VENUE_CSV, VENUE_CSV_ROWS,
};

fn load_fixture(seed: Option<u64>) -> (TempDir, VenueCatalog) {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "venues.csv", VENUE_CSV);
    let catalog = load_catalog(&dataset_settings(path, seed), &normalizer_settings()).unwrap();
    (dir, catalog)
}

#[test]
fn test_every_emitted_row_is_complete() {
    let (_dir, catalog) = load_fixture(None);

    assert_eq!(catalog.len(), VENUE_CSV_ROWS);
    for venue in catalog.get_all() {
        assert!(!venue.name.trim().is_empty());
        assert!(venue.price_per_hour.is_finite());
        assert!(venue.rating.is_finite());
        assert!((0.0..=5.0).contains(&venue.rating));
        assert!(venue.has_valid_coordinates());
        assert!(!venue.sport_type.is_empty());
        assert!(!venue.facilities.is_empty());
    }
}

#[test]
fn test_preamble_is_skipped_and_ids_follow_file_order() {
    let (_dir, catalog) = load_fixture(Some(1));

    let names: Vec<&str> = catalog.get_all().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["大安運動中心", "河濱籃球場", "城市瑜珈", "信義羽球館"]);

    let ids: Vec<i64> = catalog.get_all().iter().map(|v| v.id.value()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_field_derivation_and_provenance() {
    let (_dir, catalog) = load_fixture(Some(1));

    let daan = catalog.get_by_id(VenueId::new(1)).unwrap();
    assert_eq!(daan.sport_type, "游泳");
    assert_eq!(daan.price_per_hour, 350.0);
    assert_eq!(daan.provenance.price, Provenance::Derived);
    assert_eq!(daan.rating, 4.6);
    assert_eq!(daan.provenance.rating, Provenance::Observed);
    assert_eq!(daan.facilities, "淋浴間/置物櫃/停車場");
    assert_eq!((daan.latitude, daan.longitude), (25.0210, 121.5354));
    assert_eq!(daan.provenance.coordinates, Provenance::Observed);

    let riverside = catalog.get_by_id(VenueId::new(2)).unwrap();
    assert_eq!(riverside.price_per_hour, 120.0);
    assert_eq!(riverside.provenance.price, Provenance::Derived);
    assert_eq!(riverside.provenance.rating, Provenance::Estimated);
    assert!((3.5..=5.0).contains(&riverside.rating));
    assert_eq!(riverside.facilities, "基本設施");
    assert_eq!(
        (riverside.latitude, riverside.longitude),
        geo::district_centroid("中正區")
    );
    assert_eq!(riverside.provenance.coordinates, Provenance::Derived);

    let yoga = catalog.get_by_id(VenueId::new(3)).unwrap();
    assert_eq!(yoga.sport_type, "瑜伽");
    assert_eq!(yoga.facilities, "Wi-Fi");
    assert_eq!(yoga.provenance.price, Provenance::Estimated);
    assert!((100.0..=500.0).contains(&yoga.price_per_hour));
    assert_eq!((yoga.latitude, yoga.longitude), geo::DEFAULT_CENTROID);
    assert_eq!(yoga.provenance.coordinates, Provenance::Estimated);

    let badminton = catalog.get_by_id(VenueId::new(4)).unwrap();
    assert_eq!(badminton.sport_type, "羽毛球");
    assert_eq!(badminton.price_per_hour, 700.0);
}

#[test]
fn test_fixed_seed_reproduces_synthesized_values() {
    let (_a, first) = load_fixture(Some(2024));
    let (_b, second) = load_fixture(Some(2024));

    assert_eq!(first.get_all(), second.get_all());
}

#[test]
fn test_unseeded_loads_agree_on_observed_columns() {
    let (_a, first) = load_fixture(None);
    let (_b, second) = load_fixture(None);

    for (a, b) in first.get_all().iter().zip(second.get_all()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.name, b.name);
        assert_eq!(a.district, b.district);
        assert_eq!(a.sport_type, b.sport_type);
        assert_eq!(a.facilities, b.facilities);
        if a.provenance.price != Provenance::Estimated {
            assert_eq!(a.price_per_hour, b.price_per_hour);
        }
    }
}

#[test]
fn test_enumerate_is_sorted_and_deduplicated() {
    let (_dir, catalog) = load_fixture(Some(1));

    // 城市瑜珈 has no district and contributes nothing
    let mut expected = vec!["中正區".to_string(), "大安區".to_string(), "信義區".to_string()];
    expected.sort();
    assert_eq!(catalog.enumerate(CatalogField::District), expected);

    let facilities = catalog.enumerate(CatalogField::Facility);
    assert_eq!(
        facilities.iter().filter(|f| f.as_str() == "停車場").count(),
        1
    );
    assert!(facilities.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_title_mentioning_sport_does_not_hide_the_header() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "titled.csv",
        "台北市運動場館一覽,,\n名稱,行政區,地址\n甲館,大安區,台北市大安區1號\n乙館,信義區,台北市信義區2號\n",
    );

    let catalog = VenueCatalog::load_or_empty(&dataset_settings(path, Some(3)), &normalizer_settings());

    let names: Vec<&str> = catalog.get_all().iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["甲館", "乙館"]);
    assert_eq!(catalog.get_all()[1].district, "信義區");
}

#[test]
fn test_missing_source_degrades_to_empty_catalog() {
    let dir = TempDir::new().unwrap();
    let dataset = dataset_settings(dir.path().join("nope.csv"), None);

    let err = load_catalog(&dataset, &normalizer_settings()).unwrap_err();
    assert!(err.is_absence());

    let catalog = VenueCatalog::load_or_empty(&dataset, &normalizer_settings());
    assert!(catalog.is_empty());
    assert!(services::search(catalog.get_all(), "anything")
        .unwrap_or_default()
        .is_empty());
    assert!(services::filter(catalog.get_all(), &VenueFilter::default()).is_empty());
    assert!(catalog.enumerate(CatalogField::District).is_empty());
    assert!(catalog.get_by_id(VenueId::new(1)).is_none());
}

#[test]
fn test_first_existing_candidate_wins() {
    let dir = TempDir::new().unwrap();
    let real = write_csv(dir.path(), "venues.csv", VENUE_CSV);
    let mut dataset = dataset_settings(dir.path().join("missing.csv"), Some(1));
    dataset.paths.push(real.clone());
    dataset.paths.push(PathBuf::from("never/reached.csv"));

    let catalog = load_catalog(&dataset, &normalizer_settings()).unwrap();
    assert_eq!(catalog.source().unwrap().path, real);
}

#[test]
fn test_cache_keeps_catalog_until_file_changes() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "venues.csv", VENUE_CSV);
    let dataset = dataset_settings(path.clone(), None);
    let cache = CatalogCache::new();

    let (first, status) = cache.get_or_load(&dataset, &normalizer_settings()).unwrap();
    assert_eq!(status, CacheStatus::Loaded);

    // Unseeded: only the cache can make the synthesized values agree
    let (second, status) = cache.get_or_load(&dataset, &normalizer_settings()).unwrap();
    assert_eq!(status, CacheStatus::Hit);
    assert_eq!(first.get_all(), second.get_all());

    let trimmed: String = VENUE_CSV.lines().take(4).map(|l| format!("{}\n", l)).collect();
    write_csv(dir.path(), "venues.csv", &trimmed);
    let (third, status) = cache.get_or_load(&dataset, &normalizer_settings()).unwrap();
    assert_eq!(status, CacheStatus::Loaded);
    assert_eq!(third.len(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_source_ids_are_kept_when_unique() {
    let dir = TempDir::new().unwrap();
    let csv = "id,name,district,sport_type,price_per_hour,rating\n\
               7,Alpha,大安區,Basketball,250,4.2\n\
               12,Beta,信義區,Tennis,400,3.9\n";
    let path = write_csv(dir.path(), "venues.csv", csv);

    let catalog = load_catalog(&dataset_settings(path, Some(1)), &normalizer_settings()).unwrap();
    let beta = catalog.get_by_id(VenueId::new(12)).unwrap();
    assert_eq!(beta.name, "Beta");
    assert_eq!(beta.price_per_hour, 400.0);
    assert_eq!(beta.provenance.price, Provenance::Observed);
    assert!(catalog.get_by_id(VenueId::new(1)).is_none());
}

#[test]
fn test_venue_csv_env_override_is_tried_first() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "override.csv", VENUE_CSV);
    let path_str = path.to_string_lossy().into_owned();

    let config = with_scoped_env(
        &[
            ("VENUE_CSV", Some(path_str.as_str())),
            ("VENUE_SEED", Some("99")),
        ],
        AppConfig::load_or_default,
    );

    assert_eq!(config.dataset.paths.first(), Some(&path));
    assert_eq!(config.dataset.seed, Some(99));

    let catalog = VenueCatalog::load_or_empty(&config.dataset, &config.normalizer);
    assert_eq!(catalog.len(), VENUE_CSV_ROWS);
}
