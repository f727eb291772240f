use super::*;
use crate::config::NormalizerSettings;

fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable {
        headers: headers.iter().map(|s| s.to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect(),
    }
}

fn normalize(t: &RawTable) -> Vec<VenueRecord> {
    let settings = NormalizerSettings::default();
    Normalizer::new(&settings, Some(42)).normalize(t).unwrap()
}

#[test]
fn test_chinese_headers_map_to_canonical_fields() {
    let t = table(
        &["場地名稱", "行政區", "地址", "運動類型", "評分"],
        &[&["大安運動中心", "大安區", "辛亥路三段55號", "羽球/游泳", "4.6"]],
    );
    let venues = normalize(&t);
    assert_eq!(venues.len(), 1);
    let v = &venues[0];
    assert_eq!(v.name, "大安運動中心");
    assert_eq!(v.district, "大安區");
    assert_eq!(v.address, "辛亥路三段55號");
    assert_eq!(v.sport_type, "羽毛球");
    assert_eq!(v.rating, 4.6);
    assert_eq!(v.provenance.rating, Provenance::Observed);
}

#[test]
fn test_alias_match_is_case_insensitive() {
    let map = ColumnMap::from_headers(&["NAME".to_string(), "Address".to_string()]);
    assert_eq!(map.index_of("name"), Some(0));
    assert_eq!(map.index_of("address"), Some(1));
}

#[test]
fn test_exact_alias_beats_later_alias() {
    let headers: Vec<String> = ["地點", "name"].iter().map(|s| s.to_string()).collect();
    let map = ColumnMap::from_headers(&headers);
    assert_eq!(map.index_of("name"), Some(1));
    assert!(!map.contains("address"));
}

#[test]
fn test_positional_fallback_for_thirteen_columns() {
    let headers: Vec<&str> = (0..13).map(|_| "欄").collect();
    let row: [&str; 13] = [
        "松山網球場", "松山區", "200-500", "網球", "06:00-22:00", "停車場", "中型", "網球課",
        "夜間照明", "https://example.tw", "八德路四段", "02-1234", "",
    ];
    let venues = normalize(&table(&headers, &[&row]));
    let v = &venues[0];
    assert_eq!(v.name, "松山網球場");
    assert_eq!(v.price_per_hour, 350.0);
    assert_eq!(v.provenance.price, Provenance::Derived);
    assert_eq!(v.description, "夜間照明");
    assert_eq!(v.venue_scale, "中型");
    assert_eq!(v.courses, "網球課");
    assert_eq!(v.address, "八德路四段");
}

#[test]
fn test_missing_name_column_is_an_error() {
    let settings = NormalizerSettings::default();
    let err = Normalizer::new(&settings, Some(1))
        .normalize(&table(&["地址"], &[&["x"]]))
        .unwrap_err();
    assert!(matches!(err, DataError::MissingColumn(_)));
}

#[test]
fn test_rows_without_name_are_dropped_and_ids_assigned_in_order() {
    let t = table(&["name"], &[&["A"], &["  "], &[""], &["B"]]);
    let venues = normalize(&t);
    let ids: Vec<i64> = venues.iter().map(|v| v.id.value()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(venues[1].name, "B");
}

#[test]
fn test_source_ids_kept_when_unique() {
    let t = table(&["id", "name"], &[&["10", "A"], &["7.0", "B"]]);
    let ids: Vec<i64> = normalize(&t).iter().map(|v| v.id.value()).collect();
    assert_eq!(ids, vec![10, 7]);
}

#[test]
fn test_duplicate_source_ids_are_renumbered() {
    let t = table(&["id", "name"], &[&["5", "A"], &["5", "B"], &["x", "C"]]);
    let ids: Vec<i64> = normalize(&t).iter().map(|v| v.id.value()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_sport_type_rules() {
    assert_eq!(normalize_sport_type(""), "綜合運動");
    assert_eq!(normalize_sport_type("  "), "綜合運動");
    assert_eq!(normalize_sport_type("室內羽球"), "羽毛球");
    assert_eq!(normalize_sport_type("重訓室"), "健身");
    assert_eq!(normalize_sport_type("攀岩/籃球/游泳"), "籃球");
    assert_eq!(normalize_sport_type(" 攀岩 "), "攀岩");
}

#[test]
fn test_facility_rules() {
    assert_eq!(normalize_facilities(""), "基本設施");
    assert_eq!(normalize_facilities("停車場、淋浴間、WiFi"), "淋浴間/停車場/Wi-Fi");
    assert_eq!(normalize_facilities("Wi-Fi 與 WiFi"), "Wi-Fi");
    assert_eq!(normalize_facilities(" 飲水機 "), "飲水機");
}

#[test]
fn test_price_buckets_and_dash_variants() {
    let settings = NormalizerSettings::default();
    let mut n = Normalizer::new(&settings, Some(3));
    assert_eq!(n.price_from_range(Some("0-200")), (150.0, Provenance::Derived));
    assert_eq!(n.price_from_range(Some("200～500元")), (350.0, Provenance::Derived));
    assert_eq!(n.price_from_range(Some("200–500")), (350.0, Provenance::Derived));
    assert_eq!(n.price_from_range(Some("500以上")), (700.0, Provenance::Derived));
    assert_eq!(n.price_from_range(Some("500+")), (700.0, Provenance::Derived));
    assert_eq!(n.price_from_range(Some("NT$1,200/小時")), (1200.0, Provenance::Derived));
}

#[test]
fn test_price_fallbacks_are_estimated_within_range() {
    let settings = NormalizerSettings::default();
    let mut n = Normalizer::new(&settings, Some(9));
    for _ in 0..50 {
        let (blank, p) = n.price_from_range(None);
        assert_eq!(p, Provenance::Estimated);
        assert!((100.0..=500.0).contains(&blank));
        let (text, p) = n.price_from_range(Some("洽詢"));
        assert_eq!(p, Provenance::Estimated);
        assert!((200.0..=400.0).contains(&text));
        assert_eq!(text.fract(), 0.0);
    }
}

#[test]
fn test_unparseable_price_column_falls_back_to_range() {
    let t = table(&["name", "price_per_hour", "price_range"], &[&["A", "免費?", "0-200"], &["B", "280", ""]]);
    let venues = normalize(&t);
    assert_eq!(venues[0].price_per_hour, 150.0);
    assert_eq!(venues[0].provenance.price, Provenance::Derived);
    assert_eq!(venues[1].price_per_hour, 280.0);
    assert_eq!(venues[1].provenance.price, Provenance::Observed);
}

#[test]
fn test_rating_clamped_or_synthesized() {
    let settings = NormalizerSettings::default();
    let mut n = Normalizer::new(&settings, Some(5));
    assert_eq!(n.rating(Some("7.5")), (5.0, Provenance::Observed));
    assert_eq!(n.rating(Some("-1")), (0.0, Provenance::Observed));
    for _ in 0..50 {
        let (r, p) = n.rating(Some("n/a"));
        assert_eq!(p, Provenance::Estimated);
        assert!((3.5..=5.0).contains(&r));
        assert!(((r * 10.0).round() - r * 10.0).abs() < 1e-9);
    }
}

#[test]
fn test_coordinates_observed_derived_or_estimated() {
    let t = table(
        &["name", "district", "latitude", "longitude"],
        &[
            &["A", "大安區", "25.02", "121.54"],
            &["B", "信義區", "", "121.57"],
            &["C", "新店區", "abc", ""],
        ],
    );
    let venues = normalize(&t);
    assert_eq!((venues[0].latitude, venues[0].longitude), (25.02, 121.54));
    assert_eq!(venues[0].provenance.coordinates, Provenance::Observed);
    assert_eq!((venues[1].latitude, venues[1].longitude), (25.0336, 121.5751));
    assert_eq!(venues[1].provenance.coordinates, Provenance::Derived);
    assert_eq!((venues[2].latitude, venues[2].longitude), DEFAULT_CENTROID);
    assert_eq!(venues[2].provenance.coordinates, Provenance::Estimated);
}

#[test]
fn test_description_falls_back_to_other_and_extras_kept() {
    let t = table(&["name", "其他", "備註"], &[&["A", "有教練", "週一休館"]]);
    let v = &normalize(&t)[0];
    assert_eq!(v.description, "有教練");
    assert_eq!(v.extra.get("備註").map(String::as_str), Some("週一休館"));
    assert!(!v.extra.contains_key("其他"));
}

#[test]
fn test_same_seed_same_output() {
    let t = table(&["name"], &[&["A"], &["B"], &["C"]]);
    assert_eq!(normalize(&t), normalize(&t));
}
