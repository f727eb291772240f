#![allow(dead_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use venue_finder::config::{DatasetSettings, NormalizerSettings, WeatherSettings};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Variables are restored on unwind, and access is serialized because the
/// process environment is shared by tests running in parallel.
///
/// `Some(v)` sets the variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Export with two title lines above the header, as the venue sheet ships.
///
/// Row notes:
/// - 大安運動中心: observed coordinates, bucketed price, observed rating
/// - 河濱籃球場: no coordinates (district centroid), digits-only price
/// - the 信義區 row with a blank name is dropped
/// - 城市瑜珈: no district and no coordinates (city default), no price, no rating
pub const VENUE_CSV: &str = "\
臺北市場館一覽表,,,,,,,,
資料來源：市府開放資料,,,,,,,,
名稱,行政區,地址,運動,價格區間,設施,評分,緯度,經度
大安運動中心,大安區,臺北市大安區辛亥路三段55號,游泳/健身,200-500,淋浴間、置物櫃、停車場,4.6,25.0210,121.5354
河濱籃球場,中正區,臺北市中正區環河南路,籃球,每小時120元,,,,
  ,信義區,,,,,,,
城市瑜珈,,臺北市某處,瑜伽教室,,提供 WiFi,,,
信義羽球館,信義區,臺北市信義區松仁路,羽毛球,500以上,停車場,4.1,25.0330,121.5680
";

/// Number of named rows in [`VENUE_CSV`].
pub const VENUE_CSV_ROWS: usize = 4;

/// Write `content` (with a UTF-8 byte-order mark) into `dir/name`.
pub fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(content.as_bytes());
    std::fs::write(&path, bytes).expect("write fixture csv");
    path
}

pub fn dataset_settings(path: PathBuf, seed: Option<u64>) -> DatasetSettings {
    DatasetSettings {
        paths: vec![path],
        seed,
        ..DatasetSettings::default()
    }
}

pub fn normalizer_settings() -> NormalizerSettings {
    NormalizerSettings::default()
}

pub fn weather_settings() -> WeatherSettings {
    WeatherSettings {
        paths: Vec::new(),
        ..WeatherSettings::default()
    }
}
