//! Weather snapshots from a stored district forecast payload.
//!
//! The payload groups forecast series by city and district. For each element
//! (description, temperature, humidity, ...) the time entry closest to `now`
//! is picked, and anything missing falls back to a fixed default so a snapshot
//! is always complete.

use std::collections::{BTreeMap, HashMap};
use std::fs;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::WeatherSettings;
use crate::error::{DataError, DataResult};
use crate::models::{ComfortIndex, WeatherIcon, WeatherSnapshot};

pub const DEFAULT_DESCRIPTION: &str = "晴";
pub const DEFAULT_TEMPERATURE: f64 = 28.0;
pub const DEFAULT_HUMIDITY: f64 = 70.0;
pub const DEFAULT_PRECIPITATION: f64 = 10.0;
pub const WIND_PLACEHOLDER: &str = "—";

const DESCRIPTION_ELEMENTS: &[&str] = &["WeatherDescription", "Wx", "天氣現象", "天氣預報綜合描述"];
const TEMPERATURE_ELEMENTS: &[&str] = &["T", "溫度", "平均溫度"];
const HUMIDITY_ELEMENTS: &[&str] = &["RH", "相對濕度", "平均相對濕度"];
const WIND_ELEMENTS: &[&str] = &["Wind", "風向風速"];
const WIND_DIRECTION_ELEMENTS: &[&str] = &["WD", "風向"];
const WIND_SPEED_ELEMENTS: &[&str] = &["WS", "風速"];
const PRECIPITATION_ELEMENTS: &[&str] = &["PoP6h", "PoP12h", "降雨機率", "3小時降雨機率", "12小時降雨機率"];
const APPARENT_ELEMENTS: &[&str] = &["AT", "體感溫度"];

const DESCRIPTION_KEYS: &[&str] = &["Weather", "WeatherDescription"];
const TEMPERATURE_KEYS: &[&str] = &["Temperature"];
const HUMIDITY_KEYS: &[&str] = &["RelativeHumidity"];
const WIND_DIRECTION_KEYS: &[&str] = &["WindDirection"];
const WIND_SPEED_KEYS: &[&str] = &["WindSpeed", "BeaufortScale"];
const PRECIPITATION_KEYS: &[&str] = &["ProbabilityOfPrecipitation"];
const APPARENT_KEYS: &[&str] = &["ApparentTemperature"];

// ---- payload shape ----

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    records: Records,
}

#[derive(Debug, Default, Deserialize)]
struct Records {
    #[serde(rename = "Locations", alias = "locations", default)]
    groups: Vec<LocationGroup>,
}

#[derive(Debug, Deserialize)]
struct LocationGroup {
    #[serde(rename = "LocationsName", alias = "locationsName", default)]
    name: String,
    #[serde(rename = "Location", alias = "location", default)]
    locations: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(rename = "LocationName", alias = "locationName", default)]
    name: String,
    #[serde(rename = "WeatherElement", alias = "weatherElement", default)]
    elements: Vec<RawElement>,
}

#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "ElementName", alias = "elementName", default)]
    name: String,
    #[serde(rename = "Time", alias = "time", default)]
    times: Vec<RawTime>,
}

#[derive(Debug, Deserialize)]
struct RawTime {
    #[serde(rename = "DataTime", alias = "dataTime", default)]
    data_time: Option<String>,
    #[serde(rename = "StartTime", alias = "startTime", default)]
    start_time: Option<String>,
    #[serde(rename = "ElementValue", alias = "elementValue", default)]
    value: Value,
}

// ---- parsed series ----

#[derive(Debug, Clone)]
struct TimedValue {
    at: DateTime<FixedOffset>,
    fields: Map<String, Value>,
}

impl TimedValue {
    /// First present key among `keys`, then `Value`, then any scalar field.
    fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .chain(["Value", "value"].iter())
            .find_map(|k| self.fields.get(*k).and_then(scalar_text))
            .or_else(|| self.fields.values().find_map(scalar_text))
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

type Series = Vec<TimedValue>;

/// Parse a payload timestamp. Naive timestamps are read in `offset`.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

fn first_value_object(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Array(items) => items.first().and_then(|v| v.as_object()).cloned(),
        Value::Object(map) => Some(map.clone()),
        _ => None,
    }
}

/// Comfort score in points; higher is more comfortable.
pub fn comfort_score(temperature: f64, humidity: f64, precipitation: f64) -> f64 {
    10.0 - ((temperature - 26.0).max(0.0) * 0.2
        + (humidity - 60.0).max(0.0) * 0.05
        + precipitation * 0.02)
}

pub fn comfort_index(temperature: f64, humidity: f64, precipitation: f64) -> ComfortIndex {
    ComfortIndex::from_score(comfort_score(temperature, humidity, precipitation))
}

/// Icon category for a description and temperature.
pub fn icon_for(description: &str, temperature: f64) -> WeatherIcon {
    let d = description.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| d.contains(n));
    if has(&["雨", "rain"]) {
        WeatherIcon::Rain
    } else if has(&["雷", "thunder"]) {
        WeatherIcon::Thunder
    } else if has(&["雲", "陰", "cloud", "overcast"]) {
        WeatherIcon::Cloudy
    } else if temperature >= 32.0 {
        WeatherIcon::Hot
    } else if temperature <= 15.0 {
        WeatherIcon::Cold
    } else {
        WeatherIcon::Fair
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Splits combined wind text such as `東北風 3 級` into direction and speed.
fn split_wind(text: &str) -> (Option<String>, Option<String>) {
    let normalized = text.replace('\u{3000}', " ");
    let mut parts = normalized.split_whitespace();
    (
        parts.next().map(str::to_string),
        parts.next().map(str::to_string),
    )
}

/// District-level forecast series, read once and queried per request.
#[derive(Debug, Clone)]
pub struct WeatherResolver {
    locations: BTreeMap<String, HashMap<String, Series>>,
    offset: FixedOffset,
}

impl WeatherResolver {
    /// Resolver with no districts; every snapshot is the default one.
    pub fn empty(offset: FixedOffset) -> Self {
        Self {
            locations: BTreeMap::new(),
            offset,
        }
    }

    fn offset_from(settings: &WeatherSettings) -> DataResult<FixedOffset> {
        settings
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                DataError::Configuration(format!(
                    "Invalid weather utc_offset_hours: {}",
                    settings.utc_offset_hours
                ))
            })
    }

    /// Parse a payload string. Groups not named in `city_names` are ignored.
    pub fn from_json_str(text: &str, settings: &WeatherSettings) -> DataResult<Self> {
        let offset = Self::offset_from(settings)?;
        let payload: Payload = serde_json::from_str(text)?;

        let mut locations = BTreeMap::new();
        let mut skipped = 0usize;
        for group in payload.records.groups {
            if !settings.city_names.iter().any(|c| c == group.name.trim()) {
                continue;
            }
            for location in group.locations {
                let mut elements: HashMap<String, Series> = HashMap::new();
                for element in location.elements {
                    let series: Series = element
                        .times
                        .into_iter()
                        .filter_map(|t| {
                            let stamp = t.data_time.as_deref().or(t.start_time.as_deref())?;
                            match parse_timestamp(stamp, offset) {
                                Some(at) => Some(TimedValue {
                                    at,
                                    fields: first_value_object(&t.value).unwrap_or_default(),
                                }),
                                None => {
                                    skipped += 1;
                                    None
                                }
                            }
                        })
                        .collect();
                    elements.insert(element.name, series);
                }
                locations.insert(location.name.trim().to_string(), elements);
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {} weather entries with unparseable timestamps", skipped);
        }
        log::info!("Parsed weather for {} districts", locations.len());
        Ok(Self { locations, offset })
    }

    /// Read the first existing payload among the configured candidates.
    pub fn load(settings: &WeatherSettings) -> DataResult<Self> {
        let path = crate::catalog::source::locate(&settings.paths)?;
        let text = fs::read_to_string(&path).map_err(|e| DataError::io(&path, e))?;
        Self::from_json_str(&text, settings)
    }

    /// Like [`load`](Self::load), degrading to an empty resolver.
    pub fn load_or_empty(settings: &WeatherSettings) -> Self {
        match Self::load(settings) {
            Ok(resolver) => resolver,
            Err(e) => {
                log::warn!("Weather data unavailable ({}); using defaults", e);
                let offset = Self::offset_from(settings).unwrap_or_else(|_| Utc.fix());
                Self::empty(offset)
            }
        }
    }

    /// District names present in the payload, sorted.
    pub fn districts(&self) -> Vec<String> {
        self.locations.keys().cloned().collect()
    }

    fn nearest<'a>(&'a self, district: &str, name: &str, now: DateTime<Utc>) -> Option<&'a TimedValue> {
        let series = self.locations.get(district)?.get(name)?;
        let mut best: Option<(&TimedValue, i64)> = None;
        for entry in series {
            let diff = (entry.at.with_timezone(&Utc) - now).num_milliseconds().abs();
            match best {
                Some((_, best_diff)) if diff >= best_diff => {}
                _ => best = Some((entry, diff)),
            }
        }
        best.map(|(entry, _)| entry)
    }

    /// First element among `names` whose nearest entry carries a value.
    fn text_of(&self, district: &str, names: &[&str], keys: &[&str], now: DateTime<Utc>) -> Option<String> {
        names
            .iter()
            .find_map(|n| self.nearest(district, n, now).and_then(|v| v.text(keys)))
    }

    fn number_of(&self, district: &str, names: &[&str], keys: &[&str], now: DateTime<Utc>) -> Option<f64> {
        names.iter().find_map(|n| {
            self.nearest(district, n, now)
                .and_then(|v| v.text(keys))
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        })
    }

    /// Snapshot for `district` at `now`. Unknown districts yield defaults.
    pub fn snapshot_at(&self, district: &str, now: DateTime<Utc>) -> WeatherSnapshot {
        let district = district.trim();

        let description = self
            .text_of(district, DESCRIPTION_ELEMENTS, DESCRIPTION_KEYS, now)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        let temperature = self
            .number_of(district, TEMPERATURE_ELEMENTS, TEMPERATURE_KEYS, now)
            .unwrap_or(DEFAULT_TEMPERATURE);
        let humidity = self
            .number_of(district, HUMIDITY_ELEMENTS, HUMIDITY_KEYS, now)
            .unwrap_or(DEFAULT_HUMIDITY);
        let precipitation = self
            .number_of(district, PRECIPITATION_ELEMENTS, PRECIPITATION_KEYS, now)
            .unwrap_or(DEFAULT_PRECIPITATION);
        let apparent = self
            .number_of(district, APPARENT_ELEMENTS, APPARENT_KEYS, now)
            .unwrap_or(temperature);

        let (mut wind_direction, mut wind_speed) = self
            .text_of(district, WIND_ELEMENTS, &[], now)
            .map(|w| split_wind(&w))
            .unwrap_or((None, None));
        if wind_direction.is_none() {
            wind_direction = self.text_of(district, WIND_DIRECTION_ELEMENTS, WIND_DIRECTION_KEYS, now);
        }
        if wind_speed.is_none() {
            wind_speed = self.text_of(district, WIND_SPEED_ELEMENTS, WIND_SPEED_KEYS, now);
        }

        WeatherSnapshot {
            district: district.to_string(),
            weather_description: description,
            temperature: round_to(temperature, 1),
            humidity: humidity.round(),
            wind_direction: wind_direction.unwrap_or_else(|| WIND_PLACEHOLDER.to_string()),
            wind_speed: wind_speed.unwrap_or_else(|| WIND_PLACEHOLDER.to_string()),
            precipitation_probability: precipitation.round(),
            apparent_temperature: round_to(apparent, 1),
            comfort_index: comfort_index(temperature, humidity, precipitation),
            update_time: now.with_timezone(&self.offset).format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    /// Snapshot at the current wall-clock time.
    pub fn snapshot(&self, district: &str) -> WeatherSnapshot {
        self.snapshot_at(district, Utc::now())
    }
}
