//! Weather snapshot types derived from the forecast payload.

use serde::{Deserialize, Serialize};

/// Qualitative comfort bucket computed from temperature, humidity and
/// precipitation probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComfortIndex {
    Comfortable,
    Acceptable,
    Sultry,
    Uncomfortable,
}

impl ComfortIndex {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.5 {
            Self::Comfortable
        } else if score >= 7.0 {
            Self::Acceptable
        } else if score >= 5.5 {
            Self::Sultry
        } else {
            Self::Uncomfortable
        }
    }

    /// Display label shown to Taipei users.
    pub fn label(self) -> &'static str {
        match self {
            Self::Comfortable => "舒適",
            Self::Acceptable => "尚可",
            Self::Sultry => "悶熱",
            Self::Uncomfortable => "不舒適",
        }
    }
}

impl std::fmt::Display for ComfortIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Rain,
    Thunder,
    Cloudy,
    Hot,
    Cold,
    Fair,
}

impl WeatherIcon {
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Rain => "🌧️",
            Self::Thunder => "⛈️",
            Self::Cloudy => "⛅",
            Self::Hot => "🥵",
            Self::Cold => "🥶",
            Self::Fair => "☀️",
        }
    }
}

/// Weather for one district at one instant. Built per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub district: String,
    pub weather_description: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_direction: String,
    pub wind_speed: String,
    pub precipitation_probability: f64,
    pub apparent_temperature: f64,
    pub comfort_index: ComfortIndex,
    /// `%Y-%m-%d %H:%M` in the payload's local offset.
    pub update_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comfort_thresholds_are_inclusive() {
        assert_eq!(ComfortIndex::from_score(8.5), ComfortIndex::Comfortable);
        assert_eq!(ComfortIndex::from_score(8.49), ComfortIndex::Acceptable);
        assert_eq!(ComfortIndex::from_score(7.0), ComfortIndex::Acceptable);
        assert_eq!(ComfortIndex::from_score(5.5), ComfortIndex::Sultry);
        assert_eq!(ComfortIndex::from_score(5.49), ComfortIndex::Uncomfortable);
    }

    #[test]
    fn test_comfort_label() {
        assert_eq!(ComfortIndex::Sultry.to_string(), "悶熱");
    }
}
