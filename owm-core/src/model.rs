//! OpenWeather response shapes, trimmed to the fields the pages show.
//!
//! Each timestamped sample carries `local_dt_txt`, filled in by
//! [`crate::localtime`] once the response has been parsed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Main {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
}

// ---------------------------------------------------------------------------
// 5 day / 3 hour forecast
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    /// Seconds east of UTC.
    #[serde(default)]
    pub timezone: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    #[serde(default)]
    pub dt_txt: String,
    pub main: Main,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub wind: Wind,
    /// Probability of precipitation, 0.0 to 1.0.
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub local_dt_txt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub city: City,
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

// ---------------------------------------------------------------------------
// Current weather
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sys {
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub name: String,
    pub dt: i64,
    #[serde(default)]
    pub timezone: i64,
    pub main: Main,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub sys: Sys,
    #[serde(default)]
    pub local_dt_txt: Option<String>,
}

/// Current conditions plus the 3-hour forecast for one coordinate pair.
#[derive(Debug, Clone)]
pub struct CoordsWeather {
    pub current: CurrentWeather,
    pub forecast: Forecast,
}

// ---------------------------------------------------------------------------
// One Call 3.0
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneCallCurrent {
    pub dt: i64,
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub uvi: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub local_dt_txt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneCallHourly {
    pub dt: i64,
    pub temp: f64,
    #[serde(default)]
    pub feels_like: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub local_dt_txt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyTemp {
    #[serde(default)]
    pub day: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneCallDaily {
    pub dt: i64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub temp: DailyTemp,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub pop: f64,
    #[serde(default)]
    pub weather: Vec<Condition>,
    #[serde(default)]
    pub local_dt_txt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneCall {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub timezone_offset: i64,
    pub current: OneCallCurrent,
    #[serde(default)]
    pub hourly: Vec<OneCallHourly>,
    #[serde(default)]
    pub daily: Vec<OneCallDaily>,
}

// ---------------------------------------------------------------------------
// Reverse geocoding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalNames {
    #[serde(default)]
    pub ja: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPlace {
    pub name: String,
    #[serde(default)]
    pub local_names: Option<LocalNames>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl GeoPlace {
    /// Human-readable place name, preferring the Japanese local name and
    /// qualified by state (or country) when that differs from the place.
    pub fn display_name(&self) -> String {
        let place = self
            .local_names
            .as_ref()
            .and_then(|n| n.ja.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(self.name.as_str());

        let suffix = self
            .state
            .as_deref()
            .filter(|s| !s.is_empty() && *s != place)
            .or_else(|| self.country.as_deref().filter(|c| !c.is_empty() && *c != place));

        match suffix {
            Some(s) => format!("{place}, {s}"),
            None => place.to_string(),
        }
    }
}

/// First weather condition's description, or a placeholder.
pub fn describe(conditions: &[Condition]) -> &str {
    conditions
        .first()
        .map(|c| c.description.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or("不明")
}
