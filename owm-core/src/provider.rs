use crate::{
    Config, Coordinates,
    error::WeatherError,
    model::{CoordsWeather, Forecast, OneCall},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of weather data for the pages. Every returned sample already
/// carries its local display time.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// 3-hour forecast for a city query such as `"Tokyo,JP"`.
    async fn city_forecast(&self, city: &str) -> Result<Forecast, WeatherError>;

    /// Current conditions plus the 3-hour forecast for a coordinate pair.
    async fn coords_weather(&self, coords: Coordinates) -> Result<CoordsWeather, WeatherError>;

    /// One Call 3.0: current, hourly and daily in one response.
    async fn one_call(&self, coords: Coordinates) -> Result<OneCall, WeatherError>;

    /// Place name for a coordinate pair. `None` when the lookup fails;
    /// callers fall back to showing the coordinates.
    async fn reverse_geocode(&self, coords: Coordinates) -> Option<String>;
}

/// Construct the OpenWeather-backed provider from config.
///
/// A missing API key is not an error here: it is reported per request so
/// the page can show it.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    if !config.has_api_key() {
        tracing::warn!("OWM_API_KEY is not set; every weather request will fail");
    }

    let provider = OpenWeatherProvider::from_config(config)?;
    Ok(Box::new(provider))
}
