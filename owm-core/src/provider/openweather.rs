use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

use crate::{
    Config, Coordinates, Units,
    error::WeatherError,
    localtime,
    model::{CoordsWeather, CurrentWeather, Forecast, GeoPlace, OneCall},
};

use super::WeatherProvider;

const FORECAST_PATH: &str = "/data/2.5/forecast";
const CURRENT_PATH: &str = "/data/2.5/weather";
const ONE_CALL_PATH: &str = "/data/3.0/onecall";
const REVERSE_GEO_PATH: &str = "/geo/1.0/reverse";

type Query = Vec<(&'static str, String)>;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: Option<String>,
    base_url: String,
    lang: String,
    units: Units,
    forecast_count: u32,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key: config.api_key().map(str::to_owned),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            lang: config.lang.clone(),
            units: config.units,
            forecast_count: config.forecast_count,
            http,
        })
    }

    fn api_key(&self) -> Result<&str, WeatherError> {
        self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)
    }

    /// `appid`, `lang` and `units`, shared by the data endpoints.
    fn base_query(&self) -> Result<Query, WeatherError> {
        Ok(vec![
            ("appid", self.api_key()?.to_owned()),
            ("lang", self.lang.clone()),
            ("units", self.units.as_str().to_owned()),
        ])
    }

    fn coords_query(&self, coords: Coordinates) -> Result<Query, WeatherError> {
        let mut query = self.base_query()?;
        query.push(("lat", coords.lat.to_string()));
        query.push(("lon", coords.lon.to_string()));
        Ok(query)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &Query,
    ) -> Result<T, WeatherError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| WeatherError::Network {
                endpoint,
                source: source.without_url(),
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Network {
                endpoint,
                source: source.without_url(),
            })?;

        tracing::debug!(endpoint, %status, bytes = body.len(), "OpenWeather response");

        if !status.is_success() {
            return Err(WeatherError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Parse { endpoint, source })
    }

    #[instrument(skip(self), level = "info")]
    pub async fn fetch_city_forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        let mut query = self.base_query()?;
        query.push(("q", city.to_owned()));
        query.push(("cnt", self.forecast_count.to_string()));

        let mut forecast: Forecast = self.get_json("forecast", FORECAST_PATH, &query).await?;
        localtime::annotate_forecast(&mut forecast);
        Ok(forecast)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn fetch_coords_forecast(&self, coords: Coordinates) -> Result<Forecast, WeatherError> {
        let query = self.coords_query(coords)?;

        let mut forecast: Forecast = self.get_json("forecast", FORECAST_PATH, &query).await?;
        localtime::annotate_forecast(&mut forecast);
        Ok(forecast)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current(&self, coords: Coordinates) -> Result<CurrentWeather, WeatherError> {
        let query = self.coords_query(coords)?;

        let mut current: CurrentWeather = self.get_json("weather", CURRENT_PATH, &query).await?;
        localtime::annotate_current(&mut current);
        Ok(current)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn fetch_one_call(&self, coords: Coordinates) -> Result<OneCall, WeatherError> {
        let mut query = self.coords_query(coords)?;
        query.push(("exclude", "minutely".to_owned()));

        let mut one_call: OneCall = self.get_json("onecall", ONE_CALL_PATH, &query).await?;
        localtime::annotate_one_call(&mut one_call);
        Ok(one_call)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn fetch_place(&self, coords: Coordinates) -> Result<Option<GeoPlace>, WeatherError> {
        let query: Query = vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("limit", "1".to_owned()),
            ("appid", self.api_key()?.to_owned()),
        ];

        let places: Vec<GeoPlace> = self.get_json("geo/reverse", REVERSE_GEO_PATH, &query).await?;
        Ok(places.into_iter().next())
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn city_forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        self.fetch_city_forecast(city).await
    }

    async fn coords_weather(&self, coords: Coordinates) -> Result<CoordsWeather, WeatherError> {
        let current = self.fetch_current(coords).await?;
        let forecast = self.fetch_coords_forecast(coords).await?;
        Ok(CoordsWeather { current, forecast })
    }

    async fn one_call(&self, coords: Coordinates) -> Result<OneCall, WeatherError> {
        self.fetch_one_call(coords).await
    }

    async fn reverse_geocode(&self, coords: Coordinates) -> Option<String> {
        match self.fetch_place(coords).await {
            Ok(place) => {
                let name = place.map(|p| p.display_name());
                tracing::info!(?name, "Reverse geocoded {}", coords);
                name
            }
            Err(e) => {
                tracing::debug!("Reverse geocode failed: {}", e);
                None
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // 2023-11-14 22:13:20 UTC
    const TS: i64 = 1_700_000_000;

    fn provider(server: &MockServer) -> OpenWeatherProvider {
        let cfg = Config {
            api_key: Some("TESTKEY".into()),
            api_base: format!("{}/", server.uri()),
            ..Config::default()
        };
        OpenWeatherProvider::from_config(&cfg).unwrap()
    }

    fn sample(dt: i64, description: &str) -> serde_json::Value {
        serde_json::json!({
            "dt": dt,
            "dt_txt": "",
            "main": { "temp": 14.2, "feels_like": 13.0, "temp_min": 12.0, "temp_max": 15.0, "humidity": 71 },
            "weather": [{ "main": "Clouds", "description": description, "icon": "03d" }],
            "wind": { "speed": 3.4 },
            "pop": 0.2
        })
    }

    fn forecast_body(timezone: i64) -> serde_json::Value {
        serde_json::json!({
            "cod": "200",
            "city": { "name": "Tokyo", "country": "JP", "timezone": timezone },
            "list": [sample(TS, "曇り"), sample(TS + 10_800, "小雨")]
        })
    }

    #[tokio::test]
    async fn city_forecast_sends_expected_query_and_annotates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Tokyo,JP"))
            .and(query_param("appid", "TESTKEY"))
            .and(query_param("lang", "ja"))
            .and(query_param("units", "metric"))
            .and(query_param("cnt", "8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(32_400)))
            .expect(1)
            .mount(&server)
            .await;

        let forecast = provider(&server).city_forecast("Tokyo,JP").await.unwrap();

        assert_eq!(forecast.city.name, "Tokyo");
        assert_eq!(forecast.list.len(), 2);
        // latest first
        assert_eq!(forecast.list[0].dt, TS + 10_800);
        assert_eq!(forecast.list[0].local_dt_txt.as_deref(), Some("2023-11-15 10:13"));
        assert_eq!(forecast.list[1].local_dt_txt.as_deref(), Some("2023-11-15 07:13"));
    }

    #[tokio::test]
    async fn missing_key_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cfg = Config {
            api_key: Some("  ".into()),
            api_base: server.uri(),
            ..Config::default()
        };
        let provider = OpenWeatherProvider::from_config(&cfg).unwrap();

        let err = provider.city_forecast("Tokyo,JP").await.unwrap_err();
        assert_eq!(err.to_string(), "APIキーが読み込めていません（OWM_API_KEY）");
    }

    #[tokio::test]
    async fn upstream_error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "cod": "404",
                "message": "city not found"
            })))
            .mount(&server)
            .await;

        let err = provider(&server).city_forecast("Nowhere").await.unwrap_err();
        match &err {
            WeatherError::Status { endpoint, status, body } => {
                assert_eq!(*endpoint, "forecast");
                assert_eq!(status.as_u16(), 404);
                assert!(body.contains("city not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.user_message().starts_with("天気情報の取得に失敗しました: "));
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).city_forecast("Tokyo,JP").await.unwrap_err();
        assert!(matches!(err, WeatherError::Parse { endpoint: "forecast", .. }));
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error_without_the_key() {
        let cfg = Config {
            api_key: Some("SECRETKEY42".into()),
            api_base: "http://127.0.0.1:1".into(),
            timeout_secs: 2,
            ..Config::default()
        };
        let provider = OpenWeatherProvider::from_config(&cfg).unwrap();

        let err = provider.city_forecast("Tokyo,JP").await.unwrap_err();
        assert!(matches!(err, WeatherError::Network { endpoint: "forecast", .. }));
        assert!(!err.to_string().contains("SECRETKEY42"));
        assert!(!format!("{err:?}").contains("SECRETKEY42"));
        assert!(!err.user_message().contains("SECRETKEY42"));
    }

    #[tokio::test]
    async fn coords_weather_uses_each_responses_own_offset() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "40.7128"))
            .and(query_param("lon", "-74.006"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "New York",
                "dt": TS,
                "timezone": -18_000,
                "main": { "temp": 8.0, "humidity": 50 },
                "weather": [{ "description": "晴天", "icon": "01d" }],
                "wind": { "speed": 2.0 },
                "sys": { "country": "US" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("lat", "40.7128"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(-18_000)))
            .expect(1)
            .mount(&server)
            .await;

        let coords = Coordinates::new(40.7128, -74.006).unwrap();
        let weather = provider(&server).coords_weather(coords).await.unwrap();

        assert_eq!(weather.current.sys.country, "US");
        assert_eq!(weather.current.local_dt_txt.as_deref(), Some("2023-11-14 17:13"));
        assert_eq!(weather.forecast.list[1].local_dt_txt.as_deref(), Some("2023-11-14 17:13"));
    }

    #[tokio::test]
    async fn one_call_annotates_current_hourly_and_daily() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/3.0/onecall"))
            .and(query_param("exclude", "minutely"))
            .and(query_param("appid", "TESTKEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "lat": 35.6895,
                "lon": 139.6917,
                "timezone": "Asia/Tokyo",
                "timezone_offset": 32_400,
                "current": {
                    "dt": TS, "temp": 12.0, "feels_like": 11.0, "humidity": 60,
                    "uvi": 0.0, "wind_speed": 1.5,
                    "weather": [{ "description": "晴天", "icon": "01n" }]
                },
                "hourly": [
                    { "dt": TS, "temp": 12.0, "pop": 0.0, "weather": [] },
                    { "dt": TS + 3600, "temp": 11.5, "pop": 0.1, "weather": [] }
                ],
                "daily": [
                    { "dt": TS, "temp": { "day": 15.0, "min": 9.0, "max": 17.0 }, "pop": 0.3, "weather": [] }
                ]
            })))
            .mount(&server)
            .await;

        let coords = Coordinates::new(35.6895, 139.6917).unwrap();
        let one_call = provider(&server).one_call(coords).await.unwrap();

        assert_eq!(one_call.timezone, "Asia/Tokyo");
        assert_eq!(one_call.current.local_dt_txt.as_deref(), Some("2023-11-15 07:13"));
        assert_eq!(one_call.hourly[1].local_dt_txt.as_deref(), Some("2023-11-15 08:13"));
        assert_eq!(one_call.daily[0].local_dt_txt.as_deref(), Some("2023-11-15 07:13"));
        assert_eq!(one_call.daily[0].temp.max, 17.0);
    }

    #[tokio::test]
    async fn reverse_geocode_prefers_japanese_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "name": "Shibuya",
                    "local_names": { "ja": "渋谷区", "en": "Shibuya" },
                    "lat": 35.66, "lon": 139.70,
                    "country": "JP"
                }
            ])))
            .mount(&server)
            .await;

        let coords = Coordinates::new(35.66, 139.70).unwrap();
        let name = provider(&server).reverse_geocode(coords).await;
        assert_eq!(name.as_deref(), Some("渋谷区, JP"));
    }

    #[tokio::test]
    async fn reverse_geocode_failures_become_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let coords = Coordinates::new(0.0, 0.0).unwrap();
        assert!(provider(&server).reverse_geocode(coords).await.is_none());
    }

    #[tokio::test]
    async fn reverse_geocode_empty_result_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let coords = Coordinates::new(0.0, 0.0).unwrap();
        assert!(provider(&server).reverse_geocode(coords).await.is_none());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "雨".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
