use thiserror::Error;

/// Failures while talking to OpenWeather.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("APIキーが読み込めていません（OWM_API_KEY）")]
    MissingApiKey,

    #[error("OpenWeather {endpoint} request failed: {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("OpenWeather {endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse OpenWeather {endpoint} JSON: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl WeatherError {
    /// Message shown on the rendered page when a fetch fails.
    pub fn user_message(&self) -> String {
        format!("天気情報の取得に失敗しました: {self}")
    }
}

/// Rejections for the `lat`/`lon` query pair.
#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("lat と lon を指定してください")]
    Missing,

    #[error("lat/lon は数値で指定してください: {0}")]
    Invalid(String),

    #[error("座標が範囲外です (lat: -90〜90, lon: -180〜180): {lat}, {lon}")]
    OutOfRange { lat: f64, lon: f64 },
}
