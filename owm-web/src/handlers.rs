//! Route handlers: parse input, fetch, render.
//!
//! Upstream failures never become HTTP errors; they are rendered into the
//! page. Only bad coordinates are rejected, with a plain-text 400.

use axum::{
    Form,
    extract::{Path, Query, State, rejection::FormRejection},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use owm_core::{CoordinateError, Coordinates};
use serde::Deserialize;

use crate::{assets, render, server::AppState};

#[derive(Debug, Deserialize)]
pub struct CityForm {
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoordsQuery {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
}

impl CoordsQuery {
    fn coordinates(&self) -> Result<Coordinates, CoordinateError> {
        Coordinates::parse(self.lat.as_deref(), self.lon.as_deref())
    }
}

fn bad_request(err: CoordinateError) -> Response {
    tracing::info!("Rejected coordinates: {}", err);
    (StatusCode::BAD_REQUEST, err.to_string()).into_response()
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let city = state.default_city.to_string();
    city_page(&state, city).await
}

/// `POST /` — a missing or non-urlencoded body counts as no city.
pub async fn index_submit(
    State(state): State<AppState>,
    form: Result<Form<CityForm>, FormRejection>,
) -> Html<String> {
    let city = form
        .map_err(|e| tracing::debug!("No usable city form: {}", e))
        .ok()
        .and_then(|Form(form)| form.city)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| state.default_city.to_string());
    city_page(&state, city).await
}

async fn city_page(state: &AppState, city: String) -> Html<String> {
    tracing::info!("Forecast requested for city: {}", city);

    let html = match state.provider.city_forecast(&city).await {
        Ok(forecast) => render::city_page(&city, Some(&forecast), None, state.units),
        Err(e) => {
            tracing::warn!("Forecast for {} failed: {}", city, e);
            render::city_page(&city, None, Some(&e.user_message()), state.units)
        }
    };
    Html(html)
}

/// `GET /coords?lat=&lon=`
pub async fn coords(State(state): State<AppState>, Query(query): Query<CoordsQuery>) -> Response {
    let coords = match query.coordinates() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };
    tracing::info!("Current weather requested for {}", coords);

    let html = match state.provider.coords_weather(coords).await {
        Ok(weather) => render::coords_page(coords, Some(&weather), None, state.units),
        Err(e) => {
            tracing::warn!("Current weather for {} failed: {}", coords, e);
            render::coords_page(coords, None, Some(&e.user_message()), state.units)
        }
    };
    Html(html).into_response()
}

/// `GET /onecall?lat=&lon=`
pub async fn one_call(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> Response {
    let coords = match query.coordinates() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };
    tracing::info!("One Call requested for {}", coords);

    let html = match state.provider.one_call(coords).await {
        Ok(data) => {
            let place = state.provider.reverse_geocode(coords).await;
            render::one_call_page(coords, place.as_deref(), Some(&data), None, state.units)
        }
        Err(e) => {
            tracing::warn!("One Call for {} failed: {}", coords, e);
            render::one_call_page(coords, None, None, Some(&e.user_message()), state.units)
        }
    };
    Html(html).into_response()
}

/// `GET /sw.js` — served from the root so its scope covers every page.
pub async fn service_worker() -> Response {
    let mut res = assets::serve("sw.js");
    if res.status().is_success() {
        let headers = res.headers_mut();
        headers.insert("service-worker-allowed", HeaderValue::from_static("/"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    }
    res
}

/// `GET /static/{*path}`
pub async fn static_asset(Path(path): Path<String>) -> Response {
    assets::serve(&path)
}

/// `GET /ping`
pub async fn ping() -> &'static str {
    "pong"
}
