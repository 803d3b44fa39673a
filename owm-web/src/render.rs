//! Server-side HTML for the weather pages.
//!
//! Pages are plain `format!` templates around a shared layout. Anything that
//! came from the user or from OpenWeather goes through [`escape`].

use owm_core::{
    Coordinates, Units,
    model::{Condition, CoordsWeather, Forecast, ForecastItem, OneCall, describe},
};

const MAX_HOURLY_ROWS: usize = 24;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="manifest" href="/static/manifest.json">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Hiragino Sans", sans-serif; max-width: 760px; margin: 0 auto; padding: 16px; background: #f5f7fa; color: #222; }}
        h1 {{ font-size: 1.4em; border-bottom: 3px solid #4d96ff; padding-bottom: 6px; }}
        form {{ margin-bottom: 12px; }}
        .error {{ background: #ffe3e3; color: #a61e1e; padding: 10px; border-radius: 6px; }}
        .current {{ background: white; padding: 12px; border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,.1); }}
        table {{ width: 100%; border-collapse: collapse; background: white; margin-top: 12px; }}
        th {{ background: #4d96ff; color: white; text-align: left; padding: 6px; }}
        td {{ border-bottom: 1px solid #eee; padding: 6px; }}
        img.icon {{ width: 40px; height: 40px; vertical-align: middle; }}
    </style>
</head>
<body>
{body}
<script>
if ("serviceWorker" in navigator) {{
    navigator.serviceWorker.register("/sw.js");
}}
</script>
</body>
</html>"#,
        title = escape(title),
    )
}

fn error_block(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape(e)))
        .unwrap_or_default()
}

fn icon(conditions: &[Condition]) -> String {
    match conditions.first().filter(|c| !c.icon.is_empty()) {
        Some(c) => format!(
            r#"<img class="icon" src="https://openweathermap.org/img/wn/{}@2x.png" alt="{}">"#,
            escape(&c.icon),
            escape(&c.description)
        ),
        None => String::new(),
    }
}

fn local_time<'a>(local: &'a Option<String>, fallback: &'a str) -> &'a str {
    local.as_deref().unwrap_or(fallback)
}

fn percent(pop: f64) -> String {
    format!("{:.0}%", pop * 100.0)
}

fn city_form(city: &str) -> String {
    format!(
        r#"<form method="post" action="/">
    <input type="text" name="city" value="{}" placeholder="Tokyo,JP">
    <button type="submit">表示</button>
</form>"#,
        escape(city)
    )
}

fn coords_form(coords: Option<Coordinates>) -> String {
    let (lat, lon) = coords
        .map(|c| (c.lat.to_string(), c.lon.to_string()))
        .unwrap_or_default();
    format!(
        r#"<form method="get" action="/onecall">
    <input type="text" name="lat" value="{}" placeholder="緯度">
    <input type="text" name="lon" value="{}" placeholder="経度">
    <button type="submit">座標で表示</button>
</form>"#,
        escape(&lat),
        escape(&lon)
    )
}

fn forecast_table(list: &[ForecastItem], units: Units) -> String {
    let rows: String = list
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}{}</td><td>{:.1}{}</td><td>{}%</td><td>{}</td></tr>\n",
                escape(local_time(&item.local_dt_txt, &item.dt_txt)),
                icon(&item.weather),
                escape(describe(&item.weather)),
                item.main.temp,
                units.temperature_symbol(),
                item.main.humidity,
                percent(item.pop),
            )
        })
        .collect();

    format!(
        "<table>\n<thead><tr><th>現地時刻</th><th>天気</th><th>気温</th><th>湿度</th><th>降水確率</th></tr></thead>\n<tbody>\n{rows}</tbody>\n</table>"
    )
}

/// `/` — city form plus the 3-hour forecast.
pub fn city_page(
    city: &str,
    forecast: Option<&Forecast>,
    error: Option<&str>,
    units: Units,
) -> String {
    let mut body = String::from("<h1>天気予報</h1>\n");
    body.push_str(&city_form(city));
    body.push_str(&coords_form(None));
    body.push_str(&error_block(error));

    if let Some(forecast) = forecast {
        let country = if forecast.city.country.is_empty() {
            String::new()
        } else {
            format!(" ({})", escape(&forecast.city.country))
        };
        body.push_str(&format!("<h2>{}{country}</h2>\n", escape(&forecast.city.name)));
        body.push_str(&forecast_table(&forecast.list, units));
    }

    layout(&format!("天気予報 - {city}"), &body)
}

/// `/coords` — current conditions plus the 3-hour forecast.
pub fn coords_page(
    coords: Coordinates,
    weather: Option<&CoordsWeather>,
    error: Option<&str>,
    units: Units,
) -> String {
    let mut body = String::from("<h1>現在の天気</h1>\n");
    body.push_str(&coords_form(Some(coords)));
    body.push_str(&error_block(error));

    if let Some(weather) = weather {
        let current = &weather.current;
        let name = if current.name.is_empty() {
            coords.to_string()
        } else {
            current.name.clone()
        };
        body.push_str(&format!(
            r#"<div class="current">
    <h2>{}</h2>
    <p>{} 現在</p>
    <p>{}{} {:.1}{} (体感 {:.1}{})</p>
    <p>湿度 {}% / 風速 {:.1} {}</p>
</div>
"#,
            escape(&name),
            escape(local_time(&current.local_dt_txt, "")),
            icon(&current.weather),
            escape(describe(&current.weather)),
            current.main.temp,
            units.temperature_symbol(),
            current.main.feels_like,
            units.temperature_symbol(),
            current.main.humidity,
            current.wind.speed,
            units.speed_symbol(),
        ));
        body.push_str(&forecast_table(&weather.forecast.list, units));
    }

    layout(&format!("現在の天気 - {coords}"), &body)
}

/// `/onecall` — current block, hourly table and daily table.
pub fn one_call_page(
    coords: Coordinates,
    place: Option<&str>,
    data: Option<&OneCall>,
    error: Option<&str>,
    units: Units,
) -> String {
    let heading = place.map(str::to_owned).unwrap_or_else(|| coords.to_string());

    let mut body = format!("<h1>{}</h1>\n", escape(&heading));
    body.push_str(&coords_form(Some(coords)));
    body.push_str(&error_block(error));

    if let Some(data) = data {
        let current = &data.current;
        body.push_str(&format!(
            r#"<div class="current">
    <p>{} 現在 ({})</p>
    <p>{}{} {:.1}{} (体感 {:.1}{})</p>
    <p>湿度 {}% / 風速 {:.1} {} / UV {:.1}</p>
</div>
"#,
            escape(local_time(&current.local_dt_txt, "")),
            escape(&data.timezone),
            icon(&current.weather),
            escape(describe(&current.weather)),
            current.temp,
            units.temperature_symbol(),
            current.feels_like,
            units.temperature_symbol(),
            current.humidity,
            current.wind_speed,
            units.speed_symbol(),
            current.uvi,
        ));

        body.push_str("<h2>1時間ごと</h2>\n<table>\n<thead><tr><th>現地時刻</th><th>天気</th><th>気温</th><th>降水確率</th></tr></thead>\n<tbody>\n");
        let hourly: String = data
            .hourly
            .iter()
            .take(MAX_HOURLY_ROWS)
            .map(|hour| {
                format!(
                    "<tr><td>{}</td><td>{}{}</td><td>{:.1}{}</td><td>{}</td></tr>\n",
                    escape(local_time(&hour.local_dt_txt, "")),
                    icon(&hour.weather),
                    escape(describe(&hour.weather)),
                    hour.temp,
                    units.temperature_symbol(),
                    percent(hour.pop),
                )
            })
            .collect();
        body.push_str(&hourly);
        body.push_str("</tbody>\n</table>\n");

        body.push_str("<h2>日ごと</h2>\n<table>\n<thead><tr><th>日付</th><th>天気</th><th>最高 / 最低</th><th>降水確率</th></tr></thead>\n<tbody>\n");
        let daily: String = data
            .daily
            .iter()
            .map(|day| {
                let date = local_time(&day.local_dt_txt, "");
                let date = date.split_whitespace().next().unwrap_or(date);
                format!(
                    "<tr><td>{}</td><td>{}{}</td><td>{:.1}{} / {:.1}{}</td><td>{}</td></tr>\n",
                    escape(date),
                    icon(&day.weather),
                    escape(day.summary.as_deref().unwrap_or_else(|| describe(&day.weather))),
                    day.temp.max,
                    units.temperature_symbol(),
                    day.temp.min,
                    units.temperature_symbol(),
                    percent(day.pop),
                )
            })
            .collect();
        body.push_str(&daily);
        body.push_str("</tbody>\n</table>\n");
    }

    layout(&format!("One Call - {heading}"), &body)
}
