//! UTC epoch → local display time, using the offset OpenWeather reports
//! for the queried location.

use chrono::{DateTime, TimeDelta};

use crate::model::{
    CurrentWeather, Forecast, ForecastItem, OneCall, OneCallCurrent, OneCallDaily, OneCallHourly,
};

pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format `ts` (seconds since the epoch, UTC) shifted by `tz_offset` seconds.
pub fn format_local(ts: i64, tz_offset: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .zip(TimeDelta::try_seconds(tz_offset))
        .and_then(|(utc, offset)| utc.naive_utc().checked_add_signed(offset))
        .map(|local| local.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// A sample with an epoch timestamp and a slot for its local display time.
pub trait Timestamped {
    fn timestamp(&self) -> i64;
    fn set_local_time(&mut self, text: String);
}

macro_rules! timestamped {
    ($($ty:ty),* $(,)?) => {
        $(impl Timestamped for $ty {
            fn timestamp(&self) -> i64 {
                self.dt
            }

            fn set_local_time(&mut self, text: String) {
                self.local_dt_txt = Some(text);
            }
        })*
    };
}

timestamped!(ForecastItem, CurrentWeather, OneCallCurrent, OneCallHourly, OneCallDaily);

pub fn annotate<T: Timestamped>(items: &mut [T], tz_offset: i64) {
    for item in items {
        let text = format_local(item.timestamp(), tz_offset);
        item.set_local_time(text);
    }
}

/// Annotate every sample with the city's offset, then put the latest
/// sample first.
pub fn annotate_forecast(forecast: &mut Forecast) {
    annotate(&mut forecast.list, forecast.city.timezone);
    forecast.list.reverse();
}

pub fn annotate_current(current: &mut CurrentWeather) {
    let offset = current.timezone;
    annotate(std::slice::from_mut(current), offset);
}

pub fn annotate_one_call(one_call: &mut OneCall) {
    let offset = one_call.timezone_offset;
    annotate(std::slice::from_mut(&mut one_call.current), offset);
    annotate(&mut one_call.hourly, offset);
    annotate(&mut one_call.daily, offset);
}
