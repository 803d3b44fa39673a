//! Core library for the OpenWeather web front-end.
//!
//! This crate defines:
//! - Configuration (config file + environment)
//! - The `WeatherProvider` seam and its OpenWeather implementation
//! - Response models and the UTC → local time annotation
//!
//! It is used by `owm-web`, which renders the results as HTML.

pub mod config;
pub mod coords;
pub mod error;
pub mod localtime;
pub mod model;
pub mod provider;

pub use config::{Config, Units};
pub use coords::Coordinates;
pub use error::{CoordinateError, WeatherError};
pub use provider::{WeatherProvider, provider_from_config};
