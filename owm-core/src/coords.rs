use std::fmt;

use crate::error::CoordinateError;

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::OutOfRange { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Parse raw query values. Blank values count as missing.
    pub fn parse(lat: Option<&str>, lon: Option<&str>) -> Result<Self, CoordinateError> {
        let lat = lat.map(str::trim).filter(|s| !s.is_empty());
        let lon = lon.map(str::trim).filter(|s| !s.is_empty());

        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(CoordinateError::Missing);
        };

        let lat = parse_number(lat)?;
        let lon = parse_number(lon)?;
        Self::new(lat, lon)
    }
}

fn parse_number(raw: &str) -> Result<f64, CoordinateError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoordinateError::Invalid(raw.to_string()))
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}
