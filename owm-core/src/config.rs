use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_CITY: &str = "Tokyo,JP";
pub const DEFAULT_API_BASE: &str = "https://api.openweathermap.org";

/// Unit system passed to OpenWeather as `units=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => {
                let supported: Vec<&str> = Units::all().iter().map(Units::as_str).collect();
                Err(anyhow!(
                    "Unknown units '{value}'. Supported units: {}.",
                    supported.join(", ")
                ))
            }
        }
    }
}

/// Process-wide settings, read once at startup.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Osaka,JP"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub default_city: String,
    pub api_base: String,
    pub lang: String,
    pub units: Units,
    pub timeout_secs: u64,
    /// Number of 3-hour samples requested for the city forecast.
    pub forecast_count: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: DEFAULT_CITY.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            lang: "ja".to_string(),
            units: Units::Metric,
            timeout_secs: 10,
            forecast_count: 8,
        }
    }
}

impl Config {
    /// Config file (if any) overlaid with the process environment.
    pub fn from_environment() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Overlay `OWM_API_KEY`, `DEFAULT_CITY`, `OWM_API_BASE`, `OWM_LANG` and
    /// `OWM_UNITS` from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OWM_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(city) = lookup("DEFAULT_CITY").filter(|c| !c.trim().is_empty()) {
            self.default_city = city.trim().to_string();
        }
        if let Some(base) = lookup("OWM_API_BASE").filter(|b| !b.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
        if let Some(lang) = lookup("OWM_LANG").filter(|l| !l.trim().is_empty()) {
            self.lang = lang.trim().to_string();
        }
        if let Some(units) = lookup("OWM_UNITS") {
            self.units = Units::try_from(units.as_str()).context("Invalid OWM_UNITS")?;
        }
        Ok(())
    }

    /// API key with surrounding whitespace removed; blank counts as absent.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "owm-web", "owm-web")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
