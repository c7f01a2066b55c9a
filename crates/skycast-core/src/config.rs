use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_DIR_NAME: &str = "skycast";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The app cannot start with this value
    Error,
    /// Usable, but some feature will not work
    Warning,
}

/// One problem found by [`Config::validate`]
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    issues: Vec<ConfigIssue>,
}

impl ValidationResult {
    /// Warnings alone do not make a config invalid
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigIssue> {
        self.with_severity(Severity::Warning)
    }

    pub fn error(&mut self, field: &'static str, message: impl Into<String>) {
        self.push(Severity::Error, field, message.into());
    }

    pub fn warning(&mut self, field: &'static str, message: impl Into<String>) {
        self.push(Severity::Warning, field, message.into());
    }

    /// All errors on one line, separated by "; "
    pub fn error_summary(&self) -> String {
        self.errors()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn push(&mut self, severity: Severity, field: &'static str, message: String) {
        self.issues.push(ConfigIssue {
            severity,
            field,
            message,
        });
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ConfigIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory (also holds preferences)
    pub config_dir: PathBuf,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// City search provider settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Search box behaviour
    #[serde(default)]
    pub search: SearchConfig,

    /// Fixed device position used for "current location"
    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the OpenWeather data API
    pub base_url: String,

    /// OpenWeather `appid` (can also be set via OPENWEATHER_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the GeoDB cities API
    pub base_url: String,

    /// RapidAPI key (can also be set via GEODB_API_KEY)
    #[serde(default)]
    pub api_key: String,

    /// RapidAPI host header value
    pub api_host: String,

    /// Only cities at least this large are suggested
    #[serde(default = "default_min_population")]
    pub min_population: u64,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

fn default_min_population() -> u64 {
    1_000_000
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://wft-geo-db.p.rapidapi.com/v1/geo".to_string(),
            api_key: String::new(),
            api_host: "wft-geo-db.p.rapidapi.com".to_string(),
            min_population: default_min_population(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a search is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// City names offered as one-click shortcuts
    #[serde(default = "default_quick_picks")]
    pub quick_picks: Vec<String>,
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_quick_picks() -> Vec<String> {
    ["Lucknow", "Raebareli", "Pune", "Mumbai", "Prayagraj"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            quick_picks: default_quick_picks(),
        }
    }
}

/// Device position. Both coordinates must be set for geolocation to work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeolocationConfig {
    /// Configured position, if both coordinates are present
    pub fn position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME);

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            geocoding: GeocodingConfig::default(),
            search: SearchConfig::default(),
            geolocation: GeolocationConfig::default(),
        }
    }
}

impl Config {
    /// Read `config.toml` from the user config directory, writing one with
    /// defaults on first run. Environment API keys are applied on top.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Same as [`Config::load`] for an explicit path, without env overrides
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;

        toml::from_str(&contents).with_context(|| format!("parsing {}", config_path.display()))
    }

    /// [`Config::load`], then refuse to continue on validation errors.
    /// Warnings are logged and returned.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!("invalid configuration: {}", validation.error_summary());
        }

        for warning in validation.warnings() {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// API keys from the environment take precedence over the file
    fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env("OPENWEATHER_API_KEY") {
            self.weather.api_key = key;
        }
        if let Some(key) = non_empty_env("GEODB_API_KEY") {
            self.geocoding.api_key = key;
        }
    }

    /// Check URLs, timeouts and the configured position.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        check_url(&mut result, "weather.base_url", &self.weather.base_url);
        check_url(&mut result, "geocoding.base_url", &self.geocoding.base_url);

        if self.weather.api_key.is_empty() {
            result.warning(
                "weather.api_key",
                "No OpenWeather API key - weather requests will be rejected",
            );
        }
        if self.geocoding.api_key.is_empty() {
            result.warning(
                "geocoding.api_key",
                "No GeoDB API key - city search will return no suggestions",
            );
        }

        if self.weather.timeout_secs == 0 {
            result.error("weather.timeout_secs", "Timeout must be greater than 0");
        }
        if self.geocoding.timeout_secs == 0 {
            result.error("geocoding.timeout_secs", "Timeout must be greater than 0");
        }

        if self.search.debounce_ms == 0 {
            result.warning(
                "search.debounce_ms",
                "Search debounce disabled - every keystroke sends a request",
            );
        } else if self.search.debounce_ms > 5000 {
            result.warning(
                "search.debounce_ms",
                "Search debounce is longer than 5 seconds",
            );
        }

        match (self.geolocation.latitude, self.geolocation.longitude) {
            (Some(lat), Some(lon)) => {
                if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                    result.error(
                        "geolocation.latitude",
                        format!("Latitude must be within -90..=90, got {}", lat),
                    );
                }
                if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                    result.error(
                        "geolocation.longitude",
                        format!("Longitude must be within -180..=180, got {}", lon),
                    );
                }
            }
            (None, None) => {}
            _ => result.warning(
                "geolocation",
                "Only one coordinate is set - current location is unavailable",
            ),
        }

        result
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(config_path, contents)
            .with_context(|| format!("writing {}", config_path.display()))
    }

    fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("no user config directory on this platform")?;
        Ok(base.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}

fn check_url(result: &mut ValidationResult, field: &'static str, raw: &str) {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            result.error(field, format!("not a URL ({})", e));
            return;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        result.error(field, format!("expected http or https, got {}", url.scheme()));
    }
    if url.host().is_none() {
        result.error(field, "missing host");
    }
    if url.port() == Some(0) {
        result.error(field, "port 0 is not usable");
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        let result = config.validate();
        // Missing API keys are warnings, not errors
        assert!(result.is_valid(), "defaults rejected: {}", result.error_summary());
        assert!(result.warnings().any(|w| w.field == "weather.api_key"));
    }

    #[test]
    fn test_unparseable_weather_url() {
        let mut config = Config::default();
        config.weather.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors().any(|e| e.field == "weather.base_url"));
    }

    #[test]
    fn test_non_http_geocoding_url() {
        let mut config = Config::default();
        config.geocoding.base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.weather.timeout_secs = 0;
        let result = config.validate();
        assert!(result.errors().any(|e| e.field == "weather.timeout_secs"));
    }

    #[test]
    fn test_out_of_range_geolocation() {
        let mut config = Config::default();
        config.geolocation.latitude = Some(91.0);
        config.geolocation.longitude = Some(73.85);
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors().any(|e| e.field == "geolocation.latitude"));
    }

    #[test]
    fn test_half_geolocation_is_warning() {
        let mut config = Config::default();
        config.geolocation.latitude = Some(18.52);
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings().any(|w| w.field == "geolocation"));
        assert_eq!(config.geolocation.position(), None);
    }

    #[test]
    fn test_load_from_missing_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert!(path.exists());
        assert_eq!(config.config_dir, dir.path());
        assert_eq!(config.search.debounce_ms, 400);
        assert_eq!(config.geocoding.min_population, 1_000_000);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.config_dir = dir.path().to_path_buf();
        config.search.debounce_ms = 250;
        config.geolocation.latitude = Some(18.52);
        config.geolocation.longitude = Some(73.85);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.debounce_ms, 250);
        assert_eq!(loaded.geolocation.position(), Some((18.52, 73.85)));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.error("field1", "error1");
        result.error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
