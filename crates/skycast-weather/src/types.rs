use serde::{Deserialize, Serialize};

/// Measurement system requested from the weather provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Value of the provider's `units` query parameter
    pub fn api_token(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(self) -> &'static str {
        match self {
            Self::Metric => "m/s",
            Self::Imperial => "mph",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }
}

/// A resolved place the user can get weather for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name, e.g. "Pune, IN"
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(label: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            label: label.into(),
            latitude,
            longitude,
        }
    }

    /// Finite and within the geographic ranges
    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

// --- Provider payloads ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionRaw {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindRaw {
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunRaw {
    #[serde(default)]
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Body of the current-conditions endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditionsRaw {
    #[serde(default)]
    pub name: String,
    pub dt: i64,
    /// Shift from UTC in seconds
    pub timezone: i64,
    pub main: MainReadings,
    pub wind: WindRaw,
    pub sys: SunRaw,
    #[serde(default)]
    pub weather: Vec<ConditionRaw>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSampleRaw {
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<ConditionRaw>,
    #[serde(default)]
    pub dt_txt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCityRaw {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    /// Shift from UTC in seconds
    pub timezone: i64,
}

/// Body of the forecast endpoint: fixed-interval samples over several days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRaw {
    pub list: Vec<ForecastSampleRaw>,
    pub city: ForecastCityRaw,
}

// --- Display model ---

/// Current weather for the selected location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_label: String,
    pub observed_at_epoch_seconds: i64,
    pub utc_offset_seconds: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub sunrise_epoch_seconds: i64,
    pub sunset_epoch_seconds: i64,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_id: String,
}

impl CurrentConditions {
    /// Build from one provider response. The label comes from the selected
    /// location, not from the provider's own place name.
    pub fn from_raw(location_label: &str, raw: &CurrentConditionsRaw) -> Self {
        let condition = raw.weather.first().cloned().unwrap_or_default();
        Self {
            location_label: location_label.to_string(),
            observed_at_epoch_seconds: raw.dt,
            utc_offset_seconds: raw.timezone,
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like,
            temp_min: raw.main.temp_min,
            temp_max: raw.main.temp_max,
            humidity: raw.main.humidity,
            wind_speed: raw.wind.speed,
            sunrise_epoch_seconds: raw.sys.sunrise,
            sunset_epoch_seconds: raw.sys.sunset,
            condition_main: condition.main,
            condition_description: condition.description,
            icon_id: condition.icon,
        }
    }
}

/// One forecast slot ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub epoch_seconds: i64,
    pub temperature: f64,
    pub condition_main: String,
    pub condition_description: String,
    pub icon_id: String,
    /// "Today" or e.g. "Tue, 03 Sep"
    pub day_label: String,
    /// e.g. "3:00 PM"
    pub time_label: String,
}

/// Everything one completed fetch produced, tied to the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub units: UnitSystem,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastEntry>,
}

// --- Errors ---

/// City search failures. Never escapes the geocoding client.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("City search returned status {0}")]
    Status(u16),
    #[error("Failed to decode city search response: {0}")]
    Decode(String),
}

/// Failure of the combined current + forecast retrieval
#[derive(Debug, thiserror::Error)]
pub enum WeatherFetchError {
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{endpoint} request returned status {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("Failed to decode {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}

/// Device position could not be obtained
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Geolocation unavailable")]
    Unavailable,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_unit_tokens() {
        assert_eq!(UnitSystem::Metric.api_token(), "metric");
        assert_eq!(UnitSystem::Imperial.api_token(), "imperial");
        assert_eq!(UnitSystem::default(), UnitSystem::Metric);
    }

    #[test]
    fn test_unit_symbols() {
        assert_eq!(UnitSystem::Metric.temperature_symbol(), "°C");
        assert_eq!(UnitSystem::Imperial.temperature_symbol(), "°F");
        assert_eq!(UnitSystem::Imperial.wind_speed_unit(), "mph");
        assert_eq!(UnitSystem::Metric.toggled(), UnitSystem::Imperial);
    }

    #[test]
    fn test_location_coordinate_validation() {
        assert!(Location::new("Pune, IN", 18.52, 73.85).has_valid_coordinates());
        assert!(!Location::new("bad", 95.0, 0.0).has_valid_coordinates());
        assert!(!Location::new("bad", 0.0, -181.0).has_valid_coordinates());
        assert!(!Location::new("bad", f64::NAN, 0.0).has_valid_coordinates());
    }

    #[test]
    fn test_current_conditions_from_raw() {
        let raw: CurrentConditionsRaw = serde_json::from_value(serde_json::json!({
            "name": "Pune",
            "dt": 1725345000,
            "timezone": 19800,
            "main": {"temp": 24.6, "feels_like": 25.1, "temp_min": 23.0, "temp_max": 26.2, "humidity": 88},
            "wind": {"speed": 5.4},
            "sys": {"country": "IN", "sunrise": 1725324300, "sunset": 1725369060},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}]
        }))
        .unwrap();

        let current = CurrentConditions::from_raw("Pune, IN", &raw);

        assert_eq!(current.location_label, "Pune, IN");
        assert_eq!(current.utc_offset_seconds, 19800);
        assert_eq!(current.humidity, 88);
        assert_eq!(current.condition_main, "Rain");
        assert_eq!(current.icon_id, "10d");
        assert_eq!(current.sunset_epoch_seconds, 1725369060);
    }

    #[test]
    fn test_current_conditions_without_condition_entry() {
        let raw: CurrentConditionsRaw = serde_json::from_value(serde_json::json!({
            "dt": 0,
            "timezone": 0,
            "main": {"temp": 1.0, "feels_like": 1.0, "temp_min": 1.0, "temp_max": 1.0, "humidity": 10},
            "wind": {"speed": 0.0},
            "sys": {"sunrise": 0, "sunset": 0}
        }))
        .unwrap();

        let current = CurrentConditions::from_raw("Nowhere", &raw);
        assert!(current.condition_main.is_empty());
        assert!(current.icon_id.is_empty());
    }
}
