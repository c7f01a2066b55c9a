//! Text formatting for the weather panels.

use crate::forecast::local_datetime;
use crate::types::{CurrentConditions, UnitSystem};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";
const OBSERVED_FORMAT: &str = "%A, %-d %B %Y | %-I:%M %p";
const CLOCK_FORMAT: &str = "%-I:%M %p";

/// Format an instant in the wall-clock time of a location.
/// Out-of-range instants format as an empty string.
pub fn format_local_time(epoch_seconds: i64, offset_seconds: i64, pattern: &str) -> String {
    local_datetime(epoch_seconds, offset_seconds)
        .map(|dt| dt.format(pattern).to_string())
        .unwrap_or_default()
}

/// Whole degrees with the unit symbol, e.g. "25°C". Halves round up,
/// so -2.5 shows as "-2°C".
pub fn format_temperature(value: f64, units: UnitSystem) -> String {
    format!("{}{}", (value + 0.5).floor() as i64, units.temperature_symbol())
}

/// The provider already reports mph for imperial requests, so no conversion.
pub fn format_wind_speed(value: f64, units: UnitSystem) -> String {
    format!("{:.1} {}", value, units.wind_speed_unit())
}

pub fn icon_url(icon_id: &str) -> String {
    format!("{}/{}@2x.png", ICON_BASE_URL, icon_id)
}

impl CurrentConditions {
    /// e.g. "Tuesday, 3 September 2024 | 12:00 PM"
    pub fn observed_label(&self) -> String {
        format_local_time(
            self.observed_at_epoch_seconds,
            self.utc_offset_seconds,
            OBSERVED_FORMAT,
        )
    }

    pub fn sunrise_label(&self) -> String {
        format_local_time(self.sunrise_epoch_seconds, self.utc_offset_seconds, CLOCK_FORMAT)
    }

    pub fn sunset_label(&self) -> String {
        format_local_time(self.sunset_epoch_seconds, self.utc_offset_seconds, CLOCK_FORMAT)
    }
}
