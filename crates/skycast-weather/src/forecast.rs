//! Forecast normalization: raw 3-hourly samples to a short display list.
//!
//! Two clocks are involved. Samples are kept or dropped by comparing their
//! calendar day in the *location's* time against the location's today, but
//! the "Today" label compares against the *viewer's* calendar day.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

use crate::types::{ForecastEntry, ForecastRaw, ForecastSampleRaw};

/// Maximum number of forecast slots shown
pub const FORECAST_DISPLAY_LIMIT: usize = 6;

const DAY_LABEL_FORMAT: &str = "%a, %d %b";
const TIME_LABEL_FORMAT: &str = "%-I:%M %p";
const TODAY_LABEL: &str = "Today";

/// The "now" a forecast is normalized against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime {
    pub now: DateTime<Utc>,
    /// Calendar date on the viewer's own clock
    pub viewer_today: NaiveDate,
}

impl ReferenceTime {
    /// Wall clock of this process
    pub fn current() -> Self {
        Self {
            now: Utc::now(),
            viewer_today: Local::now().date_naive(),
        }
    }
}

/// Wall-clock time at a location `offset_seconds` away from UTC.
pub(crate) fn local_datetime(epoch_seconds: i64, offset_seconds: i64) -> Option<NaiveDateTime> {
    let shifted = epoch_seconds.checked_add(offset_seconds)?;
    DateTime::from_timestamp(shifted, 0).map(|dt| dt.naive_utc())
}

/// Keep samples from the location's today onwards, oldest first, at most
/// [`FORECAST_DISPLAY_LIMIT`] of them. Never pads.
pub fn normalize_forecast(raw: &ForecastRaw, reference: ReferenceTime) -> Vec<ForecastEntry> {
    let offset = raw.city.timezone;
    let Some(location_today) = local_datetime(reference.now.timestamp(), offset).map(|dt| dt.date())
    else {
        tracing::warn!("Forecast offset {} out of range, dropping forecast", offset);
        return Vec::new();
    };

    let mut upcoming: Vec<(&ForecastSampleRaw, NaiveDateTime)> = raw
        .list
        .iter()
        .filter_map(|sample| local_datetime(sample.dt, offset).map(|local| (sample, local)))
        .filter(|(_, local)| local.date() >= location_today)
        .collect();

    upcoming.sort_by_key(|(sample, _)| sample.dt);
    upcoming.truncate(FORECAST_DISPLAY_LIMIT);

    tracing::debug!(
        "Normalized forecast: {} of {} samples kept",
        upcoming.len(),
        raw.list.len()
    );

    upcoming
        .into_iter()
        .map(|(sample, local)| to_entry(sample, local, reference.viewer_today))
        .collect()
}

fn to_entry(sample: &ForecastSampleRaw, local: NaiveDateTime, viewer_today: NaiveDate) -> ForecastEntry {
    let condition = sample.weather.first().cloned().unwrap_or_default();
    let day_label = if local.date() == viewer_today {
        TODAY_LABEL.to_string()
    } else {
        local.format(DAY_LABEL_FORMAT).to_string()
    };

    ForecastEntry {
        epoch_seconds: sample.dt,
        temperature: sample.main.temp,
        condition_main: condition.main,
        condition_description: condition.description,
        icon_id: condition.icon,
        day_label,
        time_label: local.format(TIME_LABEL_FORMAT).to_string(),
    }
}
