//! OpenWeather client: current conditions and forecast, fetched together.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::forecast::{normalize_forecast, ReferenceTime};
use crate::types::{
    CurrentConditions, CurrentConditionsRaw, ForecastRaw, Location, UnitSystem, WeatherFetchError,
    WeatherReport,
};

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, WeatherFetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Fetch current conditions and forecast for one location.
    ///
    /// Both requests are in flight at the same time. If either fails the
    /// whole call fails and the other result is dropped.
    #[instrument(skip(self, location), fields(label = %location.label), level = "info")]
    pub async fn fetch_conditions(
        &self,
        location: &Location,
        units: UnitSystem,
    ) -> Result<(CurrentConditionsRaw, ForecastRaw), WeatherFetchError> {
        if !location.has_valid_coordinates() {
            return Err(WeatherFetchError::InvalidLocation {
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }

        let current = self.get_json::<CurrentConditionsRaw>(CURRENT_ENDPOINT, location, units);
        let forecast = self.get_json::<ForecastRaw>(FORECAST_ENDPOINT, location, units);
        let (current, forecast) = tokio::try_join!(current, forecast)?;

        tracing::debug!(
            "Fetched conditions and {} forecast samples",
            forecast.list.len()
        );
        Ok((current, forecast))
    }

    /// Fetch and shape everything the panels show for one location.
    pub async fn fetch_report(
        &self,
        location: &Location,
        units: UnitSystem,
        reference: ReferenceTime,
    ) -> Result<WeatherReport, WeatherFetchError> {
        let (current_raw, forecast_raw) = self.fetch_conditions(location, units).await?;

        Ok(WeatherReport {
            location: location.clone(),
            units,
            current: CurrentConditions::from_raw(&location.label, &current_raw),
            forecast: normalize_forecast(&forecast_raw, reference),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        location: &Location,
        units: UnitSystem,
    ) -> Result<T, WeatherFetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", units.api_token().to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {}", endpoint, status);
            return Err(WeatherFetchError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| WeatherFetchError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}
