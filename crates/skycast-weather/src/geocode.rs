//! City search: turn a typed prefix into selectable locations.
//! Uses the GeoDB Cities API behind RapidAPI header credentials.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

use crate::types::{GeocodeError, Location};

const DEFAULT_MIN_POPULATION: u64 = 1_000_000;

#[derive(Debug, Deserialize)]
struct CitiesResponse {
    #[serde(default)]
    data: Vec<CityCandidate>,
}

#[derive(Debug, Deserialize)]
struct CityCandidate {
    name: String,
    #[serde(rename = "countryCode")]
    country_code: String,
    latitude: f64,
    longitude: f64,
}

impl From<CityCandidate> for Location {
    fn from(city: CityCandidate) -> Self {
        Location::new(
            format!("{}, {}", city.name, city.country_code),
            city.latitude,
            city.longitude,
        )
    }
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
    min_population: u64,
}

impl GeocodingClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        api_host: &str,
        timeout: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_host: api_host.to_string(),
            min_population: DEFAULT_MIN_POPULATION,
        })
    }

    pub fn with_min_population(mut self, min_population: u64) -> Self {
        self.min_population = min_population;
        self
    }

    /// Search cities whose name starts with `query`, in upstream order.
    ///
    /// Blank queries return nothing without touching the network. Failures
    /// are logged and also return nothing.
    pub async fn search(&self, query: &str) -> Vec<Location> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.try_search(query).await {
            Ok(locations) => locations,
            Err(e) => {
                tracing::warn!("City search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn try_search(&self, query: &str) -> Result<Vec<Location>, GeocodeError> {
        let url = format!("{}/cities", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", self.api_key.as_str())
            .header("X-RapidAPI-Host", self.api_host.as_str())
            .query(&[
                ("minPopulation", self.min_population.to_string()),
                ("namePrefix", query.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let cities: CitiesResponse =
            serde_json::from_slice(&body).map_err(|e| GeocodeError::Decode(e.to_string()))?;

        let locations: Vec<Location> = cities.data.into_iter().map(Location::from).collect();
        tracing::debug!("City search for {:?} found {} candidates", query, locations.len());
        Ok(locations)
    }
}
