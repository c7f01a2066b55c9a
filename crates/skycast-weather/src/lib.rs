//! Weather pipeline for SkyCast
//!
//! City search via GeoDB, current conditions and forecast via OpenWeather,
//! and the normalization that turns a raw forecast into display entries.

pub mod display;
pub mod forecast;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod types;

pub use forecast::{normalize_forecast, ReferenceTime, FORECAST_DISPLAY_LIMIT};
pub use geocode::GeocodingClient;
pub use location::{current_location, FixedPosition, GeolocationSource, CURRENT_LOCATION_LABEL};
pub use provider::WeatherProvider;
pub use types::*;
