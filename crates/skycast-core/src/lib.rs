pub mod app;
pub mod config;
pub mod error;
pub mod theme;

pub use app::App;
pub use config::{Config, GeocodingConfig, GeolocationConfig, SearchConfig, WeatherConfig};
pub use error::{
    AppError, LocationError, NetworkError, PreferenceError, ReqwestErrorExt,
    WeatherError,
};
pub use theme::{Theme, ThemeStore};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("SkyCast core initialized");
    Ok(())
}
