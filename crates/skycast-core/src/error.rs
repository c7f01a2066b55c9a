//! Error types shared across SkyCast.
//!
//! Every variant has a `user_message()` for the render layer; the `Display`
//! impls carry the detail for logs.

use thiserror::Error;

/// Application-level error.
///
/// Crate-specific errors (weather fetch, geolocation) are mapped into this
/// type by the dashboard layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("network: {0}")]
    Network(#[from] NetworkError),

    #[error("weather: {0}")]
    Weather(#[from] WeatherError),

    #[error("location: {0}")]
    Location(#[from] LocationError),

    #[error("preferences: {0}")]
    Preference(#[from] PreferenceError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Short, non-technical text for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Location(e) => e.user_message(),
            AppError::Preference(e) => e.user_message(),
            AppError::Other(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Transport-level failures talking to an upstream.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("could not connect: {0}")]
    ConnectionFailed(String),

    #[error("timed out")]
    Timeout,

    #[error("upstream returned {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("unreadable response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "No connection. Check your network and retry.",
            NetworkError::Timeout => "The weather service took too long to answer.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is having trouble. Try again shortly."
            }
            NetworkError::ServerError { .. } => "The request was rejected. Please try again.",
            NetworkError::InvalidResponse(_) => "The weather service sent data we couldn't read.",
        }
    }
}

/// Weather upstream failures, after status classification.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("coordinates out of range: {0}")]
    InvalidLocation(String),

    #[error("unexpected upstream reply: {0}")]
    ApiError(String),

    #[error("api key rejected")]
    InvalidApiKey,

    #[error("no data for this location")]
    CityNotFound,

    #[error("upstream unavailable")]
    ServiceUnavailable,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::InvalidLocation(_) => "That location can't be looked up. Pick another city.",
            WeatherError::ApiError(_) => "Failed to fetch weather data. Please try again.",
            WeatherError::InvalidApiKey => "The weather API key was rejected. Check config.toml.",
            WeatherError::CityNotFound => "Failed to fetch weather data. Check the city name.",
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
        }
    }
}

/// Device location errors. These are user-facing notices, not system faults.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("no position available")]
    Unavailable,
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::PermissionDenied => {
                "Couldn't retrieve your location. Please check permissions."
            }
            LocationError::Unavailable => "Geolocation is not supported on this device.",
        }
    }
}

/// Persisted preference errors.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("read failed: {0}")]
    Read(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("malformed file: {0}")]
    Parse(String),
}

impl PreferenceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PreferenceError::Read(_) => "Saved preferences could not be loaded.",
            PreferenceError::Write(_) => "Your preference could not be saved.",
            PreferenceError::Parse(_) => "Saved preferences are malformed. Using defaults.",
        }
    }
}

/// Classify a reqwest failure.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
