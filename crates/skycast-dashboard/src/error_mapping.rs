//! Maps weather-crate errors into the application error hierarchy.

use skycast_core::{AppError, LocationError, NetworkError, ReqwestErrorExt, WeatherError};
use skycast_weather::{GeocodeError, GeolocationError, WeatherFetchError};

/// Extension trait for converting pipeline errors to [`AppError`].
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for WeatherFetchError {
    fn into_app_error(self) -> AppError {
        match self {
            WeatherFetchError::InvalidLocation {
                latitude,
                longitude,
            } => AppError::Weather(WeatherError::InvalidLocation(format!(
                "{}, {}",
                latitude, longitude
            ))),
            WeatherFetchError::Network(e) => AppError::Network(e.into_network_error()),
            WeatherFetchError::Status { status: 401, .. } => {
                AppError::Weather(WeatherError::InvalidApiKey)
            }
            WeatherFetchError::Status { status: 404, .. } => {
                AppError::Weather(WeatherError::CityNotFound)
            }
            WeatherFetchError::Status { status, .. } if status >= 500 => {
                AppError::Weather(WeatherError::ServiceUnavailable)
            }
            WeatherFetchError::Status { endpoint, status } => AppError::Weather(
                WeatherError::ApiError(format!("{} returned {}", endpoint, status)),
            ),
            WeatherFetchError::Decode { endpoint, message } => AppError::Network(
                NetworkError::InvalidResponse(format!("{}: {}", endpoint, message)),
            ),
        }
    }
}

impl IntoAppError for GeocodeError {
    fn into_app_error(self) -> AppError {
        match self {
            GeocodeError::Network(e) => AppError::Network(e.into_network_error()),
            GeocodeError::Status(status) => AppError::Network(NetworkError::ServerError {
                status,
                message: "city search failed".to_string(),
            }),
            GeocodeError::Decode(message) => {
                AppError::Network(NetworkError::InvalidResponse(message))
            }
        }
    }
}

impl IntoAppError for GeolocationError {
    fn into_app_error(self) -> AppError {
        match self {
            GeolocationError::PermissionDenied => {
                AppError::Location(LocationError::PermissionDenied)
            }
            GeolocationError::Unavailable => AppError::Location(LocationError::Unavailable),
        }
    }
}
