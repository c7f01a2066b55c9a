//! Device position lookup for "use my location".

use crate::types::{GeolocationError, Location};

pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

/// Something that can report where the device is
pub trait GeolocationSource: Send + Sync {
    fn current_position(&self) -> Result<(f64, f64), GeolocationError>;
}

/// A position configured ahead of time. With none configured the source
/// behaves like a device without geolocation support.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition {
    position: Option<(f64, f64)>,
}

impl FixedPosition {
    pub fn new(position: Option<(f64, f64)>) -> Self {
        Self { position }
    }
}

impl GeolocationSource for FixedPosition {
    fn current_position(&self) -> Result<(f64, f64), GeolocationError> {
        self.position.ok_or(GeolocationError::Unavailable)
    }
}

/// Resolve the device position into a selectable location.
pub fn current_location(source: &dyn GeolocationSource) -> Result<Location, GeolocationError> {
    let (latitude, longitude) = source.current_position()?;
    let location = Location::new(CURRENT_LOCATION_LABEL, latitude, longitude);
    if !location.has_valid_coordinates() {
        return Err(GeolocationError::Unavailable);
    }
    tracing::info!("Got location: {}, {}", latitude, longitude);
    Ok(location)
}
