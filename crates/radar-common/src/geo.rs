//! Geographic positions.

use crate::error::{VolumeError, VolumeResult};
use serde::{Deserialize, Serialize};

/// A point on the earth: latitude/longitude in degrees, altitude in meters
/// above mean sea level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Check that the coordinates are finite and the latitude is on the globe.
    pub fn validate(&self) -> VolumeResult<()> {
        if !(self.latitude.is_finite() && self.longitude.is_finite() && self.altitude.is_finite()) {
            return Err(VolumeError::InvalidSite(format!(
                "non-finite coordinates {:?}",
                self
            )));
        }
        if self.latitude.abs() > 90.0 {
            return Err(VolumeError::InvalidSite(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        Ok(())
    }
}
