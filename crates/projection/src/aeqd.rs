//! Azimuthal equidistant projection.
//!
//! Distances and directions from the projection center are preserved, which
//! makes it the natural frame for a radar-centered or grid-centered local
//! Cartesian system. Used to place radar sites relative to a grid anchor and
//! to recover the latitude/longitude of grid cells.
//!
//! Spherical earth formulas (Snyder, Map Projections: A Working Manual,
//! p. 195-197).

use crate::error::{ProjectionError, ProjectionResult};
use std::f64::consts::PI;

/// Sphere radius in meters used by the projection.
pub const AEQD_EARTH_RADIUS: f64 = 6_370_997.0;

/// Azimuthal equidistant projection about a center point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthalEquidistant {
    /// Latitude of the projection center in radians
    lat0: f64,
    /// Longitude of the projection center in radians
    lon0: f64,
    /// Sphere radius (meters)
    radius: f64,
}

impl AzimuthalEquidistant {
    /// Create a projection centered at `(lat0_deg, lon0_deg)`.
    pub fn new(lat0_deg: f64, lon0_deg: f64) -> ProjectionResult<Self> {
        if !(lat0_deg.is_finite() && lon0_deg.is_finite()) {
            return Err(ProjectionError::InvalidOrigin(format!(
                "non-finite center ({lat0_deg}, {lon0_deg})"
            )));
        }
        if lat0_deg.abs() > 90.0 {
            return Err(ProjectionError::InvalidOrigin(format!(
                "latitude {lat0_deg} outside [-90, 90]"
            )));
        }

        Ok(Self {
            lat0: lat0_deg.to_radians(),
            lon0: lon0_deg.to_radians(),
            radius: AEQD_EARTH_RADIUS,
        })
    }

    /// Project geographic coordinates (degrees) to `(x, y)` meters.
    ///
    /// The antipode of the center has no unique projection and is rejected.
    pub fn geo_to_xy(&self, lat_deg: f64, lon_deg: f64) -> ProjectionResult<(f64, f64)> {
        let lat = lat_deg.to_radians();
        let dlon = lon_deg.to_radians() - self.lon0;

        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lat0, cos_lat0) = self.lat0.sin_cos();
        let cos_dlon = dlon.cos();

        let cos_c = (sin_lat0 * sin_lat + cos_lat0 * cos_lat * cos_dlon).clamp(-1.0, 1.0);
        let c = cos_c.acos();

        let k = if c == 0.0 {
            1.0
        } else {
            let sin_c = c.sin();
            if sin_c.abs() < 1e-12 {
                return Err(ProjectionError::Antipodal {
                    lat: lat_deg,
                    lon: lon_deg,
                });
            }
            c / sin_c
        };

        let x = self.radius * k * cos_lat * dlon.sin();
        let y = self.radius * k * (cos_lat0 * sin_lat - sin_lat0 * cos_lat * cos_dlon);
        Ok((x, y))
    }

    /// Inverse projection: `(x, y)` meters to `(lat, lon)` in degrees.
    ///
    /// Longitude is normalized to `[-180, 180)`.
    pub fn xy_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let rho = x.hypot(y);
        if rho == 0.0 {
            return (self.lat0.to_degrees(), normalize_lon(self.lon0).to_degrees());
        }

        let c = rho / self.radius;
        let (sin_c, cos_c) = c.sin_cos();
        let (sin_lat0, cos_lat0) = self.lat0.sin_cos();

        let lat = (cos_c * sin_lat0 + y * sin_c * cos_lat0 / rho)
            .clamp(-1.0, 1.0)
            .asin();
        let lon = self.lon0 + (x * sin_c).atan2(rho * cos_lat0 * cos_c - y * sin_lat0 * sin_c);

        (lat.to_degrees(), normalize_lon(lon).to_degrees())
    }
}

/// Wrap a longitude in radians into `[-π, π)`.
fn normalize_lon(lon: f64) -> f64 {
    (lon + PI).rem_euclid(2.0 * PI) - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_origin() {
        let proj = AzimuthalEquidistant::new(36.5, -97.5).unwrap();
        let (x, y) = proj.geo_to_xy(36.5, -97.5).unwrap();
        assert_eq!((x, y), (0.0, 0.0));
        let (lat, lon) = proj.xy_to_geo(0.0, 0.0);
        assert!((lat - 36.5).abs() < 1e-12);
        assert!((lon + 97.5).abs() < 1e-12);
    }

    #[test]
    fn test_distance_along_meridian() {
        // One degree of latitude north is R * pi / 180 meters straight up
        let proj = AzimuthalEquidistant::new(0.0, 0.0).unwrap();
        let (x, y) = proj.geo_to_xy(1.0, 0.0).unwrap();
        let expected = AEQD_EARTH_RADIUS * PI / 180.0;
        assert!(x.abs() < 1e-6);
        assert!((y - expected).abs() < 1e-6);
    }

    #[test]
    fn test_east_is_positive_x() {
        let proj = AzimuthalEquidistant::new(45.0, 10.0).unwrap();
        let (x, _) = proj.geo_to_xy(45.0, 10.5).unwrap();
        assert!(x > 0.0);
        let (x, _) = proj.geo_to_xy(45.0, 9.5).unwrap();
        assert!(x < 0.0);
    }

    #[test]
    fn test_roundtrip() {
        let proj = AzimuthalEquidistant::new(35.33, -97.28).unwrap();
        for &(lat, lon) in &[(36.0, -98.0), (34.1, -96.2), (35.33, -97.0), (40.0, -90.0)] {
            let (x, y) = proj.geo_to_xy(lat, lon).unwrap();
            let (lat2, lon2) = proj.xy_to_geo(x, y);
            assert!((lat - lat2).abs() < 1e-9, "lat {lat} -> {lat2}");
            assert!((lon - lon2).abs() < 1e-9, "lon {lon} -> {lon2}");
        }
    }

    #[test]
    fn test_longitude_wraps_across_dateline() {
        let proj = AzimuthalEquidistant::new(0.0, 179.5).unwrap();
        let (x, y) = proj.geo_to_xy(0.0, -179.5).unwrap();
        assert!(x > 0.0);
        let (_, lon) = proj.xy_to_geo(x, y);
        assert!((lon + 179.5).abs() < 1e-9);
    }

    #[test]
    fn test_antipode_rejected() {
        let proj = AzimuthalEquidistant::new(0.0, 0.0).unwrap();
        assert!(matches!(
            proj.geo_to_xy(0.0, 180.0),
            Err(ProjectionError::Antipodal { .. })
        ));
    }

    #[test]
    fn test_invalid_center() {
        assert!(AzimuthalEquidistant::new(95.0, 0.0).is_err());
        assert!(AzimuthalEquidistant::new(0.0, f64::INFINITY).is_err());
    }
}
