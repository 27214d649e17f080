//! Radar beam geometry.
//!
//! Converts antenna coordinates (range along the beam, azimuth, elevation)
//! into a local Cartesian frame centered on the antenna, using the standard
//! effective earth radius model: atmospheric refraction bends the beam
//! toward the ground, which is equivalent to a straight beam over an earth
//! whose radius is scaled by 4/3.
//!
//! With effective radius `R`, a gate at range `r` and elevation `e` sits at
//!
//! ```text
//! h = sqrt(r² + R² + 2·r·R·sin(e)) - R
//! s = R · asin(r·cos(e) / (R + h))
//! x = s · sin(az),  y = s · cos(az)
//! ```
//!
//! where `s` is the great-circle distance along the ground and `h` the
//! height above the antenna.

/// Mean earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Standard atmosphere refraction factor.
pub const EFFECTIVE_RADIUS_FACTOR: f64 = 4.0 / 3.0;

/// Elevations this close to ±90° are treated as vertically pointing.
const VERTICAL_TOLERANCE_DEG: f64 = 1e-9;

/// Beam propagation model parameterized by the effective earth radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamModel {
    /// Effective earth radius in meters.
    pub effective_radius: f64,
}

impl Default for BeamModel {
    fn default() -> Self {
        Self::with_factor(EFFECTIVE_RADIUS_FACTOR)
    }
}

impl BeamModel {
    /// Model with an explicit effective radius in meters.
    pub fn new(effective_radius: f64) -> Self {
        Self { effective_radius }
    }

    /// Model with the effective radius set to `factor` earth radii.
    pub fn with_factor(factor: f64) -> Self {
        Self::new(EARTH_RADIUS * factor)
    }

    /// Height of a gate above the antenna.
    #[inline]
    pub fn height(&self, range: f64, elevation_deg: f64) -> f64 {
        let r_e = self.effective_radius;
        let sin_el = elevation_deg.to_radians().sin();
        (range * range + r_e * r_e + 2.0 * range * r_e * sin_el).sqrt() - r_e
    }

    /// Ground (arc) distance from the antenna to the point below a gate.
    ///
    /// A vertically pointing beam has no horizontal displacement.
    #[inline]
    pub fn ground_range(&self, range: f64, elevation_deg: f64) -> f64 {
        if (elevation_deg.abs() - 90.0).abs() <= VERTICAL_TOLERANCE_DEG {
            return 0.0;
        }
        let r_e = self.effective_radius;
        let h = self.height(range, elevation_deg);
        let arg = (range * elevation_deg.to_radians().cos() / (r_e + h)).clamp(-1.0, 1.0);
        r_e * arg.asin()
    }

    /// Antenna coordinates to `[x, y, z]` (east, north, up) in meters.
    #[inline]
    pub fn antenna_to_cartesian(&self, range: f64, azimuth_deg: f64, elevation_deg: f64) -> [f64; 3] {
        let z = self.height(range, elevation_deg);
        let s = self.ground_range(range, elevation_deg);
        let (sin_az, cos_az) = azimuth_deg.to_radians().sin_cos();
        [s * sin_az, s * cos_az, z]
    }

    /// Cartesian `(x, y, z)` relative to the antenna back to
    /// `(range, azimuth_deg, elevation_deg)`.
    ///
    /// Azimuth is returned in `[0, 360)`. A point directly above or below the
    /// antenna reports azimuth 0.
    pub fn cartesian_to_antenna(&self, x: f64, y: f64, z: f64) -> (f64, f64, f64) {
        let r_e = self.effective_radius;
        let s = x.hypot(y);
        let theta = s / r_e;

        // Position relative to the antenna in the vertical plane of the beam.
        let along = (r_e + z) * theta.sin();
        let up = (r_e + z) * theta.cos() - r_e;

        let range = along.hypot(up);
        let elevation = up.atan2(along).to_degrees();
        let azimuth = if s == 0.0 {
            0.0
        } else {
            x.atan2(y).to_degrees().rem_euclid(360.0)
        };

        (range, azimuth, elevation)
    }
}

/// [`BeamModel::antenna_to_cartesian`] with the standard 4/3 earth model.
pub fn antenna_to_cartesian(range: f64, azimuth_deg: f64, elevation_deg: f64) -> [f64; 3] {
    BeamModel::default().antenna_to_cartesian(range, azimuth_deg, elevation_deg)
}

/// [`BeamModel::cartesian_to_antenna`] with the standard 4/3 earth model.
pub fn cartesian_to_antenna(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    BeamModel::default().cartesian_to_antenna(x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_range_is_origin() {
        let [x, y, z] = antenna_to_cartesian(0.0, 123.0, 4.5);
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9 && z.abs() < 1e-9);
    }

    #[test]
    fn test_azimuth_rotation() {
        // North
        let [x, y, _] = antenna_to_cartesian(10_000.0, 0.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!(y > 9_990.0);

        // East
        let [x, y, _] = antenna_to_cartesian(10_000.0, 90.0, 0.0);
        assert!(x > 9_990.0);
        assert!(y.abs() < 1e-6);

        // South-west quadrant
        let [x, y, _] = antenna_to_cartesian(10_000.0, 225.0, 0.0);
        assert!(x < 0.0 && y < 0.0);
        assert!((x - y).abs() < 1e-6);
    }

    #[test]
    fn test_beam_rises_with_range_at_zero_elevation() {
        // Earth curvature lifts a horizontal beam: ~5.9 m at 10 km, ~589 m at 100 km
        let near = BeamModel::default().height(10_000.0, 0.0);
        let far = BeamModel::default().height(100_000.0, 0.0);
        assert!((near - 5.89).abs() < 0.05, "near = {near}");
        assert!((far - 588.6).abs() < 1.0, "far = {far}");
    }

    #[test]
    fn test_ground_range_shorter_than_slant_range() {
        let model = BeamModel::default();
        for el in [0.0, 0.5, 3.0, 10.0, 45.0] {
            let s = model.ground_range(150_000.0, el);
            assert!(s < 150_000.0 + 1e-6);
            assert!(s > 0.0);
        }
    }

    #[test]
    fn test_vertical_beam_has_no_horizontal_displacement() {
        let [x, y, z] = antenna_to_cartesian(5_000.0, 37.0, 90.0);
        assert_eq!(x, 0.0);
        assert_eq!(y, 0.0);
        assert!((z - 5_000.0).abs() < 1e-6);

        let [x, y, z] = antenna_to_cartesian(5_000.0, 37.0, -90.0);
        assert_eq!((x, y), (0.0, 0.0));
        assert!((z + 5_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_cartesian_to_antenna_inverts() {
        let model = BeamModel::default();
        for &(r, az, el) in &[
            (1_000.0, 10.0, 0.5),
            (75_000.0, 200.0, 2.4),
            (230_000.0, 359.0, 0.0),
            (12_345.0, 90.0, 19.5),
        ] {
            let [x, y, z] = model.antenna_to_cartesian(r, az, el);
            let (r2, az2, el2) = model.cartesian_to_antenna(x, y, z);
            assert!((r - r2).abs() < 1e-4, "range {r} -> {r2}");
            assert!((az - az2).abs() < 1e-8, "azimuth {az} -> {az2}");
            assert!((el - el2).abs() < 1e-8, "elevation {el} -> {el2}");
        }
    }

    #[test]
    fn test_cartesian_to_antenna_overhead() {
        let (r, az, el) = cartesian_to_antenna(0.0, 0.0, 3_000.0);
        assert!((r - 3_000.0).abs() < 1e-9);
        assert_eq!(az, 0.0);
        assert!((el - 90.0).abs() < 1e-9);
    }
}
