//! Synthetic radar volume generators.
//!
//! These generators create predictable, verifiable radar volumes that can
//! be used across the test suite and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use radar_common::{FieldData, GeoPoint, RadarVolume, Ray, Sweep};

/// Creates a volume holding exactly one gate with one field.
///
/// # Example
///
/// ```
/// use radar_common::GeoPoint;
/// use test_utils::single_gate_volume;
///
/// let site = GeoPoint::new(35.0, -97.0, 0.0);
/// let vol = single_gate_volume("KTLX", site, 10_000.0, 90.0, 0.5, "reflectivity", 25.0);
/// assert_eq!(vol.gate_count(), 1);
/// assert_eq!(vol.gate_value(0, "reflectivity"), Some(25.0));
/// ```
pub fn single_gate_volume(
    name: &str,
    site: GeoPoint,
    range: f64,
    azimuth: f64,
    elevation: f64,
    field: &str,
    value: f32,
) -> RadarVolume {
    RadarVolume::new(
        name,
        site,
        vec![range],
        vec![Sweep::new(elevation, vec![Ray::new(azimuth, elevation)])],
    )
    .and_then(|v| v.with_field(field, FieldData::new(vec![value])))
    .unwrap_or_else(|e| panic!("invalid single gate volume: {e}"))
}

/// Creates a PPI volume with no fields.
///
/// Every sweep has `azimuth_count` evenly spaced rays starting at north and
/// `gate_count` gates spaced `gate_spacing` meters apart, the first one
/// `gate_spacing` from the antenna.
///
/// # Example
///
/// ```
/// use radar_common::GeoPoint;
/// use test_utils::ppi_volume;
///
/// let vol = ppi_volume("KTLX", GeoPoint::new(35.0, -97.0, 0.0), &[0.5, 1.5], 360, 100, 250.0);
/// assert_eq!(vol.gate_count(), 2 * 360 * 100);
/// ```
pub fn ppi_volume(
    name: &str,
    site: GeoPoint,
    elevations: &[f64],
    azimuth_count: usize,
    gate_count: usize,
    gate_spacing: f64,
) -> RadarVolume {
    let step = 360.0 / azimuth_count.max(1) as f64;
    let azimuths: Vec<f64> = (0..azimuth_count).map(|i| i as f64 * step).collect();
    let ranges: Vec<f64> = (1..=gate_count).map(|i| i as f64 * gate_spacing).collect();
    let sweeps = elevations
        .iter()
        .map(|&el| Sweep::ppi(el, &azimuths))
        .collect();

    RadarVolume::new(name, site, ranges, sweeps)
        .unwrap_or_else(|e| panic!("invalid PPI volume: {e}"))
}

/// Creates a field filled with a constant value.
pub fn constant_field(volume: &RadarVolume, value: f32) -> FieldData {
    FieldData::new(vec![value; volume.gate_count()])
}

/// Creates a reflectivity-like field with a storm cell.
///
/// Values peak near 55 dBZ at 30 km range on the 45 degree radial and fall
/// off to about 5 dBZ away from it. The pattern is deterministic.
pub fn storm_reflectivity(volume: &RadarVolume) -> FieldData {
    let values = volume
        .gates()
        .map(|gate| {
            let dr = (gate.range - 30_000.0) / 12_000.0;
            let mut daz = (gate.azimuth - 45.0).rem_euclid(360.0);
            if daz > 180.0 {
                daz -= 360.0;
            }
            let da = daz / 25.0;
            let core = (-(dr * dr) - da * da).exp();
            (5.0 + 50.0 * core - 0.5 * gate.elevation) as f32
        })
        .collect();
    FieldData::new(values)
}

/// Creates a velocity-like field: a uniform wind seen as radial velocity.
///
/// `speed` m/s blowing toward `direction` degrees clockwise from north.
pub fn radial_wind(volume: &RadarVolume, speed: f64, direction: f64) -> FieldData {
    let values = volume
        .gates()
        .map(|gate| {
            let rel = (gate.azimuth - direction).to_radians();
            (speed * rel.cos() * gate.elevation.to_radians().cos()) as f32
        })
        .collect();
    FieldData::new(values)
}

/// Creates a field of uniform random values in `[low, high)`.
///
/// Deterministic for a given seed.
pub fn random_field(volume: &RadarVolume, low: f32, high: f32, seed: u64) -> FieldData {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..volume.gate_count())
        .map(|_| rng.gen_range(low..high))
        .collect();
    FieldData::new(values)
}

/// Masks every `n`th gate of a field (gate 0, n, 2n, ...).
pub fn mask_every(field: &FieldData, n: usize) -> FieldData {
    let n = n.max(1);
    FieldData::from_options(
        (0..field.len()).map(|i| if i % n == 0 { None } else { field.value(i) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> GeoPoint {
        GeoPoint::new(35.0, -97.0, 300.0)
    }

    #[test]
    fn test_ppi_volume_layout() {
        let vol = ppi_volume("test", site(), &[0.5, 2.4], 4, 3, 1000.0);
        assert_eq!(vol.gate_count(), 24);
        assert_eq!(vol.ranges(), &[1000.0, 2000.0, 3000.0]);

        let gate = vol.gate(4).unwrap();
        assert_eq!(gate.azimuth, 90.0);
        assert_eq!(gate.range, 2000.0);

        let gate = vol.gate(12).unwrap();
        assert_eq!(gate.elevation, 2.4);
        assert_eq!(gate.azimuth, 0.0);
    }

    #[test]
    fn test_storm_reflectivity_peaks_in_core() {
        let vol = ppi_volume("test", site(), &[0.5], 360, 240, 250.0);
        let field = storm_reflectivity(&vol);
        assert_eq!(field.len(), vol.gate_count());

        let max = field.values().iter().cloned().fold(f32::MIN, f32::max);
        let min = field.values().iter().cloned().fold(f32::MAX, f32::min);
        assert!(max > 50.0);
        assert!(min < 10.0);
    }

    #[test]
    fn test_random_field_is_deterministic() {
        let vol = ppi_volume("test", site(), &[0.5], 10, 10, 250.0);
        let a = random_field(&vol, -10.0, 60.0, 42);
        let b = random_field(&vol, -10.0, 60.0, 42);
        assert_eq!(a, b);
        assert!(a.values().iter().all(|&v| (-10.0..60.0).contains(&v)));
    }

    #[test]
    fn test_mask_every() {
        let vol = ppi_volume("test", site(), &[0.5], 2, 5, 250.0);
        let masked = mask_every(&constant_field(&vol, 7.0), 3);
        assert_eq!(masked.valid_count(), 6);
        assert_eq!(masked.value(0), None);
        assert_eq!(masked.value(1), Some(7.0));
    }

    #[test]
    fn test_radial_wind() {
        let vol = ppi_volume("test", site(), &[0.0], 4, 1, 1000.0);
        let field = radial_wind(&vol, 10.0, 0.0);
        assert!((field.values()[0] - 10.0).abs() < 1e-5);
        assert!(field.values()[1].abs() < 1e-5);
        assert!((field.values()[2] + 10.0).abs() < 1e-5);
    }
}
