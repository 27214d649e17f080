//! In-memory radar volumes in native polar geometry.
//!
//! A volume is an ordered list of sweeps, each an ordered list of rays. All
//! rays share one set of gate ranges, so field arrays are laid out ray-major:
//! the gate at `range_index` on the `ray`-th ray of the whole volume lives at
//! flat index `ray * gates_per_ray + range_index`.

use crate::error::{VolumeError, VolumeResult};
use crate::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel written to grid cells that received no valid data.
pub const NO_DATA: f32 = -9999.0;

/// Pointing angles of one ray, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Clockwise from north.
    pub azimuth: f64,
    /// Above the horizon.
    pub elevation: f64,
}

impl Ray {
    pub fn new(azimuth: f64, elevation: f64) -> Self {
        Self { azimuth, elevation }
    }
}

/// One antenna rotation at a nominal elevation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    /// Nominal (fixed) elevation angle in degrees.
    pub fixed_angle: f64,
    pub rays: Vec<Ray>,
}

impl Sweep {
    pub fn new(fixed_angle: f64, rays: Vec<Ray>) -> Self {
        Self { fixed_angle, rays }
    }

    /// A PPI sweep whose rays all point at the fixed angle.
    pub fn ppi(fixed_angle: f64, azimuths: &[f64]) -> Self {
        let rays = azimuths
            .iter()
            .map(|&az| Ray::new(az, fixed_angle))
            .collect();
        Self::new(fixed_angle, rays)
    }

    pub fn len(&self) -> usize {
        self.rays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }
}

/// Values of one field for every gate of a volume, with an explicit
/// validity channel.
///
/// A value is valid when it is finite and not masked. Non-finite values are
/// always treated as masked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldData {
    values: Vec<f32>,
    mask: Option<Vec<bool>>,
}

impl FieldData {
    /// Field with no mask.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, mask: None }
    }

    /// Field with a mask where `true` marks an invalid gate.
    pub fn with_mask(values: Vec<f32>, mask: Vec<bool>) -> Self {
        Self {
            values,
            mask: Some(mask),
        }
    }

    /// Field from optional values, `None` becoming a masked gate.
    pub fn from_options(values: impl IntoIterator<Item = Option<f32>>) -> Self {
        let (values, mask): (Vec<f32>, Vec<bool>) = values
            .into_iter()
            .map(|v| match v {
                Some(v) => (v, false),
                None => (NO_DATA, true),
            })
            .unzip();
        Self::with_mask(values, mask)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }

    /// Whether the gate at `index` holds a usable value.
    #[inline]
    pub fn is_valid(&self, index: usize) -> bool {
        let finite = matches!(self.values.get(index), Some(v) if v.is_finite());
        let masked = self
            .mask
            .as_ref()
            .map_or(false, |m| m.get(index).copied().unwrap_or(true));
        finite && !masked
    }

    /// The value at `index` if it is valid.
    #[inline]
    pub fn value(&self, index: usize) -> Option<f32> {
        if self.is_valid(index) {
            Some(self.values[index])
        } else {
            None
        }
    }

    /// Number of valid gates.
    pub fn valid_count(&self) -> usize {
        (0..self.values.len()).filter(|&i| self.is_valid(i)).count()
    }
}

/// One range-resolved measurement location of a volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gate {
    /// Flat index into the volume's field arrays.
    pub index: usize,
    pub sweep: usize,
    /// Ray number within the whole volume.
    pub ray: usize,
    /// Gate range along the beam in meters.
    pub range: f64,
    pub azimuth: f64,
    pub elevation: f64,
}

/// A complete radar scan, owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarVolume {
    name: String,
    site: GeoPoint,
    scan_time: Option<DateTime<Utc>>,
    ranges: Vec<f64>,
    sweeps: Vec<Sweep>,
    fields: BTreeMap<String, FieldData>,
    gate_filter: Option<Vec<bool>>,
}

impl RadarVolume {
    /// Create a volume with no fields.
    ///
    /// `ranges` are the gate center ranges in meters shared by every ray.
    pub fn new(
        name: impl Into<String>,
        site: GeoPoint,
        ranges: Vec<f64>,
        sweeps: Vec<Sweep>,
    ) -> VolumeResult<Self> {
        site.validate()?;
        if let Some((index, &value)) = ranges
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r >= 0.0))
        {
            return Err(VolumeError::InvalidRange { index, value });
        }

        Ok(Self {
            name: name.into(),
            site,
            scan_time: None,
            ranges,
            sweeps,
            fields: BTreeMap::new(),
            gate_filter: None,
        })
    }

    pub fn with_scan_time(mut self, time: DateTime<Utc>) -> Self {
        self.scan_time = Some(time);
        self
    }

    /// Attach a field, checking it covers every gate.
    pub fn with_field(mut self, name: impl Into<String>, data: FieldData) -> VolumeResult<Self> {
        self.add_field(name, data)?;
        Ok(self)
    }

    /// Attach or replace a field, checking it covers every gate.
    pub fn add_field(&mut self, name: impl Into<String>, data: FieldData) -> VolumeResult<()> {
        let name = name.into();
        let expected = self.gate_count();
        if data.len() != expected {
            return Err(VolumeError::FieldLengthMismatch {
                field: name,
                expected,
                actual: data.len(),
            });
        }
        if let Some(mask) = data.mask() {
            if mask.len() != expected {
                return Err(VolumeError::MaskLengthMismatch {
                    field: name,
                    expected,
                    actual: mask.len(),
                });
            }
        }
        self.fields.insert(name, data);
        Ok(())
    }

    /// Exclude gates from gridding; `true` marks an excluded gate.
    pub fn with_gate_filter(mut self, excluded: Vec<bool>) -> VolumeResult<Self> {
        let expected = self.gate_count();
        if excluded.len() != expected {
            return Err(VolumeError::FilterLengthMismatch {
                expected,
                actual: excluded.len(),
            });
        }
        self.gate_filter = Some(excluded);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn site(&self) -> GeoPoint {
        self.site
    }

    pub fn scan_time(&self) -> Option<DateTime<Utc>> {
        self.scan_time
    }

    pub fn ranges(&self) -> &[f64] {
        &self.ranges
    }

    pub fn sweeps(&self) -> &[Sweep] {
        &self.sweeps
    }

    pub fn gates_per_ray(&self) -> usize {
        self.ranges.len()
    }

    pub fn ray_count(&self) -> usize {
        self.sweeps.iter().map(Sweep::len).sum()
    }

    /// Total number of gates across all sweeps.
    pub fn gate_count(&self) -> usize {
        self.ray_count() * self.gates_per_ray()
    }

    pub fn field(&self, name: &str) -> Option<&FieldData> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Whether the caller's gate filter excludes the gate.
    #[inline]
    pub fn is_excluded(&self, index: usize) -> bool {
        self.gate_filter
            .as_ref()
            .map_or(false, |f| f.get(index).copied().unwrap_or(true))
    }

    /// Valid value of a field at a gate.
    pub fn gate_value(&self, index: usize, field: &str) -> Option<f32> {
        self.fields.get(field).and_then(|f| f.value(index))
    }

    /// Look up a single gate by flat index.
    pub fn gate(&self, index: usize) -> Option<Gate> {
        let per_ray = self.gates_per_ray();
        if per_ray == 0 || index >= self.gate_count() {
            return None;
        }
        let ray_number = index / per_ray;
        let range_index = index % per_ray;
        let (sweep, ray) = self.rays().nth(ray_number)?;

        Some(Gate {
            index,
            sweep,
            ray: ray_number,
            range: self.ranges[range_index],
            azimuth: ray.azimuth,
            elevation: ray.elevation,
        })
    }

    /// Iterate over all gates in flat-index order.
    pub fn gates(&self) -> impl Iterator<Item = Gate> + '_ {
        let per_ray = self.gates_per_ray();
        self.rays()
            .enumerate()
            .flat_map(move |(ray_number, (sweep, ray))| {
                self.ranges
                    .iter()
                    .enumerate()
                    .map(move |(range_index, &range)| Gate {
                        index: ray_number * per_ray + range_index,
                        sweep,
                        ray: ray_number,
                        range,
                        azimuth: ray.azimuth,
                        elevation: ray.elevation,
                    })
            })
    }

    fn rays(&self) -> impl Iterator<Item = (usize, &Ray)> {
        self.sweeps
            .iter()
            .enumerate()
            .flat_map(|(s, sweep)| sweep.rays.iter().map(move |ray| (s, ray)))
    }
}
