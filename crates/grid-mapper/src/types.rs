//! Mapping results and statistics.

use crate::aggregate::CellAggregate;
use crate::error::Result;
use chrono::{DateTime, Utc};
use projection::AzimuthalEquidistant;
use radar_common::{CellIndex, GridSpec, Point3, NO_DATA};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One mapped field with its per-cell diagnostics.
///
/// All arrays are z-major (`(nz, ny, nx)`, x fastest) and have one entry per
/// grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GridField {
    /// Aggregated values, [`NO_DATA`] where no gate contributed.
    pub data: Vec<f32>,
    /// Number of contributing gates.
    pub gate_count: Vec<u32>,
    /// Sum of contributing weights.
    pub weight_sum: Vec<f64>,
    /// Distance from the cell center to the closest contributing gate;
    /// infinite where no gate contributed.
    pub nearest_distance: Vec<f64>,
}

impl GridField {
    /// A field with every cell set to no data.
    pub fn empty(len: usize) -> Self {
        Self {
            data: vec![NO_DATA; len],
            gate_count: vec![0; len],
            weight_sum: vec![0.0; len],
            nearest_distance: vec![f64::INFINITY; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write one cell.
    pub fn set(&mut self, flat: usize, agg: &CellAggregate) {
        self.data[flat] = agg.value;
        self.gate_count[flat] = agg.gate_count;
        self.weight_sum[flat] = agg.weight_sum;
        self.nearest_distance[flat] = agg.nearest_distance;
    }

    /// Rebuild the aggregate stored at `flat`, tagged with the given ROI.
    pub fn aggregate_at(&self, flat: usize, roi: f64) -> CellAggregate {
        CellAggregate {
            value: self.data[flat],
            gate_count: self.gate_count[flat],
            weight_sum: self.weight_sum[flat],
            nearest_distance: self.nearest_distance[flat],
            roi,
        }
    }

    /// Number of cells holding data.
    pub fn valid_count(&self) -> usize {
        self.gate_count.iter().filter(|&&c| c > 0).count()
    }
}

/// A radar that contributed to a grid, positioned in the grid frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarOrigin {
    pub name: String,
    pub origin: Point3,
    /// Scan time of the volume, when the caller supplied one.
    pub scan_time: Option<DateTime<Utc>>,
}

/// Non-fatal conditions met while mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingNotice {
    /// No radar volumes, or no gates in any of them; the grid is all no data.
    EmptyInput,
    /// A radar lacks a requested field and contributed nothing to it.
    FieldNotFound { radar: String, field: String },
}

impl fmt::Display for MappingNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty input"),
            Self::FieldNotFound { radar, field } => {
                write!(f, "field '{field}' not found in radar '{radar}'")
            }
        }
    }
}

/// Gridded fields produced by one mapping call.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedGrid {
    /// The grid the fields are defined on.
    pub spec: GridSpec,
    /// Mapped fields by name.
    pub fields: BTreeMap<String, GridField>,
    /// Radius of influence used at each cell, taken from the radar closest
    /// to the cell center.
    pub roi: Vec<f64>,
    /// Radars that were mapped, in input order.
    pub radars: Vec<RadarOrigin>,
    pub notices: Vec<MappingNotice>,
}

impl MappedGrid {
    /// An all-no-data grid for the given fields.
    pub fn empty<S: AsRef<str>>(spec: GridSpec, fields: &[S], roi: Vec<f64>) -> Self {
        let len = spec.len();
        Self {
            fields: fields
                .iter()
                .map(|f| (f.as_ref().to_string(), GridField::empty(len)))
                .collect(),
            spec,
            roi,
            radars: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&GridField> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Stored value of a cell, which may be [`NO_DATA`].
    ///
    /// Returns `None` for an unknown field or a cell outside the grid.
    pub fn get(&self, field: &str, cell: CellIndex) -> Option<f32> {
        let flat = self.checked_flat(cell)?;
        self.fields.get(field).map(|f| f.data[flat])
    }

    /// Value of a cell, or `None` when it holds no data.
    pub fn value(&self, field: &str, cell: CellIndex) -> Option<f32> {
        let flat = self.checked_flat(cell)?;
        let f = self.fields.get(field)?;
        (f.gate_count[flat] > 0).then(|| f.data[flat])
    }

    /// Contributing gate count of a cell.
    pub fn gate_count(&self, field: &str, cell: CellIndex) -> Option<u32> {
        let flat = self.checked_flat(cell)?;
        self.fields.get(field).map(|f| f.gate_count[flat])
    }

    /// Radius of influence used at a cell.
    pub fn roi_at(&self, cell: CellIndex) -> Option<f64> {
        self.checked_flat(cell).map(|flat| self.roi[flat])
    }

    /// Latitude and longitude of a cell center.
    pub fn cell_geographic(&self, cell: CellIndex) -> Result<(f64, f64)> {
        let proj = AzimuthalEquidistant::new(self.spec.anchor.latitude, self.spec.anchor.longitude)?;
        let center = self.spec.cell_center(cell);
        Ok(proj.xy_to_geo(center.x, center.y))
    }

    pub fn has_notice(&self, notice: &MappingNotice) -> bool {
        self.notices.contains(notice)
    }

    pub fn len(&self) -> usize {
        self.spec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spec.is_empty()
    }

    fn checked_flat(&self, cell: CellIndex) -> Option<usize> {
        let shape = self.spec.shape;
        (cell.x < shape.nx && cell.y < shape.ny && cell.z < shape.nz)
            .then(|| self.spec.flat_index(cell))
    }
}

/// Snapshot of [`GridMapper`](crate::GridMapper) counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapperStats {
    /// Completed mapping calls.
    pub mappings: u64,
    /// Spatial indexes built.
    pub indexes_built: u64,
    /// Grid cells computed.
    pub cells_mapped: u64,
    /// Gates inserted into spatial indexes.
    pub gates_indexed: u64,
}

impl MapperStats {
    /// Average indexed gates per spatial index.
    pub fn gates_per_index(&self) -> f64 {
        if self.indexes_built == 0 {
            0.0
        } else {
            self.gates_indexed as f64 / self.indexes_built as f64
        }
    }
}
