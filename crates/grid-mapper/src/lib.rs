//! Gate-to-grid mapping for weather radar volumes.
//!
//! Radar gates sampled along beams in spherical coordinates are mapped onto
//! a regular 3-D Cartesian grid. Every cell value is a distance-weighted
//! combination of the gates inside the cell's radius of influence, and cells
//! covered by several radars are resolved by a merge policy.
//!
//! # Architecture
//!
//! ```text
//! RadarVolume(s)
//!      │
//!      ▼
//! GridMapper::map_to_grid(volumes, spec, fields)
//!      │
//!      ├─► GridSpec::validate (fails fast, nothing built yet)
//!      │
//!      ├─► per radar: GateCloud::build (beam model + AEQD offset)
//!      │                   └─► SpatialIndex::build (kd-tree)
//!      │
//!      ├─► per x-row, in parallel:
//!      │         │
//!      │         ├─► RoiConfig::radius(cell, radar)
//!      │         ├─► SpatialIndex::query_radius_into
//!      │         ├─► aggregate (Weighting) per radar and field
//!      │         └─► merge::resolve across radars
//!      │
//!      └─► MappedGrid (fields, diagnostics, ROI map, notices)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_mapper::{GridMapper, MappingConfig};
//!
//! let mapper = GridMapper::new(MappingConfig::from_env())?;
//! let grid = mapper.map_to_grid(&volumes, &spec, &["reflectivity"])?;
//!
//! let dbz = grid.value("reflectivity", CellIndex::new(10, 20, 2));
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod gates;
pub mod index;
pub mod mapper;
pub mod merge;
pub mod roi;
pub mod types;
pub mod weighting;

// Re-export commonly used types at crate root
pub use aggregate::{aggregate, CellAggregate};
pub use config::{MappingConfig, DEFAULT_TOP_OF_ATMOSPHERE};
pub use error::{GridMapperError, Result};
pub use gates::{radar_offset, GateCloud, GateCounts};
pub use index::{Neighbor, SpatialIndex};
pub use mapper::{map_to_grid, GridMapper};
pub use merge::{merge_grids, resolve, MergePolicy};
pub use roi::{RoiConfig, RoiPolicy};
pub use types::{GridField, MappedGrid, MapperStats, MappingNotice, RadarOrigin};
pub use weighting::Weighting;

pub use radar_common::{CellIndex, GeoPoint, GridShape, GridSpacing, GridSpec, Point3, RadarVolume, NO_DATA};
