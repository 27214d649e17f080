//! Common types shared across the radar gridding crates.

pub mod error;
pub mod geo;
pub mod grid;
pub mod volume;

pub use error::{VolumeError, VolumeResult};
pub use geo::GeoPoint;
pub use grid::{CellIndex, GridShape, GridSpacing, GridSpec, Point3};
pub use volume::{FieldData, Gate, RadarVolume, Ray, Sweep, NO_DATA};
