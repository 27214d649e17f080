//! Coordinate transformations for radar gridding.
//!
//! Implements the beam geometry and map projection from scratch without
//! external dependencies.

pub mod aeqd;
pub mod beam;
pub mod error;

pub use aeqd::{AzimuthalEquidistant, AEQD_EARTH_RADIUS};
pub use beam::{
    antenna_to_cartesian, cartesian_to_antenna, BeamModel, EARTH_RADIUS, EFFECTIVE_RADIUS_FACTOR,
};
pub use error::{ProjectionError, ProjectionResult};
