//! Error types for gate-to-grid mapping.

use projection::ProjectionError;
use radar_common::VolumeError;
use thiserror::Error;

/// Errors that stop a mapping before any per-cell work starts.
///
/// Sparse or missing data is never an error: empty neighbourhoods, masked
/// gates, missing fields and empty inputs all produce "no data" cells.
#[derive(Error, Debug)]
pub enum GridMapperError {
    /// A cell count is zero or a spacing is not positive.
    #[error("invalid grid specification: {0}")]
    InvalidGridSpec(String),

    /// Weighting function parameters are out of range.
    #[error("invalid weighting parameters: {0}")]
    InvalidWeightingParameters(String),

    /// Radius-of-influence parameters could produce a negative radius.
    #[error("invalid radius of influence parameters: {0}")]
    InvalidRoiParameters(String),

    /// Configuration could not be parsed or is inconsistent.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// Grids to be merged do not share a specification or field set.
    #[error("grid mismatch: {0}")]
    GridMismatch(String),

    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("volume error: {0}")]
    Volume(#[from] VolumeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridMapperError {
    /// Create an InvalidGridSpec error.
    pub fn invalid_grid_spec(msg: impl Into<String>) -> Self {
        Self::InvalidGridSpec(msg.into())
    }

    /// Create an InvalidWeightingParameters error.
    pub fn invalid_weighting(msg: impl Into<String>) -> Self {
        Self::InvalidWeightingParameters(msg.into())
    }

    /// Create an InvalidRoiParameters error.
    pub fn invalid_roi(msg: impl Into<String>) -> Self {
        Self::InvalidRoiParameters(msg.into())
    }

    /// Create a GridMismatch error.
    pub fn grid_mismatch(msg: impl Into<String>) -> Self {
        Self::GridMismatch(msg.into())
    }
}

impl From<serde_yaml::Error> for GridMapperError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Result type for grid mapping operations.
pub type Result<T> = std::result::Result<T, GridMapperError>;
