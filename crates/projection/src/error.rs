//! Projection error types.

use thiserror::Error;

/// Result type alias using ProjectionError.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("Invalid projection origin: {0}")]
    InvalidOrigin(String),

    #[error("Point ({lat}, {lon}) is antipodal to the projection center")]
    Antipodal { lat: f64, lon: f64 },
}
