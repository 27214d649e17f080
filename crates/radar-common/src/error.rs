//! Error types for radar volume construction.

use thiserror::Error;

/// Result type alias using VolumeError.
pub type VolumeResult<T> = Result<T, VolumeError>;

/// Errors raised when an in-memory radar volume is inconsistent.
#[derive(Debug, Error, PartialEq)]
pub enum VolumeError {
    #[error("Field '{field}' has {actual} values, volume has {expected} gates")]
    FieldLengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Mask for field '{field}' has {actual} entries, volume has {expected} gates")]
    MaskLengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Gate filter has {actual} entries, volume has {expected} gates")]
    FilterLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid gate range at index {index}: {value}")]
    InvalidRange { index: usize, value: f64 },

    #[error("Invalid radar site: {0}")]
    InvalidSite(String),
}
