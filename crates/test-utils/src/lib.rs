//! Shared test utilities for the radar gridding workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic radar volume generators
//! - Common radar sites and grid fixtures
//! - Approximate equality assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, single_gate_volume};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Asserts two numbers differ by at most an absolute tolerance.
///
/// Both sides are compared as `f64`, so `f32` grid values can be checked
/// against `f64` expectations. The tolerance defaults to `1e-9`.
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(25.0_f32, 25.000_001_f64, 1e-5);
/// assert_approx_eq!(0.1 + 0.2, 0.3);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, 1e-9)
    };
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (a, b, tol) = ($left as f64, $right as f64, $tolerance as f64);
        assert!(
            (a - b).abs() <= tol,
            "values differ by more than {tol}: {a} vs {b} ({} vs {})",
            stringify!($left),
            stringify!($right),
        );
    }};
}

/// Macro for approximate equality of Cartesian points.
///
/// Accepts anything with `x`, `y` and `z` fields.
///
/// ```ignore
/// use test_utils::assert_point_approx_eq;
///
/// assert_point_approx_eq!(Point3::new(1.0001, 2.0, 3.0), Point3::new(1.0, 2.0, 3.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_point_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = $left;
        let right = $right;
        $crate::assert_approx_eq!(left.x, right.x, $epsilon);
        $crate::assert_approx_eq!(left.y, right.y, $epsilon);
        $crate::assert_approx_eq!(left.z, right.z, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    use radar_common::Point3;

    #[test]
    fn test_within_tolerance() {
        assert_approx_eq!(-9999.0_f32, -9999.0_f64);
        assert_approx_eq!(37.5_f32, 37.499, 0.01);
    }

    #[test]
    #[should_panic(expected = "values differ")]
    fn test_outside_tolerance() {
        assert_approx_eq!(500.0, 500.1, 0.01);
    }

    #[test]
    fn test_assert_point_approx_eq_passes() {
        assert_point_approx_eq!(Point3::new(1.0001, 2.0001, 0.0), Point3::new(1.0, 2.0, 0.0), 0.001);
    }
}
