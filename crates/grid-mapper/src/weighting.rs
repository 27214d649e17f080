//! Distance weighting functions for combining gates into a grid cell.

use serde::{Deserialize, Serialize};

/// Distances below this (meters) are clamped for inverse-distance weights.
pub const MIN_WEIGHT_DISTANCE: f64 = 1.0e-3;

/// Largest accepted inverse-distance power. At the clamped distance the
/// weight is at most `1e48`, so sums over millions of gates stay finite.
pub const MAX_INVERSE_DISTANCE_POWER: f64 = 16.0;

/// How gate values inside the radius of influence are combined.
///
/// Every variant is a pure function of the gate-to-cell distance and the
/// cell's radius of influence; the choice is fixed for a whole mapping call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Weighting {
    /// Take the single closest valid gate.
    Nearest,
    /// `(R² - d²) / (R² + d²)`, reaching zero at the ROI boundary.
    Cressman,
    /// Gaussian `exp(-d² / (smoothing · R²))`.
    ///
    /// `smoothing = 2.0` is the classic Barnes form, `0.25` the sharper
    /// "Barnes2" variant.
    Barnes { smoothing: f64 },
    /// `1 / d^power`, with `d` clamped to [`MIN_WEIGHT_DISTANCE`].
    InverseDistance { power: f64 },
}

impl Default for Weighting {
    fn default() -> Self {
        Self::BARNES
    }
}

impl Weighting {
    pub const BARNES: Weighting = Weighting::Barnes { smoothing: 2.0 };
    pub const BARNES2: Weighting = Weighting::Barnes { smoothing: 0.25 };

    /// Parse from string (case-insensitive), falling back to Barnes.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "nearest" | "nearest_neighbor" => Self::Nearest,
            "cressman" => Self::Cressman,
            "barnes2" => Self::BARNES2,
            "idw" | "inverse_distance" => Self::InverseDistance { power: 2.0 },
            _ => Self::BARNES,
        }
    }

    /// Check the numeric parameters.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Nearest | Self::Cressman => Ok(()),
            Self::Barnes { smoothing } => {
                if smoothing.is_finite() && smoothing > 0.0 {
                    Ok(())
                } else {
                    Err(format!("Barnes smoothing must be > 0, got {smoothing}"))
                }
            }
            Self::InverseDistance { power } => {
                if power.is_finite() && (0.0..=MAX_INVERSE_DISTANCE_POWER).contains(&power) {
                    Ok(())
                } else {
                    Err(format!(
                        "inverse-distance power must be in [0, {MAX_INVERSE_DISTANCE_POWER}], got {power}"
                    ))
                }
            }
        }
    }

    pub fn is_nearest(&self) -> bool {
        matches!(self, Self::Nearest)
    }

    /// Weight of a gate at `distance` from a cell whose radius of influence
    /// is `roi`. Always finite and non-negative for validated parameters.
    #[inline]
    pub fn weight(&self, distance: f64, roi: f64) -> f64 {
        let d2 = distance * distance;
        let r2 = roi * roi;
        match *self {
            Self::Nearest => 1.0,
            Self::Cressman => {
                if d2 >= r2 {
                    0.0
                } else {
                    (r2 - d2) / (r2 + d2)
                }
            }
            Self::Barnes { smoothing } => {
                if r2 == 0.0 {
                    if d2 == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    (-d2 / (smoothing * r2)).exp()
                }
            }
            Self::InverseDistance { power } => distance.max(MIN_WEIGHT_DISTANCE).powf(-power),
        }
    }
}

impl std::fmt::Display for Weighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Cressman => write!(f, "cressman"),
            Self::Barnes { smoothing } => write!(f, "barnes(smoothing={smoothing})"),
            Self::InverseDistance { power } => write!(f, "inverse_distance(power={power})"),
        }
    }
}
