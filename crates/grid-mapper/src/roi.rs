//! Radius-of-influence policies.
//!
//! The radius of influence (ROI) bounds the neighbourhood of gates that
//! contribute to a grid cell. Radar sampling gets coarser with distance from
//! the antenna (the beam broadens and sweeps spread apart), so the ROI can
//! grow with range or height to keep far cells from going empty.

use radar_common::Point3;
use serde::{Deserialize, Serialize};

/// How the raw radius is derived from a cell's position relative to a radar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoiPolicy {
    /// Same radius everywhere.
    Constant { radius: f64 },
    /// `base + factor · horizontal range from the radar`.
    Range { base: f64, factor: f64 },
    /// `base + factor · |height above the radar|`.
    Height { base: f64, factor: f64 },
    /// Beam-spreading radius:
    /// `height_factor · h / 20 + range · tan(beam_width_deg · beam_spacing)`.
    Beam {
        beam_width_deg: f64,
        beam_spacing: f64,
        height_factor: f64,
    },
}

impl RoiPolicy {
    /// Parse a policy name (case-insensitive) into a policy with the given
    /// parameters. Unknown names fall back to `Range`.
    pub fn from_parts(kind: &str, base: f64, factor: f64) -> Self {
        match kind.to_lowercase().as_str() {
            "constant" => Self::Constant { radius: base },
            "height" => Self::Height { base, factor },
            "beam" | "dist_beam" => Self::Beam {
                beam_width_deg: 1.5,
                beam_spacing: 1.0,
                height_factor: factor,
            },
            _ => Self::Range { base, factor },
        }
    }

    /// Radius before the minimum floor is applied.
    #[inline]
    pub fn raw_radius(&self, cell: &Point3, radar: &Point3) -> f64 {
        match *self {
            Self::Constant { radius } => radius,
            Self::Range { base, factor } => base + factor * cell.horizontal_distance(radar),
            Self::Height { base, factor } => base + factor * (cell.z - radar.z).abs(),
            Self::Beam {
                beam_width_deg,
                beam_spacing,
                height_factor,
            } => {
                let spread = (beam_width_deg * beam_spacing).to_radians().tan();
                height_factor * (cell.z - radar.z).abs() / 20.0
                    + cell.horizontal_distance(radar) * spread
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        let check = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(format!("ROI {name} must be finite and >= 0, got {v}"))
            }
        };

        match *self {
            Self::Constant { radius } => check("radius", radius),
            Self::Range { base, factor } | Self::Height { base, factor } => {
                check("base", base)?;
                check("factor", factor)
            }
            Self::Beam {
                beam_width_deg,
                beam_spacing,
                height_factor,
            } => {
                check("beam_width_deg", beam_width_deg)?;
                check("beam_spacing", beam_spacing)?;
                check("height_factor", height_factor)?;
                if beam_width_deg * beam_spacing >= 90.0 {
                    return Err(format!(
                        "ROI beam spread {} deg must be < 90",
                        beam_width_deg * beam_spacing
                    ));
                }
                Ok(())
            }
        }
    }
}

/// A radius policy plus the floor every radius is raised to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiConfig {
    pub policy: RoiPolicy,
    /// Smallest radius ever used, in meters.
    pub min_radius: f64,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            policy: RoiPolicy::Range {
                base: 0.0,
                factor: 0.02,
            },
            min_radius: 500.0,
        }
    }
}

impl RoiConfig {
    pub fn new(policy: RoiPolicy, min_radius: f64) -> Self {
        Self { policy, min_radius }
    }

    /// Constant radius with no floor.
    pub fn constant(radius: f64) -> Self {
        Self::new(RoiPolicy::Constant { radius }, 0.0)
    }

    /// Check that no parameter can produce a negative or non-finite radius.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_radius.is_finite() && self.min_radius >= 0.0) {
            return Err(format!(
                "ROI min_radius must be finite and >= 0, got {}",
                self.min_radius
            ));
        }
        self.policy.validate()
    }

    /// Radius of influence for a cell, given the radar position in the same
    /// frame. Never below `min_radius`.
    #[inline]
    pub fn radius(&self, cell: &Point3, radar: &Point3) -> f64 {
        self.policy.raw_radius(cell, radar).max(self.min_radius)
    }
}
