//! Configuration for gate-to-grid mapping.

use crate::error::{GridMapperError, Result};
use crate::merge::MergePolicy;
use crate::roi::{RoiConfig, RoiPolicy};
use crate::weighting::Weighting;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default height above the grid anchor beyond which gates are ignored.
pub const DEFAULT_TOP_OF_ATMOSPHERE: f64 = 17_000.0;

/// Configuration for the grid mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Distance weighting applied to gates inside the radius of influence.
    pub weighting: Weighting,

    /// Radius-of-influence policy and floor.
    pub roi: RoiConfig,

    /// How overlapping radars are combined.
    pub merge: MergePolicy,

    /// Gates higher than this (meters above the grid anchor) are not indexed.
    pub top_of_atmosphere: f64,

    /// Compute grid rows on the rayon thread pool.
    pub parallel: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            weighting: Weighting::default(),
            roi: RoiConfig::default(),
            merge: MergePolicy::default(),
            top_of_atmosphere: DEFAULT_TOP_OF_ATMOSPHERE,
            parallel: true,
        }
    }
}

impl MappingConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup, using the same variable
    /// names as [`MappingConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<f64>().ok());

        if let Some(val) = lookup("GRID_WEIGHTING") {
            config.weighting = Weighting::from_str(&val);
        }
        if let Some(smoothing) = number("GRID_BARNES_SMOOTHING") {
            if let Weighting::Barnes { .. } = config.weighting {
                config.weighting = Weighting::Barnes { smoothing };
            }
        }
        if let Some(power) = number("GRID_IDW_POWER") {
            if let Weighting::InverseDistance { .. } = config.weighting {
                config.weighting = Weighting::InverseDistance { power };
            }
        }

        if let Some(kind) = lookup("GRID_ROI_POLICY") {
            let (base, factor) = match config.roi.policy {
                RoiPolicy::Range { base, factor } | RoiPolicy::Height { base, factor } => (base, factor),
                _ => (0.0, 0.02),
            };
            config.roi.policy = RoiPolicy::from_parts(&kind, base, factor);
        }
        if let Some(radius) = number("GRID_ROI_RADIUS") {
            if let RoiPolicy::Constant { .. } = config.roi.policy {
                config.roi.policy = RoiPolicy::Constant { radius };
            }
        }
        if let Some(value) = number("GRID_ROI_BASE") {
            if let RoiPolicy::Range { base, .. } | RoiPolicy::Height { base, .. } = &mut config.roi.policy {
                *base = value;
            }
        }
        if let Some(value) = number("GRID_ROI_FACTOR") {
            match &mut config.roi.policy {
                RoiPolicy::Range { factor, .. } | RoiPolicy::Height { factor, .. } => *factor = value,
                RoiPolicy::Beam { height_factor, .. } => *height_factor = value,
                RoiPolicy::Constant { .. } => {}
            }
        }
        if let Some(min_radius) = number("GRID_MIN_RADIUS") {
            config.roi.min_radius = min_radius;
        }

        if let Some(val) = lookup("GRID_MERGE_POLICY") {
            config.merge = MergePolicy::from_str(&val);
        }
        if let Some(toa) = number("GRID_TOA") {
            config.top_of_atmosphere = toa;
        }
        if let Some(val) = lookup("GRID_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.weighting
            .validate()
            .map_err(GridMapperError::invalid_weighting)?;
        self.roi.validate().map_err(GridMapperError::invalid_roi)?;

        if !(self.top_of_atmosphere.is_finite() && self.top_of_atmosphere > 0.0) {
            return Err(GridMapperError::InvalidConfig(format!(
                "top_of_atmosphere must be a positive height, got {}",
                self.top_of_atmosphere
            )));
        }

        Ok(())
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_roi(mut self, roi: RoiConfig) -> Self {
        self.roi = roi;
        self
    }

    pub fn with_merge(mut self, merge: MergePolicy) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_top_of_atmosphere(mut self, height: f64) -> Self {
        self.top_of_atmosphere = height;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
