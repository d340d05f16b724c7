//! Calibration run configuration.
//!
//! Mirrors the setup file of a calibration run. Every field has a default so
//! a setup file only needs to name what it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::filter::AllowList;

/// Settings for one calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Run the calibration at all.
    pub apply: bool,

    /// Coordinates allowed to be sampled.
    pub coordinates: AllowList,

    /// Muscles to calibrate.
    pub muscles: AllowList,

    /// Evaluation points per sampled coordinate.
    pub n_evaluation_points: usize,

    /// Minimum spacing between samples of one coordinate (degrees).
    /// Zero or negative disables the floor.
    pub min_degrees_increment: f64,

    /// Where to write the calibrated model. Relative paths are resolved
    /// against the setup file's directory.
    pub output_model_file: Option<PathBuf>,

    /// Persist the calibrated model when an output file is configured.
    pub write_results: bool,

    /// Relative singular-value cut-off for the least-squares solves.
    ///
    /// Singular values below `solver_tolerance * σ_max` are treated as zero.
    pub solver_tolerance: f64,

    /// Template poses with a normalized fiber length below this are dropped.
    pub min_normalized_fiber_length: f64,

    /// Range of normalized tendon length under which the tendon is reported
    /// as not changing over the sampled motion.
    pub tendon_variation_threshold: f64,

    /// Upper bound on joints walked when resolving a muscle's kinematic chain.
    pub max_chain_steps: usize,

    /// Upper bound on the poses sampled for one muscle. A muscle whose grid
    /// would be larger fails without being sampled.
    pub max_grid_poses: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            apply: true,
            coordinates: AllowList::All,
            muscles: AllowList::All,
            n_evaluation_points: 10,
            min_degrees_increment: 2.5,
            output_model_file: None,
            write_results: true,
            solver_tolerance: 1e-10,
            min_normalized_fiber_length: 0.5,
            tendon_variation_threshold: 1e-4,
            max_chain_steps: 256,
            max_grid_poses: 1_000_000,
        }
    }
}

impl CalibrationConfig {
    /// Parse a JSON setup.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON setup file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Write this setup as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Check value domains.
    pub fn validate(&self) -> Result<()> {
        if self.n_evaluation_points == 0 {
            return Err(ConfigError::invalid("n_evaluation_points", "must be at least 1"));
        }
        if !self.min_degrees_increment.is_finite() {
            return Err(ConfigError::invalid(
                "min_degrees_increment",
                format!("must be finite, got {}", self.min_degrees_increment),
            ));
        }
        check_non_negative("solver_tolerance", self.solver_tolerance)?;
        check_non_negative("min_normalized_fiber_length", self.min_normalized_fiber_length)?;
        check_non_negative("tendon_variation_threshold", self.tendon_variation_threshold)?;
        if self.max_chain_steps == 0 {
            return Err(ConfigError::invalid("max_chain_steps", "must be at least 1"));
        }
        if self.max_grid_poses == 0 {
            return Err(ConfigError::invalid("max_grid_poses", "must be at least 1"));
        }
        Ok(())
    }

    /// Minimum angular step in radians, or `None` when disabled.
    #[must_use]
    pub fn min_angular_step(&self) -> Option<f64> {
        (self.min_degrees_increment > 0.0).then(|| self.min_degrees_increment.to_radians())
    }

    /// Output path to persist to, if results are to be written.
    ///
    /// Relative paths are joined onto `base_dir` when one is given.
    #[must_use]
    pub fn resolve_output_path(&self, base_dir: Option<&Path>) -> Option<PathBuf> {
        if !self.write_results {
            return None;
        }
        let file = self.output_model_file.as_ref()?;
        if file.as_os_str().is_empty() {
            return None;
        }
        match base_dir {
            Some(base) if file.is_relative() => Some(base.join(file)),
            _ => Some(file.clone()),
        }
    }

    /// Set the coordinate allow-list.
    #[must_use]
    pub fn with_coordinates(mut self, coordinates: AllowList) -> Self {
        self.coordinates = coordinates;
        self
    }

    /// Set the muscle allow-list.
    #[must_use]
    pub fn with_muscles(mut self, muscles: AllowList) -> Self {
        self.muscles = muscles;
        self
    }

    /// Set evaluation points per coordinate.
    #[must_use]
    pub fn with_evaluation_points(mut self, n: usize) -> Self {
        self.n_evaluation_points = n;
        self
    }

    /// Set the minimum sample spacing in degrees.
    #[must_use]
    pub fn with_min_degrees_increment(mut self, degrees: f64) -> Self {
        self.min_degrees_increment = degrees;
        self
    }

    /// Set the largest pose grid sampled for one muscle.
    #[must_use]
    pub fn with_max_grid_poses(mut self, poses: usize) -> Self {
        self.max_grid_poses = poses;
        self
    }

    /// Set the output model file.
    #[must_use]
    pub fn with_output_model_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_model_file = Some(path.into());
        self
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}
