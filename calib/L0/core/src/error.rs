//! Error types for the calibration pipeline.

use std::path::PathBuf;

use calib_model::ModelError;
use calib_types::ConfigError;
use thiserror::Error;

use crate::driver::CalibrationReport;

/// Errors raised while calibrating.
#[derive(Debug, Error)]
pub enum CalibError {
    /// The joint tree cannot connect the muscle's distal body to its
    /// proximal body.
    #[error("muscle {muscle}: cannot reach {proximal_body} from {distal_body}: {reason}")]
    Reachability {
        /// Muscle being resolved.
        muscle: String,
        /// Body the walk started from.
        distal_body: String,
        /// Body the walk was looking for.
        proximal_body: String,
        /// Why the walk stopped.
        reason: String,
    },

    /// A target-model muscle has no counterpart in the template model.
    #[error("muscle {muscle} could not be found in the {model} model")]
    MuscleMismatch {
        /// The missing muscle.
        muscle: String,
        /// Name of the model lacking it.
        model: String,
    },

    /// A coordinate is coupled to more than one independent coordinate.
    #[error(
        "coordinate {coordinate} is coupled to {} independent coordinates ({})",
        .drivers.len(),
        .drivers.join(", ")
    )]
    UnsupportedCoupling {
        /// The dependent coordinate.
        coordinate: String,
        /// Its independent drivers.
        drivers: Vec<String>,
    },

    /// The pose grid over the active coordinates has more poses than allowed,
    /// or more than fit in a `usize`.
    #[error("pose grid over {coordinates} coordinates exceeds {limit} poses")]
    GridSize {
        /// Number of sampled coordinates.
        coordinates: usize,
        /// Largest grid allowed.
        limit: usize,
    },

    /// The least-squares problem has no usable solution.
    #[error("muscle {muscle}: solve failed: {reason}")]
    Solve {
        /// Muscle being fitted.
        muscle: String,
        /// What went wrong.
        reason: String,
    },

    /// Even the two-stage fit produced a non-positive parameter.
    #[error(
        "muscle {muscle}: non-physical parameters (optimal fiber length \
         {optimal_fiber_length}, tendon slack length {tendon_slack_length})"
    )]
    NonPhysical {
        /// Muscle being fitted.
        muscle: String,
        /// Fitted optimal fiber length.
        optimal_fiber_length: f64,
        /// Fitted tendon slack length.
        tendon_slack_length: f64,
    },

    /// Every muscle was processed but the calibrated model could not be
    /// written. The target model still holds the calibrated parameters.
    #[error(
        "calibrated {} muscles but could not write {}: {source}",
        .report.calibrated_count(),
        .path.display()
    )]
    Persist {
        /// Output file.
        path: PathBuf,
        /// Outcome of the run up to the failed write.
        report: Box<CalibrationReport>,
        /// Why the write failed.
        source: ModelError,
    },

    /// Error from a model.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CalibError {
    /// Create a reachability error.
    pub fn reachability(
        muscle: impl Into<String>,
        distal_body: impl Into<String>,
        proximal_body: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Reachability {
            muscle: muscle.into(),
            distal_body: distal_body.into(),
            proximal_body: proximal_body.into(),
            reason: reason.into(),
        }
    }

    /// Create a solve error.
    pub fn solve(muscle: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Solve {
            muscle: muscle.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error only invalidates the muscle it arose for.
    ///
    /// Muscle mismatches, configuration errors and failed writes abort a
    /// whole batch.
    #[must_use]
    pub fn is_muscle_local(&self) -> bool {
        !matches!(
            self,
            Self::MuscleMismatch { .. }
                | Self::Persist { .. }
                | Self::Config(_)
                | Self::Model(ModelError::Io(_))
        )
    }
}

/// Result type for calibration operations.
pub type Result<T> = std::result::Result<T, CalibError>;
