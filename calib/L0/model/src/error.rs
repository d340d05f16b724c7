//! Error types for posable model operations.

use calib_types::{MuscleQuantity, Stage};
use thiserror::Error;

/// Errors raised by a posable model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Muscle not found in the model.
    #[error("muscle not found: {0}")]
    UnknownMuscle(String),

    /// Coordinate not found in the model.
    #[error("coordinate not found: {0}")]
    UnknownCoordinate(String),

    /// Body referenced but never declared.
    #[error("reference to undefined body {body} in {context}")]
    UndefinedBody {
        /// The body name that was referenced.
        body: String,
        /// Where it was referenced.
        context: String,
    },

    /// Two items of the same kind share a name.
    #[error("duplicate {kind} name: {name}")]
    DuplicateName {
        /// Item kind ("joint", "coordinate", ...).
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// Attempt to move a locked coordinate.
    #[error("coordinate {0} is locked")]
    LockedCoordinate(String),

    /// Quantity read before the model was realized far enough.
    #[error("{quantity} requires stage {required:?}, model is at {current:?}")]
    StageNotRealized {
        /// The quantity that was requested.
        quantity: MuscleQuantity,
        /// Stage the quantity needs.
        required: Stage,
        /// Stage the model is currently realized to.
        current: Option<Stage>,
    },

    /// Equilibrium quantity read without equilibrating at the current pose.
    #[error("muscle {0} has not been equilibrated at the current pose")]
    NotEquilibrated(String),

    /// Fiber/tendon force balance could not be solved.
    #[error("equilibrium failed for muscle {muscle}: {reason}")]
    Equilibrium {
        /// The muscle being equilibrated.
        muscle: String,
        /// What went wrong.
        reason: String,
    },

    /// A muscle parameter was given an out-of-domain value.
    #[error("invalid {parameter} for muscle {muscle}: {value}")]
    InvalidParameter {
        /// The muscle being modified.
        muscle: String,
        /// Parameter name.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model (de)serialization error.
    #[error("model serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Create an undefined body error.
    pub fn undefined_body(body: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UndefinedBody {
            body: body.into(),
            context: context.into(),
        }
    }

    /// Create a duplicate name error.
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    /// Create an equilibrium failure.
    pub fn equilibrium(muscle: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Equilibrium {
            muscle: muscle.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(
        muscle: impl Into<String>,
        parameter: &'static str,
        value: f64,
    ) -> Self {
        Self::InvalidParameter {
            muscle: muscle.into(),
            parameter,
            value,
        }
    }

    /// Check if this error is a failed name lookup.
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::UnknownMuscle(_) | Self::UnknownCoordinate(_))
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
