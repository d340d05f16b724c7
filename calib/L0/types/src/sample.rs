//! Per-pose samples and per-muscle fit results.

use serde::{Deserialize, Serialize};

/// Normalized quantities read from the template model at one pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateSample {
    /// Fiber length / optimal fiber length.
    pub normalized_fiber_length: f64,
    /// Tendon length / tendon slack length.
    pub normalized_tendon_length: f64,
    /// Pennation angle (radians).
    pub pennation_angle: f64,
}

impl TemplateSample {
    /// Normalized fiber length projected onto the tendon line of action.
    #[must_use]
    pub fn projected_fiber_length(&self) -> f64 {
        self.normalized_fiber_length * self.pennation_angle.cos()
    }

    /// True when every field is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.normalized_fiber_length.is_finite()
            && self.normalized_tendon_length.is_finite()
            && self.pennation_angle.is_finite()
    }
}

/// How the parameters of a muscle were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitMethod {
    /// Single coupled least-squares solve for both parameters.
    Joint,
    /// Fiber length first (tendon fraction borrowed from the template), then
    /// tendon slack length from the residual.
    TwoStage,
}

impl std::fmt::Display for FitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Joint => write!(f, "joint"),
            Self::TwoStage => write!(f, "two-stage"),
        }
    }
}

/// Calibrated parameters of one muscle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Muscle name.
    pub muscle_name: String,
    /// Optimal fiber length (m).
    pub optimal_fiber_length: f64,
    /// Tendon slack length (m).
    pub tendon_slack_length: f64,
}

impl CalibrationResult {
    /// Create a new result.
    #[must_use]
    pub fn new(
        muscle_name: impl Into<String>,
        optimal_fiber_length: f64,
        tendon_slack_length: f64,
    ) -> Self {
        Self {
            muscle_name: muscle_name.into(),
            optimal_fiber_length,
            tendon_slack_length,
        }
    }

    /// Both parameters strictly positive (and therefore finite).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        is_physical(self.optimal_fiber_length, self.tendon_slack_length)
    }
}

/// Both lengths strictly positive and finite.
#[must_use]
pub fn is_physical(optimal_fiber_length: f64, tendon_slack_length: f64) -> bool {
    optimal_fiber_length > 0.0
        && tendon_slack_length > 0.0
        && optimal_fiber_length.is_finite()
        && tendon_slack_length.is_finite()
}
