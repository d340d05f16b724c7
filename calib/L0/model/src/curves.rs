//! Force-length curves for the fiber and tendon.
//!
//! Only the isometric relationships are needed: calibration equilibrates
//! muscles at fixed poses, so there is no force-velocity curve here.
//!
//! # References
//!
//! - Zajac, F.E. (1989). Muscle and tendon: properties, models, scaling, and
//!   application to biomechanics and motor control.

use serde::{Deserialize, Serialize};

/// Active force-length curve.
///
/// Asymmetric Gaussian centered at optimal fiber length, zero outside
/// `[min_normalized_length, max_normalized_length]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveForceLengthCurve {
    /// Width of the ascending limb (normalized length units).
    pub width_ascending: f64,

    /// Width of the descending limb (normalized length units).
    pub width_descending: f64,

    /// Minimum normalized length where any force can be produced.
    pub min_normalized_length: f64,

    /// Maximum normalized length where any force can be produced.
    pub max_normalized_length: f64,
}

impl Default for ActiveForceLengthCurve {
    fn default() -> Self {
        Self {
            width_ascending: 0.45,
            width_descending: 0.56,
            min_normalized_length: 0.5,
            max_normalized_length: 1.6,
        }
    }
}

impl ActiveForceLengthCurve {
    /// Evaluate the active force-length multiplier in `[0, 1]`.
    #[must_use]
    pub fn evaluate(&self, normalized_length: f64) -> f64 {
        let l = normalized_length;
        if l <= self.min_normalized_length || l >= self.max_normalized_length {
            return 0.0;
        }

        let width = if l < 1.0 {
            self.width_ascending
        } else {
            self.width_descending
        };

        (-((l - 1.0) / width).powi(2)).exp()
    }
}

/// Passive force-length curve.
///
/// Exponential rise above `slack_length`, reaching `scale` at 1.5 normalized
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassiveForceLengthCurve {
    /// Normalized length at which passive force begins.
    pub slack_length: f64,

    /// Exponential shape factor.
    pub shape_factor: f64,

    /// Passive force at 1.5 normalized length, relative to max isometric force.
    pub scale: f64,
}

impl Default for PassiveForceLengthCurve {
    fn default() -> Self {
        Self {
            slack_length: 1.0,
            shape_factor: 4.0,
            scale: 1.0,
        }
    }
}

impl PassiveForceLengthCurve {
    /// Evaluate the passive force-length multiplier.
    #[must_use]
    pub fn evaluate(&self, normalized_length: f64) -> f64 {
        let l = normalized_length;
        if l <= self.slack_length {
            return 0.0;
        }

        let strain = (l - self.slack_length) / (1.5 - self.slack_length);
        let k = self.shape_factor;
        let fp = self.scale * ((k * strain).exp() - 1.0) / (k.exp() - 1.0);

        fp.max(0.0)
    }
}

/// Quadratic tendon force-strain curve: `F / F_max = k · ε²` for `ε > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TendonForceLengthCurve {
    /// Stiffness `k`. Around 900 gives the usual 3.3% strain at max
    /// isometric force.
    pub stiffness: f64,
}

impl Default for TendonForceLengthCurve {
    fn default() -> Self {
        Self { stiffness: 900.0 }
    }
}

impl TendonForceLengthCurve {
    /// Evaluate normalized tendon force at `normalized_length` (L_t / L_slack).
    #[must_use]
    pub fn evaluate(&self, normalized_length: f64) -> f64 {
        let strain = normalized_length - 1.0;
        if strain <= 0.0 {
            return 0.0;
        }
        self.stiffness * strain * strain
    }
}
