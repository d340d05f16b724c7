//! Parameter comparison between two models.
//!
//! Used to check a calibrated model against a reference solution.

use std::fmt;

use calib_model::PosableModel;
use calib_types::MuscleQuantity;

use crate::error::Result;

/// Default absolute tolerance (m) for [`compare_parameters`].
pub const DEFAULT_COMPARISON_TOLERANCE: f64 = 1e-4;

/// A muscle parameter that differs between two models.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDifference {
    /// Muscle name.
    pub muscle: String,
    /// [`MuscleQuantity::OptimalFiberLength`] or
    /// [`MuscleQuantity::TendonSlackLength`].
    pub parameter: MuscleQuantity,
    /// Value in the first model.
    pub first: f64,
    /// Value in the second model.
    pub second: f64,
}

impl ParameterDifference {
    /// Absolute difference.
    #[must_use]
    pub fn difference(&self) -> f64 {
        (self.first - self.second).abs()
    }
}

impl fmt::Display for ParameterDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} difference for muscle {} is {} - {} = {}",
            self.parameter,
            self.muscle,
            self.first,
            self.second,
            self.difference()
        )
    }
}

/// Muscle parameters of `first` that differ from `second` by more than
/// `tolerance`.
///
/// Every muscle of `first` must exist in `second`. An empty result means the
/// models agree.
pub fn compare_parameters<A, B>(
    first: &A,
    second: &B,
    tolerance: f64,
) -> Result<Vec<ParameterDifference>>
where
    A: PosableModel + ?Sized,
    B: PosableModel + ?Sized,
{
    const PARAMETERS: [MuscleQuantity; 2] = [
        MuscleQuantity::OptimalFiberLength,
        MuscleQuantity::TendonSlackLength,
    ];

    let mut differences = Vec::new();
    for muscle in first.muscle_names() {
        for parameter in PARAMETERS {
            let diff = ParameterDifference {
                first: first.muscle_scalar(&muscle, parameter)?,
                second: second.muscle_scalar(&muscle, parameter)?,
                muscle: muscle.clone(),
                parameter,
            };
            if diff.difference() > tolerance {
                tracing::info!("{} > {}", diff, tolerance);
                differences.push(diff);
            }
        }
    }
    Ok(differences)
}
