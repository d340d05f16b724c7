//! Per-pose sampling of muscle quantities.
//!
//! Two passes run over the same pose grid:
//!
//! 1. [`sample_template_quantities`] equilibrates the template muscle at every
//!    pose and records its normalized fiber and tendon lengths. Poses where
//!    the muscle produces no active force, or where the fiber is collapsed,
//!    are removed from the grid.
//! 2. [`sample_mtu_length`] reads the target muscle's musculotendon length at
//!    every surviving pose.
//!
//! The template pass must run first: its pruning keeps both sample sets row
//! aligned. Both passes pose the model through a [`PoseScope`], so the model
//! is back at its default pose when they return.

use calib_model::{PosableModel, PoseScope};
use calib_types::{CoordinateCombination, MuscleQuantity, Stage, TemplateSample};

use crate::error::Result;

/// Equilibrate the template muscle at every pose of `combination`.
///
/// The muscle is fully activated first. A pose is pruned when the model
/// rejects it, when equilibrium fails, when active force is zero, or when the
/// normalized fiber length is below `min_normalized_fiber_length`. Pruned
/// rows are removed from `combination`, so on return it has exactly one row
/// per returned sample.
///
/// Fails only when the muscle itself is unknown to the model.
pub fn sample_template_quantities<M>(
    model: &mut M,
    muscle: &str,
    combination: &mut CoordinateCombination,
    min_normalized_fiber_length: f64,
) -> Result<Vec<TemplateSample>>
where
    M: PosableModel + ?Sized,
{
    if combination.is_empty() {
        return Ok(Vec::new());
    }

    model.set_activation(muscle, 1.0)?;
    let tendon_slack_length = model.muscle_scalar(muscle, MuscleQuantity::TendonSlackLength)?;

    let mut samples = Vec::with_capacity(combination.sample_count());
    let mut pruned = Vec::new();
    {
        let mut scope = PoseScope::acquire(model);
        for row in 0..combination.sample_count() {
            match template_row(&mut scope, combination, row, muscle, tendon_slack_length) {
                Ok(Some((sample, active_force))) => {
                    if active_force == 0.0 {
                        tracing::debug!("{} pose {}: no active force, pruned", muscle, row);
                        pruned.push(row);
                    } else if sample.normalized_fiber_length < min_normalized_fiber_length {
                        tracing::debug!(
                            "{} pose {}: normalized fiber length {:.3} below {}, pruned",
                            muscle,
                            row,
                            sample.normalized_fiber_length,
                            min_normalized_fiber_length
                        );
                        pruned.push(row);
                    } else {
                        samples.push(sample);
                    }
                }
                Ok(None) => pruned.push(row),
                Err(e) => {
                    tracing::debug!("{} pose {}: {}, pruned", muscle, row, e);
                    pruned.push(row);
                }
            }
        }
    }

    combination.remove_rows(&pruned);
    if !pruned.is_empty() {
        tracing::debug!(
            "{}: pruned {} of {} poses",
            muscle,
            pruned.len(),
            pruned.len() + samples.len()
        );
    }
    Ok(samples)
}

/// Equilibrium quantities at one pose, with the active force.
///
/// `None` when the equilibrium produced non-finite values.
fn template_row<M>(
    scope: &mut PoseScope<'_, M>,
    combination: &CoordinateCombination,
    row: usize,
    muscle: &str,
    tendon_slack_length: f64,
) -> calib_model::Result<Option<(TemplateSample, f64)>>
where
    M: PosableModel + ?Sized,
{
    scope.apply_row(combination, row)?;
    scope.realize(Stage::Dynamics)?;
    scope.equilibrate_muscle(muscle)?;

    let sample = TemplateSample {
        normalized_fiber_length: scope
            .muscle_scalar(muscle, MuscleQuantity::NormalizedFiberLength)?,
        normalized_tendon_length: scope.muscle_scalar(muscle, MuscleQuantity::TendonLength)?
            / tendon_slack_length,
        pennation_angle: scope.muscle_scalar(muscle, MuscleQuantity::PennationAngle)?,
    };
    let active_force = scope.muscle_scalar(muscle, MuscleQuantity::ActiveForce)?;

    Ok(sample.is_finite().then_some((sample, active_force)))
}

/// Musculotendon length of `muscle` at every pose of `combination`.
///
/// Every coordinate of the combination must exist in `model`; a missing one
/// fails the whole pass before any pose is applied, since the two models are
/// not guaranteed to share coordinate names. After that, a pose the model
/// cannot apply or measure yields `NaN` for that row only.
pub fn sample_mtu_length<M>(
    model: &mut M,
    muscle: &str,
    combination: &CoordinateCombination,
) -> Result<Vec<f64>>
where
    M: PosableModel + ?Sized,
{
    if combination.is_empty() {
        return Ok(Vec::new());
    }

    for name in combination.names() {
        model.coordinate_range(name)?;
    }
    model.set_activation(muscle, 1.0)?;

    let mut scope = PoseScope::acquire(model);
    let lengths = (0..combination.sample_count())
        .map(|row| {
            let length = scope.apply_row(combination, row).and_then(|()| {
                scope.realize(Stage::Position)?;
                scope.muscle_scalar(muscle, MuscleQuantity::Length)
            });
            length.unwrap_or_else(|e| {
                tracing::warn!(
                    "Could not retrieve musculotendon length of {} at pose {}: {}",
                    muscle,
                    row,
                    e
                );
                f64::NAN
            })
        })
        .collect();
    Ok(lengths)
}
