//! Coordinate selection and pose grid generation.
//!
//! Every joint on a muscle's chain contributes the coordinates that can
//! actually move it: enabled, unlocked, and either free or coupled to a
//! single independent driver. Those coordinates are then sampled on a
//! mixed-radix Cartesian grid, so every combination of per-coordinate values
//! appears exactly once:
//!
//! ```text
//!   knee  (n=2): k0 k0 k0 k1 k1 k1
//!   ankle (n=3): a0 a1 a2 a0 a1 a2
//! ```
//!
//! The last coordinate varies fastest. Joints with more than two active
//! coordinates sample each of them at half density to keep the grid size in
//! check.

use std::collections::HashSet;

use calib_model::PosableModel;
use calib_types::{AllowList, CoordinateCombination, CouplingDriver};

use crate::error::{CalibError, Result};

/// Slack for float round-off when counting whole steps in a range.
const STEP_EPSILON: f64 = 1e-9;

/// A coordinate that will be sampled for one muscle.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCoordinate {
    /// Coordinate name. For coupled coordinates this is the driver.
    pub name: String,
    /// Joint on the chain that contributed the coordinate.
    pub joint: String,
    /// Range `(min, max)` sampled.
    pub range: (f64, f64),
}

impl ActiveCoordinate {
    /// Create an active coordinate.
    #[must_use]
    pub fn new(name: impl Into<String>, joint: impl Into<String>, range: (f64, f64)) -> Self {
        Self {
            name: name.into(),
            joint: joint.into(),
            range,
        }
    }
}

/// Coordinates of the joints in `chain` that take part in sampling.
///
/// Disabled and locked coordinates are dropped. A constrained coordinate is
/// replaced by its single independent driver, unless the driver is locked or
/// already listed. A coordinate with several drivers fails the whole muscle
/// with [`CalibError::UnsupportedCoupling`]. No name appears twice.
pub fn collect_active_coordinates<M>(
    model: &M,
    chain: &[String],
    allowed: &AllowList,
) -> Result<Vec<ActiveCoordinate>>
where
    M: PosableModel + ?Sized,
{
    let mut active: Vec<ActiveCoordinate> = Vec::new();
    let mut seen = HashSet::new();

    let joints = chain
        .iter()
        .filter_map(|name| model.joints().iter().find(|j| &j.name == name));

    for joint in joints {
        for coordinate in &joint.coordinates {
            if !allowed.is_enabled(coordinate) || model.is_locked(coordinate)? {
                continue;
            }

            let name = if model.is_constrained(coordinate)? {
                match model.coupling_driver(coordinate)? {
                    CouplingDriver::Single(driver) => {
                        if model.is_locked(&driver)? {
                            tracing::debug!(
                                "Coordinate {} is driven by locked coordinate {}; not sampled",
                                coordinate,
                                driver
                            );
                            continue;
                        }
                        driver
                    }
                    CouplingDriver::Multiple(drivers) => {
                        tracing::warn!(
                            "Coordinate {} is coupled to several drivers ({}); not supported",
                            coordinate,
                            drivers.join(", ")
                        );
                        return Err(CalibError::UnsupportedCoupling {
                            coordinate: coordinate.clone(),
                            drivers,
                        });
                    }
                    CouplingDriver::None => {
                        tracing::debug!(
                            "Coordinate {} is constrained without a coupling driver; not sampled",
                            coordinate
                        );
                        continue;
                    }
                }
            } else {
                coordinate.clone()
            };

            if !seen.insert(name.clone()) {
                continue;
            }
            let range = model.coordinate_range(&name)?;
            active.push(ActiveCoordinate {
                name,
                joint: joint.name.clone(),
                range,
            });
        }
    }

    Ok(active)
}

/// Number of values sampled for each coordinate.
///
/// Coordinates of a joint contributing more than two active coordinates get
/// half of `n_evaluation_points`, and never fewer than one.
#[must_use]
pub fn evaluation_counts(active: &[ActiveCoordinate], n_evaluation_points: usize) -> Vec<usize> {
    active
        .iter()
        .map(|coordinate| {
            let on_joint = active.iter().filter(|c| c.joint == coordinate.joint).count();
            if on_joint > 2 {
                (n_evaluation_points / 2).max(1)
            } else {
                n_evaluation_points.max(1)
            }
        })
        .collect()
}

/// Number of poses in the grid for `active`, or `None` if it does not fit in
/// a `usize`.
#[must_use]
pub fn pose_count(active: &[ActiveCoordinate], n_evaluation_points: usize) -> Option<usize> {
    grid_size(&evaluation_counts(active, n_evaluation_points))
}

fn grid_size(counts: &[usize]) -> Option<usize> {
    counts.iter().try_fold(1_usize, |total, &n| total.checked_mul(n))
}

/// Build the full pose grid for `active`.
///
/// Every column has `Π nᵢ` values, with `nᵢ` from [`evaluation_counts`].
/// `min_step` (radians) widens the spacing of coordinates whose range would
/// otherwise be sampled more finely; see [`generate_angle_samples`].
///
/// Fails with [`CalibError::GridSize`] when the grid would have more than
/// `max_poses` rows.
pub fn generate(
    active: &[ActiveCoordinate],
    n_evaluation_points: usize,
    min_step: Option<f64>,
    max_poses: usize,
) -> Result<CoordinateCombination> {
    let counts = evaluation_counts(active, n_evaluation_points);
    let total = grid_size(&counts)
        .filter(|&total| total <= max_poses)
        .ok_or(CalibError::GridSize {
            coordinates: active.len(),
            limit: max_poses,
        })?;

    let mut columns = Vec::with_capacity(active.len());
    let mut multiplicity = 1;
    for (coordinate, &n) in active.iter().zip(&counts).rev() {
        let (min, max) = coordinate.range;
        let values = generate_angle_samples(min, max, n, multiplicity, total, min_step);
        columns.push((coordinate.name.as_str(), values));
        multiplicity *= n;
    }

    let mut combination = CoordinateCombination::new();
    for (name, values) in columns.into_iter().rev() {
        let added = combination.push(name, values);
        debug_assert!(added, "active coordinates are unique and columns equal length");
    }
    tracing::debug!(
        "Generated {} poses over {} coordinates",
        combination.sample_count(),
        combination.coordinate_count()
    );
    Ok(combination)
}

/// Samples of one coordinate within a Cartesian grid of `total` rows.
///
/// The coordinate takes `n` values starting at `min`, each repeated
/// `multiplicity` times, and the pattern repeats until `total` values are
/// produced. Values are spaced by `(max - min) / (n - 1)`, or by `min_step`
/// when that is larger. A widened step can run past `max`; such values are
/// held at the last step that still fits in the range, so the grid keeps its
/// size and simply repeats values.
#[must_use]
pub fn generate_angle_samples(
    min: f64,
    max: f64,
    n: usize,
    multiplicity: usize,
    total: usize,
    min_step: Option<f64>,
) -> Vec<f64> {
    let n = n.max(1);
    let multiplicity = multiplicity.max(1);

    let mut step = if n > 1 { (max - min) / (n - 1) as f64 } else { 0.0 };
    if let Some(min_step) = min_step.filter(|s| *s > 0.0) {
        step = step.max(min_step);
    }

    let max_index = if step > 0.0 {
        ((max - min) / step + STEP_EPSILON).floor().max(0.0) as usize
    } else {
        0
    };

    let pattern: Vec<f64> = (0..n)
        .flat_map(|k| {
            let value = min + k.min(max_index) as f64 * step;
            std::iter::repeat_n(value, multiplicity)
        })
        .collect();

    pattern.iter().copied().cycle().take(total).collect()
}
