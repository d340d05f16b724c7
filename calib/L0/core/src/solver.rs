//! Least-squares fit of optimal fiber length and tendon slack length.
//!
//! At every pose the musculotendon length splits into a fiber part projected
//! on the line of action and a tendon part:
//!
//! ```text
//! L = l_opt · (l̃_f · cos α) + l_slack · l̃_t
//! ```
//!
//! The normalized quantities `l̃_f`, `α`, and `l̃_t` come from the template
//! muscle, `L` from the target muscle. Stacking all poses gives the
//! overdetermined system `A · [l_opt, l_slack]ᵀ ≈ L`, solved with an SVD so
//! rank-deficient designs still yield the minimum-norm answer.
//!
//! When that answer is not physical the two-stage fit borrows the template's
//! tendon share of the musculotendon length to estimate `l_opt` alone, then
//! fits `l_slack` to what remains.

use calib_types::{CalibrationConfig, CalibrationResult, FitMethod, TemplateSample};
use nalgebra::{DMatrix, DVector};

use crate::error::{CalibError, Result};

/// Outcome of one least-squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    /// Fitted parameters.
    pub result: CalibrationResult,
    /// Which solve produced them.
    pub method: FitMethod,
    /// Poses that entered the solve.
    pub samples: usize,
    /// Numerical rank of the design matrix.
    pub rank: usize,
}

impl LinearFit {
    /// Both parameters strictly positive.
    #[must_use]
    pub fn is_physical(&self) -> bool {
        self.result.is_valid()
    }
}

/// Rank-revealing least-squares solver for the two muscle parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSolver {
    /// Singular values below `tolerance · σ_max` are treated as zero.
    pub tolerance: f64,
    /// Tendon columns varying less than this are reported as constant.
    pub tendon_variation_threshold: f64,
}

impl Default for ParameterSolver {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            tendon_variation_threshold: 1e-4,
        }
    }
}

impl ParameterSolver {
    /// Create a solver with a relative singular-value tolerance.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Create a solver from run settings.
    #[must_use]
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            tolerance: config.solver_tolerance,
            tendon_variation_threshold: config.tendon_variation_threshold,
        }
    }

    /// Fit both parameters at once.
    ///
    /// Rows with a non-finite sample or target are dropped first. The result
    /// may be non-physical; callers decide whether to fall back to
    /// [`solve_two_stage`](Self::solve_two_stage).
    pub fn solve(
        &self,
        muscle: &str,
        samples: &[TemplateSample],
        targets: &[f64],
    ) -> Result<LinearFit> {
        check_lengths(muscle, samples.len(), targets.len())?;

        let rows: Vec<usize> = (0..samples.len())
            .filter(|&i| samples[i].is_finite() && targets[i].is_finite())
            .collect();
        if rows.is_empty() {
            return Err(CalibError::solve(muscle, "no usable samples"));
        }
        let (a, b) = design(samples, targets, &rows);

        let (x, rank) = self
            .least_squares(a, &b)
            .ok_or_else(|| CalibError::solve(muscle, "design matrix has rank 0"))?;

        Ok(LinearFit {
            result: CalibrationResult::new(muscle, x[0], x[1]),
            method: FitMethod::Joint,
            samples: rows.len(),
            rank,
        })
    }

    /// Fit fiber length first, then tendon slack length.
    ///
    /// At each pose the template's tendon fraction
    /// `l̃_t · l_slack,template / L_template` is taken to hold for the target
    /// as well, which gives a target fiber length to fit `l_opt` against the
    /// fiber column. `l_slack` is then fit against the tendon column using
    /// what the fiber leaves of each target length.
    ///
    /// `template_lengths` are the template's musculotendon lengths at the
    /// same poses. Rows with any non-finite input, or a zero template length,
    /// are dropped.
    pub fn solve_two_stage(
        &self,
        muscle: &str,
        samples: &[TemplateSample],
        targets: &[f64],
        template_tendon_slack_length: f64,
        template_lengths: &[f64],
    ) -> Result<LinearFit> {
        check_lengths(muscle, samples.len(), targets.len())?;
        check_lengths(muscle, samples.len(), template_lengths.len())?;

        let rows: Vec<usize> = (0..samples.len())
            .filter(|&i| {
                samples[i].is_finite()
                    && targets[i].is_finite()
                    && template_lengths[i].is_finite()
                    && template_lengths[i] != 0.0
            })
            .collect();
        if rows.is_empty() {
            return Err(CalibError::solve(muscle, "no usable samples"));
        }
        let (a, b) = design(samples, targets, &rows);

        let (min, max) = column_bounds(&a, 1);
        if max - min < self.tendon_variation_threshold {
            tracing::warn!(
                "Tendon length of {} does not change throughout the range of motion",
                muscle
            );
        }

        let fiber_targets = DVector::from_iterator(
            rows.len(),
            rows.iter().enumerate().map(|(r, &i)| {
                let tendon_fraction =
                    a[(r, 1)] * template_tendon_slack_length / template_lengths[i];
                (1.0 - tendon_fraction) * b[r]
            }),
        );

        let fiber_column = a.columns(0, 1).into_owned();
        let (fiber, fiber_rank) = self
            .least_squares(fiber_column.clone(), &fiber_targets)
            .ok_or_else(|| CalibError::solve(muscle, "fiber column has rank 0"))?;
        let optimal_fiber_length = fiber[0];

        let remainder = &b - fiber_column.column(0) * optimal_fiber_length;
        let (tendon, tendon_rank) = self
            .least_squares(a.columns(1, 1).into_owned(), &remainder)
            .ok_or_else(|| CalibError::solve(muscle, "tendon column has rank 0"))?;

        Ok(LinearFit {
            result: CalibrationResult::new(muscle, optimal_fiber_length, tendon[0]),
            method: FitMethod::TwoStage,
            samples: rows.len(),
            rank: fiber_rank.min(tendon_rank),
        })
    }

    /// Minimum-norm solution of `a · x ≈ b` and the rank used, or `None` when
    /// every singular value is negligible.
    fn least_squares(&self, a: DMatrix<f64>, b: &DVector<f64>) -> Option<(DVector<f64>, usize)> {
        if a.is_empty() {
            return None;
        }
        let svd = a.svd(true, true);
        let sigma_max = svd.singular_values.max();
        if sigma_max <= 0.0 {
            return None;
        }
        let eps = self.tolerance * sigma_max;
        let rank = svd.rank(eps);
        if rank == 0 {
            return None;
        }
        svd.solve(b, eps).ok().map(|x| (x, rank))
    }
}

fn check_lengths(muscle: &str, samples: usize, values: usize) -> Result<()> {
    if samples == values {
        Ok(())
    } else {
        Err(CalibError::solve(
            muscle,
            format!("{samples} template samples but {values} lengths"),
        ))
    }
}

/// Design matrix and right-hand side over the selected rows.
fn design(
    samples: &[TemplateSample],
    targets: &[f64],
    rows: &[usize],
) -> (DMatrix<f64>, DVector<f64>) {
    let mut a = DMatrix::<f64>::zeros(rows.len(), 2);
    let mut b = DVector::<f64>::zeros(rows.len());
    for (r, &i) in rows.iter().enumerate() {
        a[(r, 0)] = samples[i].projected_fiber_length();
        a[(r, 1)] = samples[i].normalized_tendon_length;
        b[r] = targets[i];
    }
    (a, b)
}

fn column_bounds(a: &DMatrix<f64>, column: usize) -> (f64, f64) {
    a.column(column)
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}
