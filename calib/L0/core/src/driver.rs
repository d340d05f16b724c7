//! Per-muscle calibration loop.
//!
//! For every enabled muscle of the target model the driver:
//!
//! 1. resets both models to their default pose,
//! 2. resolves the joints the muscle spans in the template model,
//! 3. collects the coordinates to sample and builds the pose grid,
//! 4. samples the template (pruning poses) and then the target,
//! 5. fits both parameters, falling back to the two-stage fit when the
//!    joint fit is not physical,
//! 6. writes the fitted parameters onto the target muscle.
//!
//! A muscle missing from the template aborts the run before any model is
//! posed. Failures while fitting a muscle are confined to that muscle and
//! reported in the [`CalibrationReport`].

use std::path::{Path, PathBuf};

use calib_model::PosableModel;
use calib_types::{CalibrationConfig, CalibrationResult, FitMethod, MuscleQuantity};
use rayon::prelude::*;

use crate::chain::resolve_chain;
use crate::error::{CalibError, Result};
use crate::grid;
use crate::sampling::{sample_mtu_length, sample_template_quantities};
use crate::solver::ParameterSolver;

/// What happened to one muscle.
#[derive(Debug)]
pub enum MuscleOutcome {
    /// Parameters were fitted and written to the target model.
    Calibrated {
        /// Fitted parameters.
        result: CalibrationResult,
        /// Solve that produced them.
        method: FitMethod,
        /// Poses used in the fit.
        samples: usize,
    },
    /// Nothing could be sampled.
    Skipped {
        /// Why.
        reason: String,
    },
    /// Calibration of this muscle failed; the target is left unchanged.
    Failed {
        /// The failure.
        error: CalibError,
    },
}

impl MuscleOutcome {
    /// Fitted parameters, if calibrated.
    #[must_use]
    pub fn result(&self) -> Option<&CalibrationResult> {
        match self {
            Self::Calibrated { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Check if the muscle was calibrated.
    #[must_use]
    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated { .. })
    }
}

/// Outcome of one muscle, by name.
#[derive(Debug)]
pub struct MuscleReport {
    /// Muscle name.
    pub muscle: String,
    /// What happened.
    pub outcome: MuscleOutcome,
}

/// Outcome of a calibration run.
#[derive(Debug, Default)]
pub struct CalibrationReport {
    /// One entry per enabled muscle, in target model order.
    pub muscles: Vec<MuscleReport>,
    /// File the calibrated target model was written to.
    pub written_to: Option<PathBuf>,
}

impl CalibrationReport {
    /// Outcome for `muscle`.
    #[must_use]
    pub fn outcome(&self, muscle: &str) -> Option<&MuscleOutcome> {
        self.muscles
            .iter()
            .find(|m| m.muscle == muscle)
            .map(|m| &m.outcome)
    }

    /// Fitted parameters of every calibrated muscle.
    pub fn results(&self) -> impl Iterator<Item = &CalibrationResult> {
        self.muscles.iter().filter_map(|m| m.outcome.result())
    }

    /// Muscles that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &CalibError)> {
        self.muscles.iter().filter_map(|m| match &m.outcome {
            MuscleOutcome::Failed { error } => Some((m.muscle.as_str(), error)),
            _ => None,
        })
    }

    /// Muscles that were skipped, with the reason.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.muscles.iter().filter_map(|m| match &m.outcome {
            MuscleOutcome::Skipped { reason } => Some((m.muscle.as_str(), reason.as_str())),
            _ => None,
        })
    }

    /// Number of calibrated muscles.
    #[must_use]
    pub fn calibrated_count(&self) -> usize {
        self.results().count()
    }

    /// True when no muscle was processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.muscles.is_empty()
    }
}

/// Runs calibration of a target model against a template model.
#[derive(Debug, Clone)]
pub struct CalibrationDriver {
    config: CalibrationConfig,
    base_dir: Option<PathBuf>,
}

impl CalibrationDriver {
    /// Create a driver, validating `config`.
    pub fn new(config: CalibrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            base_dir: None,
        })
    }

    /// Directory relative output paths are resolved against, usually the
    /// directory of the setup file.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Calibrate every enabled muscle of `target`, one after another.
    ///
    /// Both models are posed in place during the run and left at their
    /// default pose afterwards. Fails without touching either model when a
    /// target muscle is missing from `template`.
    pub fn calibrate<T, R>(&self, target: &mut T, template: &mut R) -> Result<CalibrationReport>
    where
        T: PosableModel + ?Sized,
        R: PosableModel + ?Sized,
    {
        if !self.config.apply {
            tracing::info!("Muscle calibration is disabled, nothing to do");
            return Ok(CalibrationReport::default());
        }
        check_muscles(&*target, &*template)?;

        let mut report = CalibrationReport::default();
        for muscle in self.enabled_muscles(&*target) {
            let fitted = self.fit_muscle(target, template, &muscle);
            let outcome = match settle(&muscle, fitted) {
                Ok(outcome) => write_back(target, &muscle, outcome),
                Err(e) => {
                    target.reset_pose();
                    template.reset_pose();
                    return Err(e);
                }
            };
            report.muscles.push(MuscleReport { muscle, outcome });
        }

        template.reset_pose();
        self.finish(target, report)
    }

    /// Calibrate every enabled muscle of `target` in parallel.
    ///
    /// Each worker fits muscles on its own clones of both models; results
    /// are then written back to `target` in model order. Produces the same
    /// report as [`calibrate`](Self::calibrate).
    pub fn calibrate_parallel<T, R>(
        &self,
        target: &mut T,
        template: &R,
    ) -> Result<CalibrationReport>
    where
        T: PosableModel + Clone + Send + Sync,
        R: PosableModel + Clone + Send + Sync,
    {
        if !self.config.apply {
            tracing::info!("Muscle calibration is disabled, nothing to do");
            return Ok(CalibrationReport::default());
        }
        check_muscles(&*target, template)?;

        let muscles = self.enabled_muscles(&*target);
        let shared: &T = &*target;
        let fitted: Vec<Result<MuscleOutcome>> = muscles
            .par_iter()
            .map_init(
                || (shared.clone(), template.clone()),
                |(target, template), muscle| self.fit_muscle(target, template, muscle),
            )
            .collect();

        let mut report = CalibrationReport::default();
        for (muscle, fitted) in muscles.into_iter().zip(fitted) {
            let outcome = settle(&muscle, fitted)?;
            let outcome = write_back(target, &muscle, outcome);
            report.muscles.push(MuscleReport { muscle, outcome });
        }

        self.finish(target, report)
    }

    fn enabled_muscles<T: PosableModel + ?Sized>(&self, target: &T) -> Vec<String> {
        target
            .muscle_names()
            .into_iter()
            .filter(|m| self.config.muscles.is_enabled(m))
            .collect()
    }

    /// Fit one muscle without touching its parameters.
    fn fit_muscle<T, R>(
        &self,
        target: &mut T,
        template: &mut R,
        muscle: &str,
    ) -> Result<MuscleOutcome>
    where
        T: PosableModel + ?Sized,
        R: PosableModel + ?Sized,
    {
        template.reset_pose();
        target.reset_pose();

        let chain = resolve_chain(&*template, muscle, self.config.max_chain_steps)?;
        let active =
            grid::collect_active_coordinates(&*template, &chain, &self.config.coordinates)?;
        if active.is_empty() {
            let reason = "spans no enabled, unlocked coordinate".to_string();
            tracing::info!("No coordinates for {}, skipping", muscle);
            return Ok(MuscleOutcome::Skipped { reason });
        }

        let n_eval = self.config.n_evaluation_points;
        let mut combination = grid::generate(
            &active,
            n_eval,
            self.config.min_angular_step(),
            self.config.max_grid_poses,
        )?;
        tracing::info!(
            "Calibrating {} using coordinates [{}], {} combinations",
            muscle,
            combination.names().collect::<Vec<_>>().join(", "),
            combination.sample_count()
        );

        let samples = sample_template_quantities(
            template,
            muscle,
            &mut combination,
            self.config.min_normalized_fiber_length,
        )?;
        if combination.sample_count() < n_eval / 2 {
            tracing::warn!(
                "Only {} usable combinations for {}, less than half the {} evaluation points",
                combination.sample_count(),
                muscle,
                n_eval
            );
        }

        let targets = sample_mtu_length(target, muscle, &combination)?;

        let solver = ParameterSolver::from_config(&self.config);
        let mut fit = solver.solve(muscle, &samples, &targets)?;
        if !fit.is_physical() {
            tracing::warn!(
                "Non-physical estimate for {} (optimal fiber length {}, tendon slack length {}), \
                 using two-stage fit",
                muscle,
                fit.result.optimal_fiber_length,
                fit.result.tendon_slack_length
            );
            let template_lengths = sample_mtu_length(template, muscle, &combination)?;
            let template_slack = template.muscle_scalar(muscle, MuscleQuantity::TendonSlackLength)?;
            fit = solver.solve_two_stage(
                muscle,
                &samples,
                &targets,
                template_slack,
                &template_lengths,
            )?;
            if !fit.is_physical() {
                return Err(CalibError::NonPhysical {
                    muscle: muscle.to_string(),
                    optimal_fiber_length: fit.result.optimal_fiber_length,
                    tendon_slack_length: fit.result.tendon_slack_length,
                });
            }
        }

        Ok(MuscleOutcome::Calibrated {
            result: fit.result,
            method: fit.method,
            samples: fit.samples,
        })
    }

    /// Reset the target pose and persist the target if configured to.
    fn finish<T>(&self, target: &mut T, mut report: CalibrationReport) -> Result<CalibrationReport>
    where
        T: PosableModel + ?Sized,
    {
        target.reset_pose();

        tracing::info!(
            "Calibrated {} of {} muscles of {}",
            report.calibrated_count(),
            report.muscles.len(),
            target.name()
        );

        if let Some(path) = self.config.resolve_output_path(self.base_dir.as_deref()) {
            if let Err(source) = target.persist(&path) {
                tracing::error!(
                    "Could not write calibrated model {} to {}: {}",
                    target.name(),
                    path.display(),
                    source
                );
                return Err(CalibError::Persist {
                    path,
                    report: Box::new(report),
                    source,
                });
            }
            report.written_to = Some(path);
        }
        Ok(report)
    }

    /// Output file the target would be written to.
    #[must_use]
    pub fn output_path(&self) -> Option<PathBuf> {
        self.config.resolve_output_path(self.base_dir.as_deref())
    }

    /// Directory relative output paths are resolved against.
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

/// Every target muscle must exist in the template.
fn check_muscles<T, R>(target: &T, template: &R) -> Result<()>
where
    T: PosableModel + ?Sized,
    R: PosableModel + ?Sized,
{
    match target.muscle_names().into_iter().find(|m| !template.has_muscle(m)) {
        Some(muscle) => {
            tracing::error!(
                "Muscle {} could not be found in template model {}, aborting",
                muscle,
                template.name()
            );
            Err(CalibError::MuscleMismatch {
                muscle,
                model: template.name().to_string(),
            })
        }
        None => Ok(()),
    }
}

/// Turn a muscle-local error into a failed outcome; pass batch-fatal ones on.
fn settle(muscle: &str, fitted: Result<MuscleOutcome>) -> Result<MuscleOutcome> {
    match fitted {
        Ok(outcome) => Ok(outcome),
        Err(error) if error.is_muscle_local() => {
            tracing::warn!("Calibration of {} failed: {}", muscle, error);
            Ok(MuscleOutcome::Failed { error })
        }
        Err(error) => Err(error),
    }
}

fn write_back<T>(target: &mut T, muscle: &str, outcome: MuscleOutcome) -> MuscleOutcome
where
    T: PosableModel + ?Sized,
{
    let (result, method, samples) = match outcome {
        MuscleOutcome::Calibrated { result, method, samples } => (result, method, samples),
        other => return other,
    };
    let written = target
        .set_optimal_fiber_length(muscle, result.optimal_fiber_length)
        .and_then(|()| target.set_tendon_slack_length(muscle, result.tendon_slack_length));
    match written {
        Ok(()) => {
            tracing::info!(
                "{}: optimal fiber length {:.5}, tendon slack length {:.5} ({} fit, {} poses)",
                muscle,
                result.optimal_fiber_length,
                result.tendon_slack_length,
                method,
                samples
            );
            MuscleOutcome::Calibrated { result, method, samples }
        }
        Err(e) => MuscleOutcome::Failed { error: e.into() },
    }
}
