//! Musculotendon parameter calibration.
//!
//! Fits the optimal fiber length and tendon slack length of every muscle of
//! a target model so its fiber/tendon operating range matches a template
//! model with trusted parameters:
//!
//! ```text
//!   template ──► chain ──► grid ──► template samples ─┐
//!                                      (prunes grid)   ├──► solver ──► target
//!   target ─────────────────────────► target lengths ─┘
//! ```
//!
//! - [`chain`] - joints a muscle spans, distal first
//! - [`grid`] - coordinates to sample and the Cartesian pose grid
//! - [`sampling`] - template equilibrium quantities and target lengths
//! - [`solver`] - rank-revealing least squares with a two-stage fallback
//! - [`CalibrationDriver`] - the per-muscle loop and write-back
//! - [`compare_parameters`] - check a calibrated model against a reference
//!
//! # Example
//!
//! ```
//! use calib_core::CalibrationDriver;
//! use calib_model::{Coordinate, Muscle, MuscleParameters, MusclePath, SkeletalModel};
//! use calib_types::{CalibrationConfig, JointInfo};
//!
//! let leg = |lopt: f64, lts: f64, scale: f64| {
//!     SkeletalModel::new("leg")
//!         .with_body("tibia_r")
//!         .with_body("calcn_r")
//!         .with_joint(
//!             JointInfo::new("ankle_r", "tibia_r", "calcn_r").with_coordinate("ankle_angle_r"),
//!         )
//!         .with_coordinate(Coordinate::new("ankle_angle_r", (-0.7, 0.5)))
//!         .with_muscle(Muscle::new(
//!             "soleus_r",
//!             "tibia_r",
//!             "calcn_r",
//!             MuscleParameters::new(lopt, lts),
//!             MusclePath::new(0.3).with_term("ankle_angle_r", -0.05).scaled(scale),
//!         ))
//! };
//!
//! let mut template = leg(0.05, 0.25, 1.0);
//! let mut target = leg(0.1, 0.1, 1.1);
//!
//! let driver = CalibrationDriver::new(CalibrationConfig::default()).unwrap();
//! let report = driver.calibrate(&mut target, &mut template).unwrap();
//!
//! let soleus = report.outcome("soleus_r").and_then(|o| o.result()).unwrap();
//! assert!((soleus.optimal_fiber_length - 0.055).abs() < 1e-6);
//! assert!((soleus.tendon_slack_length - 0.275).abs() < 1e-6);
//! ```

#![doc(html_root_url = "https://docs.rs/calib-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names,
)]

pub mod chain;
mod compare;
mod driver;
mod error;
pub mod grid;
pub mod sampling;
pub mod solver;

pub use chain::resolve_chain;
pub use compare::{DEFAULT_COMPARISON_TOLERANCE, ParameterDifference, compare_parameters};
pub use driver::{CalibrationDriver, CalibrationReport, MuscleOutcome, MuscleReport};
pub use error::{CalibError, Result};
pub use grid::ActiveCoordinate;
pub use solver::{LinearFit, ParameterSolver};
