//! Posable musculoskeletal models.
//!
//! Calibration never builds or simulates a model itself. It poses a model,
//! asks it to realize geometry or forces, and reads muscle scalars back. This
//! crate defines that contract as [`PosableModel`] and ships
//! [`SkeletalModel`], an in-memory implementation:
//!
//! ```text
//!   pelvis ──hip_r──► femur_r ──knee_r──► tibia_r ──ankle_r──► calcn_r
//!      ●━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━●
//!   origin                  muscle path                   insertion
//! ```
//!
//! - Joints connect a parent body to a child body and own coordinates.
//! - Coordinates can be locked, or driven by others through linear couplers.
//! - Muscles are Hill-type with a compliant tendon; musculotendon length is
//!   linear in coordinate values.
//!
//! # Pose handling
//!
//! Models are mutated in place when posed. [`PoseScope`] wraps a mutable
//! borrow and restores the default pose when dropped.
//!
//! # Example
//!
//! ```
//! use calib_model::{
//!     Coordinate, Muscle, MuscleParameters, MusclePath, PosableModel, SkeletalModel,
//! };
//! use calib_types::{JointInfo, MuscleQuantity, Stage};
//!
//! let mut model = SkeletalModel::new("leg")
//!     .with_body("tibia_r")
//!     .with_body("calcn_r")
//!     .with_joint(
//!         JointInfo::new("ankle_r", "tibia_r", "calcn_r").with_coordinate("ankle_angle_r"),
//!     )
//!     .with_coordinate(Coordinate::new("ankle_angle_r", (-0.7, 0.5)))
//!     .with_muscle(Muscle::new(
//!         "soleus_r",
//!         "tibia_r",
//!         "calcn_r",
//!         MuscleParameters::new(0.05, 0.25),
//!         MusclePath::new(0.3).with_term("ankle_angle_r", -0.05),
//!     ));
//!
//! model.set_coordinate_value("ankle_angle_r", 0.2).unwrap();
//! model.realize(Stage::Position).unwrap();
//! let length = model.muscle_scalar("soleus_r", MuscleQuantity::Length).unwrap();
//! assert!((length - 0.29).abs() < 1e-12);
//! ```

#![doc(html_root_url = "https://docs.rs/calib-model/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::suboptimal_flops,
)]

use std::path::Path;

use calib_types::{CouplingDriver, JointInfo, MuscleQuantity, MuscleSpan, Stage};

pub mod curves;
mod error;
mod pose;
pub mod skeletal;

pub use error::{ModelError, Result};
pub use pose::PoseScope;
pub use skeletal::{
    Coordinate, CoordinateCoupler, CouplerTerm, Equilibrium, Muscle, MuscleParameters,
    MusclePath, PathTerm, SkeletalModel,
};

/// A musculoskeletal model that can be posed and queried.
///
/// Implementations own all model state. Posing methods mutate that state in
/// place, so a model must not be posed from two places at once.
pub trait PosableModel {
    /// Model name.
    fn name(&self) -> &str;

    /// Names of all muscles, in model order.
    fn muscle_names(&self) -> Vec<String>;

    /// Check if a muscle exists.
    fn has_muscle(&self, muscle: &str) -> bool {
        self.muscle_names().iter().any(|m| m == muscle)
    }

    /// Bodies at the two ends of a muscle's path.
    fn muscle_span(&self, muscle: &str) -> Result<MuscleSpan>;

    /// All joints of the model.
    fn joints(&self) -> &[JointInfo];

    /// Range `(min, max)` of a coordinate.
    fn coordinate_range(&self, coordinate: &str) -> Result<(f64, f64)>;

    /// Check if a coordinate is locked.
    fn is_locked(&self, coordinate: &str) -> Result<bool>;

    /// Check if a coordinate is driven by a constraint.
    fn is_constrained(&self, coordinate: &str) -> Result<bool>;

    /// Independent coordinate(s) of the coupler driving `coordinate`.
    fn coupling_driver(&self, coordinate: &str) -> Result<CouplingDriver>;

    /// Current value of a coordinate.
    fn coordinate_value(&self, coordinate: &str) -> Result<f64>;

    /// Set a coordinate. Invalidates any realized stage.
    fn set_coordinate_value(&mut self, coordinate: &str, value: f64) -> Result<()>;

    /// Check if every coordinate is at its default value.
    fn is_default_pose(&self) -> bool;

    /// Return every coordinate to its default value.
    fn reset_pose(&mut self);

    /// Bring derived quantities up to `stage` for the current pose.
    fn realize(&mut self, stage: Stage) -> Result<()>;

    /// Set a muscle's activation.
    fn set_activation(&mut self, muscle: &str, activation: f64) -> Result<()>;

    /// Solve a muscle's fiber/tendon force balance at the current pose.
    fn equilibrate_muscle(&mut self, muscle: &str) -> Result<()>;

    /// Read a muscle scalar.
    fn muscle_scalar(&self, muscle: &str, quantity: MuscleQuantity) -> Result<f64>;

    /// Overwrite a muscle's optimal fiber length.
    fn set_optimal_fiber_length(&mut self, muscle: &str, value: f64) -> Result<()>;

    /// Overwrite a muscle's tendon slack length.
    fn set_tendon_slack_length(&mut self, muscle: &str, value: f64) -> Result<()>;

    /// Write the model to `path`.
    fn persist(&self, path: &Path) -> Result<()>;
}
