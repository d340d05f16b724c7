//! Core types for musculotendon parameter calibration.
//!
//! This crate provides the data shared between posable models and the
//! calibration pipeline:
//!
//! - [`CoordinateCombination`] - Sampled joint poses for one muscle
//! - [`TemplateSample`] - Normalized fiber/tendon quantities at one pose
//! - [`CalibrationResult`] - Fitted optimal fiber and tendon slack lengths
//! - [`AllowList`] - Which muscles and coordinates take part in a run
//! - [`CalibrationConfig`] - Settings of a calibration run
//!
//! # Layer 0
//!
//! These types are **pure data**. They carry no model state and no solver;
//! the `calib-model` and `calib-core` crates build on them.
//!
//! # Example
//!
//! ```
//! use calib_types::{AllowList, CalibrationConfig};
//!
//! let config = CalibrationConfig::default()
//!     .with_muscles(AllowList::from_names(["soleus_r"]))
//!     .with_evaluation_points(8);
//!
//! assert!(config.muscles.is_enabled("soleus_r"));
//! assert!(config.coordinates.is_enabled("ankle_angle_r"));
//! ```

#![doc(html_root_url = "https://docs.rs/calib-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
)]

mod combination;
mod config;
mod error;
mod filter;
mod sample;
mod topology;

pub use combination::CoordinateCombination;
pub use config::CalibrationConfig;
pub use error::{ConfigError, Result};
pub use filter::{ALLOW_ALL, AllowList, is_enabled};
pub use sample::{CalibrationResult, FitMethod, TemplateSample, is_physical};
pub use topology::{CouplingDriver, JointInfo, MuscleQuantity, MuscleSpan, Stage};
