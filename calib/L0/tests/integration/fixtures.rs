//! Shared model builders.
//!
//! A right leg with a three-coordinate hip, a knee whose translation follows
//! the knee angle, an ankle with a locked subtalar coordinate, and a toe
//! joint without coordinates:
//!
//! ```text
//!   pelvis ─hip_r─► femur_r ─knee_r─► tibia_r ─ankle_r─► calcn_r ─mtp_r─► toes_r
//! ```

use calib_model::{
    Coordinate, CoordinateCoupler, Muscle, MuscleParameters, MusclePath, SkeletalModel,
};
use calib_types::JointInfo;

pub const SOLEUS: &str = "soleus_r";
pub const GASMED: &str = "gasmed_r";
pub const BFLH: &str = "bflh_r";
pub const FDB: &str = "fdb_r";

/// Optimal fiber and tendon slack length of every uncalibrated target muscle.
pub const PLACEHOLDER: f64 = 0.2;

/// Template parameters `(optimal fiber length, tendon slack length)`.
pub fn template_parameters(muscle: &str) -> (f64, f64) {
    match muscle {
        SOLEUS => (0.05, 0.25),
        GASMED => (0.06, 0.38),
        BFLH => (0.10, 0.32),
        _ => (0.02, 0.03),
    }
}

/// Bones, joints and coordinates, without muscles.
pub fn skeleton(name: &str) -> SkeletalModel {
    SkeletalModel::new(name)
        .with_body("pelvis")
        .with_body("femur_r")
        .with_body("tibia_r")
        .with_body("calcn_r")
        .with_body("toes_r")
        .with_joint(
            JointInfo::new("hip_r", "pelvis", "femur_r")
                .with_coordinate("hip_flexion_r")
                .with_coordinate("hip_adduction_r")
                .with_coordinate("hip_rotation_r"),
        )
        .with_joint(
            JointInfo::new("knee_r", "femur_r", "tibia_r")
                .with_coordinate("knee_angle_r")
                .with_coordinate("knee_tx_r"),
        )
        .with_joint(
            JointInfo::new("ankle_r", "tibia_r", "calcn_r")
                .with_coordinate("ankle_angle_r")
                .with_coordinate("subtalar_angle_r"),
        )
        .with_joint(JointInfo::new("mtp_r", "calcn_r", "toes_r"))
        .with_coordinate(Coordinate::new("hip_flexion_r", (-0.5, 1.5)))
        .with_coordinate(Coordinate::new("hip_adduction_r", (-0.5, 0.3)))
        .with_coordinate(Coordinate::new("hip_rotation_r", (-0.5, 0.5)))
        .with_coordinate(Coordinate::new("knee_angle_r", (-2.0, 0.1)))
        .with_coordinate(Coordinate::new("knee_tx_r", (-0.01, 0.01)))
        .with_coordinate(Coordinate::new("ankle_angle_r", (-0.7, 0.5)))
        .with_coordinate(Coordinate::new("subtalar_angle_r", (-0.3, 0.3)).with_locked(true))
        .with_coupler(CoordinateCoupler::mimic("knee_angle_r", "knee_tx_r", 0.002, 0.0))
}

fn paths() -> [(&'static str, &'static str, &'static str, MusclePath); 4] {
    [
        (
            SOLEUS,
            "tibia_r",
            "calcn_r",
            MusclePath::new(0.3).with_term("ankle_angle_r", -0.05),
        ),
        (
            GASMED,
            "femur_r",
            "calcn_r",
            MusclePath::new(0.4525)
                .with_term("knee_angle_r", 0.01)
                .with_term("knee_tx_r", 0.5)
                .with_term("ankle_angle_r", -0.02),
        ),
        (
            BFLH,
            "pelvis",
            "tibia_r",
            MusclePath::new(0.428)
                .with_term("hip_flexion_r", 0.03)
                .with_term("hip_adduction_r", 0.01)
                .with_term("hip_rotation_r", 0.005)
                .with_term("knee_angle_r", 0.015),
        ),
        (FDB, "calcn_r", "toes_r", MusclePath::new(0.06)),
    ]
}

/// The template leg with trusted parameters.
pub fn template() -> SkeletalModel {
    let mut model = skeleton("template");
    for (name, proximal, distal, path) in paths() {
        let (lopt, lts) = template_parameters(name);
        let parameters = if name == GASMED {
            MuscleParameters::new(lopt, lts).with_pennation(0.17)
        } else {
            MuscleParameters::new(lopt, lts)
        };
        model = model.with_muscle(Muscle::new(name, proximal, distal, parameters, path));
    }
    model
}

/// A subject leg whose muscle paths are the template's scaled by `scale`,
/// with placeholder parameters.
pub fn target(scale: f64) -> SkeletalModel {
    let mut model = skeleton("subject01");
    for (name, proximal, distal, path) in paths() {
        model = model.with_muscle(Muscle::new(
            name,
            proximal,
            distal,
            MuscleParameters::new(PLACEHOLDER, PLACEHOLDER),
            path.scaled(scale),
        ));
    }
    model
}

/// The template with every muscle's parameters multiplied by `scale`.
///
/// This is what calibrating [`target`] with the same `scale` should produce.
pub fn expected(scale: f64) -> SkeletalModel {
    let mut model = skeleton("expected");
    for (name, proximal, distal, path) in paths() {
        let (lopt, lts) = template_parameters(name);
        let (lopt, lts) = if name == FDB {
            (PLACEHOLDER, PLACEHOLDER)
        } else {
            (lopt * scale, lts * scale)
        };
        model = model.with_muscle(Muscle::new(
            name,
            proximal,
            distal,
            MuscleParameters::new(lopt, lts),
            path.scaled(scale),
        ));
    }
    model
}
