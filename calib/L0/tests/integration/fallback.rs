//! Two-stage fallback when the joint fit is not physical.
//!
//! The target soleus path is `3 · L_template - 0.8`. Fitting both parameters
//! at once explains the constant offset with a negative tendon slack length,
//! so the driver falls back to the two-stage fit.

use calib_core::{CalibrationDriver, MuscleOutcome, ParameterSolver, grid, resolve_chain, sampling};
use calib_model::{Coordinate, Muscle, MuscleParameters, MusclePath, PosableModel, SkeletalModel};
use calib_types::{AllowList, CalibrationConfig, FitMethod, JointInfo, MuscleQuantity};

use crate::fixtures::SOLEUS;

fn ankle(name: &str, lopt: f64, lts: f64, path: MusclePath) -> SkeletalModel {
    SkeletalModel::new(name)
        .with_body("tibia_r")
        .with_body("calcn_r")
        .with_joint(
            JointInfo::new("ankle_r", "tibia_r", "calcn_r").with_coordinate("ankle_angle_r"),
        )
        .with_coordinate(Coordinate::new("ankle_angle_r", (-0.7, 0.5)))
        .with_muscle(Muscle::new(
            SOLEUS,
            "tibia_r",
            "calcn_r",
            MuscleParameters::new(lopt, lts),
            path,
        ))
}

fn template() -> SkeletalModel {
    ankle(
        "template",
        0.05,
        0.25,
        MusclePath::new(0.3).with_term("ankle_angle_r", -0.05),
    )
}

fn offset_target() -> SkeletalModel {
    ankle(
        "subject01",
        0.2,
        0.2,
        MusclePath::new(0.1).with_term("ankle_angle_r", -0.15),
    )
}

/// Test: the joint fit of the offset target is non-physical and the
/// two-stage fit is not.
#[test]
fn test_two_stage_repairs_offset_target() {
    let mut template = template();
    let mut target = offset_target();

    let chain = resolve_chain(&template, SOLEUS, 16).unwrap();
    let active = grid::collect_active_coordinates(&template, &chain, &AllowList::All).unwrap();
    let mut combination = grid::generate(&active, 10, None, usize::MAX).unwrap();
    let samples =
        sampling::sample_template_quantities(&mut template, SOLEUS, &mut combination, 0.5).unwrap();
    let targets = sampling::sample_mtu_length(&mut target, SOLEUS, &combination).unwrap();
    let template_lengths =
        sampling::sample_mtu_length(&mut template, SOLEUS, &combination).unwrap();
    let slack = template
        .muscle_scalar(SOLEUS, MuscleQuantity::TendonSlackLength)
        .unwrap();

    let solver = ParameterSolver::default();
    let joint = solver.solve(SOLEUS, &samples, &targets).unwrap();
    assert_eq!(joint.method, FitMethod::Joint);
    assert!(!joint.is_physical(), "{:?}", joint.result);
    assert!(joint.result.tendon_slack_length < 0.0);

    let staged = solver
        .solve_two_stage(SOLEUS, &samples, &targets, slack, &template_lengths)
        .unwrap();
    assert_eq!(staged.method, FitMethod::TwoStage);
    assert!(staged.is_physical(), "{:?}", staged.result);
}

/// Test: the driver falls back on its own and writes the two-stage result.
#[test]
fn test_driver_uses_two_stage_fit() {
    let mut template = template();
    let mut target = offset_target();

    let report = CalibrationDriver::new(CalibrationConfig::default())
        .unwrap()
        .calibrate(&mut target, &mut template)
        .unwrap();

    match report.outcome(SOLEUS).unwrap() {
        MuscleOutcome::Calibrated { result, method, .. } => {
            assert_eq!(*method, FitMethod::TwoStage);
            assert!(result.optimal_fiber_length > 0.0);
            assert!(result.tendon_slack_length > 0.0);
            let written = &target.muscle(SOLEUS).unwrap().parameters;
            assert!((written.optimal_fiber_length - result.optimal_fiber_length).abs() < 1e-15);
            assert!((written.tendon_slack_length - result.tendon_slack_length).abs() < 1e-15);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
