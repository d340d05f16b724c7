//! Muscle sets that disagree between the two models.

use calib_core::{CalibError, CalibrationDriver};
use calib_model::{Muscle, MuscleParameters, MusclePath, PosableModel};
use calib_types::CalibrationConfig;

use crate::fixtures;

/// Test: a target muscle missing from the template aborts the run before
/// either model is posed or modified.
#[test]
fn test_missing_template_muscle_fails_fast() {
    let mut template = fixtures::template();
    let mut target = fixtures::target(1.1).with_muscle(Muscle::new(
        "tibant_r",
        "tibia_r",
        "calcn_r",
        MuscleParameters::new(0.09, 0.22),
        MusclePath::new(0.3).with_term("ankle_angle_r", 0.04),
    ));
    let target_before = target.clone();
    let template_before = template.clone();

    let err = CalibrationDriver::new(CalibrationConfig::default())
        .unwrap()
        .calibrate(&mut target, &mut template)
        .unwrap_err();

    match &err {
        CalibError::MuscleMismatch { muscle, model } => {
            assert_eq!(muscle, "tibant_r");
            assert_eq!(model, "template");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!err.is_muscle_local());
    assert!(target.is_default_pose());
    assert!(template.is_default_pose());
    assert_eq!(target, target_before);
    assert_eq!(template, template_before);
}

/// Test: the parallel driver applies the same check.
#[test]
fn test_missing_template_muscle_fails_fast_in_parallel() {
    let template = fixtures::template();
    let mut target = fixtures::target(1.1).with_muscle(Muscle::new(
        "tibant_r",
        "tibia_r",
        "calcn_r",
        MuscleParameters::new(0.09, 0.22),
        MusclePath::new(0.3),
    ));
    let before = target.clone();

    let result = CalibrationDriver::new(CalibrationConfig::default())
        .unwrap()
        .calibrate_parallel(&mut target, &template);

    assert!(matches!(result, Err(CalibError::MuscleMismatch { .. })));
    assert_eq!(target, before);
}

/// Test: extra template muscles are ignored.
#[test]
fn test_extra_template_muscle_is_ignored() {
    let mut template = fixtures::template().with_muscle(Muscle::new(
        "tibant_r",
        "tibia_r",
        "calcn_r",
        MuscleParameters::new(0.09, 0.22),
        MusclePath::new(0.3),
    ));
    let mut target = fixtures::target(1.0);

    let report = CalibrationDriver::new(CalibrationConfig::default())
        .unwrap()
        .calibrate(&mut target, &mut template)
        .unwrap();
    assert!(report.outcome("tibant_r").is_none());
    assert_eq!(report.muscles.len(), target.muscle_names().len());
}
