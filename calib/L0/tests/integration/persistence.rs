//! Writing the calibrated model and reading setups from disk.

use approx::assert_relative_eq;
use calib_core::{CalibError, CalibrationDriver, DEFAULT_COMPARISON_TOLERANCE, compare_parameters};
use calib_model::{PosableModel, SkeletalModel};
use calib_types::{AllowList, CalibrationConfig};

use crate::fixtures::{self, SOLEUS};

/// Test: a relative output file is written next to the setup and reloads to
/// the calibrated model.
#[test]
fn test_writes_calibrated_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = CalibrationConfig::default().with_output_model_file("subject01_calibrated.json");
    let driver = CalibrationDriver::new(config).unwrap().with_base_dir(dir.path());

    let mut template = fixtures::template();
    let mut target = fixtures::target(1.2);
    let report = driver.calibrate(&mut target, &mut template).unwrap();

    let path = dir.path().join("subject01_calibrated.json");
    assert_eq!(report.written_to.as_deref(), Some(path.as_path()));

    let reloaded = SkeletalModel::load(&path).unwrap();
    assert_eq!(reloaded.name(), "subject01");
    assert!(compare_parameters(&reloaded, &target, 1e-12).unwrap().is_empty());
    let diffs =
        compare_parameters(&reloaded, &fixtures::expected(1.2), DEFAULT_COMPARISON_TOLERANCE)
            .unwrap();
    assert!(diffs.is_empty(), "{diffs:?}");
}

/// Test: with results turned off nothing is written but the target is still
/// calibrated in memory.
#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = CalibrationConfig {
        write_results: false,
        ..CalibrationConfig::default().with_output_model_file("out.json")
    };
    let driver = CalibrationDriver::new(config).unwrap().with_base_dir(dir.path());

    let mut template = fixtures::template();
    let mut target = fixtures::target(1.2);
    let report = driver.calibrate(&mut target, &mut template).unwrap();

    assert!(report.written_to.is_none());
    assert!(!dir.path().join("out.json").exists());
    assert_relative_eq!(
        target.muscle(SOLEUS).unwrap().parameters.optimal_fiber_length,
        0.05 * 1.2,
        epsilon = 1e-6
    );
}

/// Test: an unwritable output path fails the run but hands back the report
/// of the muscles already calibrated.
#[test]
fn test_unwritable_output_keeps_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("out.json");
    let config = CalibrationConfig::default()
        .with_muscles(AllowList::from_names([SOLEUS]))
        .with_output_model_file(&out);

    let mut template = fixtures::template();
    let mut target = fixtures::target(1.0);
    let err = CalibrationDriver::new(config)
        .unwrap()
        .calibrate(&mut target, &mut template)
        .unwrap_err();

    assert!(!err.is_muscle_local());
    match err {
        CalibError::Persist { path, report, .. } => {
            assert_eq!(path, out);
            assert_eq!(report.calibrated_count(), 1);
            assert!(report.written_to.is_none());
            let soleus = report.outcome(SOLEUS).and_then(|o| o.result()).unwrap();
            assert_relative_eq!(
                target.muscle(SOLEUS).unwrap().parameters.tendon_slack_length,
                soleus.tendon_slack_length
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(target.is_default_pose());
}

/// Test: a setup saved to disk loads back unchanged and drives the same run.
#[test]
fn test_setup_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calibrate_setup.json");
    let config = CalibrationConfig::default()
        .with_muscles(AllowList::from_names([SOLEUS]))
        .with_evaluation_points(6)
        .with_min_degrees_increment(0.0);
    config.save(&path).unwrap();

    let loaded = CalibrationConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let mut template = fixtures::template();
    let mut target = fixtures::target(0.95);
    let report = CalibrationDriver::new(loaded)
        .unwrap()
        .calibrate(&mut target, &mut template)
        .unwrap();
    assert_eq!(report.calibrated_count(), 1);
}

/// Test: a partial setup file fills the rest from defaults.
#[test]
fn test_partial_setup_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("setup.json");
    std::fs::write(&path, r#"{ "n_evaluation_points": 4, "muscles": ["gasmed_r"] }"#).unwrap();

    let config = CalibrationConfig::load(&path).unwrap();
    assert_eq!(config.n_evaluation_points, 4);
    assert!(config.muscles.is_enabled("gasmed_r"));
    assert!(!config.muscles.is_enabled(SOLEUS));
    assert!(config.coordinates.is_all());
    assert!(config.apply);
}

/// Test: an invalid setup file is rejected on load.
#[test]
fn test_invalid_setup_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("setup.json");
    std::fs::write(&path, r#"{ "n_evaluation_points": 0 }"#).unwrap();
    assert!(CalibrationConfig::load(&path).is_err());
}
