//! Full calibration runs on the reference leg.

use approx::assert_relative_eq;
use calib_core::{
    CalibrationDriver, DEFAULT_COMPARISON_TOLERANCE, MuscleOutcome, compare_parameters, grid,
    resolve_chain,
};
use calib_model::{PosableModel, SkeletalModel};
use calib_types::{AllowList, CalibrationConfig, FitMethod};

use crate::fixtures::{self, BFLH, FDB, GASMED, SOLEUS};

fn driver(config: CalibrationConfig) -> CalibrationDriver {
    CalibrationDriver::new(config).unwrap()
}

/// Test: fixtures are well-formed models.
#[test]
fn test_fixtures_validate() {
    fixtures::template().validate().unwrap();
    fixtures::target(1.2).validate().unwrap();
    fixtures::expected(1.2).validate().unwrap();
}

/// Test: two independent coordinates at 10 points each give 100 poses.
#[test]
fn test_two_coordinate_grid_has_100_poses() {
    let model = fixtures::template();
    let chain = resolve_chain(&model, GASMED, 16).unwrap();
    assert_eq!(chain, vec!["ankle_r", "knee_r"]);

    let active = grid::collect_active_coordinates(&model, &chain, &AllowList::All).unwrap();
    let names: Vec<_> = active.iter().map(|c| c.name.as_str()).collect();
    // knee_tx_r follows knee_angle_r and subtalar_angle_r is locked.
    assert_eq!(names, vec!["ankle_angle_r", "knee_angle_r"]);

    let combination = grid::generate(&active, 10, None, usize::MAX).unwrap();
    assert_eq!(combination.sample_count(), 100);
    assert!(combination.is_rectangular());
}

/// Test: a minimum step wider than the natural spacing keeps the grid size
/// and repeats the clamped values.
#[test]
fn test_min_step_keeps_grid_size() {
    let model = fixtures::template();
    let chain = resolve_chain(&model, GASMED, 16).unwrap();
    let active = grid::collect_active_coordinates(&model, &chain, &AllowList::All).unwrap();

    let config = CalibrationConfig::default().with_min_degrees_increment(20.0);
    let step = config.min_angular_step().unwrap();
    let combination = grid::generate(&active, 10, Some(step), usize::MAX).unwrap();
    assert_eq!(combination.sample_count(), 100);

    let ankle = combination.values("ankle_angle_r").unwrap();
    let mut distinct: Vec<f64> = ankle.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    // 1.2 rad of ankle range holds three 20 degree steps.
    assert_eq!(distinct.len(), 4);
    for pair in distinct.windows(2) {
        assert_relative_eq!(pair[1] - pair[0], step, epsilon = 1e-12);
    }
    assert!(distinct.iter().all(|&q| (-0.7..=0.5).contains(&q)));
}

/// Test: coordinates of a joint with three active coordinates are sampled at
/// half density.
#[test]
fn test_multi_coordinate_joint_is_halved() {
    let model = fixtures::template();
    let chain = resolve_chain(&model, BFLH, 16).unwrap();
    let active = grid::collect_active_coordinates(&model, &chain, &AllowList::All).unwrap();
    assert_eq!(grid::evaluation_counts(&active, 10), vec![10, 5, 5, 5]);
    let combination = grid::generate(&active, 10, None, usize::MAX).unwrap();
    assert_eq!(combination.sample_count(), 1250);
}

/// Test: a target whose paths are the template's scaled uniformly calibrates
/// to the template's parameters scaled the same way.
#[test]
fn test_scaled_target_recovers_scaled_parameters() {
    let scale = 1.15;
    let mut template = fixtures::template();
    let mut target = fixtures::target(scale);

    let report = driver(CalibrationConfig::default())
        .calibrate(&mut target, &mut template)
        .unwrap();

    for muscle in [SOLEUS, GASMED, BFLH] {
        let (lopt, lts) = fixtures::template_parameters(muscle);
        match report.outcome(muscle).unwrap() {
            MuscleOutcome::Calibrated { result, method, samples } => {
                assert_eq!(*method, FitMethod::Joint, "{muscle}");
                assert!(*samples > 2, "{muscle}");
                assert_relative_eq!(result.optimal_fiber_length, lopt * scale, epsilon = 1e-6);
                assert_relative_eq!(result.tendon_slack_length, lts * scale, epsilon = 1e-6);
            }
            other => panic!("{muscle}: {other:?}"),
        }
    }
    assert_eq!(report.calibrated_count(), 3);

    let expected = fixtures::expected(scale);
    let diffs = compare_parameters(&target, &expected, DEFAULT_COMPARISON_TOLERANCE).unwrap();
    assert!(diffs.is_empty(), "{diffs:?}");
}

/// Test: the toe flexor crosses only a joint without coordinates.
#[test]
fn test_muscle_without_coordinates_is_skipped() {
    let mut template = fixtures::template();
    let mut target = fixtures::target(1.0);

    let report = driver(CalibrationConfig::default().with_muscles(AllowList::from_names([FDB])))
        .calibrate(&mut target, &mut template)
        .unwrap();

    assert_eq!(report.muscles.len(), 1);
    let skipped: Vec<_> = report.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].0, FDB);
    assert_relative_eq!(
        target.muscle(FDB).unwrap().parameters.tendon_slack_length,
        fixtures::PLACEHOLDER
    );
}

/// Test: restricting coordinates narrows the grid.
#[test]
fn test_coordinate_filter_narrows_grid() {
    let mut template = fixtures::template();
    let mut target = fixtures::target(1.1);

    let config = CalibrationConfig::default()
        .with_muscles(AllowList::from_names([GASMED]))
        .with_coordinates(AllowList::from_names(["ankle_angle_r"]));
    let report = driver(config).calibrate(&mut target, &mut template).unwrap();

    match report.outcome(GASMED).unwrap() {
        MuscleOutcome::Calibrated { samples, .. } => assert!(*samples <= 10),
        other => panic!("{other:?}"),
    }
}

/// Test: both models are back at their default pose after a run.
#[test]
fn test_models_left_at_default_pose() {
    let mut template = fixtures::template();
    let mut target = fixtures::target(0.9);
    driver(CalibrationConfig::default())
        .calibrate(&mut target, &mut template)
        .unwrap();
    assert!(target.is_default_pose());
    assert!(template.is_default_pose());
}

/// Test: a disabled run leaves the target untouched.
#[test]
fn test_disabled_run() {
    let mut template = fixtures::template();
    let mut target = fixtures::target(1.3);
    let before = target.clone();

    let config = CalibrationConfig {
        apply: false,
        ..CalibrationConfig::default()
    };
    let report = driver(config).calibrate(&mut target, &mut template).unwrap();
    assert!(report.is_empty());
    assert_eq!(target, before);
}

/// Test: parallel and sequential runs agree.
#[test]
fn test_parallel_matches_sequential() {
    let template = fixtures::template();
    let mut sequential_target = fixtures::target(1.05);
    let mut parallel_target = fixtures::target(1.05);
    let driver = driver(CalibrationConfig::default());

    let sequential = driver
        .calibrate(&mut sequential_target, &mut template.clone())
        .unwrap();
    let parallel = driver
        .calibrate_parallel(&mut parallel_target, &template)
        .unwrap();

    assert_eq!(sequential.muscles.len(), parallel.muscles.len());
    for (a, b) in sequential.results().zip(parallel.results()) {
        assert_eq!(a.muscle_name, b.muscle_name);
        assert_relative_eq!(a.optimal_fiber_length, b.optimal_fiber_length, epsilon = 1e-12);
        assert_relative_eq!(a.tendon_slack_length, b.tendon_slack_length, epsilon = 1e-12);
    }
    assert!(compare_parameters(&sequential_target, &parallel_target, 1e-12)
        .unwrap()
        .is_empty());
    assert!(parallel_target.is_default_pose());
}

/// Test: a calibrated model differs from its uncalibrated self.
#[test]
fn test_compare_flags_calibrated_muscles() {
    let mut template = fixtures::template();
    let mut target = fixtures::target(1.0);
    let original: SkeletalModel = target.clone();
    driver(CalibrationConfig::default())
        .calibrate(&mut target, &mut template)
        .unwrap();

    let diffs = compare_parameters(&target, &original, DEFAULT_COMPARISON_TOLERANCE).unwrap();
    // Two parameters for each of the three calibrated muscles.
    assert_eq!(diffs.len(), 6);
    assert!(diffs.iter().all(|d| d.muscle != FDB));
}
