#[allow(dead_code)]
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use driftcorr_core::align::{estimate_pair, register_pair};
use driftcorr_core::error::DriftError;
use driftcorr_core::frame::{ImageBuffer, Offset3D, PairwiseShift};
use driftcorr_core::pipeline::{
    correct_drift, register_sequence, run_pipeline, DriftConfig, NoOpReporter, PairOutcome,
    PipelineStage, ProgressReporter, RegistrationConfig,
};
use ndarray::Array2;

fn drift() -> Vec<Offset3D> {
    vec![
        Offset3D::new(0.0, 0.0, 0.0),
        Offset3D::new(1.0, 0.0, -1.0),
        Offset3D::new(2.0, 1.0, -1.0),
        Offset3D::new(2.0, 2.0, 0.0),
        Offset3D::new(3.0, 2.0, 1.0),
    ]
}

#[derive(Default)]
struct RecordingReporter {
    stages: Mutex<Vec<PipelineStage>>,
    advanced: AtomicUsize,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }

    fn advance(&self, _items_done: usize) {
        self.advanced.fetch_add(1, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Single pair
// ---------------------------------------------------------------------------

#[test]
fn test_single_frame_yields_sentinel() {
    let frames = common::drifting_sequence(32, &[Offset3D::ZERO], 1);
    let shift = register_pair(&frames, 0, &RegistrationConfig::default()).unwrap();
    assert_eq!(shift, PairwiseShift::sentinel());
    assert_eq!(shift.to_record(), [0.0; 4]);
}

#[test]
fn test_frame_zero_yields_sentinel() {
    let frames = common::drifting_sequence(32, &drift()[..2], 1);
    let shift = register_pair(&frames, 0, &RegistrationConfig::default()).unwrap();
    assert_eq!(shift, PairwiseShift::sentinel());
}

#[test]
fn test_frame_out_of_range_is_rejected() {
    let frames = common::drifting_sequence(32, &drift()[..2], 1);
    let result = register_pair(&frames, 2, &RegistrationConfig::default());
    assert!(matches!(result, Err(DriftError::InvalidInput(_))));
}

#[test]
fn test_pair_shift_combines_projections() {
    let frames = common::drifting_sequence(48, &drift()[..3], 2);
    let shift = estimate_pair(&frames[1], &frames[2], 2, &RegistrationConfig::nearest()).unwrap();
    assert_eq!(shift, Offset3D::new(1.0, 1.0, 0.0));
}

#[test]
fn test_pair_failure_names_frame_and_projection() {
    let mut frames = common::drifting_sequence(32, &drift()[..2], 3);
    frames[1].xz = ImageBuffer::from(Array2::<f32>::zeros((32, 32)));
    let err = register_pair(&frames, 1, &RegistrationConfig::nearest()).unwrap_err();
    assert!(err.is_per_pair());
    let message = err.to_string();
    assert!(message.contains("Frame 1"), "{}", message);
    assert!(message.contains("XZ"), "{}", message);
}

// ---------------------------------------------------------------------------
// Whole sequence
// ---------------------------------------------------------------------------

#[test]
fn test_nearest_sequence_recovers_drift_exactly() {
    let truth = drift();
    let frames = common::drifting_sequence(48, &truth, 4);
    let reporter = RecordingReporter::default();
    let outcomes = register_sequence(&frames, &RegistrationConfig::nearest(), &reporter).unwrap();

    assert_eq!(outcomes.len(), truth.len());
    assert_eq!(reporter.advanced.load(Ordering::Relaxed), truth.len());
    assert_eq!(
        outcomes[0].shift().copied(),
        Some(PairwiseShift::sentinel())
    );
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.frame, i);
    }

    let correction = correct_drift(&outcomes, frames.len(), &Default::default()).unwrap();
    assert!(correction.missing.is_empty());
    assert!(correction.failures.is_empty());
    assert_eq!(correction.raw.as_slice(), truth.as_slice());
    assert_eq!(correction.smoothed[0], truth[0]);
    assert_eq!(correction.smoothed[4], truth[4]);
}

#[test]
fn test_refined_sequence_tracks_drift() {
    let truth = drift();
    let frames = common::drifting_sequence(48, &truth, 5);
    let correction = run_pipeline(&frames, &DriftConfig::default(), &NoOpReporter).unwrap();
    for (got, want) in correction.raw.iter().zip(&truth) {
        for (g, w) in got.components().iter().zip(want.components()) {
            assert!((g - w).abs() < 0.5, "got {:?}, want {:?}", got, want);
        }
    }
}

#[test]
fn test_failed_pairs_are_isolated() {
    let truth = drift();
    let mut frames = common::drifting_sequence(48, &truth, 6);
    frames[2].xy = ImageBuffer::from(Array2::<f32>::zeros((48, 48)));

    let reporter = RecordingReporter::default();
    let outcomes = register_sequence(&frames, &RegistrationConfig::nearest(), &reporter).unwrap();
    let failed: Vec<usize> = outcomes
        .iter()
        .filter(|o| o.error().is_some())
        .map(|o| o.frame)
        .collect();
    assert_eq!(failed, vec![2, 3]);

    let correction = correct_drift(&outcomes, frames.len(), &Default::default()).unwrap();
    assert_eq!(correction.missing, vec![2, 3]);
    assert_eq!(correction.failures.len(), 2);
    // Frame 4 only adds its own shift on top of the frozen frames.
    assert_eq!(correction.raw[1], truth[1]);
    assert_eq!(correction.raw[3], truth[1]);
    assert_eq!(
        correction.raw[4],
        truth[1] + Offset3D::new(1.0, 0.0, 1.0)
    );
}

#[test]
fn test_blank_projection_fails_its_pairs() {
    let truth = drift();
    let mut frames = common::drifting_sequence(48, &truth, 8);
    frames[2].yz = ImageBuffer::from(Array2::<u16>::zeros((48, 48)));

    let outcomes = register_sequence(&frames, &RegistrationConfig::nearest(), &NoOpReporter).unwrap();
    let failed: Vec<usize> = outcomes
        .iter()
        .filter(|o| o.error().is_some())
        .map(|o| o.frame)
        .collect();
    assert_eq!(failed, vec![2, 3]);

    let correction = correct_drift(&outcomes, frames.len(), &Default::default()).unwrap();
    assert_eq!(correction.missing, vec![2, 3]);
}

#[test]
fn test_stored_records_follow_integration_rules() {
    let record = |frame: usize, dx: f64| PairOutcome {
        frame,
        result: Ok(PairwiseShift {
            frame,
            shift: Offset3D::new(dx, 0.0, 0.0),
        }),
    };
    let outcomes = vec![
        PairOutcome {
            frame: 0,
            result: Ok(PairwiseShift::sentinel()),
        },
        record(1, 1.0),
        record(1, 2.0),
        record(3, 1.0),
        record(9, 5.0),
    ];

    let correction = correct_drift(&outcomes, 4, &Default::default()).unwrap();
    assert_eq!(correction.missing, vec![2]);
    assert!(correction.failures.is_empty());
    let xs: Vec<f64> = correction.raw.iter().map(|o| o.dx).collect();
    assert_eq!(xs, vec![0.0, 2.0, 2.0, 3.0]);
}

#[test]
fn test_sequential_path_reports_stages() {
    let frames = common::drifting_sequence(32, &drift()[..3], 7);
    let reporter = RecordingReporter::default();
    let config = DriftConfig {
        registration: RegistrationConfig::nearest(),
        ..Default::default()
    };
    run_pipeline(&frames, &config, &reporter).unwrap();
    assert_eq!(
        *reporter.stages.lock().unwrap(),
        vec![
            PipelineStage::Registration,
            PipelineStage::Integration,
            PipelineStage::Smoothing
        ]
    );
}

#[test]
fn test_empty_sequence_is_an_error() {
    let result = register_sequence(&[], &RegistrationConfig::default(), &NoOpReporter);
    assert!(matches!(result, Err(DriftError::EmptySequence)));
    assert!(matches!(
        correct_drift(&[], 0, &Default::default()),
        Err(DriftError::EmptySequence)
    ));
}

#[test]
fn test_invalid_config_is_fatal() {
    let frames = common::drifting_sequence(32, &drift()[..2], 8);
    let config = RegistrationConfig {
        offset_bound: 0,
        ..RegistrationConfig::default()
    };
    assert!(matches!(
        register_sequence(&frames, &config, &NoOpReporter),
        Err(DriftError::InvalidConfig(_))
    ));
}
