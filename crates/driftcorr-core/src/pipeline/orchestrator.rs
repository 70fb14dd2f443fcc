use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::align::register_pair;
use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::drift::{integrate_records, smooth};
use crate::error::{DriftError, Result};
use crate::frame::ProjectionSet;

use super::config::{DriftConfig, RegistrationConfig, SmoothingConfig};
use super::types::{DriftCorrection, NoOpReporter, PairOutcome, PipelineStage, ProgressReporter};

/// Register every frame against its predecessor.
///
/// Outcomes are returned in frame order, one per frame; frame 0 carries the
/// sentinel. A failed pair is recorded in its outcome and does not stop the
/// others. Only an invalid configuration or an empty sequence is fatal.
pub fn register_sequence(
    frames: &[ProjectionSet],
    config: &RegistrationConfig,
    reporter: &dyn ProgressReporter,
) -> Result<Vec<PairOutcome>> {
    if frames.is_empty() {
        return Err(DriftError::EmptySequence);
    }
    config.validate()?;

    let total = frames.len();
    info!(frames = total, %config, "Registering sequence");
    reporter.begin_stage(PipelineStage::Registration, Some(total));
    let counter = AtomicUsize::new(0);

    let run = |frame: usize| {
        let result = register_pair(frames, frame, config);
        if let Err(e) = &result {
            warn!(frame, error = %e, "Pair registration failed");
        }
        let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
        reporter.advance(done);
        PairOutcome { frame, result }
    };

    let outcomes: Vec<PairOutcome> = if total >= PARALLEL_FRAME_THRESHOLD {
        (0..total).into_par_iter().map(run).collect()
    } else {
        (0..total).map(run).collect()
    };

    reporter.finish_stage();
    Ok(outcomes)
}

/// Integrate and smooth the outcomes of [`register_sequence`] (or shift
/// records read back from disk) for a sequence of `frame_count` frames.
///
/// Failed and absent pairs contribute a zero shift and are listed in
/// [`DriftCorrection::missing`].
pub fn correct_drift(
    outcomes: &[PairOutcome],
    frame_count: usize,
    smoothing: &SmoothingConfig,
) -> Result<DriftCorrection> {
    correct_drift_reported(outcomes, frame_count, smoothing, &NoOpReporter)
}

pub fn correct_drift_reported(
    outcomes: &[PairOutcome],
    frame_count: usize,
    smoothing: &SmoothingConfig,
    reporter: &dyn ProgressReporter,
) -> Result<DriftCorrection> {
    if frame_count == 0 {
        return Err(DriftError::EmptySequence);
    }
    smoothing.validate()?;

    reporter.begin_stage(PipelineStage::Integration, Some(frame_count));
    let mut records = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match &outcome.result {
            Ok(shift) => records.push(*shift),
            Err(e) => failures.push((outcome.frame, e.to_string())),
        }
    }
    let chain = integrate_records(frame_count, &records);
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Smoothing, None);
    let smoothed = smooth(&chain.offsets, smoothing)?;
    reporter.finish_stage();

    info!(
        frames = frame_count,
        missing = chain.missing.len(),
        failed = failures.len(),
        "Drift correction computed"
    );
    let mut correction = DriftCorrection::new(chain, smoothed);
    correction.failures = failures;
    Ok(correction)
}

/// Register, integrate and smooth an in-memory sequence in one call.
pub fn run_pipeline(
    frames: &[ProjectionSet],
    config: &DriftConfig,
    reporter: &dyn ProgressReporter,
) -> Result<DriftCorrection> {
    config.validate()?;
    let outcomes = register_sequence(frames, &config.registration, reporter)?;
    correct_drift_reported(&outcomes, frames.len(), &config.smoothing, reporter)
}
