use crate::drift::ChainIntegration;
use crate::error::DriftError;
use crate::frame::{PairwiseShift, ShiftSequence};

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    Registration,
    Integration,
    Smoothing,
    Writing,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading projections"),
            Self::Registration => write!(f, "Registering frame pairs"),
            Self::Integration => write!(f, "Integrating offsets"),
            Self::Smoothing => write!(f, "Smoothing offsets"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Result of registering one adjacent frame pair. A failure only affects
/// its own frame.
#[derive(Debug)]
pub struct PairOutcome {
    pub frame: usize,
    pub result: Result<PairwiseShift, DriftError>,
}

impl PairOutcome {
    pub fn shift(&self) -> Option<&PairwiseShift> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&DriftError> {
        self.result.as_ref().err()
    }
}

/// Absolute drift of a whole sequence, before and after smoothing.
#[derive(Clone, Debug)]
pub struct DriftCorrection {
    pub raw: ShiftSequence,
    pub smoothed: ShiftSequence,
    /// Frames integrated with a zero shift, in ascending order.
    pub missing: Vec<usize>,
    /// Frames whose registration failed, with the reason.
    pub failures: Vec<(usize, String)>,
}

impl DriftCorrection {
    pub(super) fn new(chain: ChainIntegration, smoothed: ShiftSequence) -> Self {
        Self {
            raw: chain.offsets,
            smoothed,
            missing: chain.missing,
            failures: Vec::new(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.raw.len()
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Reporter that ignores every event.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
