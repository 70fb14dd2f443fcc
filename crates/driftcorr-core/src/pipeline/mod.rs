pub mod config;
mod orchestrator;
mod types;

pub use config::{DriftConfig, RegistrationConfig, SmoothingConfig};
pub use orchestrator::{correct_drift, correct_drift_reported, register_sequence, run_pipeline};
pub use types::{DriftCorrection, NoOpReporter, PairOutcome, PipelineStage, ProgressReporter};
