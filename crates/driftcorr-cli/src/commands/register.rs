use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use driftcorr_core::frame::ProjectionSet;
use driftcorr_core::io::layout::shift_record_path;
use driftcorr_core::io::{load_projection_set, write_shift_record};
use driftcorr_core::pipeline::{register_sequence, PipelineStage, ProgressReporter};

use super::progress::BarReporter;
use super::RegistrationArgs;
use crate::summary::{print_registration_failures, print_registration_summary};

#[derive(Args)]
pub struct RegisterArgs {
    /// Directory holding `NNN-{XY,XZ,YZ}.png`; records are written here too
    #[arg(short, long, default_value = "reg")]
    pub dir: PathBuf,

    /// Index of the last frame
    #[arg(short = 'n', long)]
    pub last: usize,

    #[command(flatten)]
    pub registration: RegistrationArgs,
}

pub fn run(args: &RegisterArgs) -> Result<()> {
    let config = args.registration.resolve()?;
    let total = args.last + 1;
    print_registration_summary(&args.dir, total, &config.registration);

    let reporter = BarReporter::new()?;
    reporter.begin_stage(PipelineStage::Reading, Some(total));
    let mut frames: Vec<ProjectionSet> = Vec::with_capacity(total);
    for frame in 0..total {
        let set = load_projection_set(&args.dir, frame)
            .with_context(|| format!("Failed to load frame {}", frame))?;
        frames.push(set);
        reporter.advance(frame + 1);
    }
    reporter.finish_stage();

    let outcomes = register_sequence(&frames, &config.registration, &reporter)?;

    reporter.begin_stage(PipelineStage::Writing, Some(outcomes.len()));
    let mut failures = Vec::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        match &outcome.result {
            Ok(record) => {
                let path = shift_record_path(&args.dir, outcome.frame);
                write_shift_record(&path, record)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            Err(e) => failures.push((outcome.frame, e.to_string())),
        }
        reporter.advance(i + 1);
    }
    reporter.finish();

    print_registration_failures(&failures);
    println!(
        "Wrote {} shift record(s) to {}",
        outcomes.len() - failures.len(),
        args.dir.display()
    );
    Ok(())
}
