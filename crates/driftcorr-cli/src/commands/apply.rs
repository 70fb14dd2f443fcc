use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use driftcorr_core::io::layout::{
    HEADER_DIR, OFFSETS_FILE, REGISTRATION_DIR, SMOOTHED_OFFSETS_FILE,
};
use driftcorr_core::io::{read_shift_records, write_offsets, NhdrOffsetWriter};
use driftcorr_core::pipeline::{correct_drift_reported, PairOutcome};

use super::load_config;
use super::progress::BarReporter;
use crate::summary::print_correction_summary;

#[derive(Args)]
pub struct ApplyArgs {
    /// Dataset root holding `reg/` and `nhdr/`
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Index of the last frame
    #[arg(short = 'n', long)]
    pub last: usize,

    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &ApplyArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let reg_dir = args.dir.join(REGISTRATION_DIR);
    let nhdr_dir = args.dir.join(HEADER_DIR);
    if !reg_dir.is_dir() {
        bail!("Missing '{}' subdirectory", reg_dir.display());
    }
    if !nhdr_dir.is_dir() {
        bail!("Missing '{}' subdirectory", nhdr_dir.display());
    }

    let frame_count = args.last + 1;
    let outcomes: Vec<PairOutcome> = read_shift_records(&reg_dir, args.last)
        .into_iter()
        .map(|record| PairOutcome {
            frame: record.frame,
            result: Ok(record),
        })
        .collect();

    let reporter = BarReporter::new()?;
    let correction =
        correct_drift_reported(&outcomes, frame_count, &config.smoothing, &reporter)?;
    reporter.finish();

    let raw_path = reg_dir.join(OFFSETS_FILE);
    write_offsets(&raw_path, &correction.raw)
        .with_context(|| format!("Failed to write {}", raw_path.display()))?;
    let smooth_path = reg_dir.join(SMOOTHED_OFFSETS_FILE);
    write_offsets(&smooth_path, &correction.smoothed)
        .with_context(|| format!("Failed to write {}", smooth_path.display()))?;

    let report = NhdrOffsetWriter::new(&nhdr_dir).write_all(&correction.smoothed);
    print_correction_summary(&correction, &report, &config.smoothing);
    Ok(())
}
