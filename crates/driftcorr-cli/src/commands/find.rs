use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use driftcorr_core::align::estimate_pair;
use driftcorr_core::frame::PairwiseShift;
use driftcorr_core::io::layout::shift_record_path;
use driftcorr_core::io::{load_projection_set, write_shift_record};

use super::RegistrationArgs;

#[derive(Args)]
pub struct FindArgs {
    /// Directory holding `NNN-{XY,XZ,YZ}.png`; the record is written here too
    #[arg(short, long, default_value = "reg")]
    pub dir: PathBuf,

    /// Frame to register against its predecessor
    #[arg(short, long)]
    pub frame: usize,

    #[command(flatten)]
    pub registration: RegistrationArgs,
}

pub fn run(args: &FindArgs) -> Result<()> {
    let config = args.registration.resolve()?;

    let record = if args.frame == 0 {
        PairwiseShift::sentinel()
    } else {
        let prev = load_projection_set(&args.dir, args.frame - 1)
            .with_context(|| format!("Failed to load frame {}", args.frame - 1))?;
        let next = load_projection_set(&args.dir, args.frame)
            .with_context(|| format!("Failed to load frame {}", args.frame))?;
        let shift = estimate_pair(&prev, &next, args.frame, &config.registration)?;
        PairwiseShift {
            frame: args.frame,
            shift,
        }
    };

    let path = shift_record_path(&args.dir, args.frame);
    write_shift_record(&path, &record)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    let [x, y, z, _] = record.to_record();
    println!("{} {} {}", x, y, z);
    Ok(())
}
