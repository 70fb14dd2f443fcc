use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use driftcorr_core::align::{refine_peak, search};
use driftcorr_core::io::{load_image, save_correlation_map};
use driftcorr_core::pipeline::RegistrationConfig;
use tracing::warn;

use super::parse_kernels;

#[derive(Args)]
pub struct CorrArgs {
    /// Reference image A
    #[arg(short = 'a', long = "image-a")]
    pub a: PathBuf,

    /// Moving image B
    #[arg(short = 'b', long = "image-b")]
    pub b: PathBuf,

    /// Maximum offset searched, in pixels
    #[arg(long, default_value = "10")]
    pub bound: usize,

    /// Reconstruction kernel and its derivative; `box box` skips refinement
    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["KERNEL", "DERIVATIVE"],
        default_values = ["box", "box"]
    )]
    pub kernel: Vec<String>,

    /// Relative gain at which refinement stops
    #[arg(short, long, default_value = "1e-4")]
    pub epsilon: f64,

    /// Refinement iteration limit
    #[arg(long, default_value = "100")]
    pub max_iters: usize,

    /// Save the correlation map as a 16-bit TIFF
    #[arg(long)]
    pub map: Option<PathBuf>,
}

/// Print `dx dy`: the shift such that `B(x, y) ≈ A(x + dx, y + dy)`.
pub fn run(args: &CorrArgs) -> Result<()> {
    let kernels = parse_kernels(&args.kernel)?;
    let config = RegistrationConfig {
        offset_bound: args.bound,
        kernel: kernels.kernel,
        derivative: kernels.derivative,
        epsilon: args.epsilon,
        max_iters: args.max_iters,
    };
    let params = config.refine_params()?;

    let a = load_image(&args.a).with_context(|| format!("Failed to load {}", args.a.display()))?;
    let b = load_image(&args.b).with_context(|| format!("Failed to load {}", args.b.display()))?;

    let found = search(&a, &b, config.offset_bound)?;
    if let Some(ref path) = args.map {
        save_correlation_map(&found.map, path)
            .with_context(|| format!("Failed to save map to {}", path.display()))?;
    }
    if found.on_boundary() {
        warn!(
            ox = found.best.ox,
            oy = found.best.oy,
            "Maximum on the search boundary; the bound may be too small"
        );
    }

    let refined = refine_peak(&found.map, &found.best, &params)?;
    println!("{} {}", refined.offset.dx, refined.offset.dy);
    Ok(())
}
