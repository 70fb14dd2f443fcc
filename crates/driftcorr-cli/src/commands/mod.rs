pub mod apply;
pub mod config;
pub mod corr;
pub mod find;
pub mod progress;
pub mod register;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use driftcorr_core::kernel::KernelPair;
use driftcorr_core::pipeline::DriftConfig;

/// Registration options shared by `find` and `register`. Flags override the
/// config file, which overrides the defaults.
#[derive(Args)]
pub struct RegistrationArgs {
    /// Config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Maximum offset searched, in pixels
    #[arg(short, long)]
    pub bound: Option<usize>,

    /// Reconstruction kernel and its derivative, e.g. `ctmr ctmrd`
    #[arg(short, long, num_args = 2, value_names = ["KERNEL", "DERIVATIVE"])]
    pub kernel: Option<Vec<String>>,

    /// Relative gain at which refinement stops
    #[arg(short, long)]
    pub epsilon: Option<f64>,

    /// Refinement iteration limit
    #[arg(long)]
    pub max_iters: Option<usize>,
}

impl RegistrationArgs {
    pub fn resolve(&self) -> Result<DriftConfig> {
        let mut config = load_config(self.config.as_deref())?;
        let reg = &mut config.registration;
        if let Some(bound) = self.bound {
            reg.offset_bound = bound;
        }
        if let Some(names) = &self.kernel {
            let pair = parse_kernels(names)?;
            reg.kernel = pair.kernel;
            reg.derivative = pair.derivative;
        }
        if let Some(epsilon) = self.epsilon {
            reg.epsilon = epsilon;
        }
        if let Some(max_iters) = self.max_iters {
            reg.max_iters = max_iters;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Read a TOML config, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<DriftConfig> {
    let Some(path) = path else {
        return Ok(DriftConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: DriftConfig = toml::from_str(&contents).context("Invalid drift config")?;
    config.validate()?;
    Ok(config)
}

pub fn parse_kernels(names: &[String]) -> Result<KernelPair> {
    match names {
        [kernel, derivative] => Ok(KernelPair::from_names(kernel, derivative)?),
        _ => anyhow::bail!("expected a kernel and its derivative, got {:?}", names),
    }
}
