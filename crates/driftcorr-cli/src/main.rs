mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "driftcorr", about = "Drift correction for volumetric time series")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register two images and print the shift of B relative to A
    Corr(commands::corr::CorrArgs),
    /// Compute the 3D shift of one frame relative to the previous one
    Find(commands::find::FindArgs),
    /// Compute the shifts of every frame of a sequence
    Register(commands::register::RegisterArgs),
    /// Integrate and smooth shifts and rewrite the volume headers
    Apply(commands::apply::ApplyArgs),
    /// Print or save the default configuration as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Corr(args) => commands::corr::run(args),
        Commands::Find(args) => commands::find::run(args),
        Commands::Register(args) => commands::register::run(args),
        Commands::Apply(args) => commands::apply::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
