//! Command-line argument parsing for lattice sampling runs

use clap::Parser;
use spinlab::Algorithm;

/// Monte Carlo sampling of lattice spin models with YAML configuration
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Sample a single temperature instead of the configured list
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Override lattice extent N
    #[arg(short = 'n', long)]
    pub size: Option<usize>,

    /// Override number of lattice axes
    #[arg(short, long)]
    pub dimension: Option<usize>,

    /// Override sweep count K
    #[arg(short = 'k', long)]
    pub sweeps: Option<usize>,

    /// Override number of independent trials per temperature
    #[arg(long)]
    pub trials: Option<usize>,

    /// Override base random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override sampler (metropolis or wolff)
    #[arg(short, long)]
    pub algorithm: Option<Algorithm>,

    /// Override model (ising, glass, gauge, square_ice, xy, ffxy)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Override directory receiving sampled data
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Override output file: (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Run trials on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Log per-sweep progress
    #[arg(short, long)]
    pub verbose: bool,

    /// Analyse a previously written data folder instead of sampling
    #[arg(long, value_name = "DIR")]
    pub analyze: Option<String>,
}
