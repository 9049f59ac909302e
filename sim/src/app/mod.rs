mod analysis;
mod report;
mod runner;

pub use analysis::analyze_folder;
pub use runner::{data_store, run_sampling};

use self::report::report_analysis;
use crate::config::{Args, Config};
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing::info;

pub struct SimApplication {
    args: Args,
    config: Config,
}

impl SimApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        let config = load_config(&args)?.apply_overrides(&args);
        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_deref(), self.args.verbose);

        match &self.args.analyze {
            Some(dir) => {
                info!("Analysing saved configurations in {}", dir);
                let points = analyze_folder(Path::new(dir))?;
                report_analysis(&points);
            }
            None => {
                info!("Configuration loaded:\n{:?}", self.config);
                let store = data_store(&self.config);
                let written = run_sampling(&self.config, &store)?;
                info!("Sampling finished, {} trial file(s) written", written);
            }
        }

        Ok(())
    }
}

/// Read the YAML configuration; a missing default file falls back to defaults.
fn load_config(args: &Args) -> Result<Config> {
    let path = Path::new(&args.config_file);
    if !path.exists() && args.config_file == "config.yaml" {
        return Ok(Config::default().with_defaults());
    }

    let config_content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}
