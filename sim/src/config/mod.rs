//! Configuration management for sampling runs
//!
//! This module handles the YAML configuration sections, their defaults, and
//! the command-line overrides, and converts the result into the engine's
//! run parameters.

mod args;

pub use args::Args;

use color_eyre::eyre::{bail, Result};
use serde::{Deserialize, Serialize};
use spinlab::{Algorithm, ModelKind, RunParameters};
use std::f64::consts::FRAC_PI_4;

/// Main configuration structure for sampling runs
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub model: ModelParams,
    #[serde(default)]
    pub sampler: SamplerParams,
    #[serde(default)]
    pub run: RunParams,
    #[serde(default)]
    pub output: OutputParams,
}

/// Model family and lattice
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ModelParams {
    pub kind: Option<String>,
    pub dimension: Option<usize>,
    pub size: Option<usize>,
    pub coupling: Option<f64>,
    /// Glass only: probability of a +1 bond
    pub bond_probability: Option<f64>,
    /// XY only: width of the Gaussian angle proposal
    pub step_sigma: Option<f64>,
}

impl ModelParams {
    fn defaults() -> Self {
        ModelParams {
            kind: Some("ising".to_string()),
            dimension: Some(2),
            size: Some(16),
            coupling: Some(1.0),
            bond_probability: Some(0.5),
            step_sigma: Some(FRAC_PI_4),
        }
    }

    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::defaults();
        if self.kind.is_none() {
            self.kind = defaults.kind;
        }
        if self.dimension.is_none() {
            self.dimension = defaults.dimension;
        }
        if self.size.is_none() {
            self.size = defaults.size;
        }
        if self.coupling.is_none() {
            self.coupling = defaults.coupling;
        }
        if self.bond_probability.is_none() {
            self.bond_probability = defaults.bond_probability;
        }
        if self.step_sigma.is_none() {
            self.step_sigma = defaults.step_sigma;
        }
        self
    }
}

/// Evenly spaced temperatures `start, start + step, ...` below `stop`
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl TemperatureRange {
    pub fn values(&self) -> Result<Vec<f64>> {
        if !(self.step > 0.0) {
            bail!("Temperature step must be positive, got {}", self.step);
        }
        let count = ((self.stop - self.start) / self.step).ceil().max(0.0) as usize;
        Ok((0..count)
            .map(|k| self.start + k as f64 * self.step)
            // strip accumulated float noise so folder names stay short
            .map(|t| (t * 1e10).round() / 1e10)
            .collect())
    }
}

/// Sampler selection and budget
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct SamplerParams {
    pub algorithm: Option<Algorithm>,
    /// K: sweeps (Metropolis) or multiples of N^d flipped spins (Wolff)
    pub sweeps: Option<usize>,
    pub temperatures: Option<Vec<f64>>,
    pub temperature_range: Option<TemperatureRange>,
    pub track_energy: Option<bool>,
}

impl SamplerParams {
    fn defaults() -> Self {
        SamplerParams {
            algorithm: Some(Algorithm::Metropolis),
            sweeps: Some(1000),
            temperatures: None,
            temperature_range: Some(TemperatureRange {
                start: 0.05,
                stop: 6.0,
                step: 0.1,
            }),
            track_energy: Some(true),
        }
    }

    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::defaults();
        if self.algorithm.is_none() {
            self.algorithm = defaults.algorithm;
        }
        if self.sweeps.is_none() {
            self.sweeps = defaults.sweeps;
        }
        if self.temperatures.is_none() && self.temperature_range.is_none() {
            self.temperature_range = defaults.temperature_range;
        }
        if self.track_energy.is_none() {
            self.track_energy = defaults.track_energy;
        }
        self
    }
}

/// Repetitions and seeding
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct RunParams {
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub parallel: Option<bool>,
}

impl RunParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.trials.is_none() {
            self.trials = Some(1);
        }
        if self.parallel.is_none() {
            self.parallel = Some(false);
        }
        self
    }
}

/// Persistence of sampled data
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct OutputParams {
    pub data_dir: Option<String>,
    pub save_series: Option<bool>,
    pub save_configuration: Option<bool>,
}

impl OutputParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        if self.data_dir.is_none() {
            self.data_dir = Some("data".to_string());
        }
        if self.save_series.is_none() {
            self.save_series = Some(true);
        }
        if self.save_configuration.is_none() {
            self.save_configuration = Some(false);
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.model = self.model.with_defaults();
        self.sampler = self.sampler.with_defaults();
        self.run = self.run.with_defaults();
        self.output = self.output.with_defaults();
        self
    }

    /// Replace configured values with those given on the command line
    pub fn apply_overrides(mut self, args: &Args) -> Self {
        if let Some(t) = args.temperature {
            self.sampler.temperatures = Some(vec![t]);
            self.sampler.temperature_range = None;
        }
        if args.size.is_some() {
            self.model.size = args.size;
        }
        if args.dimension.is_some() {
            self.model.dimension = args.dimension;
        }
        if args.sweeps.is_some() {
            self.sampler.sweeps = args.sweeps;
        }
        if args.trials.is_some() {
            self.run.trials = args.trials;
        }
        if args.seed.is_some() {
            self.run.seed = args.seed;
        }
        if args.algorithm.is_some() {
            self.sampler.algorithm = args.algorithm;
        }
        if args.model.is_some() {
            self.model.kind = args.model.clone();
        }
        if args.data_dir.is_some() {
            self.output.data_dir = args.data_dir.clone();
        }
        if args.parallel {
            self.run.parallel = Some(true);
        }
        self.with_defaults()
    }

    /// Temperatures to sample: the explicit list followed by the range
    pub fn temperatures(&self) -> Result<Vec<f64>> {
        let mut temperatures = self.sampler.temperatures.clone().unwrap_or_default();
        if let Some(range) = &self.sampler.temperature_range {
            temperatures.extend(range.values()?);
        }
        if temperatures.is_empty() {
            bail!("No temperatures configured");
        }
        Ok(temperatures)
    }

    pub fn model_kind(&self) -> Result<ModelKind> {
        let kind = self.model.kind.as_deref().unwrap_or("ising");
        let bond_probability = self.model.bond_probability.unwrap_or(0.5);
        let step_sigma = self.model.step_sigma.unwrap_or(FRAC_PI_4);
        let model = match kind.to_ascii_lowercase().as_str() {
            "ising" => ModelKind::Ising,
            "gauge" | "z2_gauge" => ModelKind::Gauge,
            "square_ice" | "ice" => ModelKind::SquareIce,
            "glass" => ModelKind::Glass { bond_probability },
            "xy" => ModelKind::Xy {
                step_sigma,
                frustrated: false,
            },
            "ffxy" => ModelKind::Xy {
                step_sigma,
                frustrated: true,
            },
            other => bail!("Unknown model: {}", other),
        };
        Ok(model)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.sampler.algorithm.unwrap_or(Algorithm::Metropolis)
    }

    pub fn trials(&self) -> usize {
        self.run.trials.unwrap_or(1)
    }

    pub fn parallel(&self) -> bool {
        self.run.parallel.unwrap_or(false)
    }

    /// Engine parameters for one temperature, validated
    pub fn run_parameters(&self, temperature: f64) -> Result<RunParameters> {
        let params = RunParameters {
            model: self.model_kind()?,
            algorithm: self.algorithm(),
            dimension: self.model.dimension.unwrap_or(2),
            size: self.model.size.unwrap_or(16),
            temperature,
            sweeps: self.sampler.sweeps.unwrap_or(1000),
            coupling: self.model.coupling.unwrap_or(1.0),
            track_energy: self.sampler.track_energy.unwrap_or(true),
            seed: self.run.seed,
        };
        params.validate()?;
        Ok(params)
    }
}
