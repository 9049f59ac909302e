//! Batch driver: builds a model from run parameters and samples independent
//! trials from it.

use crate::error::{check_temperature, Result, SimError};
use crate::lattice::{Lattice, MAX_DIMENSION};
use crate::metropolis::{Metropolis, SweepStats};
use crate::model::{GaugeZ2, Glass, Ising, Snapshot, SpinModel, SquareIce, XyRotor};
use crate::observables::{ObservableSeries, Summary};
use crate::partition::MajorityPartition;
use crate::wolff::{ClusterStats, Wolff};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Model family and its model-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelKind {
    Ising,
    Gauge,
    SquareIce,
    Glass {
        /// Probability of a +1 bond
        bond_probability: f64,
    },
    Xy {
        /// Width of the Gaussian angle proposal
        step_sigma: f64,
        frustrated: bool,
    },
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Ising => "ising",
            ModelKind::Gauge => "gauge",
            ModelKind::SquareIce => "square_ice",
            ModelKind::Glass { .. } => "glass",
            ModelKind::Xy { frustrated: false, .. } => "xy",
            ModelKind::Xy { frustrated: true, .. } => "ffxy",
        }
    }

    /// Whether spins live on edges rather than sites.
    pub fn on_edges(&self) -> bool {
        matches!(self, ModelKind::Gauge | ModelKind::SquareIce)
    }

    fn min_dimension(&self) -> usize {
        match self {
            ModelKind::Xy { frustrated: true, .. } => 2,
            m if m.on_edges() => 2,
            _ => 1,
        }
    }

    /// Spins per site on a `dimension`-axis lattice.
    fn arity(&self, dimension: usize) -> usize {
        if self.on_edges() {
            dimension
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[serde(alias = "met")]
    Metropolis,
    Wolff,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Metropolis => "metropolis",
            Algorithm::Wolff => "wolff",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "metropolis" | "met" => Ok(Algorithm::Metropolis),
            "wolff" => Ok(Algorithm::Wolff),
            other => Err(SimError::InvalidParameter(format!(
                "unknown algorithm '{other}'"
            ))),
        }
    }
}

/// Everything needed to sample one `(model, T)` point.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub model: ModelKind,
    pub algorithm: Algorithm,
    pub dimension: usize,
    /// Extent N of every axis
    pub size: usize,
    pub temperature: f64,
    /// K: sweeps for Metropolis, multiples of N^d flipped spins for Wolff
    pub sweeps: usize,
    pub coupling: f64,
    pub track_energy: bool,
    /// Base seed; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            model: ModelKind::Ising,
            algorithm: Algorithm::Metropolis,
            dimension: 2,
            size: 16,
            temperature: 2.0,
            sweeps: 1000,
            coupling: 1.0,
            track_energy: true,
            seed: None,
        }
    }
}

impl RunParameters {
    /// Reject every configuration error before any sampling starts.
    pub fn validate(&self) -> Result<()> {
        check_temperature(self.temperature)?;
        if self.size == 0 {
            return Err(SimError::InvalidLattice("lattice size must be at least 1".to_string()));
        }
        if self.dimension == 0 || self.dimension > MAX_DIMENSION {
            return Err(SimError::InvalidLattice(format!(
                "dimension must be between 1 and {MAX_DIMENSION}, got {}",
                self.dimension
            )));
        }
        if self.dimension < self.model.min_dimension() {
            return Err(SimError::InvalidLattice(format!(
                "{} model needs at least {} axes",
                self.model.name(),
                self.model.min_dimension()
            )));
        }
        if self.sweeps == 0 {
            return Err(SimError::InvalidParameter("sweep count must be at least 1".to_string()));
        }
        if self.flip_budget().is_none() {
            return Err(SimError::InvalidParameter(format!(
                "{} sweeps of a {}^{} lattice overflow the update counter",
                self.sweeps, self.size, self.dimension
            )));
        }
        if !self.coupling.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "coupling {} is not finite",
                self.coupling
            )));
        }
        match self.model {
            ModelKind::Glass { bond_probability } if !(0.0..=1.0).contains(&bond_probability) => {
                return Err(SimError::InvalidParameter(format!(
                    "bond probability {bond_probability} outside [0, 1]"
                )));
            }
            ModelKind::Xy { step_sigma, .. } if !(step_sigma > 0.0 && step_sigma.is_finite()) => {
                return Err(SimError::InvalidParameter(format!(
                    "rotation step width {step_sigma} must be positive and finite"
                )));
            }
            _ => {}
        }
        if self.algorithm == Algorithm::Wolff && self.model != ModelKind::Ising {
            return Err(SimError::UnsupportedAlgorithm {
                algorithm: self.algorithm.name(),
                model: self.model.name(),
            });
        }
        if self.algorithm == Algorithm::Wolff && self.coupling <= 0.0 {
            return Err(SimError::InvalidParameter(
                "Wolff clusters need a ferromagnetic coupling".to_string(),
            ));
        }
        Ok(())
    }

    pub fn lattice(&self) -> Result<Lattice> {
        Lattice::hypercubic(self.dimension, self.size)
    }

    /// K times the number of addressable units, `None` on overflow.
    pub fn flip_budget(&self) -> Option<u64> {
        (self.size as u64)
            .checked_pow(u32::try_from(self.dimension).ok()?)?
            .checked_mul(self.model.arity(self.dimension) as u64)?
            .checked_mul(self.sweeps as u64)
    }
}

/// A model of any supported family.
#[derive(Debug, Clone)]
pub enum AnyModel {
    Ising(Ising),
    Glass(Glass),
    Gauge(GaugeZ2),
    SquareIce(SquareIce),
    Xy(XyRotor),
}

impl AnyModel {
    pub fn build<R: Rng + ?Sized>(params: &RunParameters, rng: &mut R) -> Result<Self> {
        let lattice = params.lattice()?;
        let model = match params.model {
            ModelKind::Ising => AnyModel::Ising(Ising::new(lattice, rng).with_coupling(params.coupling)),
            ModelKind::Gauge => AnyModel::Gauge(GaugeZ2::new(lattice, rng)?),
            ModelKind::SquareIce => AnyModel::SquareIce(SquareIce::new(lattice, rng)?),
            ModelKind::Glass { bond_probability } => {
                AnyModel::Glass(Glass::new(lattice, bond_probability, rng)?)
            }
            ModelKind::Xy {
                step_sigma,
                frustrated,
            } => AnyModel::Xy(
                XyRotor::new(lattice, step_sigma, frustrated, rng)?.with_coupling(params.coupling),
            ),
        };
        Ok(model)
    }

    pub fn unit_count(&self) -> usize {
        match self {
            AnyModel::Ising(m) => m.unit_count(),
            AnyModel::Glass(m) => m.unit_count(),
            AnyModel::Gauge(m) => m.unit_count(),
            AnyModel::SquareIce(m) => m.unit_count(),
            AnyModel::Xy(m) => m.unit_count(),
        }
    }
}

/// Sampler totals of one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplerStats {
    Metropolis(SweepStats),
    Wolff(ClusterStats),
}

/// Result of one independent trial.
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub trial: usize,
    pub temperature: f64,
    pub units: usize,
    pub series: ObservableSeries,
    pub snapshot: Snapshot,
    /// Absent for continuous spins
    pub majority: Option<MajorityPartition>,
    pub stats: SamplerStats,
}

impl TrialOutcome {
    /// Summary over the second half of the series.
    pub fn summary(&self) -> Summary {
        self.series
            .summary(self.series.len() / 2, self.temperature, self.units)
    }
}

/// Sampler paired with the template model it drives.
#[derive(Debug, Clone)]
enum Plan {
    Local(AnyModel, Metropolis),
    Cluster(Ising, Wolff),
}

/// Sampling driver for one `(model, T)` point.
///
/// The template model is built once, so quenched disorder is shared by every
/// trial; each trial starts from an independently randomised copy with its
/// own generator. The configured seed is mixed with the temperature, so runs
/// at different temperatures never share a stream.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: RunParameters,
    plan: Plan,
    base_seed: u64,
    point_seed: u64,
}

impl Simulation {
    pub fn new(params: RunParameters) -> Result<Self> {
        params.validate()?;
        let base_seed = params.seed.unwrap_or_else(rand::random);
        let point_seed = splitmix(base_seed ^ params.temperature.to_bits());
        let mut rng = StdRng::seed_from_u64(point_seed);
        let template = AnyModel::build(&params, &mut rng)?;
        let plan = match (params.algorithm, template) {
            (Algorithm::Wolff, AnyModel::Ising(ising)) => {
                let wolff = Wolff::new(params.temperature)?.with_coupling(ising.coupling());
                Plan::Cluster(ising, wolff)
            }
            (Algorithm::Wolff, _) => {
                return Err(SimError::UnsupportedAlgorithm {
                    algorithm: params.algorithm.name(),
                    model: params.model.name(),
                })
            }
            (Algorithm::Metropolis, model) => {
                Plan::Local(model, Metropolis::new(params.temperature)?)
            }
        };

        let simulation = Self {
            params,
            plan,
            base_seed,
            point_seed,
        };
        info!(
            "Prepared {} model on {}^{} lattice at T = {} ({} units, seed {})",
            simulation.params.model.name(),
            simulation.params.size,
            simulation.params.dimension,
            simulation.params.temperature,
            simulation.unit_count(),
            base_seed
        );
        Ok(simulation)
    }

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Number of addressable units of the sampled model.
    pub fn unit_count(&self) -> usize {
        match &self.plan {
            Plan::Local(model, _) => model.unit_count(),
            Plan::Cluster(model, _) => model.unit_count(),
        }
    }

    /// Seed of the generator owned by trial `trial`.
    pub fn trial_seed(&self, trial: usize) -> u64 {
        splitmix(self.point_seed ^ (trial as u64 + 1).wrapping_mul(0x9E3779B97F4A7C15))
    }

    /// Run one trial from a fresh random configuration.
    pub fn run_trial(&self, trial: usize) -> TrialOutcome {
        let mut rng = StdRng::seed_from_u64(self.trial_seed(trial));
        let outcome = match &self.plan {
            Plan::Cluster(model, wolff) => {
                let mut model = model.clone();
                model.randomize(&mut rng);
                let mut series = ObservableSeries::new(self.params.track_energy);
                let budget = self.params.sweeps as u64 * model.unit_count() as u64;
                let stats = wolff.run(&mut model, budget, &mut rng, &mut series);
                self.outcome(trial, &model, series, SamplerStats::Wolff(stats))
            }
            Plan::Local(AnyModel::Ising(m), sampler) => self.local(m, sampler, trial, &mut rng),
            Plan::Local(AnyModel::Glass(m), sampler) => self.local(m, sampler, trial, &mut rng),
            Plan::Local(AnyModel::Gauge(m), sampler) => self.local(m, sampler, trial, &mut rng),
            Plan::Local(AnyModel::SquareIce(m), sampler) => self.local(m, sampler, trial, &mut rng),
            Plan::Local(AnyModel::Xy(m), sampler) => self.local(m, sampler, trial, &mut rng),
        };
        debug!("Trial {} finished with {} samples", trial, outcome.series.len());
        outcome
    }

    /// Run `trials` independent trials, in parallel when asked.
    pub fn run_trials(&self, trials: usize, parallel: bool) -> Vec<TrialOutcome> {
        info!(
            "Running {} trial(s) of {} with {}",
            trials,
            self.params.model.name(),
            self.params.algorithm
        );
        if parallel {
            (0..trials)
                .into_par_iter()
                .map(|trial| self.run_trial(trial))
                .collect()
        } else {
            (0..trials).map(|trial| self.run_trial(trial)).collect()
        }
    }

    fn local<M: SpinModel>(
        &self,
        template: &M,
        sampler: &Metropolis,
        trial: usize,
        rng: &mut StdRng,
    ) -> TrialOutcome {
        let mut model = template.clone();
        model.randomize(rng);
        let mut series = ObservableSeries::new(self.params.track_energy);
        let stats = sampler.run(&mut model, self.params.sweeps, rng, &mut series);
        self.outcome(trial, &model, series, SamplerStats::Metropolis(stats))
    }

    fn outcome<M: SpinModel>(
        &self,
        trial: usize,
        model: &M,
        series: ObservableSeries,
        stats: SamplerStats,
    ) -> TrialOutcome {
        TrialOutcome {
            trial,
            temperature: self.params.temperature,
            units: model.unit_count(),
            series,
            snapshot: model.snapshot(),
            majority: model.majority(),
            stats,
        }
    }
}

fn splitmix(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotValues;

    fn params(model: ModelKind, algorithm: Algorithm) -> RunParameters {
        RunParameters {
            model,
            algorithm,
            dimension: 2,
            size: 6,
            temperature: 1.5,
            sweeps: 20,
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_configuration_errors() {
        let base = params(ModelKind::Ising, Algorithm::Metropolis);
        assert!(base.validate().is_ok());

        let bad = [
            RunParameters { temperature: 0.0, ..base.clone() },
            RunParameters { temperature: f64::NAN, ..base.clone() },
            RunParameters { size: 0, ..base.clone() },
            RunParameters { dimension: 5, ..base.clone() },
            RunParameters { sweeps: 0, ..base.clone() },
            RunParameters {
                model: ModelKind::Glass { bond_probability: -0.1 },
                ..base.clone()
            },
            RunParameters {
                model: ModelKind::Xy { step_sigma: 0.0, frustrated: false },
                ..base.clone()
            },
            RunParameters {
                model: ModelKind::Gauge,
                dimension: 1,
                ..base.clone()
            },
            RunParameters {
                model: ModelKind::SquareIce,
                dimension: 1,
                ..base.clone()
            },
            RunParameters {
                sweeps: usize::MAX,
                ..base.clone()
            },
        ];
        for p in bad {
            assert!(p.validate().is_err(), "{p:?} should be rejected");
        }
    }

    #[test]
    fn test_edge_models_need_two_axes() {
        for model in [ModelKind::Gauge, ModelKind::SquareIce] {
            let p = RunParameters {
                dimension: 1,
                ..params(model, Algorithm::Metropolis)
            };
            assert!(matches!(p.validate(), Err(SimError::InvalidLattice(_))));
            assert!(Simulation::new(p).is_err());
        }
        let p = RunParameters {
            dimension: 1,
            ..params(ModelKind::Ising, Algorithm::Metropolis)
        };
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_flip_budget_counts_addressable_units() {
        let ising = params(ModelKind::Ising, Algorithm::Wolff);
        assert_eq!(ising.flip_budget(), Some(20 * 36));
        let ice = params(ModelKind::SquareIce, Algorithm::Metropolis);
        assert_eq!(ice.flip_budget(), Some(20 * 72));
        let huge = RunParameters {
            size: 1 << 20,
            dimension: 4,
            ..ising
        };
        assert_eq!(huge.flip_budget(), None);
        assert!(huge.validate().is_err());
    }

    #[test]
    fn test_wolff_only_for_ising() {
        let p = params(ModelKind::Gauge, Algorithm::Wolff);
        assert!(matches!(
            p.validate(),
            Err(SimError::UnsupportedAlgorithm { algorithm: "wolff", model: "gauge" })
        ));
        assert!(Simulation::new(p).is_err());
        assert!(Simulation::new(params(ModelKind::Ising, Algorithm::Wolff)).is_ok());
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("Wolff".parse::<Algorithm>().unwrap(), Algorithm::Wolff);
        assert_eq!("met".parse::<Algorithm>().unwrap(), Algorithm::Metropolis);
        assert!("heatbath".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_trials_are_reproducible_and_independent() {
        let sim = Simulation::new(params(ModelKind::Ising, Algorithm::Metropolis)).unwrap();
        let a = sim.run_trial(0);
        let b = sim.run_trial(0);
        let c = sim.run_trial(1);
        assert_eq!(a.snapshot, b.snapshot);
        assert_eq!(a.series, b.series);
        assert_ne!(sim.trial_seed(0), sim.trial_seed(1));
        assert_eq!(c.series.len(), 20);
    }

    #[test]
    fn test_temperatures_get_distinct_streams() {
        let at = |temperature| {
            Simulation::new(RunParameters {
                temperature,
                seed: Some(42),
                ..params(ModelKind::Ising, Algorithm::Metropolis)
            })
            .unwrap()
        };
        let (cold, hot) = (at(1.0), at(3.0));
        assert_eq!(cold.base_seed(), hot.base_seed());
        assert_ne!(cold.trial_seed(0), hot.trial_seed(0));
        assert_eq!(cold.trial_seed(0), at(1.0).trial_seed(0));

        let glass = |temperature| {
            let sim = Simulation::new(RunParameters {
                temperature,
                seed: Some(42),
                ..params(ModelKind::Glass { bond_probability: 0.5 }, Algorithm::Metropolis)
            })
            .unwrap();
            match sim.plan {
                Plan::Local(AnyModel::Glass(glass), _) => glass.bonds().clone(),
                _ => panic!("expected a glass template"),
            }
        };
        assert_ne!(glass(1.0), glass(3.0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sim = Simulation::new(params(ModelKind::SquareIce, Algorithm::Metropolis)).unwrap();
        let sequential = sim.run_trials(3, false);
        let parallel = sim.run_trials(3, true);
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.trial, p.trial);
            assert_eq!(s.snapshot, p.snapshot);
        }
    }

    #[test]
    fn test_glass_disorder_shared_across_trials() {
        let p = params(ModelKind::Glass { bond_probability: 0.3 }, Algorithm::Metropolis);
        let sim = Simulation::new(p).unwrap();
        let bonds = match &sim.plan {
            Plan::Local(AnyModel::Glass(glass), _) => glass.bonds().clone(),
            _ => panic!("expected a glass template"),
        };
        let outcome = sim.run_trial(2);
        let spins = match &outcome.snapshot.values {
            SnapshotValues::Discrete(values) => values.clone(),
            _ => panic!("glass spins are discrete"),
        };
        assert_eq!(spins.len(), 36);
        assert_eq!(bonds.len(), 72);
        match &sim.plan {
            Plan::Local(AnyModel::Glass(glass), _) => assert_eq!(glass.bonds(), &bonds),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_wolff_budget_and_outcome() {
        let sim = Simulation::new(params(ModelKind::Ising, Algorithm::Wolff)).unwrap();
        let outcome = sim.run_trial(0);
        match outcome.stats {
            SamplerStats::Wolff(stats) => assert!(stats.flipped >= 20 * 36),
            other => panic!("unexpected stats {other:?}"),
        }
        let majority = outcome.majority.as_ref().unwrap();
        assert!(majority.count() * 2 >= 36);
        let summary = outcome.summary();
        assert!(summary.mean_abs_magnetization <= 1.0);
    }

    #[test]
    fn test_xy_has_no_majority() {
        let p = params(
            ModelKind::Xy { step_sigma: std::f64::consts::FRAC_PI_4, frustrated: true },
            Algorithm::Metropolis,
        );
        let outcome = Simulation::new(p).unwrap().run_trial(0);
        assert!(outcome.majority.is_none());
        assert!(matches!(outcome.snapshot.values, SnapshotValues::Angles(_)));
        assert_eq!(outcome.series.planar().len(), 20);
    }
}
