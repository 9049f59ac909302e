use crate::acceptance::metropolis_accept;
use crate::error::{check_temperature, Result};
use crate::model::SpinModel;
use crate::observables::ObservableSeries;
use rand::Rng;
use tracing::debug;

/// Proposal and acceptance counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub proposals: u64,
    pub accepted: u64,
}

impl SweepStats {
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposals == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposals as f64
        }
    }

    fn absorb(&mut self, other: SweepStats) {
        self.proposals += other.proposals;
        self.accepted += other.accepted;
    }
}

/// Single-unit Metropolis sampler.
///
/// One sweep draws as many proposals as the model has addressable units, each
/// at an independently drawn unit, so a sweep touches every unit once on
/// average.
#[derive(Debug, Clone, Copy)]
pub struct Metropolis {
    temperature: f64,
}

impl Metropolis {
    pub fn new(temperature: f64) -> Result<Self> {
        Ok(Self {
            temperature: check_temperature(temperature)?,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Propose one update at a random unit and apply it if accepted.
    pub fn propose<M: SpinModel, R: Rng + ?Sized>(&self, model: &mut M, rng: &mut R) -> bool {
        let unit = model.field().random_unit(rng);
        let update = model.propose(rng);
        let delta = model.local_delta(unit, update);
        if metropolis_accept(delta, self.temperature, rng) {
            model.apply(unit, update);
            true
        } else {
            false
        }
    }

    /// One sweep (wash) of the lattice.
    pub fn sweep<M: SpinModel, R: Rng + ?Sized>(&self, model: &mut M, rng: &mut R) -> SweepStats {
        let proposals = model.unit_count() as u64;
        let accepted = (0..proposals).filter(|_| self.propose(model, rng)).count() as u64;
        SweepStats {
            proposals,
            accepted,
        }
    }

    /// Run `sweeps` sweeps, recording observables after each one.
    pub fn run<M: SpinModel, R: Rng + ?Sized>(
        &self,
        model: &mut M,
        sweeps: usize,
        rng: &mut R,
        series: &mut ObservableSeries,
    ) -> SweepStats {
        let mut stats = SweepStats::default();
        let report_every = (sweeps / 10).max(1);
        for k in 0..sweeps {
            if k % report_every == 0 {
                debug!("{:4.1} %", 100.0 * k as f64 / sweeps as f64);
            }
            stats.absorb(self.sweep(model, rng));
            series.record(model);
        }
        stats
    }
}
