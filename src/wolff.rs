use crate::error::{check_temperature, Result};
use crate::model::Ising;
use crate::observables::ObservableSeries;
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Totals of a Wolff run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterStats {
    pub clusters: u64,
    pub flipped: u64,
}

impl ClusterStats {
    pub fn mean_cluster_size(&self) -> f64 {
        if self.clusters == 0 {
            0.0
        } else {
            self.flipped as f64 / self.clusters as f64
        }
    }
}

/// Wolff single-cluster sampler for the Ising model.
///
/// A cluster is grown from a random seed by activating bonds to aligned
/// neighbours with probability `1 - exp(-2J/T)`, then flipped as one move.
/// The flip satisfies detailed balance without a further accept/reject step.
#[derive(Debug, Clone, Copy)]
pub struct Wolff {
    temperature: f64,
    coupling: f64,
}

impl Wolff {
    pub fn new(temperature: f64) -> Result<Self> {
        Ok(Self {
            temperature: check_temperature(temperature)?,
            coupling: 1.0,
        })
    }

    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Bond activation probability `1 - exp(-2J/T)`.
    pub fn add_probability(&self) -> f64 {
        1.0 - (-2.0 * self.coupling / self.temperature).exp()
    }

    /// Neighbours of `site` whose spin equals the spin at `site`.
    pub fn aligned_neighbors<'a>(
        &self,
        model: &'a Ising,
        site: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        let spin = model.spin(site);
        model
            .lattice()
            .neighbors(site)
            .filter(move |&n| model.spin(n) == spin)
    }

    /// Grow a cluster from `seed` without modifying the configuration.
    ///
    /// The candidate queue may hold the same site several times; a candidate
    /// that is already a member is dropped when popped. Returned sites are
    /// distinct, seed first.
    pub fn grow_cluster_from<R: Rng + ?Sized>(
        &self,
        model: &Ising,
        seed: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut cluster = vec![seed];
        let mut members = HashSet::from([seed]);
        let mut candidates: VecDeque<usize> = self.aligned_neighbors(model, seed).collect();

        while let Some(site) = candidates.pop_front() {
            if members.contains(&site) {
                continue;
            }
            if rng.gen::<f64>() < self.add_probability() {
                members.insert(site);
                cluster.push(site);
                candidates.extend(self.aligned_neighbors(model, site));
            }
        }

        cluster
    }

    /// Grow a cluster from a uniformly random seed.
    pub fn grow_cluster<R: Rng + ?Sized>(&self, model: &Ising, rng: &mut R) -> Vec<usize> {
        let seed = model.lattice().random_site(rng);
        self.grow_cluster_from(model, seed, rng)
    }

    /// Grow and flip one cluster, returning its size.
    pub fn step<R: Rng + ?Sized>(&self, model: &mut Ising, rng: &mut R) -> usize {
        let cluster = self.grow_cluster(model, rng);
        for &site in &cluster {
            model.flip(site);
        }
        cluster.len()
    }

    /// Flip clusters until at least `flip_budget` spins have been flipped in
    /// total, recording observables after each cluster. The last cluster may
    /// overshoot the budget.
    pub fn run<R: Rng + ?Sized>(
        &self,
        model: &mut Ising,
        flip_budget: u64,
        rng: &mut R,
        series: &mut ObservableSeries,
    ) -> ClusterStats {
        let mut stats = ClusterStats::default();
        let report_every = (flip_budget / 10).max(1);
        let mut next_report = 0;
        while stats.flipped < flip_budget {
            if stats.flipped >= next_report {
                debug!("{:4.1} %", 100.0 * stats.flipped as f64 / flip_budget as f64);
                next_report += report_every;
            }
            stats.flipped += self.step(model, rng) as u64;
            stats.clusters += 1;
            series.record(model);
        }
        stats
    }
}
