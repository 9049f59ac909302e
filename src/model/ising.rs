use super::{draw_sign, mean_spin, Flip, OrderParameter, SpinModel, TermSet};
use crate::field::SpinField;
use crate::lattice::Lattice;
use rand::Rng;

/// Ising model with spins on lattice sites.
///
/// Each spin takes the value +1 or -1 and interacts with its nearest
/// neighbours through `E = -J Σ<ij> s_i s_j`. Bond terms are labelled by the
/// site they leave and their axis, so every bond is counted exactly once.
#[derive(Debug, Clone)]
pub struct Ising {
    /// Spin configuration: +1 or -1 for each site
    spins: SpinField<i8>,
    /// Coupling constant J (typically set to 1)
    coupling: f64,
}

impl Ising {
    /// Create an Ising model with a random initial configuration
    pub fn new<R: Rng + ?Sized>(lattice: Lattice, rng: &mut R) -> Self {
        let spins = SpinField::from_fn(lattice, 1, |_| draw_sign(rng));
        Self {
            spins,
            coupling: 1.0,
        }
    }

    /// Create an Ising model with all spins up (ordered state)
    pub fn ordered(lattice: Lattice) -> Self {
        Self {
            spins: SpinField::filled(lattice, 1, 1),
            coupling: 1.0,
        }
    }

    /// Set the coupling constant
    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn coupling(&self) -> f64 {
        self.coupling
    }

    pub fn lattice(&self) -> &Lattice {
        self.spins.lattice()
    }

    pub fn spins(&self) -> &[i8] {
        self.spins.values()
    }

    #[inline]
    pub fn spin(&self, site: usize) -> i8 {
        self.spins[site]
    }

    pub fn flip(&mut self, site: usize) {
        self.spins[site] *= -1;
    }

    /// Sum of all spins
    pub fn magnetization(&self) -> f64 {
        self.spins.values().iter().map(|&s| s as f64).sum()
    }

    pub fn magnetization_per_site(&self) -> f64 {
        mean_spin(self.spins.values())
    }
}

impl SpinModel for Ising {
    type Spin = i8;
    type Update = Flip;

    fn name(&self) -> &'static str {
        "ising"
    }

    fn field(&self) -> &SpinField<i8> {
        &self.spins
    }

    fn field_mut(&mut self) -> &mut SpinField<i8> {
        &mut self.spins
    }

    fn term_count(&self) -> usize {
        self.lattice().volume() * self.lattice().dimension()
    }

    fn term_energy<F: Fn(usize) -> i8>(&self, term: usize, spin: F) -> f64 {
        let dims = self.lattice().dimension();
        let (site, axis) = (term / dims, term % dims);
        let next = self.lattice().shift(site, axis, true);
        -self.coupling * (spin(site) * spin(next)) as f64
    }

    fn incident_terms(&self, unit: usize) -> TermSet {
        let lattice = self.lattice();
        let dims = lattice.dimension();
        let mut terms = TermSet::default();
        for axis in 0..dims {
            terms.insert(unit * dims + axis);
            terms.insert(lattice.shift(unit, axis, false) * dims + axis);
        }
        terms
    }

    fn updated(&self, current: i8, _update: Flip) -> i8 {
        -current
    }

    fn propose<R: Rng + ?Sized>(&self, _rng: &mut R) -> Flip {
        Flip
    }

    fn draw_spin<R: Rng + ?Sized>(&self, rng: &mut R) -> i8 {
        draw_sign(rng)
    }

    fn order_parameter(&self) -> OrderParameter {
        OrderParameter::Scalar(self.magnetization_per_site())
    }
}
