use super::{draw_sign, mean_spin, Flip, OrderParameter, SpinModel, TermSet};
use crate::error::{Result, SimError};
use crate::field::SpinField;
use crate::lattice::Lattice;
use rand::Rng;

/// Ising spin glass with quenched ±1 bonds.
///
/// `E = -Σ<ij> J_ij s_i s_j`, where `J` on the bond leaving site `i` along
/// axis `a` is stored at the same unit index as an edge field. Bonds are drawn
/// once at construction; [`SpinModel::randomize`] only redraws the spins.
#[derive(Debug, Clone)]
pub struct Glass {
    spins: SpinField<i8>,
    bonds: SpinField<i8>,
    /// Probability of a bond being +1
    bond_probability: f64,
}

impl Glass {
    pub fn new<R: Rng + ?Sized>(
        lattice: Lattice,
        bond_probability: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&bond_probability) {
            return Err(SimError::InvalidParameter(format!(
                "bond probability {bond_probability} outside [0, 1]"
            )));
        }
        let dims = lattice.dimension();
        let bonds = SpinField::from_fn(lattice.clone(), dims, |_| {
            if rng.gen_bool(bond_probability) {
                1
            } else {
                -1
            }
        });
        let spins = SpinField::from_fn(lattice, 1, |_| draw_sign(rng));
        Ok(Self {
            spins,
            bonds,
            bond_probability,
        })
    }

    /// Glass with explicit bonds, mostly useful for tests.
    pub fn with_bonds(spins: SpinField<i8>, bonds: SpinField<i8>) -> Result<Self> {
        if spins.lattice() != bonds.lattice() || bonds.arity() != bonds.lattice().dimension() {
            return Err(SimError::InvalidParameter(
                "bond field must have one component per axis on the spin lattice".to_string(),
            ));
        }
        let positive = bonds.values().iter().filter(|&&j| j > 0).count();
        let bond_probability = positive as f64 / bonds.len() as f64;
        Ok(Self {
            spins,
            bonds,
            bond_probability,
        })
    }

    pub fn bonds(&self) -> &SpinField<i8> {
        &self.bonds
    }

    pub fn bond_probability(&self) -> f64 {
        self.bond_probability
    }

    pub fn lattice(&self) -> &Lattice {
        self.spins.lattice()
    }
}

impl SpinModel for Glass {
    type Spin = i8;
    type Update = Flip;

    fn name(&self) -> &'static str {
        "glass"
    }

    fn field(&self) -> &SpinField<i8> {
        &self.spins
    }

    fn field_mut(&mut self) -> &mut SpinField<i8> {
        &mut self.spins
    }

    fn term_count(&self) -> usize {
        self.bonds.len()
    }

    fn term_energy<F: Fn(usize) -> i8>(&self, term: usize, spin: F) -> f64 {
        let (site, axis) = self.bonds.split(term);
        let next = self.lattice().shift(site, axis, true);
        -(self.bonds[term] * spin(site) * spin(next)) as f64
    }

    fn incident_terms(&self, unit: usize) -> TermSet {
        let lattice = self.lattice();
        let mut terms = TermSet::default();
        for axis in 0..lattice.dimension() {
            terms.insert(self.bonds.unit(unit, axis));
            terms.insert(self.bonds.unit(lattice.shift(unit, axis, false), axis));
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
        OrderParameter::Scalar(mean_spin(self.spins.values()))
    }
}
