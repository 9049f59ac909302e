use super::{draw_sign, mean_spin, Flip, OrderParameter, SpinModel, TermSet};
use crate::error::{Result, SimError};
use crate::field::SpinField;
use crate::lattice::Lattice;
use rand::Rng;

/// Square ice: edge spins with a soft ice rule at every vertex.
///
/// A vertex sums the `2d` edges meeting at it, `(x, a)` and `(x - e_a, a)` for
/// every axis, and contributes the square of that sum. Ice-rule vertices cost
/// nothing.
#[derive(Debug, Clone)]
pub struct SquareIce {
    edges: SpinField<i8>,
}

impl SquareIce {
    pub fn new<R: Rng + ?Sized>(lattice: Lattice, rng: &mut R) -> Result<Self> {
        let dims = lattice.dimension();
        Self::from_edges(SpinField::from_fn(lattice, dims, |_| draw_sign(rng)))
    }

    pub fn from_edges(edges: SpinField<i8>) -> Result<Self> {
        let dims = edges.lattice().dimension();
        if edges.arity() != dims {
            return Err(SimError::InvalidParameter(format!(
                "ice field needs {dims} components per site, got {}",
                edges.arity()
            )));
        }
        Ok(Self { edges })
    }

    pub fn lattice(&self) -> &Lattice {
        self.edges.lattice()
    }

    /// Sum of the edges meeting at `site`.
    pub fn vertex_sum(&self, site: usize) -> i32 {
        self.vertex_sum_with(site, |u| self.edges[u])
    }

    fn vertex_sum_with<F: Fn(usize) -> i8>(&self, site: usize, spin: F) -> i32 {
        let lattice = self.lattice();
        (0..lattice.dimension())
            .map(|a| {
                let behind = lattice.shift(site, a, false);
                spin(self.edges.unit(site, a)) as i32 + spin(self.edges.unit(behind, a)) as i32
            })
            .sum()
    }
}

impl SpinModel for SquareIce {
    type Spin = i8;
    type Update = Flip;

    fn name(&self) -> &'static str {
        "square_ice"
    }

    fn field(&self) -> &SpinField<i8> {
        &self.edges
    }

    fn field_mut(&mut self) -> &mut SpinField<i8> {
        &mut self.edges
    }

    fn term_count(&self) -> usize {
        self.lattice().volume()
    }

    fn term_energy<F: Fn(usize) -> i8>(&self, term: usize, spin: F) -> f64 {
        let sum = self.vertex_sum_with(term, spin);
        (sum * sum) as f64
    }

    fn incident_terms(&self, unit: usize) -> TermSet {
        let (site, a) = self.edges.split(unit);
        let mut terms = TermSet::default();
        terms.insert(site);
        terms.insert(self.lattice().shift(site, a, true));
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
        OrderParameter::Scalar(mean_spin(self.edges.values()))
    }
}
