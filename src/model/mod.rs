//! Lattice spin models behind one sampling interface.
//!
//! Each model describes its Hamiltonian as a list of interaction terms (bonds,
//! plaquettes or vertices). Total energy sums every term once; the local
//! energy change of a single-unit update only re-evaluates the terms incident
//! to that unit.

pub mod gauge;
pub mod glass;
pub mod ice;
pub mod ising;
pub mod xy;

pub use gauge::GaugeZ2;
pub use glass::Glass;
pub use ice::SquareIce;
pub use ising::Ising;
pub use xy::{Rotation, XyRotor};

use crate::field::SpinField;
use crate::lattice::MAX_DIMENSION;
use crate::partition::MajorityPartition;
use nalgebra::Vector2;
use rand::Rng;
use std::fmt::Debug;

/// Largest number of distinct terms a single unit can touch.
pub const MAX_INCIDENT_TERMS: usize = 2 * MAX_DIMENSION;

/// Sign flip of a discrete spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flip;

/// Small de-duplicated set of term ids.
///
/// On lattices with extent 1 or 2 along an axis the same term can be reached
/// through two different neighbour relations; it must only be counted once.
#[derive(Debug, Clone, Copy)]
pub struct TermSet {
    ids: [usize; MAX_INCIDENT_TERMS],
    len: usize,
}

impl Default for TermSet {
    fn default() -> Self {
        Self {
            ids: [0; MAX_INCIDENT_TERMS],
            len: 0,
        }
    }
}

impl TermSet {
    pub fn insert(&mut self, id: usize) {
        if !self.contains(id) {
            assert!(self.len < MAX_INCIDENT_TERMS, "too many incident terms");
            self.ids[self.len] = id;
            self.len += 1;
        }
    }

    pub fn contains(&self, id: usize) -> bool {
        self.ids[..self.len].contains(&id)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.ids[..self.len].iter().copied()
    }
}

/// Order parameter of a configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderParameter {
    /// Mean spin of a discrete model
    Scalar(f64),
    /// Mean `(cos θ, sin θ)` of a rotor model
    Planar(Vector2<f64>),
}

impl OrderParameter {
    /// Magnitude used as the magnetization proxy.
    pub fn magnitude(&self) -> f64 {
        match self {
            OrderParameter::Scalar(m) => m.abs(),
            OrderParameter::Planar(m) => m.norm(),
        }
    }

    pub fn squared(&self) -> f64 {
        match self {
            OrderParameter::Scalar(m) => m * m,
            OrderParameter::Planar(m) => m.norm_squared(),
        }
    }
}

/// Raw configuration values handed to downstream analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotValues {
    Discrete(Vec<i8>),
    Angles(Vec<f64>),
}

/// Copy of a finished configuration together with its layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub shape: Vec<usize>,
    pub arity: usize,
    pub values: SnapshotValues,
}

/// Value stored on one addressable unit.
pub trait SpinValue: Copy + PartialEq + Debug + Send + Sync {
    fn snapshot_values(values: &[Self]) -> SnapshotValues;

    /// Majority/minority partition, when the spin alphabet has one.
    fn majority(field: &SpinField<Self>) -> Option<MajorityPartition>;
}

impl SpinValue for i8 {
    fn snapshot_values(values: &[Self]) -> SnapshotValues {
        SnapshotValues::Discrete(values.to_vec())
    }

    fn majority(field: &SpinField<Self>) -> Option<MajorityPartition> {
        Some(MajorityPartition::of(field))
    }
}

impl SpinValue for f64 {
    fn snapshot_values(values: &[Self]) -> SnapshotValues {
        SnapshotValues::Angles(values.to_vec())
    }

    fn majority(_field: &SpinField<Self>) -> Option<MajorityPartition> {
        None
    }
}

/// Capability interface every lattice model implements.
pub trait SpinModel: Clone + Send {
    type Spin: SpinValue;
    type Update: Copy + Debug;

    fn name(&self) -> &'static str;

    fn field(&self) -> &SpinField<Self::Spin>;

    fn field_mut(&mut self) -> &mut SpinField<Self::Spin>;

    /// Number of interaction terms in the Hamiltonian.
    fn term_count(&self) -> usize;

    /// Energy of one term, reading unit values through `spin`.
    fn term_energy<F: Fn(usize) -> Self::Spin>(&self, term: usize, spin: F) -> f64;

    /// Distinct terms that contain `unit`.
    fn incident_terms(&self, unit: usize) -> TermSet;

    /// Value of a unit after `update` is applied to `current`.
    fn updated(&self, current: Self::Spin, update: Self::Update) -> Self::Spin;

    /// Draw a proposed single-unit update.
    fn propose<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Update;

    /// Draw one value from the spin alphabet.
    fn draw_spin<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Spin;

    fn order_parameter(&self) -> OrderParameter;

    fn unit_count(&self) -> usize {
        self.field().len()
    }

    fn total_energy(&self) -> f64 {
        let field = self.field();
        (0..self.term_count())
            .map(|term| self.term_energy(term, |u| field[u]))
            .sum()
    }

    /// Total energy normalised by the number of addressable units.
    fn energy_per_unit(&self) -> f64 {
        self.total_energy() / self.unit_count() as f64
    }

    /// Energy change from applying `update` at `unit`, from incident terms only.
    fn local_delta(&self, unit: usize, update: Self::Update) -> f64 {
        let field = self.field();
        let proposed = self.updated(field[unit], update);
        self.incident_terms(unit)
            .iter()
            .map(|term| {
                let after = self.term_energy(term, |u| if u == unit { proposed } else { field[u] });
                let before = self.term_energy(term, |u| field[u]);
                after - before
            })
            .sum()
    }

    fn apply(&mut self, unit: usize, update: Self::Update) {
        let value = self.updated(self.field()[unit], update);
        self.field_mut()[unit] = value;
    }

    /// Redraw every unit independently from the spin alphabet.
    fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for unit in 0..self.unit_count() {
            let value = self.draw_spin(rng);
            self.field_mut()[unit] = value;
        }
    }

    fn snapshot(&self) -> Snapshot {
        let field = self.field();
        Snapshot {
            shape: field.lattice().shape().to_vec(),
            arity: field.arity(),
            values: Self::Spin::snapshot_values(field.values()),
        }
    }

    fn majority(&self) -> Option<MajorityPartition> {
        Self::Spin::majority(self.field())
    }
}

/// Uniform draw from `{-1, +1}`.
pub(crate) fn draw_sign<R: Rng + ?Sized>(rng: &mut R) -> i8 {
    if rng.gen_bool(0.5) {
        1
    } else {
        -1
    }
}

/// Mean of a discrete field.
pub(crate) fn mean_spin(values: &[i8]) -> f64 {
    values.iter().map(|&s| s as f64).sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests;
