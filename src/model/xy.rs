use super::{OrderParameter, SpinModel, TermSet};
use crate::error::{Result, SimError};
use crate::field::SpinField;
use crate::lattice::Lattice;
use nalgebra::Vector2;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::{PI, TAU};

/// Angle increment proposed for a single rotor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation(pub f64);

/// Planar rotor (XY) model.
///
/// `E = -J Σ<ij> cos(θ_i - θ_j - A_ij)`. With frustration enabled, bonds along
/// axis 0 leaving a site with odd axis-1 coordinate carry `A = π`, giving the
/// fully frustrated XY model on the square lattice; otherwise every `A` is zero.
#[derive(Debug, Clone)]
pub struct XyRotor {
    angles: SpinField<f64>,
    coupling: f64,
    /// Bond phase `A`, indexed like Ising bond terms (`site * dims + axis`)
    phases: Vec<f64>,
    step: Normal<f64>,
}

impl XyRotor {
    /// Rotors with uniformly random angles in `[0, 2π)`.
    pub fn new<R: Rng + ?Sized>(
        lattice: Lattice,
        step_sigma: f64,
        frustrated: bool,
        rng: &mut R,
    ) -> Result<Self> {
        let angles = SpinField::from_fn(lattice, 1, |_| rng.gen_range(0.0..TAU));
        Self::from_angles(angles, step_sigma, frustrated)
    }

    pub fn from_angles(angles: SpinField<f64>, step_sigma: f64, frustrated: bool) -> Result<Self> {
        if !(step_sigma > 0.0 && step_sigma.is_finite()) {
            return Err(SimError::InvalidParameter(format!(
                "rotation step width {step_sigma} must be positive and finite"
            )));
        }
        if let Some(bad) = angles.values().iter().find(|theta| !theta.is_finite()) {
            return Err(SimError::InvalidParameter(format!("rotor angle {bad} is not finite")));
        }
        let lattice = angles.lattice();
        let dims = lattice.dimension();
        if frustrated && dims < 2 {
            return Err(SimError::InvalidLattice(
                "frustrated XY model needs at least two axes".to_string(),
            ));
        }
        let step = Normal::new(0.0, step_sigma)
            .map_err(|e| SimError::InvalidParameter(e.to_string()))?;

        let mut phases = vec![0.0; lattice.volume() * dims];
        if frustrated {
            for site in 0..lattice.volume() {
                if lattice.coords(site)[1] % 2 == 1 {
                    phases[site * dims] = PI;
                }
            }
        }

        Ok(Self {
            angles: SpinField::from_fn(lattice.clone(), 1, |u| wrap_angle(angles[u])),
            coupling: 1.0,
            phases,
            step,
        })
    }

    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn lattice(&self) -> &Lattice {
        self.angles.lattice()
    }

    pub fn angles(&self) -> &[f64] {
        self.angles.values()
    }

    pub fn is_frustrated(&self) -> bool {
        self.phases.iter().any(|&a| a != 0.0)
    }
}

impl SpinModel for XyRotor {
    type Spin = f64;
    type Update = Rotation;

    fn name(&self) -> &'static str {
        "xy"
    }

    fn field(&self) -> &SpinField<f64> {
        &self.angles
    }

    fn field_mut(&mut self) -> &mut SpinField<f64> {
        &mut self.angles
    }

    fn term_count(&self) -> usize {
        self.phases.len()
    }

    fn term_energy<F: Fn(usize) -> f64>(&self, term: usize, spin: F) -> f64 {
        let dims = self.lattice().dimension();
        let (site, axis) = (term / dims, term % dims);
        let next = self.lattice().shift(site, axis, true);
        -self.coupling * (spin(site) - spin(next) - self.phases[term]).cos()
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

    fn updated(&self, current: f64, update: Rotation) -> f64 {
        wrap_angle(current + update.0)
    }

    fn propose<R: Rng + ?Sized>(&self, rng: &mut R) -> Rotation {
        Rotation(self.step.sample(rng))
    }

    fn draw_spin<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(0.0..TAU)
    }

    fn order_parameter(&self) -> OrderParameter {
        let n = self.angles.len() as f64;
        let sum = self
            .angles
            .values()
            .iter()
            .fold(Vector2::<f64>::zeros(), |acc, &t| acc + Vector2::new(t.cos(), t.sin()));
        OrderParameter::Planar(sum / n)
    }
}

/// Reduce an angle to `[0, 2π)`.
fn wrap_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
