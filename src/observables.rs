use crate::model::{OrderParameter, SpinModel};
use nalgebra::Vector2;

/// Time series of scalar observables, one entry per sweep or cluster flip.
///
/// Entries are only ever appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservableSeries {
    /// Mean spin (discrete models) or `|<(cos θ, sin θ)>|` (rotor models)
    magnetization: Vec<f64>,
    /// Mean `(cos θ, sin θ)`, rotor models only
    planar: Vec<Vector2<f64>>,
    /// Squared order parameter
    susceptibility: Vec<f64>,
    /// Energy per unit, when tracked
    energy: Vec<f64>,
    track_energy: bool,
}

impl ObservableSeries {
    pub fn new(track_energy: bool) -> Self {
        Self {
            track_energy,
            ..Default::default()
        }
    }

    /// Append the current observables of `model`.
    pub fn record<M: SpinModel>(&mut self, model: &M) {
        let order = model.order_parameter();
        match order {
            OrderParameter::Scalar(m) => self.magnetization.push(m),
            OrderParameter::Planar(m) => {
                self.magnetization.push(m.norm());
                self.planar.push(m);
            }
        }
        self.susceptibility.push(order.squared());
        if self.track_energy {
            self.energy.push(model.energy_per_unit());
        }
    }

    pub fn len(&self) -> usize {
        self.magnetization.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnetization.is_empty()
    }

    pub fn tracks_energy(&self) -> bool {
        self.track_energy
    }

    pub fn magnetization(&self) -> &[f64] {
        &self.magnetization
    }

    pub fn planar(&self) -> &[Vector2<f64>] {
        &self.planar
    }

    pub fn susceptibility(&self) -> &[f64] {
        &self.susceptibility
    }

    pub fn energy(&self) -> &[f64] {
        &self.energy
    }

    /// Summary over the entries from `skip` onwards.
    pub fn summary(&self, skip: usize, temperature: f64, units: usize) -> Summary {
        let magnetization: Vec<f64> = self
            .magnetization
            .iter()
            .skip(skip)
            .map(|m| m.abs())
            .collect();
        let energy: Vec<f64> = self.energy.iter().skip(skip).copied().collect();

        Summary {
            samples: magnetization.len(),
            mean_abs_magnetization: mean(&magnetization),
            abs_magnetization_error: std_error(&magnetization),
            mean_energy: (!energy.is_empty()).then(|| mean(&energy)),
            energy_error: (!energy.is_empty()).then(|| std_error(&energy)),
            specific_heat: (!energy.is_empty()).then(|| specific_heat(&energy, temperature, units)),
            susceptibility: magnetic_susceptibility(&magnetization, temperature, units),
        }
    }
}

/// Equilibrium estimates from the tail of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub samples: usize,
    pub mean_abs_magnetization: f64,
    pub abs_magnetization_error: f64,
    pub mean_energy: Option<f64>,
    pub energy_error: Option<f64>,
    pub specific_heat: Option<f64>,
    pub susceptibility: f64,
}

pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

fn variance(samples: &[f64]) -> f64 {
    let m = mean(samples);
    let m2 = samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64;
    (m2 - m * m).max(0.0)
}

/// Standard error of the mean, ignoring autocorrelation.
pub fn std_error(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let n = samples.len() as f64;
    (variance(samples) * n / (n - 1.0)).sqrt() / n.sqrt()
}

/// Specific heat per unit from per-unit energy samples: `N Var(e) / T²`.
pub fn specific_heat(energy_samples: &[f64], temperature: f64, units: usize) -> f64 {
    if energy_samples.len() < 2 {
        return 0.0;
    }
    variance(energy_samples) * units as f64 / (temperature * temperature)
}

/// Susceptibility per unit from per-unit magnetization samples: `N Var(m) / T`.
pub fn magnetic_susceptibility(magnetization_samples: &[f64], temperature: f64, units: usize) -> f64 {
    if magnetization_samples.len() < 2 {
        return 0.0;
    }
    variance(magnetization_samples) * units as f64 / temperature
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::Lattice;
    use crate::model::{Ising, XyRotor};
    use approx::assert_relative_eq;

    #[test]
    fn test_record_appends() {
        let model = Ising::ordered(Lattice::hypercubic(2, 4).unwrap());
        let mut series = ObservableSeries::new(true);
        series.record(&model);
        series.record(&model);
        assert_eq!(series.len(), 2);
        assert_eq!(series.magnetization(), &[1.0, 1.0]);
        assert_eq!(series.energy(), &[-2.0, -2.0]);
        assert!(series.planar().is_empty());
    }

    #[test]
    fn test_energy_optional() {
        let model = Ising::ordered(Lattice::hypercubic(2, 4).unwrap());
        let mut series = ObservableSeries::new(false);
        series.record(&model);
        assert!(series.energy().is_empty());
        assert!(series.summary(0, 1.0, 16).specific_heat.is_none());
    }

    #[test]
    fn test_planar_order_parameter() {
        let lattice = Lattice::hypercubic(2, 3).unwrap();
        let angles = crate::field::SpinField::filled(lattice, 1, std::f64::consts::FRAC_PI_2);
        let model = XyRotor::from_angles(angles, 0.5, false).unwrap();
        let mut series = ObservableSeries::new(false);
        series.record(&model);
        assert_relative_eq!(series.magnetization()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(series.planar()[0].y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(series.susceptibility()[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fluctuation_formulas() {
        let samples = [1.0, 3.0];
        assert_relative_eq!(specific_heat(&samples, 2.0, 4), 1.0);
        assert_relative_eq!(magnetic_susceptibility(&samples, 2.0, 4), 2.0);
        assert_relative_eq!(std_error(&samples), 1.0);
        assert_eq!(specific_heat(&[1.0], 2.0, 4), 0.0);
    }
}
