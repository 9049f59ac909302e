/// Utility functions for analysing sampled configurations

/// Critical temperature for 2D Ising model (exact result)
/// T_c = 2J / (k_B * ln(1 + √2)) ≈ 2.269 J/k_B
pub fn critical_temperature_2d() -> f64 {
    2.0 / (1.0 + 2.0_f64.sqrt()).ln()
}

/// Critical temperature for 3D Ising model (numerical result)
/// T_c ≈ 4.511 J/k_B (from series expansions and Monte Carlo simulations)
pub fn critical_temperature_3d() -> f64 {
    4.511
}

/// Known critical temperature of the Ising model on a `dimension`-dimensional
/// hypercubic lattice, if there is one.
pub fn ising_critical_temperature(dimension: usize) -> Option<f64> {
    match dimension {
        2 => Some(critical_temperature_2d()),
        3 => Some(critical_temperature_3d()),
        _ => None,
    }
}

/// Onsager spontaneous magnetization of the 2D Ising model (J = 1).
///
/// M(T) = (1 - sinh(2/T)^-4)^(1/8) below T_c, zero at and above it.
pub fn onsager_magnetization(temperature: f64) -> f64 {
    if temperature <= 0.0 {
        return 1.0;
    }
    if temperature >= critical_temperature_2d() {
        return 0.0;
    }
    let s = (2.0 / temperature).sinh();
    (1.0 - s.powi(-4)).max(0.0).powf(0.125)
}

/// Magnetization per unit implied by a majority count: `2 count / units - 1`.
///
/// The majority is the more populated sign, so the result lies in `[0, 1]`
/// for a valid partition.
pub fn magnetization_from_majority(count: usize, units: usize) -> f64 {
    if units == 0 {
        return 0.0;
    }
    2.0 * count as f64 / units as f64 - 1.0
}
