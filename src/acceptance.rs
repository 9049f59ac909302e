//! Boltzmann acceptance rule.
//!
//! The test is carried out in the log domain, `ln U < -ΔE / T` with
//! `U ~ Uniform(0, 1)`, which never evaluates `exp` of a large argument.

use rand::Rng;
use rand_distr::Open01;

/// Metropolis test for an energy change `delta` at `temperature`.
///
/// Downhill and neutral moves are always accepted. A NaN `delta` is always
/// rejected.
#[inline]
pub fn metropolis_accept<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    debug_assert!(!delta.is_nan(), "energy change is NaN");
    if delta <= 0.0 {
        return true;
    }
    let u: f64 = rng.sample(Open01);
    u.ln() < -delta / temperature
}

/// `min(1, exp(-ΔE / T))`, zero for a NaN argument.
pub fn acceptance_probability(delta: f64, temperature: f64) -> f64 {
    let exponent = -delta / temperature;
    if exponent.is_nan() {
        0.0
    } else {
        exponent.min(0.0).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_downhill_always_accepted() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(metropolis_accept(-4.0, 0.01, &mut rng));
            assert!(metropolis_accept(0.0, 0.01, &mut rng));
        }
    }

    #[test]
    fn test_infinite_temperature_accepts_everything() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..10_000 {
            assert!(metropolis_accept(12.0, f64::INFINITY, &mut rng));
        }
        assert_eq!(acceptance_probability(12.0, f64::INFINITY), 1.0);
    }

    #[test]
    fn test_zero_temperature_limit_rejects_uphill() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10_000 {
            assert!(!metropolis_accept(1e-3, 1e-300, &mut rng));
            assert!(!metropolis_accept(4.0, f64::MIN_POSITIVE, &mut rng));
        }
        assert_eq!(acceptance_probability(4.0, 1e-300), 0.0);
    }

    #[test]
    fn test_huge_energy_change_does_not_overflow() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(!metropolis_accept(1e308, 1e-10, &mut rng));
        assert_eq!(acceptance_probability(-1e308, 1e-10), 1.0);
    }

    #[test]
    fn test_acceptance_rate_matches_boltzmann_factor() {
        let mut rng = StdRng::seed_from_u64(5);
        let (delta, temperature) = (2.0, 1.5);
        let trials = 200_000;
        let accepted = (0..trials)
            .filter(|_| metropolis_accept(delta, temperature, &mut rng))
            .count();
        let rate = accepted as f64 / trials as f64;
        let expected = acceptance_probability(delta, temperature);
        assert!((rate - expected).abs() < 0.01, "rate {rate} vs {expected}");
    }

    #[test]
    fn test_nan_probability_is_zero() {
        assert_eq!(acceptance_probability(f64::NAN, 1.0), 0.0);
    }
}
