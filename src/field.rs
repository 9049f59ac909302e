use crate::lattice::Lattice;
use rand::Rng;
use std::ops::{Index, IndexMut};

/// Spin values stored on a lattice, `arity` components per site.
///
/// Vertex models use one component per site. Edge models use one component
/// per axis, component `a` being the edge leaving the site in direction `a`.
/// A unit index is `site * arity + component`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinField<S> {
    lattice: Lattice,
    arity: usize,
    values: Vec<S>,
}

impl<S: Copy> SpinField<S> {
    /// Field with every unit set to `value`.
    pub fn filled(lattice: Lattice, arity: usize, value: S) -> Self {
        assert!(arity > 0, "a field needs at least one component per site");
        let values = vec![value; lattice.volume() * arity];
        Self {
            lattice,
            arity,
            values,
        }
    }

    /// Field whose units are drawn independently by `draw`.
    pub fn from_fn<F: FnMut(usize) -> S>(lattice: Lattice, arity: usize, draw: F) -> Self {
        assert!(arity > 0, "a field needs at least one component per site");
        let values = (0..lattice.volume() * arity).map(draw).collect();
        Self {
            lattice,
            arity,
            values,
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[S] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [S] {
        &mut self.values
    }

    #[inline]
    pub fn unit(&self, site: usize, component: usize) -> usize {
        debug_assert!(component < self.arity);
        site * self.arity + component
    }

    /// `(site, component)` of a unit index.
    #[inline]
    pub fn split(&self, unit: usize) -> (usize, usize) {
        (unit / self.arity, unit % self.arity)
    }

    #[inline]
    pub fn at(&self, site: usize, component: usize) -> S {
        self.values[self.unit(site, component)]
    }

    /// Uniform random site, then uniform random component on it.
    pub fn random_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let site = self.lattice.random_site(rng);
        let component = if self.arity == 1 {
            0
        } else {
            rng.gen_range(0..self.arity)
        };
        self.unit(site, component)
    }
}

impl<S> Index<usize> for SpinField<S> {
    type Output = S;

    #[inline]
    fn index(&self, unit: usize) -> &S {
        &self.values[unit]
    }
}

impl<S> IndexMut<usize> for SpinField<S> {
    #[inline]
    fn index_mut(&mut self, unit: usize) -> &mut S {
        &mut self.values[unit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_layout() {
        let lattice = Lattice::hypercubic(2, 3).unwrap();
        let field = SpinField::filled(lattice, 2, 1i8);
        assert_eq!(field.len(), 18);
        assert_eq!(field.unit(4, 1), 9);
        assert_eq!(field.split(9), (4, 1));
    }

    #[test]
    fn test_from_fn_order() {
        let lattice = Lattice::hypercubic(1, 4).unwrap();
        let field = SpinField::from_fn(lattice, 1, |u| u as i8);
        assert_eq!(field.values(), &[0, 1, 2, 3]);
    }
}
