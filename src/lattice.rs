use crate::error::{Result, SimError};
use rand::Rng;

/// Largest number of axes a lattice may have.
pub const MAX_DIMENSION: usize = 4;

/// Periodic hypercubic lattice with a precomputed neighbour table.
///
/// Sites are indexed in row-major order. Every neighbour lookup wraps each
/// axis with a Euclidean modulo, so negative offsets land on the far side of
/// the lattice rather than being truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    /// Extent along each axis
    shape: Vec<usize>,
    /// Row-major strides: `strides[a] = product of shape[a+1..]`
    strides: Vec<usize>,
    /// Total number of sites
    volume: usize,
    /// `neighbors[(site * dims + axis) * 2 + dir]`, `dir = 0` forward, `1` backward
    neighbors: Vec<usize>,
}

impl Lattice {
    /// Create a periodic lattice with the given extent per axis.
    pub fn new(shape: Vec<usize>) -> Result<Self> {
        if shape.is_empty() || shape.len() > MAX_DIMENSION {
            return Err(SimError::InvalidLattice(format!(
                "dimension must be between 1 and {MAX_DIMENSION}, got {}",
                shape.len()
            )));
        }
        if let Some(axis) = shape.iter().position(|&n| n == 0) {
            return Err(SimError::InvalidLattice(format!(
                "axis {axis} has zero extent"
            )));
        }

        let dims = shape.len();
        let mut strides = vec![1usize; dims];
        for a in (0..dims - 1).rev() {
            strides[a] = strides[a + 1] * shape[a + 1];
        }
        let volume = shape.iter().product();

        let mut lattice = Self {
            shape,
            strides,
            volume,
            neighbors: Vec::new(),
        };

        let mut neighbors = vec![0usize; volume * dims * 2];
        let mut offset = vec![0isize; dims];
        for site in 0..volume {
            let coord = lattice.coords(site);
            for axis in 0..dims {
                for (dir, step) in [(0, 1isize), (1, -1isize)] {
                    offset[axis] = step;
                    neighbors[(site * dims + axis) * 2 + dir] =
                        lattice.index(&lattice.neighbor(&coord, &offset));
                    offset[axis] = 0;
                }
            }
        }
        lattice.neighbors = neighbors;

        Ok(lattice)
    }

    /// Create an `size^dimension` lattice.
    pub fn hypercubic(dimension: usize, size: usize) -> Result<Self> {
        Self::new(vec![size; dimension])
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dimension(&self) -> usize {
        self.shape.len()
    }

    /// Number of sites
    pub fn volume(&self) -> usize {
        self.volume
    }

    /// Flat index of a coordinate whose components already lie in `[0, N)`.
    #[inline]
    pub fn index(&self, coord: &[usize]) -> usize {
        debug_assert_eq!(coord.len(), self.dimension());
        coord
            .iter()
            .zip(&self.strides)
            .map(|(c, s)| c * s)
            .sum()
    }

    /// Coordinate tuple of a flat index.
    pub fn coords(&self, index: usize) -> Vec<usize> {
        self.strides
            .iter()
            .zip(&self.shape)
            .map(|(&s, &n)| (index / s) % n)
            .collect()
    }

    /// Coordinate reached by adding `offset` to `coord`, wrapped on every axis.
    pub fn neighbor(&self, coord: &[usize], offset: &[isize]) -> Vec<usize> {
        assert_eq!(offset.len(), self.dimension(), "offset has wrong length");
        coord
            .iter()
            .zip(offset)
            .zip(&self.shape)
            .map(|((&c, &o), &n)| (c as isize + o).rem_euclid(n as isize) as usize)
            .collect()
    }

    /// Site one step along `axis`, forward when `forward` is true.
    #[inline]
    pub fn shift(&self, site: usize, axis: usize, forward: bool) -> usize {
        self.neighbors[(site * self.dimension() + axis) * 2 + (!forward as usize)]
    }

    /// All `2d` nearest neighbours of a site, repeats included on small lattices.
    pub fn neighbors(&self, site: usize) -> impl Iterator<Item = usize> + '_ {
        let dims = self.dimension();
        self.neighbors[site * dims * 2..(site + 1) * dims * 2]
            .iter()
            .copied()
    }

    /// Uniformly random site.
    pub fn random_site<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_empty_extent() {
        assert!(Lattice::new(vec![4, 0]).is_err());
        assert!(Lattice::new(vec![]).is_err());
        assert!(Lattice::new(vec![2; MAX_DIMENSION + 1]).is_err());
    }

    #[test]
    fn test_2d_neighbors() {
        // 3x4 lattice
        let lat = Lattice::new(vec![3, 4]).unwrap();
        assert_eq!(lat.volume(), 12);

        // (0,0): forward along 0 -> (1,0)=4, along 1 -> (0,1)=1
        assert_eq!(lat.shift(0, 0, true), 4);
        assert_eq!(lat.shift(0, 1, true), 1);
        // backward wraps to (2,0)=8 and (0,3)=3
        assert_eq!(lat.shift(0, 0, false), 8);
        assert_eq!(lat.shift(0, 1, false), 3);
        // (2,3) forward wraps to (0,3)=3 and (2,0)=8
        assert_eq!(lat.shift(11, 0, true), 3);
        assert_eq!(lat.shift(11, 1, true), 8);
    }

    #[test]
    fn test_full_period_offset_is_identity() {
        for n in 1..6 {
            let lat = Lattice::hypercubic(3, n).unwrap();
            let n = n as isize;
            for site in 0..lat.volume() {
                let c = lat.coords(site);
                assert_eq!(lat.neighbor(&c, &[n, 0, 0]), c);
                assert_eq!(lat.neighbor(&c, &[0, -n, 2 * n]), c);
            }
        }
    }

    #[test]
    fn test_negative_offsets_wrap() {
        let lat = Lattice::hypercubic(2, 5).unwrap();
        assert_eq!(lat.neighbor(&[0, 1], &[-1, -3]), vec![4, 3]);
        assert_eq!(lat.neighbor(&[4, 4], &[-11, 7]), vec![3, 1]);
    }

    #[test]
    fn test_index_coords_round_trip() {
        let lat = Lattice::new(vec![2, 3, 4]).unwrap();
        for site in 0..lat.volume() {
            assert_eq!(lat.index(&lat.coords(site)), site);
        }
        assert_eq!(lat.coords(23), vec![1, 2, 3]);
    }

    #[test]
    fn test_random_site_in_range() {
        let lat = Lattice::hypercubic(2, 7).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(lat.random_site(&mut rng) < 49);
        }
    }
}
