use super::{draw_sign, mean_spin, Flip, OrderParameter, SpinModel, TermSet};
use crate::error::{Result, SimError};
use crate::field::SpinField;
use crate::lattice::Lattice;
use rand::Rng;

/// Z2 lattice gauge model.
///
/// Spins live on edges, `(x, a)` being the edge leaving site `x` along axis `a`.
/// Each plaquette is labelled by its lowest site and an unordered pair of
/// axes `a < b`, and contributes minus the product of its four edges.
#[derive(Debug, Clone)]
pub struct GaugeZ2 {
    links: SpinField<i8>,
    /// Axis pairs `(a, b)` with `a < b`, in plaquette order
    planes: Vec<(usize, usize)>,
    /// `plane_index[a * dims + b]` for `a != b`
    plane_index: Vec<usize>,
}

impl GaugeZ2 {
    pub fn new<R: Rng + ?Sized>(lattice: Lattice, rng: &mut R) -> Result<Self> {
        let dims = lattice.dimension();
        let links = SpinField::from_fn(lattice, dims, |_| draw_sign(rng));
        Self::from_links(links)
    }

    /// All edges set to +1.
    pub fn ordered(lattice: Lattice) -> Result<Self> {
        let dims = lattice.dimension();
        Self::from_links(SpinField::filled(lattice, dims, 1))
    }

    pub fn from_links(links: SpinField<i8>) -> Result<Self> {
        let dims = links.lattice().dimension();
        if dims < 2 {
            return Err(SimError::InvalidLattice(
                "gauge model needs at least two axes".to_string(),
            ));
        }
        if links.arity() != dims {
            return Err(SimError::InvalidParameter(format!(
                "gauge field needs {dims} components per site, got {}",
                links.arity()
            )));
        }

        let mut planes = Vec::new();
        let mut plane_index = vec![usize::MAX; dims * dims];
        for a in 0..dims {
            for b in a + 1..dims {
                plane_index[a * dims + b] = planes.len();
                plane_index[b * dims + a] = planes.len();
                planes.push((a, b));
            }
        }

        Ok(Self {
            links,
            planes,
            plane_index,
        })
    }

    pub fn lattice(&self) -> &Lattice {
        self.links.lattice()
    }

    /// Unit indices of the four edges bounding the plaquette at `site` in plane `(a, b)`.
    pub fn plaquette(&self, site: usize, a: usize, b: usize) -> [usize; 4] {
        assert_ne!(a, b, "plaquette needs two distinct directions");
        let lattice = self.lattice();
        [
            self.links.unit(site, a),
            self.links.unit(site, b),
            self.links.unit(lattice.shift(site, a, true), b),
            self.links.unit(lattice.shift(site, b, true), a),
        ]
    }

    fn plane(&self, a: usize, b: usize) -> usize {
        self.plane_index[a * self.lattice().dimension() + b]
    }
}

impl SpinModel for GaugeZ2 {
    type Spin = i8;
    type Update = Flip;

    fn name(&self) -> &'static str {
        "gauge"
    }

    fn field(&self) -> &SpinField<i8> {
        &self.links
    }

    fn field_mut(&mut self) -> &mut SpinField<i8> {
        &mut self.links
    }

    fn term_count(&self) -> usize {
        self.lattice().volume() * self.planes.len()
    }

    fn term_energy<F: Fn(usize) -> i8>(&self, term: usize, spin: F) -> f64 {
        let (site, plane) = (term / self.planes.len(), term % self.planes.len());
        let (a, b) = self.planes[plane];
        let product: i8 = self.plaquette(site, a, b).iter().map(|&u| spin(u)).product();
        -(product as f64)
    }

    fn incident_terms(&self, unit: usize) -> TermSet {
        let (site, a) = self.links.split(unit);
        let lattice = self.lattice();
        let n_planes = self.planes.len();
        let mut terms = TermSet::default();
        for b in (0..lattice.dimension()).filter(|&b| b != a) {
            let plane = self.plane(a, b);
            terms.insert(site * n_planes + plane);
            terms.insert(lattice.shift(site, b, false) * n_planes + plane);
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
        OrderParameter::Scalar(mean_spin(self.links.values()))
    }
}
