//! Majority/minority partition of a discrete configuration.
//!
//! The partition is what gets persisted for downstream topological analysis:
//! the positions of every unit aligned with the majority sign. Vertex spins
//! sit at their integer site coordinates; an edge spin `(x, a)` sits at the
//! midpoint `x + 0.5 e_a` of its edge.

use crate::error::{Result, SimError};
use crate::field::SpinField;
use crate::lattice::Lattice;
use itertools::Itertools;

#[derive(Debug, Clone, PartialEq)]
pub struct MajorityPartition {
    lattice: Lattice,
    arity: usize,
    majority: i8,
    /// Majority-aligned unit indices, ascending
    units: Vec<usize>,
}

impl MajorityPartition {
    /// Partition of `field`. A zero net spin counts as a +1 majority.
    pub fn of(field: &SpinField<i8>) -> Self {
        let net: i64 = field.values().iter().map(|&s| s as i64).sum();
        let majority = if net >= 0 { 1 } else { -1 };
        let units = field
            .values()
            .iter()
            .positions(|&s| s == majority)
            .collect();
        Self {
            lattice: field.lattice().clone(),
            arity: field.arity(),
            majority,
            units,
        }
    }

    /// Rebuild a partition from persisted positions.
    pub fn from_positions(
        lattice: Lattice,
        arity: usize,
        majority: i8,
        positions: &[Vec<f64>],
    ) -> Result<Self> {
        if majority.abs() != 1 {
            return Err(SimError::InvalidParameter(format!(
                "majority sign must be +1 or -1, got {majority}"
            )));
        }
        let mut units = positions
            .iter()
            .map(|p| unit_of_position(&lattice, arity, p))
            .collect::<Result<Vec<_>>>()?;
        units.sort_unstable();
        units.dedup();
        Ok(Self {
            lattice,
            arity,
            majority,
            units,
        })
    }

    pub fn majority(&self) -> i8 {
        self.majority
    }

    pub fn units(&self) -> &[usize] {
        &self.units
    }

    pub fn count(&self) -> usize {
        self.units.len()
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Site-space position of every majority unit.
    pub fn positions(&self) -> Vec<Vec<f64>> {
        self.units
            .iter()
            .map(|&unit| position_of_unit(&self.lattice, self.arity, unit))
            .collect()
    }

    /// Configuration with listed units set to the majority sign, the rest to the minority.
    pub fn reconstruct(&self) -> SpinField<i8> {
        let mut field = SpinField::filled(self.lattice.clone(), self.arity, -self.majority);
        for &unit in &self.units {
            field[unit] = self.majority;
        }
        field
    }

    /// Whitespace-delimited rows, integers for vertex spins and one decimal for edge spins.
    pub fn to_rows(&self) -> String {
        let mut out = String::new();
        for position in self.positions() {
            let row = if self.arity == 1 {
                position.iter().map(|c| format!("{}", *c as i64)).join(" ")
            } else {
                position.iter().map(|c| format!("{c:.1}")).join(" ")
            };
            out.push_str(&row);
            out.push('\n');
        }
        out
    }
}

/// Parse whitespace-delimited numeric rows, skipping blank lines.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<f64>>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .map(|field| {
                    field
                        .parse::<f64>()
                        .map_err(|_| SimError::MalformedPosition(line.to_string()))
                })
                .collect()
        })
        .collect()
}

fn position_of_unit(lattice: &Lattice, arity: usize, unit: usize) -> Vec<f64> {
    let (site, component) = (unit / arity, unit % arity);
    let mut position: Vec<f64> = lattice.coords(site).iter().map(|&c| c as f64).collect();
    if arity > 1 {
        position[component] += 0.5;
    }
    position
}

fn unit_of_position(lattice: &Lattice, arity: usize, position: &[f64]) -> Result<usize> {
    let malformed = || SimError::MalformedPosition(position.iter().join(" "));
    if position.len() != lattice.dimension() {
        return Err(malformed());
    }

    let mut component = None;
    let mut coord = Vec::with_capacity(position.len());
    for (axis, (&p, &n)) in position.iter().zip(lattice.shape()).enumerate() {
        let base = p.floor();
        let frac = p - base;
        if frac == 0.5 && arity > 1 && component.is_none() {
            component = Some(axis);
        } else if frac != 0.0 {
            return Err(malformed());
        }
        if base < 0.0 || base >= n as f64 {
            return Err(malformed());
        }
        coord.push(base as usize);
    }

    let component = match (arity, component) {
        (1, None) => 0,
        (a, Some(c)) if a > 1 && c < a => c,
        _ => return Err(malformed()),
    };
    Ok(lattice.index(&coord) * arity + component)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GaugeZ2, Ising, SpinModel};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_edge_positions_carry_half_offset() {
        let lattice = Lattice::hypercubic(2, 3).unwrap();
        let mut field = SpinField::filled(lattice, 2, -1i8);
        let u = field.unit(4, 0);
        field[u] = 1;
        let u = field.unit(4, 1);
        field[u] = 1;
        let u = field.unit(0, 0);
        field[u] = 1;
        // net spin is negative, so -1 is the majority
        let partition = MajorityPartition::of(&field);
        assert_eq!(partition.majority(), -1);
        assert_eq!(partition.count(), 15);

        let mut flipped = field.clone();
        for s in flipped.values_mut() {
            *s = -*s;
        }
        let partition = MajorityPartition::of(&flipped);
        let positions = partition.positions();
        assert!(positions.contains(&vec![0.0, 0.5]));
        assert!(!positions.contains(&vec![1.5, 1.0]));
    }

    #[test]
    fn test_tie_counts_as_positive_majority() {
        let lattice = Lattice::hypercubic(1, 2).unwrap();
        let field = SpinField::from_fn(lattice, 1, |u| if u == 0 { 1 } else { -1 });
        let partition = MajorityPartition::of(&field);
        assert_eq!(partition.majority(), 1);
        assert_eq!(partition.units(), &[0]);
    }

    #[test]
    fn test_vertex_rows_round_trip() {
        let mut rng = StdRng::seed_from_u64(31);
        let model = Ising::new(Lattice::hypercubic(2, 7).unwrap(), &mut rng);
        let partition = model.majority().unwrap();
        let rows = parse_rows(&partition.to_rows()).unwrap();
        let restored = MajorityPartition::from_positions(
            model.lattice().clone(),
            1,
            partition.majority(),
            &rows,
        )
        .unwrap();
        assert_eq!(restored.reconstruct(), *model.field());
    }

    #[test]
    fn test_edge_rows_round_trip() {
        let mut rng = StdRng::seed_from_u64(32);
        let model = GaugeZ2::new(Lattice::hypercubic(3, 4).unwrap(), &mut rng).unwrap();
        let partition = model.majority().unwrap();
        let text = partition.to_rows();
        assert!(text.lines().all(|l| l.contains(".5")));
        let rows = parse_rows(&text).unwrap();
        let restored = MajorityPartition::from_positions(
            model.lattice().clone(),
            3,
            partition.majority(),
            &rows,
        )
        .unwrap();
        assert_eq!(restored, partition);
        assert_eq!(restored.reconstruct(), *model.field());
    }

    #[test]
    fn test_rejects_malformed_positions() {
        let lattice = Lattice::hypercubic(2, 3).unwrap();
        let bad = [vec![0.5, 0.5], vec![3.0, 0.0], vec![0.25, 1.0], vec![1.0]];
        for row in bad {
            assert!(MajorityPartition::from_positions(lattice.clone(), 2, 1, &[row]).is_err());
        }
        assert!(MajorityPartition::from_positions(lattice.clone(), 1, 1, &[vec![0.5, 1.0]]).is_err());
        assert!(parse_rows("1 2\n3 x\n").is_err());
    }
}
