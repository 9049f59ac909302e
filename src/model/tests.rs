use super::*;
use crate::lattice::Lattice;
use approx::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// `local_delta` must match the change in `total_energy` for every unit.
fn check_local_delta<M: SpinModel>(model: &mut M, rng: &mut StdRng) {
    for _ in 0..model.unit_count().min(200) {
        let unit = model.field().random_unit(rng);
        let update = model.propose(rng);
        let before = model.total_energy();
        let delta = model.local_delta(unit, update);
        model.apply(unit, update);
        let after = model.total_energy();
        assert_relative_eq!(delta, after - before, epsilon = 1e-9);
    }
}

fn shapes() -> Vec<Vec<usize>> {
    vec![
        vec![1, 1],
        vec![2, 2],
        vec![2, 3],
        vec![5, 4],
        vec![3, 3, 3],
        vec![2, 1, 4],
        vec![4, 4, 4],
    ]
}

#[test]
fn test_ising_local_delta_matches_total() {
    let mut rng = StdRng::seed_from_u64(100);
    for shape in shapes().into_iter().chain([vec![1], vec![2], vec![9]]) {
        let mut model = Ising::new(Lattice::new(shape).unwrap(), &mut rng).with_coupling(0.7);
        check_local_delta(&mut model, &mut rng);
    }
}

#[test]
fn test_glass_local_delta_matches_total() {
    let mut rng = StdRng::seed_from_u64(101);
    for shape in shapes() {
        let mut model = Glass::new(Lattice::new(shape).unwrap(), 0.2, &mut rng).unwrap();
        check_local_delta(&mut model, &mut rng);
    }
}

#[test]
fn test_gauge_local_delta_matches_total() {
    let mut rng = StdRng::seed_from_u64(102);
    for shape in shapes() {
        let mut model = GaugeZ2::new(Lattice::new(shape).unwrap(), &mut rng).unwrap();
        check_local_delta(&mut model, &mut rng);
    }
}

#[test]
fn test_ice_local_delta_matches_total() {
    let mut rng = StdRng::seed_from_u64(103);
    for shape in shapes() {
        let mut model = SquareIce::new(Lattice::new(shape).unwrap(), &mut rng).unwrap();
        check_local_delta(&mut model, &mut rng);
    }
}

#[test]
fn test_xy_local_delta_matches_total() {
    let mut rng = StdRng::seed_from_u64(104);
    for shape in shapes() {
        for frustrated in [false, true] {
            let mut model =
                XyRotor::new(Lattice::new(shape.clone()).unwrap(), 0.8, frustrated, &mut rng)
                    .unwrap();
            check_local_delta(&mut model, &mut rng);
        }
    }
}

#[test]
fn test_ising_ordered_energy() {
    for n in [1, 3, 5, 10] {
        let model = Ising::ordered(Lattice::hypercubic(2, n).unwrap());
        assert_relative_eq!(model.total_energy(), -2.0 * (n * n) as f64);
        assert_relative_eq!(model.energy_per_unit(), -2.0, epsilon = 1e-10);
        assert_eq!(model.magnetization_per_site(), 1.0);
    }
    let model = Ising::ordered(Lattice::hypercubic(3, 4).unwrap());
    assert_relative_eq!(model.energy_per_unit(), -3.0, epsilon = 1e-10);
}

#[test]
fn test_ising_single_flip_energy() {
    let mut ising = Ising::ordered(Lattice::hypercubic(2, 3).unwrap());
    let initial_energy = ising.total_energy();
    assert_relative_eq!(ising.local_delta(4, Flip), 8.0);

    // One spin surrounded by 4 opposite neighbours
    ising.flip(4);
    assert_relative_eq!(ising.total_energy() - initial_energy, 8.0, epsilon = 1e-10);

    let mut ising = Ising::ordered(Lattice::hypercubic(3, 3).unwrap());
    assert_relative_eq!(ising.local_delta(13, Flip), 12.0);
    ising.apply(13, Flip);
    assert_relative_eq!(ising.total_energy(), -81.0 + 12.0, epsilon = 1e-10);
}

#[test]
fn test_two_site_ring_energy() {
    let model = Ising::ordered(Lattice::hypercubic(1, 2).unwrap());
    assert_relative_eq!(model.total_energy(), -2.0);
    assert_relative_eq!(model.local_delta(0, Flip), 4.0);
}

#[test]
fn test_glass_with_positive_bonds_is_ising() {
    let mut rng = StdRng::seed_from_u64(105);
    let lattice = Lattice::hypercubic(3, 4).unwrap();
    let ising = Ising::new(lattice.clone(), &mut rng);
    let bonds = crate::field::SpinField::filled(lattice, 3, 1i8);
    let glass = Glass::with_bonds(ising.field().clone(), bonds).unwrap();
    assert_relative_eq!(glass.total_energy(), ising.total_energy());
    assert_eq!(glass.bond_probability(), 1.0);
}

#[test]
fn test_glass_bonds_are_quenched() {
    let mut rng = StdRng::seed_from_u64(106);
    let mut glass = Glass::new(Lattice::hypercubic(3, 5).unwrap(), 0.2, &mut rng).unwrap();
    let bonds = glass.bonds().clone();
    glass.randomize(&mut rng);
    assert_eq!(glass.bonds(), &bonds);

    let positive = bonds.values().iter().filter(|&&j| j == 1).count() as f64;
    let fraction = positive / bonds.len() as f64;
    assert!((fraction - 0.2).abs() < 0.06, "fraction of +1 bonds {fraction}");
    assert!(Glass::new(Lattice::hypercubic(2, 3).unwrap(), 1.5, &mut rng).is_err());
}

#[test]
fn test_gauge_ordered_energy() {
    let model = GaugeZ2::ordered(Lattice::hypercubic(2, 4).unwrap()).unwrap();
    assert_relative_eq!(model.total_energy(), -16.0);
    assert_relative_eq!(model.energy_per_unit(), -0.5);

    let model = GaugeZ2::ordered(Lattice::hypercubic(3, 3).unwrap()).unwrap();
    assert_relative_eq!(model.energy_per_unit(), -1.0);
}

#[test]
fn test_gauge_edge_touches_two_plaquettes_per_plane() {
    let model = GaugeZ2::ordered(Lattice::hypercubic(3, 4).unwrap()).unwrap();
    for unit in 0..model.unit_count() {
        assert_eq!(model.incident_terms(unit).len(), 4);
    }
    // flipping one edge of the ordered state breaks all incident plaquettes
    assert_relative_eq!(model.local_delta(0, Flip), 8.0);
    assert!(GaugeZ2::ordered(Lattice::hypercubic(1, 4).unwrap()).is_err());
}

#[test]
#[should_panic(expected = "distinct directions")]
fn test_gauge_plaquette_needs_two_directions() {
    let model = GaugeZ2::ordered(Lattice::hypercubic(2, 3).unwrap()).unwrap();
    model.plaquette(0, 1, 1);
}

#[test]
fn test_gauge_transformation_preserves_energy() {
    // flipping every edge at one site is a gauge transformation
    let mut rng = StdRng::seed_from_u64(107);
    let mut model = GaugeZ2::new(Lattice::hypercubic(3, 4).unwrap(), &mut rng).unwrap();
    let before = model.total_energy();
    let site = 21;
    let lattice = model.lattice().clone();
    for a in 0..3 {
        let forward = model.field().unit(site, a);
        let backward = model.field().unit(lattice.shift(site, a, false), a);
        model.apply(forward, Flip);
        model.apply(backward, Flip);
    }
    assert_relative_eq!(model.total_energy(), before);
}

#[test]
fn test_ice_rule_ground_state() {
    // alternate edges along every axis so each vertex sums to zero
    let lattice = Lattice::hypercubic(2, 4).unwrap();
    let field = crate::field::SpinField::from_fn(lattice.clone(), 2, |unit| {
        let (site, a) = (unit / 2, unit % 2);
        if lattice.coords(site)[a] % 2 == 0 {
            1
        } else {
            -1
        }
    });
    let ice = SquareIce::from_edges(field).unwrap();
    assert_eq!(ice.total_energy(), 0.0);
    assert!((0..16).all(|site| ice.vertex_sum(site) == 0));

    let ordered = SquareIce::from_edges(crate::field::SpinField::filled(lattice, 2, 1)).unwrap();
    assert_relative_eq!(ordered.energy_per_unit(), 8.0);
}

#[test]
fn test_xy_aligned_energy_and_wrapping() {
    let lattice = Lattice::hypercubic(2, 4).unwrap();
    let angles = crate::field::SpinField::filled(lattice.clone(), 1, 1.0);
    let mut xy = XyRotor::from_angles(angles, 0.5, false).unwrap();
    assert_relative_eq!(xy.energy_per_unit(), -2.0, epsilon = 1e-12);
    assert!(!xy.is_frustrated());

    xy.apply(3, Rotation(-7.0));
    let theta = xy.angles()[3];
    assert!((0.0..std::f64::consts::TAU).contains(&theta));
    assert_relative_eq!(theta, (1.0 - 7.0f64).rem_euclid(std::f64::consts::TAU), epsilon = 1e-12);

    let angles = crate::field::SpinField::filled(lattice, 1, 0.0);
    let ffxy = XyRotor::from_angles(angles, 0.5, true).unwrap();
    assert!(ffxy.is_frustrated());
    // half of the axis-0 bonds are antiferromagnetic
    assert_relative_eq!(ffxy.total_energy(), -16.0, epsilon = 1e-12);
}

#[test]
fn test_xy_rejects_bad_step() {
    let lattice = Lattice::hypercubic(2, 4).unwrap();
    let angles = crate::field::SpinField::filled(lattice, 1, 0.0);
    assert!(XyRotor::from_angles(angles.clone(), 0.0, false).is_err());
    assert!(XyRotor::from_angles(angles, f64::NAN, false).is_err());
}

#[test]
fn test_xy_rejects_non_finite_angles() {
    let lattice = Lattice::hypercubic(2, 3).unwrap();
    for bad in [f64::NAN, f64::INFINITY] {
        let angles = crate::field::SpinField::from_fn(lattice.clone(), 1, |u| {
            if u == 4 {
                bad
            } else {
                0.0
            }
        });
        assert!(matches!(
            XyRotor::from_angles(angles, 0.5, false),
            Err(crate::error::SimError::InvalidParameter(_))
        ));
    }
}

#[test]
fn test_randomize_draws_from_alphabet() {
    let mut rng = StdRng::seed_from_u64(108);
    let mut model = Ising::ordered(Lattice::hypercubic(2, 20).unwrap());
    model.randomize(&mut rng);
    assert!(model.spins().iter().all(|&s| s == 1 || s == -1));
    assert!(model.magnetization_per_site().abs() < 0.2);
}

#[test]
fn test_term_set_deduplicates() {
    let mut terms = TermSet::default();
    terms.insert(3);
    terms.insert(3);
    terms.insert(5);
    assert_eq!(terms.len(), 2);
    assert_eq!(terms.iter().collect::<Vec<_>>(), vec![3, 5]);
}

#[test]
fn test_snapshot_layout() {
    let model = GaugeZ2::ordered(Lattice::new(vec![2, 3]).unwrap()).unwrap();
    let snapshot = model.snapshot();
    assert_eq!(snapshot.shape, vec![2, 3]);
    assert_eq!(snapshot.arity, 2);
    assert_eq!(snapshot.values, SnapshotValues::Discrete(vec![1; 12]));

    let xy = XyRotor::from_angles(
        crate::field::SpinField::filled(Lattice::new(vec![2]).unwrap(), 1, 0.5),
        0.1,
        false,
    )
    .unwrap();
    assert!(xy.majority().is_none());
    assert_eq!(xy.snapshot().values, SnapshotValues::Angles(vec![0.5, 0.5]));
}
