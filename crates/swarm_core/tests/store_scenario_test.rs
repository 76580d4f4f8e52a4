//! # Store Scenario Integration Test
//!
//! Drives the public API the way a simulation does: append, sort by a
//! field, read back, pop. Every scenario runs on both backends.

use std::cmp::Reverse;

use swarm_core::{
    particle_field, Backend, Parallel, Particle, Particles, Sequential, StoreError, Vec2,
};

particle_field!(
    /// Per-particle weight.
    pub Weight: f64 = "weight"
);

type WeightedStore<B> = Particles<(Weight,), 2, B>;

/// Integer sort key for descending weight. Weights are whole numbers here.
#[allow(clippy::cast_possible_truncation)]
fn descending_weight_keys<B: Backend>(store: &WeightedStore<B>) -> Vec<Reverse<i64>> {
    store
        .column::<Weight, _>()
        .iter()
        .map(|&weight| Reverse(weight as i64))
        .collect()
}

fn run_weighted_scenario<B: Backend>() {
    let mut store = WeightedStore::<B>::new();
    assert_eq!(store.len(), 0);

    for (coord, weight) in [(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)] {
        store
            .push(Particle::new(Vec2::new([coord, coord])).with_fields((weight,)))
            .unwrap();
    }
    assert_eq!(store.len(), 3);

    let mut keys = descending_weight_keys(&store);
    store.sort_by_key(&mut keys).unwrap();
    assert_eq!(*store.get(0).unwrap().position(), Vec2::new([2.0, 2.0]));
    assert_eq!(store.column::<Weight, _>(), &[30.0, 20.0, 10.0]);

    let popped = store.pop().unwrap();
    assert_eq!(popped.position, Vec2::new([0.0, 0.0]));
    assert_eq!(store.len(), 2);
    assert_eq!(*store.get(1).unwrap().position(), Vec2::new([1.0, 1.0]));
    assert!(store.is_aligned());
}

#[test]
fn test_weighted_scenario_sequential() {
    run_weighted_scenario::<Sequential>();
}

#[test]
fn test_weighted_scenario_parallel() {
    run_weighted_scenario::<Parallel>();
}

#[test]
fn test_empty_store_errors() {
    let mut store = WeightedStore::<Sequential>::new();
    assert_eq!(store.pop(), Err(StoreError::Empty));
    assert_eq!(
        store.get(0).map(|particle| particle.id()),
        Err(StoreError::IndexOutOfRange { index: 0, len: 0 })
    );
    assert!(store.iter().next().is_none());
}

#[test]
fn test_spatial_sort_keeps_fields_together() {
    // Sort by a derived cell key, then check every entity kept its weight.
    let mut store = WeightedStore::<Parallel>::with_len(5_000);
    store.for_each(|mut particle| {
        let id = f64::from(u32::try_from(particle.id()).unwrap());
        *particle.position_mut() = Vec2::new([id.sin() * 100.0, id.cos() * 100.0]);
        *particle.get_mut::<Weight, _>() = id;
    });

    #[allow(clippy::cast_possible_truncation)]
    let mut cells: Vec<(i64, i64)> = store
        .positions()
        .iter()
        .map(|p| ((p[0] / 10.0).floor() as i64, (p[1] / 10.0).floor() as i64))
        .collect();
    store.sort_by_key(&mut cells).unwrap();

    assert!(cells.windows(2).all(|pair| pair[0] <= pair[1]));
    for particle in &store {
        let id = f64::from(u32::try_from(particle.id()).unwrap());
        assert_eq!(*particle.get::<Weight, _>(), id);
        assert_eq!(*particle.position(), Vec2::new([id.sin() * 100.0, id.cos() * 100.0]));
    }
}

#[test]
fn test_retain_alive_after_parallel_update() {
    let mut store = WeightedStore::<Parallel>::with_len(10_000);
    store.for_each(|mut particle| {
        if particle.id() % 3 == 0 {
            particle.set_alive(false);
        }
    });

    let removed = store.retain_alive();
    assert_eq!(removed, 3_334);
    assert_eq!(store.len(), 6_666);
    assert!(store.ids().iter().all(|id| id % 3 != 0));
    assert!(store.ids().windows(2).all(|pair| pair[0] < pair[1]));
    assert!(store.is_aligned());
}
