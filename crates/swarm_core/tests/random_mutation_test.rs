//! # Randomized Mutation Test
//!
//! Applies long seeded sequences of mutations to a store and to a plain
//! `Vec<Particle>` model side by side. After every step all columns must
//! have the same length and every column must match the model.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use swarm_core::{
    particle_field, Backend, Parallel, Particle, Particles, Sequential, StoreError, Vec3,
};

particle_field!(
    /// Sphere radius.
    pub Radius: f64 = "radius"
);
particle_field!(
    /// Species index.
    pub Species: u16 = "species"
);
particle_field!(
    /// Free-form tag.
    pub Label: String = "label"
);

type Fields = (Radius, Species, Label);
type Store<B> = Particles<Fields, 3, B>;
type Record = Particle<Fields, 3>;

const STEPS: usize = 2_000;

fn random_particle(rng: &mut ChaCha8Rng) -> Record {
    let species: u16 = rng.gen_range(0..8);
    Particle::new(Vec3::new([rng.gen(), rng.gen(), rng.gen()]))
        .with_id(rng.gen_range(0..1_000))
        .with_alive(rng.gen_bool(0.8))
        .with_fields((rng.gen(), species, format!("s{species}")))
}

fn assert_matches<B: Backend>(store: &Store<B>, model: &[Record]) {
    assert!(store.is_aligned());
    assert_eq!(store.len(), model.len());
    for (index, expected) in model.iter().enumerate() {
        assert_eq!(&store.get(index).unwrap().to_particle(), expected);
    }
    let radii: Vec<f64> = model.iter().map(|p| *p.get::<Radius, _>()).collect();
    assert_eq!(store.column::<Radius, _>(), radii.as_slice());
}

fn run_mutations<B: Backend>(seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut store = Store::<B>::new();
    let mut model: Vec<Record> = Vec::new();

    for _ in 0..STEPS {
        match rng.gen_range(0..9) {
            0 | 1 => {
                let particle = random_particle(&mut rng);
                store.push(particle.clone()).unwrap();
                model.push(particle);
            }
            2 => {
                let index = rng.gen_range(0..=model.len());
                let particle = random_particle(&mut rng);
                store.insert(index, particle.clone()).unwrap();
                model.insert(index, particle);
            }
            3 => {
                let index = rng.gen_range(0..=model.len());
                let n = rng.gen_range(0..4);
                let particle = random_particle(&mut rng);
                store.insert_n(index, n, &particle).unwrap();
                model.splice(index..index, std::iter::repeat(particle).take(n));
            }
            4 => {
                let index = rng.gen_range(0..=model.len());
                let batch: Vec<Record> = (0..rng.gen_range(0..5))
                    .map(|_| random_particle(&mut rng))
                    .collect();
                store.insert_iter(index, batch.clone()).unwrap();
                model.splice(index..index, batch);
            }
            5 => match model.pop() {
                Some(expected) => assert_eq!(store.pop().unwrap(), expected),
                None => assert_eq!(store.pop(), Err(StoreError::Empty)),
            },
            6 => {
                // Stable sort on both sides needs distinct keys: (species, position in model).
                let mut keys: Vec<(u16, usize)> = store
                    .column::<Species, _>()
                    .iter()
                    .copied()
                    .zip(0..)
                    .collect();
                store.sort_by_key(&mut keys).unwrap();
                model.sort_by_key(|p| *p.get::<Species, _>());
            }
            7 => {
                let removed = store.retain_alive();
                let before = model.len();
                model.retain(|p| p.alive);
                assert_eq!(removed, before - model.len());
            }
            _ => {
                if !model.is_empty() {
                    let index = rng.gen_range(0..model.len());
                    let radius = rng.gen::<f64>();
                    *store.get_mut(index).unwrap().get_mut::<Radius, _>() = radius;
                    *model[index].get_mut::<Radius, _>() = radius;
                }
            }
        }
        assert_matches(&store, &model);
    }

    let max_id = model.iter().map(|p| p.id).max();
    if let Some(max_id) = max_id {
        assert!(store.next_id() > max_id);
    }
}

#[test]
fn test_random_mutations_sequential() {
    for seed in [1, 7, 42] {
        run_mutations::<Sequential>(seed);
    }
}

#[test]
fn test_random_mutations_parallel() {
    for seed in [3, 11] {
        run_mutations::<Parallel>(seed);
    }
}

#[test]
fn test_backends_agree_on_sort() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let particles: Vec<Record> = (0..20_000).map(|_| random_particle(&mut rng)).collect();

    let mut sequential = Store::<Sequential>::new();
    sequential.insert_iter(0, particles.clone()).unwrap();
    let mut parallel = Store::<Parallel>::new();
    parallel.insert_iter(0, particles).unwrap();

    let mut keys: Vec<(u16, u64)> = sequential
        .column::<Species, _>()
        .iter()
        .copied()
        .zip(0..)
        .collect();
    let mut parallel_keys = keys.clone();
    sequential.sort_by_key(&mut keys).unwrap();
    parallel.sort_by_key(&mut parallel_keys).unwrap();

    assert_eq!(keys, parallel_keys);
    assert_eq!(sequential.ids(), parallel.ids());
    assert_eq!(sequential.column::<Label, _>(), parallel.column::<Label, _>());
}
