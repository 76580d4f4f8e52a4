//! # SWARM Core
//!
//! Structure-of-arrays particle storage with pluggable execution backends.
//!
//! - A particle store keeps one contiguous column per field, all of equal
//!   length, so bulk algorithms stream over plain slices
//! - A backend supplies the bulk primitives (sort-by-key, scans, scatter,
//!   compaction) and decides whether they run on one thread or on rayon
//! - Simulation code is written once against [`Backend`] and runs
//!   unchanged on [`Sequential`] or [`Parallel`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use swarm_core::{particle_field, Parallel, Particle, Particles, Vec2};
//!
//! particle_field!(pub Weight: f64 = "weight");
//!
//! let mut store: Particles<(Weight,), 2, Parallel> = Particles::new();
//! store.push(Particle::new(Vec2::new([0.0, 0.0])).with_fields((1.0,)))?;
//! store.for_each(|mut p| *p.get_mut::<Weight, _>() *= 2.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod column;
pub mod config;
pub mod error;
pub mod particles;

pub use backend::{Backend, Countable, Parallel, Partition, Permute, Sequential};
pub use column::{Column, Element};
pub use config::ParallelConfig;
pub use error::{AlgorithmError, ConfigError, StoreError, StoreResult};
pub use particles::{
    Alive, Field, FieldList, Id, Iter, IterMut, Particle, ParticleMut, ParticleRef, Particles,
    ParticlesSlice, ParticlesSliceMut, Position, Select,
};
pub use swarm_shared::{Vec2, Vec3, Vector};
