//! # Particle Storage
//!
//! The entity store and everything needed to declare and view its fields.
//!
//! ## Layout
//!
//! ```text
//!  index:      0      1      2     ...
//!  position  [ p0 ][ p1 ][ p2 ]    mandatory
//!  id        [ i0 ][ i1 ][ i2 ]    mandatory
//!  alive     [ a0 ][ a1 ][ a2 ]    mandatory
//!  F0        [ .. ][ .. ][ .. ]    user fields, declaration order
//!  F1        [ .. ][ .. ][ .. ]
//! ```
//!
//! Every column has the same length at every observable point.

mod field;
mod store;
mod view;

pub use field::{Alive, At0, At1, At2, At3, At4, At5, At6, At7, Field, FieldList, Id, Position, Select};
pub use store::Particles;
pub use view::{Iter, IterMut, Particle, ParticleMut, ParticleRef, ParticlesSlice, ParticlesSliceMut};
