//! # Particle Views
//!
//! [`Particle`] is an owned record, one value per column. [`ParticleRef`]
//! and [`ParticleMut`] borrow entry `i` of every column at once.
//! [`ParticlesSlice`] and [`ParticlesSliceMut`] borrow a range of entities
//! and are the [`Partition`] ranges handed to `Backend::for_each`.

use std::fmt;
use std::slice;

use swarm_shared::Vector;

use super::field::{Field, FieldList, Select};
use crate::backend::Partition;

// ============================================================================
// OWNED RECORD
// ============================================================================

/// One entity's values, detached from the store.
///
/// Used as the input of `push`/`insert` and the output of `pop`.
pub struct Particle<L: FieldList, const D: usize> {
    /// Position.
    pub position: Vector<f64, D>,
    /// Identifier.
    pub id: u64,
    /// Liveness flag.
    pub alive: bool,
    /// User field values, in declaration order.
    pub fields: L::Values,
}

impl<L: FieldList, const D: usize> Particle<L, D> {
    /// A live particle at `position` with id 0 and default user fields.
    #[must_use]
    pub fn new(position: Vector<f64, D>) -> Self {
        Self {
            position,
            id: 0,
            alive: true,
            fields: L::Values::default(),
        }
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Sets every user field.
    #[must_use]
    pub fn with_fields(mut self, fields: L::Values) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the liveness flag.
    #[must_use]
    pub fn with_alive(mut self, alive: bool) -> Self {
        self.alive = alive;
        self
    }

    /// Value of user field `F`.
    #[inline]
    pub fn get<F: Field, I>(&self) -> &F::Value
    where
        L: Select<F, I>,
    {
        L::value(&self.fields)
    }

    /// Mutable value of user field `F`.
    #[inline]
    pub fn get_mut<F: Field, I>(&mut self) -> &mut F::Value
    where
        L: Select<F, I>,
    {
        L::value_mut(&mut self.fields)
    }
}

impl<L: FieldList, const D: usize> Default for Particle<L, D> {
    fn default() -> Self {
        Self::new(Vector::default())
    }
}

impl<L: FieldList, const D: usize> Clone for Particle<L, D> {
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            id: self.id,
            alive: self.alive,
            fields: self.fields.clone(),
        }
    }
}

impl<L: FieldList, const D: usize> PartialEq for Particle<L, D> {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.id == other.id
            && self.alive == other.alive
            && self.fields == other.fields
    }
}

impl<L: FieldList, const D: usize> fmt::Debug for Particle<L, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("position", &self.position)
            .field("id", &self.id)
            .field("alive", &self.alive)
            .field("fields", &self.fields)
            .finish()
    }
}

// ============================================================================
// ENTITY VIEWS
// ============================================================================

/// Shared view of entry `i` of every column.
pub struct ParticleRef<'a, L: FieldList, const D: usize> {
    pub(crate) position: &'a Vector<f64, D>,
    pub(crate) id: &'a u64,
    pub(crate) alive: &'a bool,
    pub(crate) fields: L::Refs<'a>,
}

impl<L: FieldList, const D: usize> Clone for ParticleRef<'_, L, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: FieldList, const D: usize> Copy for ParticleRef<'_, L, D> {}

impl<'a, L: FieldList, const D: usize> ParticleRef<'a, L, D> {
    /// Position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> &'a Vector<f64, D> {
        self.position
    }

    /// Identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        *self.id
    }

    /// Liveness flag.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        *self.alive
    }

    /// Value of user field `F`.
    #[inline]
    pub fn get<F: Field, I>(&self) -> &'a F::Value
    where
        L: Select<F, I>,
    {
        L::get(&self.fields)
    }

    /// Copies the entity out.
    #[must_use]
    pub fn to_particle(&self) -> Particle<L, D> {
        Particle {
            position: *self.position,
            id: *self.id,
            alive: *self.alive,
            fields: L::to_values(self.fields),
        }
    }
}

/// Exclusive view of entry `i` of every column.
///
/// Writes go straight into the columns.
pub struct ParticleMut<'a, L: FieldList, const D: usize> {
    pub(crate) position: &'a mut Vector<f64, D>,
    pub(crate) id: &'a mut u64,
    pub(crate) alive: &'a mut bool,
    pub(crate) fields: L::Muts<'a>,
}

impl<L: FieldList, const D: usize> ParticleMut<'_, L, D> {
    /// Position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> &Vector<f64, D> {
        self.position
    }

    /// Mutable position.
    #[inline]
    pub fn position_mut(&mut self) -> &mut Vector<f64, D> {
        self.position
    }

    /// Identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        *self.id
    }

    /// Overwrites the identifier.
    #[inline]
    pub fn set_id(&mut self, id: u64) {
        *self.id = id;
    }

    /// Liveness flag.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        *self.alive
    }

    /// Sets the liveness flag.
    #[inline]
    pub fn set_alive(&mut self, alive: bool) {
        *self.alive = alive;
    }

    /// Value of user field `F`.
    #[inline]
    pub fn get<F: Field, I>(&self) -> &F::Value
    where
        L: Select<F, I>,
    {
        L::get_in(&self.fields)
    }

    /// Mutable value of user field `F`.
    #[inline]
    pub fn get_mut<F: Field, I>(&mut self) -> &mut F::Value
    where
        L: Select<F, I>,
    {
        L::get_mut(&mut self.fields)
    }

    /// Overwrites every column entry with `particle`.
    pub fn assign(&mut self, particle: Particle<L, D>) {
        *self.position = particle.position;
        *self.id = particle.id;
        *self.alive = particle.alive;
        L::assign(&mut self.fields, particle.fields);
    }

    /// Copies the entity out.
    #[must_use]
    pub fn to_particle(&self) -> Particle<L, D> {
        Particle {
            position: *self.position,
            id: *self.id,
            alive: *self.alive,
            fields: L::muts_to_values(&self.fields),
        }
    }
}

// ============================================================================
// ITERATORS
// ============================================================================

/// Lock-step iterator over every column.
pub struct Iter<'a, L: FieldList, const D: usize> {
    position: slice::Iter<'a, Vector<f64, D>>,
    id: slice::Iter<'a, u64>,
    alive: slice::Iter<'a, bool>,
    fields: L::Iters<'a>,
}

impl<'a, L: FieldList, const D: usize> Iterator for Iter<'a, L, D> {
    type Item = ParticleRef<'a, L, D>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        Some(ParticleRef {
            position: self.position.next()?,
            id: self.id.next()?,
            alive: self.alive.next()?,
            fields: L::next(&mut self.fields)?,
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.position.size_hint()
    }
}

impl<L: FieldList, const D: usize> ExactSizeIterator for Iter<'_, L, D> {}

/// Lock-step mutable iterator over every column.
pub struct IterMut<'a, L: FieldList, const D: usize> {
    position: slice::IterMut<'a, Vector<f64, D>>,
    id: slice::IterMut<'a, u64>,
    alive: slice::IterMut<'a, bool>,
    fields: L::IterMuts<'a>,
}

impl<'a, L: FieldList, const D: usize> Iterator for IterMut<'a, L, D> {
    type Item = ParticleMut<'a, L, D>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        Some(ParticleMut {
            position: self.position.next()?,
            id: self.id.next()?,
            alive: self.alive.next()?,
            fields: L::next_mut(&mut self.fields)?,
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.position.size_hint()
    }
}

impl<L: FieldList, const D: usize> ExactSizeIterator for IterMut<'_, L, D> {}

// ============================================================================
// SLICES
// ============================================================================

/// Shared borrow of a contiguous range of entities.
pub struct ParticlesSlice<'a, L: FieldList, const D: usize> {
    pub(crate) position: &'a [Vector<f64, D>],
    pub(crate) id: &'a [u64],
    pub(crate) alive: &'a [bool],
    pub(crate) fields: L::Slices<'a>,
}

impl<L: FieldList, const D: usize> Clone for ParticlesSlice<'_, L, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: FieldList, const D: usize> Copy for ParticlesSlice<'_, L, D> {}

impl<'a, L: FieldList, const D: usize> ParticlesSlice<'a, L, D> {
    /// Number of entities in the range.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Whether the range is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// View of entity `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<ParticleRef<'a, L, D>> {
        if index >= self.len() {
            return None;
        }
        Some(ParticleRef {
            position: &self.position[index],
            id: &self.id[index],
            alive: &self.alive[index],
            fields: L::slice_refs(self.fields, index),
        })
    }

    /// Positions in the range.
    #[must_use]
    pub fn positions(&self) -> &'a [Vector<f64, D>] {
        self.position
    }

    /// Identifiers in the range.
    #[must_use]
    pub fn ids(&self) -> &'a [u64] {
        self.id
    }

    /// User field `F` in the range.
    pub fn column<F: Field, I>(&self) -> &'a [F::Value]
    where
        L: Select<F, I>,
    {
        L::slice(&self.fields)
    }

    /// Lock-step iterator over the range.
    #[must_use]
    pub fn iter(&self) -> Iter<'a, L, D> {
        Iter {
            position: self.position.iter(),
            id: self.id.iter(),
            alive: self.alive.iter(),
            fields: L::iters(self.fields),
        }
    }
}

impl<'a, L: FieldList, const D: usize> Partition for ParticlesSlice<'a, L, D> {
    type Item = ParticleRef<'a, L, D>;
    type Iter = Iter<'a, L, D>;

    #[inline]
    fn len(&self) -> usize {
        self.position.len()
    }

    fn split(self, mid: usize) -> (Self, Self) {
        let (position_left, position_right) = self.position.split_at(mid);
        let (id_left, id_right) = self.id.split_at(mid);
        let (alive_left, alive_right) = self.alive.split_at(mid);
        let (fields_left, fields_right) = L::split_slices(self.fields, mid);
        (
            Self {
                position: position_left,
                id: id_left,
                alive: alive_left,
                fields: fields_left,
            },
            Self {
                position: position_right,
                id: id_right,
                alive: alive_right,
                fields: fields_right,
            },
        )
    }

    #[inline]
    fn into_seq(self) -> Self::Iter {
        self.iter()
    }
}

/// Exclusive borrow of a contiguous range of entities.
pub struct ParticlesSliceMut<'a, L: FieldList, const D: usize> {
    pub(crate) position: &'a mut [Vector<f64, D>],
    pub(crate) id: &'a mut [u64],
    pub(crate) alive: &'a mut [bool],
    pub(crate) fields: L::SlicesMut<'a>,
}

impl<'a, L: FieldList, const D: usize> ParticlesSliceMut<'a, L, D> {
    /// Number of entities in the range.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Whether the range is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Lock-step mutable iterator over the range.
    #[must_use]
    pub fn into_iter_mut(self) -> IterMut<'a, L, D> {
        IterMut {
            position: self.position.iter_mut(),
            id: self.id.iter_mut(),
            alive: self.alive.iter_mut(),
            fields: L::iter_muts(self.fields),
        }
    }
}

impl<'a, L: FieldList, const D: usize> Partition for ParticlesSliceMut<'a, L, D> {
    type Item = ParticleMut<'a, L, D>;
    type Iter = IterMut<'a, L, D>;

    #[inline]
    fn len(&self) -> usize {
        self.position.len()
    }

    fn split(self, mid: usize) -> (Self, Self) {
        let (position_left, position_right) = self.position.split_at_mut(mid);
        let (id_left, id_right) = self.id.split_at_mut(mid);
        let (alive_left, alive_right) = self.alive.split_at_mut(mid);
        let (fields_left, fields_right) = L::split_slices_mut(self.fields, mid);
        (
            Self {
                position: position_left,
                id: id_left,
                alive: alive_left,
                fields: fields_left,
            },
            Self {
                position: position_right,
                id: id_right,
                alive: alive_right,
                fields: fields_right,
            },
        )
    }

    #[inline]
    fn into_seq(self) -> Self::Iter {
        self.into_iter_mut()
    }
}
