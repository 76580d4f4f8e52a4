//! # Particle Store
//!
//! Structure-of-arrays entity storage: one column per field, all of the
//! same length, index `i` in every column describing entity `i`.
//!
//! Every length-changing operation reserves room in all columns first and
//! only then writes. A failed reservation returns
//! [`StoreError::AllocationFailed`] with every column untouched, so the
//! columns never disagree on their length.

use swarm_shared::Vector;

use super::field::{reserve_column, Alive, Field, FieldList, Id, Position, Select};
use super::view::{Iter, IterMut, Particle, ParticleMut, ParticleRef, ParticlesSlice, ParticlesSliceMut};
use crate::backend::{Backend, Permute, Sequential};
use crate::column::Column;
use crate::error::{StoreError, StoreResult};

/// Dynamically sized particle store.
///
/// # Type Parameters
///
/// * `L` - Tuple of user [`Field`] markers, e.g. `(Radius, Mass)`
/// * `D` - Spatial dimension of the position field
/// * `B` - Backend deciding column type and execution of bulk operations
///
/// # Example
///
/// ```rust,ignore
/// particle_field!(pub Weight: f64 = "weight");
///
/// let mut store: Particles<(Weight,), 2> = Particles::new();
/// store.push(Particle::new(Vec2::new([0.0, 1.0])).with_fields((0.5,)))?;
/// assert_eq!(*store.get(0)?.get::<Weight, _>(), 0.5);
/// ```
pub struct Particles<L: FieldList, const D: usize, B: Backend = Sequential> {
    position: B::Column<Vector<f64, D>>,
    id: B::Column<u64>,
    alive: B::Column<bool>,
    fields: L::Columns<B>,
    next_id: u64,
}

impl<L: FieldList, const D: usize, B: Backend> Particles<L, D, B> {
    /// Number of columns, mandatory ones included.
    pub const FIELD_COUNT: usize = 3 + L::COUNT;

    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Default::default(),
            id: Default::default(),
            alive: Default::default(),
            fields: Default::default(),
            next_id: 0,
        }
    }

    /// Creates a store of `len` default-initialised particles.
    ///
    /// Identifiers are `0..len` and every particle starts alive.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        let mut particles = Self {
            position: <B::Column<Vector<f64, D>> as Column<_>>::with_len(len),
            id: <B::Column<u64> as Column<_>>::with_len(len),
            alive: <B::Column<bool> as Column<_>>::with_len(len),
            fields: L::with_len::<B>(len),
            next_id: u64::try_from(len).unwrap_or(u64::MAX),
        };
        B::sequence(&mut particles.id[..]);
        let _ = B::for_each(&mut particles.alive[..], |alive: &mut bool| *alive = true);
        particles
    }

    /// Number of particles.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Whether the store holds no particles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Identifier the next [`push_position`](Self::push_position) assigns.
    #[inline]
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Column names in storage order: `position`, `id`, `alive`, then the
    /// user fields.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(Self::FIELD_COUNT);
        names.extend([Position::<D>::NAME, Id::NAME, Alive::NAME]);
        L::push_names(&mut names);
        names
    }

    /// Whether every column has the same length.
    ///
    /// Always true from outside the store; exposed for tests.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        let len = self.position.len();
        self.id.len() == len && self.alive.len() == len && L::all_len::<B>(&self.fields, len)
    }

    // ------------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------------

    /// View of particle `index`.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] if `index >= len()`.
    pub fn get(&self, index: usize) -> StoreResult<ParticleRef<'_, L, D>> {
        self.as_slice().get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Mutable view of particle `index`.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] if `index >= len()`.
    pub fn get_mut(&mut self, index: usize) -> StoreResult<ParticleMut<'_, L, D>> {
        self.check_index(index)?;
        Ok(ParticleMut {
            position: &mut self.position[index],
            id: &mut self.id[index],
            alive: &mut self.alive[index],
            fields: L::muts::<B>(&mut self.fields, index),
        })
    }

    /// Overwrites particle `index` in every column.
    ///
    /// # Errors
    ///
    /// [`StoreError::IndexOutOfRange`] if `index >= len()`.
    pub fn set(&mut self, index: usize, particle: Particle<L, D>) -> StoreResult<()> {
        let id = particle.id;
        self.get_mut(index)?.assign(particle);
        self.bump_next_id(id);
        Ok(())
    }

    /// Lock-step iterator over every particle.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, L, D> {
        self.as_slice().iter()
    }

    /// Lock-step mutable iterator over every particle.
    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, L, D> {
        self.as_slice_mut().into_iter_mut()
    }

    /// Every column, borrowed as one range.
    #[must_use]
    pub fn as_slice(&self) -> ParticlesSlice<'_, L, D> {
        ParticlesSlice {
            position: &self.position,
            id: &self.id,
            alive: &self.alive,
            fields: L::slices::<B>(&self.fields),
        }
    }

    /// Every column, mutably borrowed as one range.
    #[must_use]
    pub fn as_slice_mut(&mut self) -> ParticlesSliceMut<'_, L, D> {
        ParticlesSliceMut {
            position: &mut self.position,
            id: &mut self.id,
            alive: &mut self.alive,
            fields: L::slices_mut::<B>(&mut self.fields),
        }
    }

    // ------------------------------------------------------------------------
    // Column access
    // ------------------------------------------------------------------------

    /// Position column.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Vector<f64, D>] {
        &self.position
    }

    /// Mutable position column.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [Vector<f64, D>] {
        &mut self.position
    }

    /// Identifier column.
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[u64] {
        &self.id
    }

    /// Mutable identifier column.
    #[inline]
    pub fn ids_mut(&mut self) -> &mut [u64] {
        &mut self.id
    }

    /// Liveness column.
    #[inline]
    #[must_use]
    pub fn alive(&self) -> &[bool] {
        &self.alive
    }

    /// Mutable liveness column.
    #[inline]
    pub fn alive_mut(&mut self) -> &mut [bool] {
        &mut self.alive
    }

    /// Column of user field `F`.
    #[inline]
    pub fn column<F: Field, I>(&self) -> &[F::Value]
    where
        L: Select<F, I>,
    {
        L::column::<B>(&self.fields)
    }

    /// Mutable column of user field `F`.
    ///
    /// Only element values can change through the slice; lengths stay
    /// under the store's control.
    #[inline]
    pub fn column_mut<F: Field, I>(&mut self) -> &mut [F::Value]
    where
        L: Select<F, I>,
    {
        L::column_mut::<B>(&mut self.fields)
    }

    // ------------------------------------------------------------------------
    // Length-changing operations
    // ------------------------------------------------------------------------

    /// Removes every particle. Capacity is kept.
    pub fn clear(&mut self) {
        Column::clear(&mut self.position);
        Column::clear(&mut self.id);
        Column::clear(&mut self.alive);
        L::clear::<B>(&mut self.fields);
    }

    /// Appends one particle, keeping its identifier.
    ///
    /// # Errors
    ///
    /// [`StoreError::AllocationFailed`] if a column cannot grow; the store
    /// is unchanged.
    pub fn push(&mut self, particle: Particle<L, D>) -> StoreResult<()> {
        self.try_reserve(1)?;
        let Particle {
            position,
            id,
            alive,
            fields,
        } = particle;
        self.position.push(position);
        self.id.push(id);
        self.alive.push(alive);
        L::push::<B>(&mut self.fields, fields);
        self.bump_next_id(id);
        Ok(())
    }

    /// Appends a live particle at `position` with default user fields and a
    /// freshly assigned identifier, which is returned.
    ///
    /// # Errors
    ///
    /// [`StoreError::AllocationFailed`] if a column cannot grow.
    pub fn push_position(&mut self, position: Vector<f64, D>) -> StoreResult<u64> {
        let id = self.next_id;
        self.push(Particle::new(position).with_id(id))?;
        Ok(id)
    }

    /// Removes and returns the last particle.
    ///
    /// # Errors
    ///
    /// [`StoreError::Empty`] if there is nothing to remove.
    pub fn pop(&mut self) -> StoreResult<Particle<L, D>> {
        if self.is_empty() {
            return Err(StoreError::Empty);
        }
        let position = self.position.pop();
        let id = self.id.pop();
        let alive = self.alive.pop();
        let fields = L::pop::<B>(&mut self.fields);
        match (position, id, alive, fields) {
            (Some(position), Some(id), Some(alive), Some(fields)) => Ok(Particle {
                position,
                id,
                alive,
                fields,
            }),
            _ => Err(StoreError::Empty),
        }
    }

    /// Inserts one particle before position `index`.
    ///
    /// # Errors
    ///
    /// [`StoreError::InsertOutOfRange`] if `index > len()`, or
    /// [`StoreError::AllocationFailed`]; the store is unchanged on error.
    pub fn insert(&mut self, index: usize, particle: Particle<L, D>) -> StoreResult<()> {
        self.check_insert(index)?;
        self.try_reserve(1)?;
        let Particle {
            position,
            id,
            alive,
            fields,
        } = particle;
        Column::insert(&mut self.position, index, position);
        Column::insert(&mut self.id, index, id);
        Column::insert(&mut self.alive, index, alive);
        L::insert::<B>(&mut self.fields, index, fields);
        self.bump_next_id(id);
        Ok(())
    }

    /// Inserts `n` copies of `particle` before position `index`.
    ///
    /// # Errors
    ///
    /// [`StoreError::InsertOutOfRange`] if `index > len()`, or
    /// [`StoreError::AllocationFailed`]; the store is unchanged on error.
    pub fn insert_n(&mut self, index: usize, n: usize, particle: &Particle<L, D>) -> StoreResult<()> {
        self.check_insert(index)?;
        if n == 0 {
            return Ok(());
        }
        self.try_reserve(n)?;
        self.position.insert_n(index, n, &particle.position);
        self.id.insert_n(index, n, &particle.id);
        self.alive.insert_n(index, n, &particle.alive);
        L::insert_n::<B>(&mut self.fields, index, n, &particle.fields);
        self.bump_next_id(particle.id);
        Ok(())
    }

    /// Inserts a run of particles before position `index`, in iteration
    /// order.
    ///
    /// # Errors
    ///
    /// [`StoreError::InsertOutOfRange`] if `index > len()`, or
    /// [`StoreError::AllocationFailed`]; the store is unchanged on error.
    pub fn insert_iter<I>(&mut self, index: usize, particles: I) -> StoreResult<()>
    where
        I: IntoIterator<Item = Particle<L, D>>,
        I::IntoIter: ExactSizeIterator,
    {
        self.check_insert(index)?;
        let particles = particles.into_iter();
        let n = particles.len();
        self.try_reserve(n)?;

        let mut positions = Vec::with_capacity(n);
        let mut ids = Vec::with_capacity(n);
        let mut alive = Vec::with_capacity(n);
        let mut fields = Vec::with_capacity(n);
        for particle in particles {
            positions.push(particle.position);
            ids.push(particle.id);
            alive.push(particle.alive);
            fields.push(particle.fields);
        }

        if let Some(&max_id) = ids.iter().max() {
            self.bump_next_id(max_id);
        }
        self.position.insert_vec(index, positions);
        self.id.insert_vec(index, ids);
        self.alive.insert_vec(index, alive);
        L::insert_many::<B>(&mut self.fields, index, fields);
        Ok(())
    }

    /// Shortens the store to `len` particles. No effect if already shorter.
    pub fn truncate(&mut self, len: usize) {
        Column::truncate(&mut self.position, len);
        Column::truncate(&mut self.id, len);
        Column::truncate(&mut self.alive, len);
        L::truncate::<B>(&mut self.fields, len);
    }

    /// Reserves room for `additional` more particles in every column.
    ///
    /// # Errors
    ///
    /// [`StoreError::AllocationFailed`] naming the first column that could
    /// not grow. Lengths are never changed.
    pub fn try_reserve(&mut self, additional: usize) -> StoreResult<()> {
        reserve_column(&mut self.position, Position::<D>::NAME, additional)?;
        reserve_column(&mut self.id, Id::NAME, additional)?;
        reserve_column(&mut self.alive, Alive::NAME, additional)?;
        L::try_reserve::<B>(&mut self.fields, additional)
    }

    // ------------------------------------------------------------------------
    // Bulk operations
    // ------------------------------------------------------------------------

    /// Applies `f` to every particle through the backend.
    ///
    /// With [`Parallel`](crate::backend::Parallel) the calls run on the
    /// current rayon pool in unspecified order.
    pub fn for_each<F>(&mut self, f: F)
    where
        F: for<'p> Fn(ParticleMut<'p, L, D>) + Send + Sync,
    {
        let _ = B::for_each(self.as_slice_mut(), f);
    }

    /// Sorts the particles by `keys`, moving every column in lock step.
    ///
    /// `keys` must hold one key per particle and is left sorted.
    ///
    /// # Errors
    ///
    /// [`StoreError::LengthMismatch`] if `keys.len() != len()`.
    pub fn sort_by_key<K>(&mut self, keys: &mut [K]) -> StoreResult<()>
    where
        K: Ord + Copy + Send + Sync,
    {
        self.check_per_particle(keys.len())?;
        B::sort_by_key(keys, self);
        tracing::debug!("sorted {} particles by key on {} backend", self.len(), B::NAME);
        Ok(())
    }

    /// Reorders the particles so new particle `k` is old particle
    /// `order[k]`.
    ///
    /// # Errors
    ///
    /// [`StoreError::LengthMismatch`] if `order.len() != len()`, or
    /// [`StoreError::InvalidPermutation`] if `order` is not a permutation
    /// of `0..len()`. The store is unchanged on error.
    pub fn reorder(&mut self, order: &[usize]) -> StoreResult<()> {
        self.check_per_particle(order.len())?;
        let mut seen = vec![false; order.len()];
        for &index in order {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(StoreError::InvalidPermutation { index }),
            }
        }
        self.permute::<B>(order);
        tracing::debug!("reordered {} particles on {} backend", self.len(), B::NAME);
        Ok(())
    }

    /// Drops every particle whose liveness flag is false, keeping the
    /// relative order of the rest. Returns the number removed.
    ///
    /// # Panics
    ///
    /// Only if the backend's `copy_if` writes past a buffer sized for
    /// every particle.
    pub fn retain_alive(&mut self) -> usize {
        let len = self.len();
        let mut indices = vec![0_usize; len];
        B::sequence(&mut indices);

        let mut kept = vec![0_usize; len];
        // `kept` has a slot per particle, so the output can never be too small.
        let count = B::copy_if(&indices, &self.alive[..], &mut kept, |&alive| alive)
            .expect("retain buffer holds every particle");
        if count == len {
            return 0;
        }
        kept.truncate(count);
        self.permute::<B>(&kept);

        let removed = len - count;
        tracing::debug!("removed {} dead particles, {} remain", removed, count);
        removed
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn bump_next_id(&mut self, id: u64) {
        self.next_id = self.next_id.max(id.saturating_add(1));
    }

    fn check_index(&self, index: usize) -> StoreResult<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    fn check_insert(&self, index: usize) -> StoreResult<()> {
        if index <= self.len() {
            Ok(())
        } else {
            Err(StoreError::InsertOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    fn check_per_particle(&self, found: usize) -> StoreResult<()> {
        if found == self.len() {
            Ok(())
        } else {
            Err(StoreError::LengthMismatch {
                expected: self.len(),
                found,
            })
        }
    }
}

impl<L: FieldList, const D: usize, B: Backend> Permute for Particles<L, D, B> {
    fn permute_len(&self) -> usize {
        self.len()
    }

    /// Gathers every column by `order`. A shorter `order` shrinks the store
    /// to the selected particles.
    fn permute<P: Backend>(&mut self, order: &[usize]) {
        let position = P::gather(&self.position[..], order);
        self.position.replace(position);
        let id = P::gather(&self.id[..], order);
        self.id.replace(id);
        let alive = P::gather(&self.alive[..], order);
        self.alive.replace(alive);
        L::permute::<B, P>(&mut self.fields, order);
    }
}

impl<L: FieldList, const D: usize, B: Backend> Default for Particles<L, D, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: FieldList, const D: usize, B: Backend> Clone for Particles<L, D, B>
where
    B::Column<Vector<f64, D>>: Clone,
    B::Column<u64>: Clone,
    B::Column<bool>: Clone,
    L::Columns<B>: Clone,
{
    fn clone(&self) -> Self {
        Self {
            position: self.position.clone(),
            id: self.id.clone(),
            alive: self.alive.clone(),
            fields: self.fields.clone(),
            next_id: self.next_id,
        }
    }
}

impl<L: FieldList, const D: usize, B: Backend> std::fmt::Debug for Particles<L, D, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Particles")
            .field("backend", &B::NAME)
            .field("len", &self.len())
            .field("fields", &self.field_names())
            .finish_non_exhaustive()
    }
}

impl<'a, L: FieldList, const D: usize, B: Backend> IntoIterator for &'a Particles<L, D, B> {
    type Item = ParticleRef<'a, L, D>;
    type IntoIter = Iter<'a, L, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, L: FieldList, const D: usize, B: Backend> IntoIterator for &'a mut Particles<L, D, B> {
    type Item = ParticleMut<'a, L, D>;
    type IntoIter = IterMut<'a, L, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
