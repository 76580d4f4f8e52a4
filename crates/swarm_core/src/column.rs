//! # Column Storage
//!
//! A column is the growable array holding one field for every particle.
//!
//! Each backend maps an element type to its concrete column type through
//! [`Backend::Column`](crate::backend::Backend::Column). The store only ever
//! talks to columns through the [`Column`] trait, so a backend with
//! device-resident memory can plug in its own array type.

use std::collections::TryReserveError;
use std::fmt::Debug;
use std::ops::{Deref, DerefMut};

use bytemuck::Pod;

/// Bound satisfied by every field value.
///
/// Values must be cheap to default-initialise (pre-sized stores), cloneable
/// (permutations gather by clone) and shareable across worker threads.
pub trait Element: Clone + Default + Debug + PartialEq + Send + Sync + 'static {}

impl<T> Element for T where T: Clone + Default + Debug + PartialEq + Send + Sync + 'static {}

/// Growable, randomly indexable array of one field.
///
/// Reads and in-place writes go through the slice the column derefs to.
/// Every length-changing method is listed here so the store can fan it out.
pub trait Column<T: Element>: Default + Deref<Target = [T]> + DerefMut + Send + Sync {
    /// Creates a column of `len` default values.
    fn with_len(len: usize) -> Self;

    /// Reserves room for `additional` more elements without changing the
    /// length.
    ///
    /// # Errors
    ///
    /// Returns the allocator's error when the capacity cannot grow.
    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError>;

    /// Number of elements the column can hold without reallocating.
    fn capacity(&self) -> usize;

    /// Appends one element.
    fn push(&mut self, value: T);

    /// Removes the last element.
    fn pop(&mut self) -> Option<T>;

    /// Inserts `value` at `index`, shifting later elements up.
    fn insert(&mut self, index: usize, value: T);

    /// Inserts `n` clones of `value` at `index`.
    fn insert_n(&mut self, index: usize, n: usize, value: &T);

    /// Inserts every element of `values` at `index`, in order.
    fn insert_vec(&mut self, index: usize, values: Vec<T>);

    /// Shortens the column to `len` elements.
    fn truncate(&mut self, len: usize);

    /// Removes every element.
    fn clear(&mut self);

    /// Grows or shrinks to `len`, filling new slots with `T::default()`.
    fn resize_default(&mut self, len: usize);

    /// Replaces the whole contents.
    fn replace(&mut self, values: Vec<T>);

    /// Raw bytes of a plain-old-data column.
    fn as_bytes(&self) -> &[u8]
    where
        T: Pod,
    {
        bytemuck::cast_slice(self.deref())
    }
}

impl<T: Element> Column<T> for Vec<T> {
    fn with_len(len: usize) -> Self {
        vec![T::default(); len]
    }

    #[inline]
    fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        Vec::try_reserve(self, additional)
    }

    #[inline]
    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    #[inline]
    fn push(&mut self, value: T) {
        Vec::push(self, value);
    }

    #[inline]
    fn pop(&mut self) -> Option<T> {
        Vec::pop(self)
    }

    #[inline]
    fn insert(&mut self, index: usize, value: T) {
        Vec::insert(self, index, value);
    }

    fn insert_n(&mut self, index: usize, n: usize, value: &T) {
        self.splice(index..index, std::iter::repeat(value).take(n).cloned());
    }

    fn insert_vec(&mut self, index: usize, values: Vec<T>) {
        self.splice(index..index, values);
    }

    #[inline]
    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn resize_default(&mut self, len: usize) {
        self.resize(len, T::default());
    }

    fn replace(&mut self, values: Vec<T>) {
        *self = values;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_insertions() {
        let mut column: Vec<u32> = Column::with_len(2);
        assert_eq!(column.as_slice(), &[0, 0]);

        Column::insert(&mut column, 1, 7);
        column.insert_n(0, 2, &5);
        column.insert_vec(5, vec![8, 9]);
        assert_eq!(column.as_slice(), &[5, 5, 0, 7, 0, 8, 9]);
    }

    #[test]
    fn test_column_reserve_keeps_length() {
        let mut column: Vec<f64> = Vec::new();
        Column::try_reserve(&mut column, 64).unwrap();
        assert!(Column::capacity(&column) >= 64);
        assert!(column.is_empty());
    }

    #[test]
    fn test_column_bytes() {
        let column: Vec<u16> = vec![1, 2];
        assert_eq!(Column::as_bytes(&column).len(), 4);
    }
}
