//! # Backend Algorithm Capability
//!
//! The fixed set of bulk primitives every execution backend provides.
//!
//! ## Design Philosophy
//!
//! - A backend is a zero-sized type chosen at compile time; there is no
//!   runtime switch and no backend state
//! - Every primitive has the same observable result on every backend
//! - Only the execution differs: [`Sequential`] loops on the calling thread,
//!   [`Parallel`] hands the whole call to rayon and blocks until it is done
//!
//! ```text
//!            Backend (trait, associated functions only)
//!               │
//!      ┌────────┴─────────┐
//!      ▼                  ▼
//!  Sequential          Parallel
//!  (iterator loops)    (rayon join / par_iter)
//! ```
//!
//! ## Preconditions
//!
//! Input and output slices of one call must have matching lengths. A
//! mismatch is a caller bug and panics. Failures that depend on the data
//! itself (scatter collisions, compaction overflow) come back as
//! [`AlgorithmError`] and leave the output untouched.

mod parallel;
mod sequential;

pub use parallel::{Parallel, MIN_SPLIT_LEN, SCAN_BLOCK_LEN};
pub use sequential::Sequential;

use crate::column::{Column, Element};
use crate::error::AlgorithmError;

/// Execution strategy for the bulk primitives.
///
/// Implementations only differ in how the work is scheduled. Operations
/// whose element functions are free of cross-element ordering
/// dependencies may run in any order; [`copy_if`](Backend::copy_if) is the
/// one primitive that guarantees the relative order of its output.
pub trait Backend: Copy + Default + std::fmt::Debug + Send + Sync + 'static {
    /// Human-readable backend name.
    const NAME: &'static str;

    /// Concrete column type this backend stores a field of type `T` in.
    type Column<T: Element>: Column<T>;

    /// Applies `f` to every item of `range`.
    ///
    /// `range` may be a plain slice or a zipped multi-column range. Returns
    /// `f` back to the caller.
    fn for_each<P, F>(range: P, f: F) -> F
    where
        P: Partition,
        F: Fn(P::Item) + Send + Sync;

    /// Sorts `keys` ascending and applies the same permutation to `data`.
    ///
    /// Stability is not guaranteed. `data` may be a single column or a whole
    /// particle store.
    ///
    /// # Panics
    ///
    /// Panics if `data` does not have one entry per key.
    fn sort_by_key<K, P>(keys: &mut [K], data: &mut P)
    where
        K: Ord + Copy + Send + Sync,
        P: Permute + ?Sized;

    /// For each value, writes the index of the first element of `sorted`
    /// that is not less than it.
    ///
    /// # Panics
    ///
    /// Panics if `result` and `values` differ in length.
    fn lower_bound<T>(sorted: &[T], values: &[T], result: &mut [usize])
    where
        T: Ord + Sync;

    /// For each value, writes the index of the first element of `sorted`
    /// that is strictly greater than it.
    ///
    /// # Panics
    ///
    /// Panics if `result` and `values` differ in length.
    fn upper_bound<T>(sorted: &[T], values: &[T], result: &mut [usize])
    where
        T: Ord + Sync;

    /// Folds `input` into `init` with `op`.
    ///
    /// `op` must be associative; the grouping is up to the backend.
    fn reduce<T, Op>(input: &[T], init: T, op: Op) -> T
    where
        T: Clone + Send + Sync,
        Op: Fn(T, T) -> T + Send + Sync;

    /// Writes `op(input[k])` to `output[k]`.
    ///
    /// # Panics
    ///
    /// Panics if `input` and `output` differ in length.
    fn transform<T, U, Op>(input: &[T], output: &mut [U], op: Op)
    where
        T: Sync,
        U: Send,
        Op: Fn(&T) -> U + Send + Sync;

    /// Writes `op(k)` to `output[k]`.
    fn tabulate<T, Op>(output: &mut [T], op: Op)
    where
        T: Send,
        Op: Fn(usize) -> T + Send + Sync;

    /// Writes `0, 1, 2, ...` to `output`.
    fn sequence<T: Countable>(output: &mut [T]) {
        Self::tabulate(output, T::from_index);
    }

    /// Exclusive prefix scan of `unary` over `input`, seeded with `init`.
    ///
    /// `output[0] = init` and `output[k] = binary(output[k - 1],
    /// unary(&input[k - 1]))`. Returns the combination over the whole
    /// input. `binary` must be associative.
    ///
    /// # Panics
    ///
    /// Panics if `input` and `output` differ in length.
    fn transform_exclusive_scan<T, U, Un, Bin>(
        input: &[T],
        output: &mut [U],
        unary: Un,
        init: U,
        binary: Bin,
    ) -> U
    where
        T: Sync,
        U: Clone + Send + Sync,
        Un: Fn(&T) -> U + Send + Sync,
        Bin: Fn(U, U) -> U + Send + Sync;

    /// Writes `output[map[k]] = input[k]` for every `k` where
    /// `pred(&stencil[k])` holds.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::ScatterOutOfBounds`] or
    /// [`AlgorithmError::ScatterCollision`] when the selected targets are not
    /// distinct in-range indices. `output` is unchanged in that case.
    ///
    /// # Panics
    ///
    /// Panics if `map` or `stencil` differ in length from `input`.
    fn scatter_if<T, S, P>(
        input: &[T],
        map: &[usize],
        stencil: &[S],
        output: &mut [T],
        pred: P,
    ) -> Result<(), AlgorithmError>
    where
        T: Clone + Send + Sync,
        S: Sync,
        P: Fn(&S) -> bool + Send + Sync;

    /// Copies the elements of `input` whose stencil passes `pred` to the
    /// front of `output`, preserving their relative order.
    ///
    /// Returns the number of elements written.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::OutputTooSmall`] without writing anything if
    /// `output` cannot hold every selected element.
    ///
    /// # Panics
    ///
    /// Panics if `stencil` differs in length from `input`.
    fn copy_if<T, S, P>(
        input: &[T],
        stencil: &[S],
        output: &mut [T],
        pred: P,
    ) -> Result<usize, AlgorithmError>
    where
        T: Clone + Send + Sync,
        S: Sync,
        P: Fn(&S) -> bool + Send + Sync;

    /// Returns `source[order[k]]` for every `k`.
    ///
    /// # Panics
    ///
    /// Panics if an index in `order` is out of range for `source`.
    fn gather<T>(source: &[T], order: &[usize]) -> Vec<T>
    where
        T: Clone + Send + Sync;
}

/// A range that can be cut in two and walked sequentially.
///
/// This is the lock-step cursor abstraction: a slice is a partition, and so
/// is a zipped set of column slices that splits every column at the same
/// index.
pub trait Partition: Sized + Send {
    /// What one step of the range yields.
    type Item;

    /// Sequential iterator over the whole range.
    type Iter: Iterator<Item = Self::Item>;

    /// Number of items.
    fn len(&self) -> usize;

    /// Whether the range has no items.
    fn is_empty(&self) -> bool {
        Partition::len(self) == 0
    }

    /// Splits into `[0, mid)` and `[mid, len)`.
    fn split(self, mid: usize) -> (Self, Self);

    /// Walks the range in order on the current thread.
    fn into_seq(self) -> Self::Iter;
}

impl<'a, T: Sync> Partition for &'a [T] {
    type Item = &'a T;
    type Iter = std::slice::Iter<'a, T>;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn split(self, mid: usize) -> (Self, Self) {
        <[T]>::split_at(self, mid)
    }

    #[inline]
    fn into_seq(self) -> Self::Iter {
        self.iter()
    }
}

impl<'a, T: Send> Partition for &'a mut [T] {
    type Item = &'a mut T;
    type Iter = std::slice::IterMut<'a, T>;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn split(self, mid: usize) -> (Self, Self) {
        <[T]>::split_at_mut(self, mid)
    }

    #[inline]
    fn into_seq(self) -> Self::Iter {
        self.iter_mut()
    }
}

/// Data that can be reordered by an index permutation.
///
/// Used as the payload of [`Backend::sort_by_key`].
pub trait Permute {
    /// Number of entries the permutation must cover.
    fn permute_len(&self) -> usize;

    /// Reorders so that new entry `k` is old entry `order[k]`.
    fn permute<B: Backend>(&mut self, order: &[usize]);
}

impl<T: Clone + Send + Sync> Permute for [T] {
    fn permute_len(&self) -> usize {
        self.len()
    }

    fn permute<B: Backend>(&mut self, order: &[usize]) {
        let gathered = B::gather(self, order);
        self.clone_from_slice(&gathered);
    }
}

impl<T: Clone + Send + Sync> Permute for Vec<T> {
    fn permute_len(&self) -> usize {
        self.len()
    }

    fn permute<B: Backend>(&mut self, order: &[usize]) {
        let gathered = B::gather(self.as_slice(), order);
        *self = gathered;
    }
}

/// Values [`Backend::sequence`] can count with.
pub trait Countable: Send {
    /// The value representing position `index`.
    fn from_index(index: usize) -> Self;
}

macro_rules! impl_countable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Countable for $ty {
                #[inline]
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss)]
                fn from_index(index: usize) -> Self {
                    index as $ty
                }
            }
        )*
    };
}

impl_countable!(u8, u16, u32, u64, usize, i32, i64, isize, f32, f64);

/// Panics with a uniform message when two ranges of one call disagree.
#[inline]
#[track_caller]
pub(crate) fn check_len(what: &str, expected: usize, found: usize) {
    assert!(
        expected == found,
        "{what}: expected {expected} elements, found {found}"
    );
}

/// Seeded sequential exclusive scan of one block. Returns the running value
/// after the last element.
#[inline]
pub(crate) fn scan_block<T, U, Un, Bin>(
    block: &[T],
    output: &mut [U],
    base: U,
    unary: &Un,
    binary: &Bin,
) -> U
where
    U: Clone,
    Un: Fn(&T) -> U,
    Bin: Fn(U, U) -> U,
{
    let mut running = base;
    for (slot, value) in output.iter_mut().zip(block) {
        let next = binary(running.clone(), unary(value));
        *slot = std::mem::replace(&mut running, next);
    }
    running
}
