//! # Field Declarations
//!
//! A field is a zero-sized marker type naming one column and fixing its
//! element type. User fields are grouped in a tuple (`(Radius, Mass)`),
//! and [`FieldList`] is implemented for tuples of up to eight markers.
//!
//! Every per-column operation below is expanded by `impl_field_list!` into
//! one statement per field, so a fan-out over N fields is N straight-line
//! calls with no runtime loop over the field count.

use crate::backend::Backend;
use crate::column::{Column, Element};
use crate::error::{StoreError, StoreResult};

use swarm_shared::Vector;

/// A named, typed column of the particle store.
///
/// Declare user fields with [`particle_field!`](crate::particle_field).
pub trait Field: 'static {
    /// Element type stored for every particle.
    type Value: Element;

    /// Column name, used by export consumers.
    const NAME: &'static str;
}

/// Declares a field marker type.
///
/// ```rust,ignore
/// particle_field!(
///     /// Sphere radius.
///     pub Radius: f64 = "radius"
/// );
/// ```
#[macro_export]
macro_rules! particle_field {
    ($(#[$meta:meta])* $vis:vis $name:ident : $ty:ty = $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::Field for $name {
            type Value = $ty;
            const NAME: &'static str = $label;
        }
    };
}

/// Mandatory position field, a `D`-dimensional double vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position<const D: usize>;

impl<const D: usize> Field for Position<D> {
    type Value = Vector<f64, D>;
    const NAME: &'static str = "position";
}

/// Mandatory identifier field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Id;

impl Field for Id {
    type Value = u64;
    const NAME: &'static str = "id";
}

/// Mandatory liveness flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alive;

impl Field for Alive {
    type Value = bool;
    const NAME: &'static str = "alive";
}

/// Reserves room for `additional` elements in one column, naming the field
/// on failure.
pub(crate) fn reserve_column<T: Element, C: Column<T>>(
    column: &mut C,
    field: &'static str,
    additional: usize,
) -> StoreResult<()> {
    column
        .try_reserve(additional)
        .map_err(|_| StoreError::AllocationFailed { field, additional })
}

/// An ordered list of user fields and the per-column fan-out over it.
///
/// The associated types are tuples with one entry per field, in
/// declaration order. Implemented for `()` and tuples of up to eight
/// [`Field`] markers.
pub trait FieldList: 'static {
    /// Number of fields in the list.
    const COUNT: usize;

    /// One owned value per field.
    type Values: Clone + Default + std::fmt::Debug + PartialEq + Send + Sync;

    /// One column per field, as chosen by backend `B`.
    type Columns<B: Backend>: Default + Send + Sync;

    /// One shared reference per field.
    type Refs<'a>: Copy;

    /// One exclusive reference per field.
    type Muts<'a>;

    /// One shared slice per field.
    type Slices<'a>: Copy + Send + Sync;

    /// One exclusive slice per field.
    type SlicesMut<'a>: Send;

    /// One slice iterator per field.
    type Iters<'a>;

    /// One mutable slice iterator per field.
    type IterMuts<'a>;

    /// Appends the field names in declaration order.
    fn push_names(names: &mut Vec<&'static str>);

    /// Columns of `len` default values.
    fn with_len<B: Backend>(len: usize) -> Self::Columns<B>;

    /// Reserves room in every column. Stops at the first failure; lengths
    /// are never changed.
    ///
    /// # Errors
    ///
    /// [`StoreError::AllocationFailed`] naming the column that could not grow.
    fn try_reserve<B: Backend>(columns: &mut Self::Columns<B>, additional: usize) -> StoreResult<()>;

    /// Whether every column holds exactly `len` elements.
    fn all_len<B: Backend>(columns: &Self::Columns<B>, len: usize) -> bool;

    /// Appends one value to every column.
    fn push<B: Backend>(columns: &mut Self::Columns<B>, values: Self::Values);

    /// Removes the last value of every column.
    fn pop<B: Backend>(columns: &mut Self::Columns<B>) -> Option<Self::Values>;

    /// Inserts one value into every column at `index`.
    fn insert<B: Backend>(columns: &mut Self::Columns<B>, index: usize, values: Self::Values);

    /// Inserts `n` copies into every column at `index`.
    fn insert_n<B: Backend>(columns: &mut Self::Columns<B>, index: usize, n: usize, values: &Self::Values);

    /// Inserts a run of records into every column at `index`.
    fn insert_many<B: Backend>(columns: &mut Self::Columns<B>, index: usize, values: Vec<Self::Values>);

    /// Shortens every column to `len`.
    fn truncate<B: Backend>(columns: &mut Self::Columns<B>, len: usize);

    /// Empties every column.
    fn clear<B: Backend>(columns: &mut Self::Columns<B>);

    /// Reorders every column with backend `P` so new entry `k` is old entry
    /// `order[k]`.
    fn permute<B: Backend, P: Backend>(columns: &mut Self::Columns<B>, order: &[usize]);

    /// References to entry `index` of every column.
    fn muts<B: Backend>(columns: &mut Self::Columns<B>, index: usize) -> Self::Muts<'_>;

    /// Every column as a slice.
    fn slices<B: Backend>(columns: &Self::Columns<B>) -> Self::Slices<'_>;

    /// Every column as a mutable slice.
    fn slices_mut<B: Backend>(columns: &mut Self::Columns<B>) -> Self::SlicesMut<'_>;

    /// Entry `index` of every slice.
    fn slice_refs(slices: Self::Slices<'_>, index: usize) -> Self::Refs<'_>;

    /// Splits every slice at `mid`.
    fn split_slices(slices: Self::Slices<'_>, mid: usize) -> (Self::Slices<'_>, Self::Slices<'_>);

    /// Splits every mutable slice at `mid`.
    fn split_slices_mut(slices: Self::SlicesMut<'_>, mid: usize) -> (Self::SlicesMut<'_>, Self::SlicesMut<'_>);

    /// Starts a lock-step walk over every slice.
    fn iters(slices: Self::Slices<'_>) -> Self::Iters<'_>;

    /// Advances every iterator by one.
    fn next<'a>(iters: &mut Self::Iters<'a>) -> Option<Self::Refs<'a>>;

    /// Starts a lock-step mutable walk over every slice.
    fn iter_muts(slices: Self::SlicesMut<'_>) -> Self::IterMuts<'_>;

    /// Advances every mutable iterator by one.
    fn next_mut<'a>(iters: &mut Self::IterMuts<'a>) -> Option<Self::Muts<'a>>;

    /// Copies referenced values out.
    fn to_values(refs: Self::Refs<'_>) -> Self::Values;

    /// Copies values out through exclusive references.
    fn muts_to_values(muts: &Self::Muts<'_>) -> Self::Values;

    /// Overwrites every referenced value.
    fn assign(muts: &mut Self::Muts<'_>, values: Self::Values);
}

/// Projection of field `F` out of a field list, at position marker `I`.
///
/// `I` is inferred: `view.get::<Radius, _>()`. A field missing from the
/// list, or listed twice, fails to compile.
pub trait Select<F: Field, I>: FieldList {
    /// The field's column as a slice.
    fn column<B: Backend>(columns: &Self::Columns<B>) -> &[F::Value];

    /// The field's column as a mutable slice.
    fn column_mut<B: Backend>(columns: &mut Self::Columns<B>) -> &mut [F::Value];

    /// The field's slice out of a zipped slice set.
    fn slice<'a>(slices: &Self::Slices<'a>) -> &'a [F::Value];

    /// The field's reference out of an entity view.
    fn get<'a>(refs: &Self::Refs<'a>) -> &'a F::Value;

    /// Shared access through a mutable entity view.
    fn get_in<'b, 'a: 'b>(muts: &'b Self::Muts<'a>) -> &'b F::Value;

    /// Exclusive access through a mutable entity view.
    fn get_mut<'b, 'a: 'b>(muts: &'b mut Self::Muts<'a>) -> &'b mut F::Value;

    /// The field's value in an owned record.
    fn value(values: &Self::Values) -> &F::Value;

    /// The field's value in an owned record, mutably.
    fn value_mut(values: &mut Self::Values) -> &mut F::Value;
}

/// Position marker for the first field of a list.
#[derive(Clone, Copy, Debug)]
pub struct At0;
/// Position marker for the second field.
#[derive(Clone, Copy, Debug)]
pub struct At1;
/// Position marker for the third field.
#[derive(Clone, Copy, Debug)]
pub struct At2;
/// Position marker for the fourth field.
#[derive(Clone, Copy, Debug)]
pub struct At3;
/// Position marker for the fifth field.
#[derive(Clone, Copy, Debug)]
pub struct At4;
/// Position marker for the sixth field.
#[derive(Clone, Copy, Debug)]
pub struct At5;
/// Position marker for the seventh field.
#[derive(Clone, Copy, Debug)]
pub struct At6;
/// Position marker for the eighth field.
#[derive(Clone, Copy, Debug)]
pub struct At7;

macro_rules! impl_select {
    (@one [$($All:ident),*]; $F:ident $idx:tt $At:ident) => {
        impl<$($All: Field),*> Select<$F, $At> for ($($All,)*) {
            #[inline]
            fn column<B: Backend>(columns: &Self::Columns<B>) -> &[$F::Value] {
                &columns.$idx
            }

            #[inline]
            fn column_mut<B: Backend>(columns: &mut Self::Columns<B>) -> &mut [$F::Value] {
                &mut columns.$idx
            }

            #[inline]
            fn slice<'a>(slices: &Self::Slices<'a>) -> &'a [$F::Value] {
                slices.$idx
            }

            #[inline]
            fn get<'a>(refs: &Self::Refs<'a>) -> &'a $F::Value {
                refs.$idx
            }

            #[inline]
            fn get_in<'b, 'a: 'b>(muts: &'b Self::Muts<'a>) -> &'b $F::Value {
                &*muts.$idx
            }

            #[inline]
            fn get_mut<'b, 'a: 'b>(muts: &'b mut Self::Muts<'a>) -> &'b mut $F::Value {
                &mut *muts.$idx
            }

            #[inline]
            fn value(values: &Self::Values) -> &$F::Value {
                &values.$idx
            }

            #[inline]
            fn value_mut(values: &mut Self::Values) -> &mut $F::Value {
                &mut values.$idx
            }
        }
    };
    ($all:tt; $($F:ident $idx:tt $At:ident),*) => {
        $( impl_select!(@one $all; $F $idx $At); )*
    };
}

macro_rules! impl_field_list {
    ($count:expr; $($F:ident $idx:tt $At:ident),*) => {
        #[allow(unused_variables, unused_mut, clippy::unused_unit, clippy::let_unit_value)]
        impl<$($F: Field),*> FieldList for ($($F,)*) {
            const COUNT: usize = $count;

            type Values = ($($F::Value,)*);
            type Columns<B: Backend> = ($(B::Column<$F::Value>,)*);
            type Refs<'a> = ($(&'a $F::Value,)*);
            type Muts<'a> = ($(&'a mut $F::Value,)*);
            type Slices<'a> = ($(&'a [$F::Value],)*);
            type SlicesMut<'a> = ($(&'a mut [$F::Value],)*);
            type Iters<'a> = ($(std::slice::Iter<'a, $F::Value>,)*);
            type IterMuts<'a> = ($(std::slice::IterMut<'a, $F::Value>,)*);

            fn push_names(names: &mut Vec<&'static str>) {
                $( names.push($F::NAME); )*
            }

            fn with_len<B: Backend>(len: usize) -> Self::Columns<B> {
                ($(<B::Column<$F::Value> as Column<$F::Value>>::with_len(len),)*)
            }

            fn try_reserve<B: Backend>(columns: &mut Self::Columns<B>, additional: usize) -> StoreResult<()> {
                $( reserve_column(&mut columns.$idx, $F::NAME, additional)?; )*
                Ok(())
            }

            fn all_len<B: Backend>(columns: &Self::Columns<B>, len: usize) -> bool {
                true $( && columns.$idx.len() == len )*
            }

            fn push<B: Backend>(columns: &mut Self::Columns<B>, values: Self::Values) {
                $( columns.$idx.push(values.$idx); )*
            }

            fn pop<B: Backend>(columns: &mut Self::Columns<B>) -> Option<Self::Values> {
                // Pop every column before looking at the results so a short
                // column can never leave the others one element longer.
                let popped = ($(columns.$idx.pop(),)*);
                Some(($(popped.$idx?,)*))
            }

            fn insert<B: Backend>(columns: &mut Self::Columns<B>, index: usize, values: Self::Values) {
                $( Column::insert(&mut columns.$idx, index, values.$idx); )*
            }

            fn insert_n<B: Backend>(columns: &mut Self::Columns<B>, index: usize, n: usize, values: &Self::Values) {
                $( columns.$idx.insert_n(index, n, &values.$idx); )*
            }

            fn insert_many<B: Backend>(columns: &mut Self::Columns<B>, index: usize, values: Vec<Self::Values>) {
                let mut split = ($(Vec::<$F::Value>::with_capacity(values.len()),)*);
                for value in values {
                    $( split.$idx.push(value.$idx); )*
                }
                $( columns.$idx.insert_vec(index, split.$idx); )*
            }

            fn truncate<B: Backend>(columns: &mut Self::Columns<B>, len: usize) {
                $( Column::truncate(&mut columns.$idx, len); )*
            }

            fn clear<B: Backend>(columns: &mut Self::Columns<B>) {
                $( Column::clear(&mut columns.$idx); )*
            }

            fn permute<B: Backend, P: Backend>(columns: &mut Self::Columns<B>, order: &[usize]) {
                $(
                    let gathered = P::gather(&columns.$idx[..], order);
                    columns.$idx.replace(gathered);
                )*
            }

            fn muts<B: Backend>(columns: &mut Self::Columns<B>, index: usize) -> Self::Muts<'_> {
                ($(&mut columns.$idx[index],)*)
            }

            fn slices<B: Backend>(columns: &Self::Columns<B>) -> Self::Slices<'_> {
                ($(&columns.$idx[..],)*)
            }

            fn slices_mut<B: Backend>(columns: &mut Self::Columns<B>) -> Self::SlicesMut<'_> {
                ($(&mut columns.$idx[..],)*)
            }

            fn slice_refs(slices: Self::Slices<'_>, index: usize) -> Self::Refs<'_> {
                ($(&slices.$idx[index],)*)
            }

            fn split_slices(slices: Self::Slices<'_>, mid: usize) -> (Self::Slices<'_>, Self::Slices<'_>) {
                let halves = ($(slices.$idx.split_at(mid),)*);
                (($(halves.$idx.0,)*), ($(halves.$idx.1,)*))
            }

            fn split_slices_mut(slices: Self::SlicesMut<'_>, mid: usize) -> (Self::SlicesMut<'_>, Self::SlicesMut<'_>) {
                let halves = ($(slices.$idx.split_at_mut(mid),)*);
                (($(halves.$idx.0,)*), ($(halves.$idx.1,)*))
            }

            fn iters(slices: Self::Slices<'_>) -> Self::Iters<'_> {
                ($(slices.$idx.iter(),)*)
            }

            fn next<'a>(iters: &mut Self::Iters<'a>) -> Option<Self::Refs<'a>> {
                Some(($(iters.$idx.next()?,)*))
            }

            fn iter_muts(slices: Self::SlicesMut<'_>) -> Self::IterMuts<'_> {
                ($(slices.$idx.iter_mut(),)*)
            }

            fn next_mut<'a>(iters: &mut Self::IterMuts<'a>) -> Option<Self::Muts<'a>> {
                Some(($(iters.$idx.next()?,)*))
            }

            fn to_values(refs: Self::Refs<'_>) -> Self::Values {
                ($((*refs.$idx).clone(),)*)
            }

            fn muts_to_values(muts: &Self::Muts<'_>) -> Self::Values {
                ($((*muts.$idx).clone(),)*)
            }

            fn assign(muts: &mut Self::Muts<'_>, values: Self::Values) {
                $( *muts.$idx = values.$idx; )*
            }
        }

        impl_select!([$($F),*]; $($F $idx $At),*);
    };
}

impl_field_list!(0;);
impl_field_list!(1; F0 0 At0);
impl_field_list!(2; F0 0 At0, F1 1 At1);
impl_field_list!(3; F0 0 At0, F1 1 At1, F2 2 At2);
impl_field_list!(4; F0 0 At0, F1 1 At1, F2 2 At2, F3 3 At3);
impl_field_list!(5; F0 0 At0, F1 1 At1, F2 2 At2, F3 3 At3, F4 4 At4);
impl_field_list!(6; F0 0 At0, F1 1 At1, F2 2 At2, F3 3 At3, F4 4 At4, F5 5 At5);
impl_field_list!(7; F0 0 At0, F1 1 At1, F2 2 At2, F3 3 At3, F4 4 At4, F5 5 At5, F6 6 At6);
impl_field_list!(8; F0 0 At0, F1 1 At1, F2 2 At2, F3 3 At3, F4 4 At4, F5 5 At5, F6 6 At6, F7 7 At7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Sequential;

    crate::particle_field!(Radius: f64 = "radius");
    crate::particle_field!(Charge: i32 = "charge");

    type Fields = (Radius, Charge);
    type Columns = <Fields as FieldList>::Columns<Sequential>;

    #[test]
    fn test_field_names() {
        let mut names = Vec::new();
        Fields::push_names(&mut names);
        assert_eq!(names, vec!["radius", "charge"]);
        assert_eq!(<Fields as FieldList>::COUNT, 2);
        assert_eq!(<() as FieldList>::COUNT, 0);
    }

    #[test]
    fn test_fan_out_keeps_columns_aligned() {
        let mut columns = Columns::default();
        Fields::push::<Sequential>(&mut columns, (1.0, 1));
        Fields::push::<Sequential>(&mut columns, (2.0, 2));
        Fields::insert::<Sequential>(&mut columns, 0, (0.5, 0));
        Fields::insert_n::<Sequential>(&mut columns, 3, 2, &(9.0, 9));
        assert!(Fields::all_len::<Sequential>(&columns, 5));
        assert_eq!(columns.1, vec![0, 1, 2, 9, 9]);

        assert_eq!(Fields::pop::<Sequential>(&mut columns), Some((9.0, 9)));
        Fields::truncate::<Sequential>(&mut columns, 1);
        assert!(Fields::all_len::<Sequential>(&columns, 1));
    }

    #[test]
    fn test_select_by_name() {
        let mut values: <Fields as FieldList>::Values = (1.5, -3);
        assert_eq!(*<Fields as Select<Charge, _>>::value(&values), -3);
        *<Fields as Select<Radius, _>>::value_mut(&mut values) = 4.0;
        assert_eq!(values.0, 4.0);
    }

    #[test]
    fn test_lock_step_iteration() {
        let mut columns = Columns::default();
        Fields::insert_many::<Sequential>(&mut columns, 0, vec![(1.0, 10), (2.0, 20)]);

        let mut iters = Fields::iters(Fields::slices::<Sequential>(&columns));
        let first = Fields::next(&mut iters).unwrap();
        assert_eq!(Fields::to_values(first), (1.0, 10));
        let second = Fields::next(&mut iters).unwrap();
        assert_eq!(*second.1, 20);
        assert!(Fields::next(&mut iters).is_none());
    }
}
