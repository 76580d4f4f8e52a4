//! # Sequential Backend
//!
//! Every primitive is a plain loop on the calling thread. This is the
//! reference semantics the parallel backend must reproduce.

use super::{check_len, scan_block, Backend, Partition, Permute};
use crate::error::AlgorithmError;

/// Host backend running every primitive on the calling thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Sequential;

impl Backend for Sequential {
    const NAME: &'static str = "sequential";

    type Column<T: crate::column::Element> = Vec<T>;

    #[inline]
    fn for_each<P, F>(range: P, f: F) -> F
    where
        P: Partition,
        F: Fn(P::Item) + Send + Sync,
    {
        range.into_seq().for_each(&f);
        f
    }

    fn sort_by_key<K, P>(keys: &mut [K], data: &mut P)
    where
        K: Ord + Copy + Send + Sync,
        P: Permute + ?Sized,
    {
        check_len("sort_by_key data", keys.len(), data.permute_len());

        let mut pairs: Vec<(K, usize)> = keys.iter().copied().zip(0..).collect();
        pairs.sort_unstable();

        for (key, &(sorted, _)) in keys.iter_mut().zip(&pairs) {
            *key = sorted;
        }
        let order: Vec<usize> = pairs.into_iter().map(|(_, index)| index).collect();
        data.permute::<Self>(&order);
    }

    fn lower_bound<T>(sorted: &[T], values: &[T], result: &mut [usize])
    where
        T: Ord + Sync,
    {
        check_len("lower_bound result", values.len(), result.len());
        for (slot, value) in result.iter_mut().zip(values) {
            *slot = sorted.partition_point(|x| x < value);
        }
    }

    fn upper_bound<T>(sorted: &[T], values: &[T], result: &mut [usize])
    where
        T: Ord + Sync,
    {
        check_len("upper_bound result", values.len(), result.len());
        for (slot, value) in result.iter_mut().zip(values) {
            *slot = sorted.partition_point(|x| x <= value);
        }
    }

    #[inline]
    fn reduce<T, Op>(input: &[T], init: T, op: Op) -> T
    where
        T: Clone + Send + Sync,
        Op: Fn(T, T) -> T + Send + Sync,
    {
        input.iter().cloned().fold(init, op)
    }

    fn transform<T, U, Op>(input: &[T], output: &mut [U], op: Op)
    where
        T: Sync,
        U: Send,
        Op: Fn(&T) -> U + Send + Sync,
    {
        check_len("transform output", input.len(), output.len());
        for (slot, value) in output.iter_mut().zip(input) {
            *slot = op(value);
        }
    }

    fn tabulate<T, Op>(output: &mut [T], op: Op)
    where
        T: Send,
        Op: Fn(usize) -> T + Send + Sync,
    {
        for (index, slot) in output.iter_mut().enumerate() {
            *slot = op(index);
        }
    }

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
        Bin: Fn(U, U) -> U + Send + Sync,
    {
        check_len("transform_exclusive_scan output", input.len(), output.len());
        scan_block(input, output, init, &unary, &binary)
    }

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
        P: Fn(&S) -> bool + Send + Sync,
    {
        check_len("scatter_if map", input.len(), map.len());
        check_len("scatter_if stencil", input.len(), stencil.len());

        // Validate every target before the first write.
        let len = output.len();
        let mut claimed = vec![false; len];
        for (element, (&target, flag)) in map.iter().zip(stencil).enumerate() {
            if !pred(flag) {
                continue;
            }
            let Some(slot) = claimed.get_mut(target) else {
                return Err(AlgorithmError::ScatterOutOfBounds { element, target, len });
            };
            if std::mem::replace(slot, true) {
                return Err(AlgorithmError::ScatterCollision { target });
            }
        }

        for ((value, &target), flag) in input.iter().zip(map).zip(stencil) {
            if pred(flag) {
                output[target] = value.clone();
            }
        }
        Ok(())
    }

    fn copy_if<T, S, P>(
        input: &[T],
        stencil: &[S],
        output: &mut [T],
        pred: P,
    ) -> Result<usize, AlgorithmError>
    where
        T: Clone + Send + Sync,
        S: Sync,
        P: Fn(&S) -> bool + Send + Sync,
    {
        check_len("copy_if stencil", input.len(), stencil.len());

        let required = stencil.iter().filter(|&flag| pred(flag)).count();
        if required > output.len() {
            return Err(AlgorithmError::OutputTooSmall {
                required,
                available: output.len(),
            });
        }

        let selected = input.iter().zip(stencil).filter(|&(_, flag)| pred(flag));
        for (slot, (value, _)) in output.iter_mut().zip(selected) {
            *slot = value.clone();
        }
        Ok(required)
    }

    fn gather<T>(source: &[T], order: &[usize]) -> Vec<T>
    where
        T: Clone + Send + Sync,
    {
        order.iter().map(|&index| source[index].clone()).collect()
    }
}
