//! # Parallel Backend
//!
//! Every primitive is one bulk unit of work on the current rayon pool. The
//! call blocks until all workers are done, so from the caller's side it
//! behaves exactly like the sequential backend.
//!
//! Run inside `pool.install(...)` to use a pool built from
//! [`ParallelConfig`](crate::config::ParallelConfig); otherwise rayon's
//! global pool is used.

use rayon::prelude::*;

use super::{check_len, scan_block, Backend, Partition, Permute, Sequential};
use crate::error::AlgorithmError;

/// Ranges at or below this length are walked on one worker.
pub const MIN_SPLIT_LEN: usize = 1 << 10;

/// Block length of the two-pass parallel scan.
pub const SCAN_BLOCK_LEN: usize = 1 << 12;

/// Bulk-parallel backend on rayon's work-stealing pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Parallel;

/// Recursively halves `range` until it is small enough to walk in place.
fn split_for_each<P, F>(range: P, f: &F)
where
    P: Partition,
    F: Fn(P::Item) + Sync,
{
    let len = range.len();
    if len <= MIN_SPLIT_LEN {
        range.into_seq().for_each(f);
        return;
    }
    let (left, right) = range.split(len / 2);
    rayon::join(|| split_for_each(left, f), || split_for_each(right, f));
}

impl Backend for Parallel {
    const NAME: &'static str = "parallel";

    type Column<T: crate::column::Element> = Vec<T>;

    fn for_each<P, F>(range: P, f: F) -> F
    where
        P: Partition,
        F: Fn(P::Item) + Send + Sync,
    {
        split_for_each(range, &f);
        f
    }

    fn sort_by_key<K, P>(keys: &mut [K], data: &mut P)
    where
        K: Ord + Copy + Send + Sync,
        P: Permute + ?Sized,
    {
        check_len("sort_by_key data", keys.len(), data.permute_len());

        // Composite (key, origin) pairs sort as one flat array.
        let mut pairs: Vec<(K, usize)> = keys.par_iter().copied().zip(0..keys.len()).collect();
        pairs.par_sort_unstable();

        keys.par_iter_mut()
            .zip(pairs.par_iter())
            .for_each(|(key, &(sorted, _))| *key = sorted);
        let order: Vec<usize> = pairs.into_par_iter().map(|(_, index)| index).collect();
        data.permute::<Self>(&order);
    }

    fn lower_bound<T>(sorted: &[T], values: &[T], result: &mut [usize])
    where
        T: Ord + Sync,
    {
        check_len("lower_bound result", values.len(), result.len());
        result
            .par_iter_mut()
            .zip(values.par_iter())
            .for_each(|(slot, value)| *slot = sorted.partition_point(|x| x < value));
    }

    fn upper_bound<T>(sorted: &[T], values: &[T], result: &mut [usize])
    where
        T: Ord + Sync,
    {
        check_len("upper_bound result", values.len(), result.len());
        result
            .par_iter_mut()
            .zip(values.par_iter())
            .for_each(|(slot, value)| *slot = sorted.partition_point(|x| x <= value));
    }

    fn reduce<T, Op>(input: &[T], init: T, op: Op) -> T
    where
        T: Clone + Send + Sync,
        Op: Fn(T, T) -> T + Send + Sync,
    {
        match input.par_iter().cloned().reduce_with(|a, b| op(a, b)) {
            Some(total) => op(init, total),
            None => init,
        }
    }

    fn transform<T, U, Op>(input: &[T], output: &mut [U], op: Op)
    where
        T: Sync,
        U: Send,
        Op: Fn(&T) -> U + Send + Sync,
    {
        check_len("transform output", input.len(), output.len());
        output
            .par_iter_mut()
            .zip(input.par_iter())
            .for_each(|(slot, value)| *slot = op(value));
    }

    fn tabulate<T, Op>(output: &mut [T], op: Op)
    where
        T: Send,
        Op: Fn(usize) -> T + Send + Sync,
    {
        output
            .par_iter_mut()
            .enumerate()
            .for_each(|(index, slot)| *slot = op(index));
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
        if input.len() <= SCAN_BLOCK_LEN {
            return Sequential::transform_exclusive_scan(input, output, unary, init, binary);
        }

        // Pass 1: reduce every block independently.
        let block_totals: Vec<Option<U>> = input
            .par_chunks(SCAN_BLOCK_LEN)
            .map(|block| block.iter().map(&unary).reduce(&binary))
            .collect();

        // Scan the block totals to get each block's seed.
        let mut seeds = Vec::with_capacity(block_totals.len());
        let mut running = init;
        for total in block_totals {
            seeds.push(running.clone());
            if let Some(total) = total {
                running = binary(running, total);
            }
        }

        // Pass 2: seeded scan inside every block.
        output
            .par_chunks_mut(SCAN_BLOCK_LEN)
            .zip(input.par_chunks(SCAN_BLOCK_LEN))
            .zip(seeds.into_par_iter())
            .for_each(|((out, block), seed)| {
                scan_block(block, out, seed, &unary, &binary);
            });

        running
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

        let len = output.len();
        let mut targets: Vec<(usize, usize)> = map
            .par_iter()
            .zip(stencil.par_iter())
            .enumerate()
            .filter(|(_, (_, flag))| pred(flag))
            .map(|(element, (&target, _))| (target, element))
            .collect();

        // Sorted by (target, element): within a run of equal targets every
        // pair after the first hits a slot an earlier element claimed. The
        // smallest offending element matches a front-to-back walk.
        targets.par_sort_unstable();
        let first_bad = targets
            .par_iter()
            .enumerate()
            .filter(|&(position, &(target, _))| {
                target >= len || (position > 0 && targets[position - 1].0 == target)
            })
            .map(|(_, &(target, element))| (element, target))
            .min();
        if let Some((element, target)) = first_bad {
            return Err(if target >= len {
                AlgorithmError::ScatterOutOfBounds { element, target, len }
            } else {
                AlgorithmError::ScatterCollision { target }
            });
        }

        // Targets are distinct and sorted: each output block writes only the
        // run of targets that falls inside it.
        output
            .par_chunks_mut(SCAN_BLOCK_LEN)
            .enumerate()
            .for_each(|(block, out)| {
                let start = block * SCAN_BLOCK_LEN;
                let first = targets.partition_point(|&(target, _)| target < start);
                let last = targets.partition_point(|&(target, _)| target < start + out.len());
                for &(target, element) in &targets[first..last] {
                    out[target - start] = input[element].clone();
                }
            });
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

        // Indexed collect keeps the input relative order.
        let selected: Vec<&T> = input
            .par_iter()
            .zip(stencil.par_iter())
            .filter(|(_, flag)| pred(flag))
            .map(|(value, _)| value)
            .collect();

        if selected.len() > output.len() {
            return Err(AlgorithmError::OutputTooSmall {
                required: selected.len(),
                available: output.len(),
            });
        }

        output[..selected.len()]
            .par_iter_mut()
            .zip(selected.par_iter())
            .for_each(|(slot, &value)| *slot = value.clone());
        Ok(selected.len())
    }

    fn gather<T>(source: &[T], order: &[usize]) -> Vec<T>
    where
        T: Clone + Send + Sync,
    {
        order.par_iter().map(|&index| source[index].clone()).collect()
    }
}
