//! Multi-threaded herk.

use std::thread;

use num_complex::Complex;

use super::{HerkArgs, flops, in_triangle};
use crate::element::HerkReal;
use crate::layout::Order;

/// Multi-threaded herk over the stored vectors of C.
///
/// C is n vectors of `ldc` elements (rows for row-major, columns for
/// column-major). Each thread owns a contiguous block of vectors, so no two
/// threads write the same memory. Thread count adapts to the flop count:
/// - < 100M FLOPs: 1 thread
/// - < 300M FLOPs: 2 threads
/// - Otherwise: up to `num_threads`
///
/// # Panics
///
/// Panics if the buffers are shorter than `args` requires. Call
/// [`HerkArgs::validate`] first.
pub fn herk_threaded<R: HerkReal>(
    args: &HerkArgs<R>,
    a: &[Complex<R>],
    c: &mut [Complex<R>],
    num_threads: usize,
) {
    let n = args.n;
    let ldc = args.ldc;
    let region = &mut c[args.offc..args.offc + ldc * n];

    let effective_threads = choose_thread_count(n, args.k, num_threads);

    if effective_threads == 1 {
        for (v, vector) in region.chunks_mut(ldc).enumerate() {
            update_vector(args, a, v, vector);
        }
        return;
    }

    let vectors_per_thread = n.div_ceil(effective_threads);

    thread::scope(|s| {
        for (tid, block) in region.chunks_mut(vectors_per_thread * ldc).enumerate() {
            s.spawn(move || {
                let first = tid * vectors_per_thread;
                for (v, vector) in block.chunks_mut(ldc).enumerate() {
                    update_vector(args, a, first + v, vector);
                }
            });
        }
    });
}

/// Update the triangle elements of stored vector `v` of C.
fn update_vector<R: HerkReal>(args: &HerkArgs<R>, a: &[Complex<R>], v: usize, vector: &mut [Complex<R>]) {
    // elements past n are padding up to ldc
    for (q, slot) in vector.iter_mut().take(args.n).enumerate() {
        let (i, j) = match args.order {
            Order::RowMajor => (v, q),
            Order::ColumnMajor => (q, v),
        };
        if in_triangle(args.uplo, i, j) {
            *slot = args.updated(a, i, j, *slot);
        }
    }
}

fn choose_thread_count(n: usize, k: usize, max_threads: usize) -> usize {
    let flops = flops(n, k);

    const SINGLE_THREAD_THRESHOLD: f64 = 100_000_000.0;
    const TWO_THREAD_THRESHOLD: f64 = 300_000_000.0;

    let optimal_threads = if flops < SINGLE_THREAD_THRESHOLD {
        1
    } else if flops < TWO_THREAD_THRESHOLD {
        2
    } else {
        max_threads
    };

    let threads_by_vectors = (n / 64).max(1);

    optimal_threads.min(threads_by_vectors).min(max_threads).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_problems_stay_single_threaded() {
        assert_eq!(choose_thread_count(16, 16, 8), 1);
        assert_eq!(choose_thread_count(4096, 4096, 8), 8);
    }

    #[test]
    fn zero_thread_request_still_runs() {
        assert_eq!(choose_thread_count(4096, 4096, 0), 1);
    }
}
