use num_complex::Complex;

use super::{HerkArgs, in_triangle};
use crate::element::HerkReal;

/// Reference herk: visit every element of the `uplo` triangle of C in
/// logical (row, column) order and recompute it from scratch.
///
/// Slow, but the index math is the textbook one, so it doubles as the
/// correctness baseline for the threaded kernel.
///
/// # Panics
///
/// Panics if the buffers are shorter than `args` requires. Call
/// [`HerkArgs::validate`] first.
///
/// # Example
///
/// ```
/// use herk::kernels::{HerkArgs, naive::herk_naive};
/// use herk::layout::{Order, Transpose, Uplo};
/// use num_complex::Complex;
///
/// // A = [1+i, 2] as a 1×2 row, so C = A * A^H = |1+i|^2 + |2|^2 = 6
/// let a = vec![Complex::new(1.0, 1.0), Complex::new(2.0, 0.0)];
/// let mut c = vec![Complex::new(0.0, 0.0)];
/// let args = HerkArgs {
///     order: Order::RowMajor,
///     uplo: Uplo::Upper,
///     trans_a: Transpose::NoTrans,
///     n: 1,
///     k: 2,
///     alpha: 1.0f64,
///     beta: 0.0,
///     offa: 0,
///     lda: 2,
///     offc: 0,
///     ldc: 1,
/// };
///
/// herk_naive(&args, &a, &mut c);
/// assert_eq!(c[0], Complex::new(6.0, 0.0));
/// ```
pub fn herk_naive<R: HerkReal>(args: &HerkArgs<R>, a: &[Complex<R>], c: &mut [Complex<R>]) {
    for i in 0..args.n {
        for j in 0..args.n {
            if !in_triangle(args.uplo, i, j) {
                continue;
            }
            let idx = args.offc + args.order.index(i, j, args.ldc);
            c[idx] = args.updated(a, i, j, c[idx]);
        }
    }
}
