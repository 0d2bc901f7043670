//! Benchmark harness for the Hermitian rank-k update (herk).
//!
//! I wrote this to measure `cherk`/`zherk` the way BLAS benchmark clients do:
//! work out buffer strides from the layout flags, fill the buffers with
//! reproducible data, upload them, time the kernel, and optionally time the
//! whole round trip including transfers. The fiddly part is the layout:
//! which dimension is the leading one depends on both the storage order and
//! the transpose flag, so that logic lives in one pure function.
//!
//! ## Usage
//!
//! ```
//! use herk::layout::{resolve, MatrixLayoutSpec, Order, Transpose};
//!
//! let spec = MatrixLayoutSpec::new(Order::ColumnMajor, Transpose::ConjTrans, 64, 16);
//! let layout = resolve(&spec).unwrap();
//!
//! assert_eq!((layout.lda, layout.a_vectors), (16, 64));
//! assert_eq!((layout.ldc, layout.c_vectors), (64, 64));
//! ```
//!
//! Running a benchmark:
//!
//! ```
//! use herk::device::HostDevice;
//! use herk::harness::{HerkBench, HerkParams, RunConfig, run};
//!
//! let params = HerkParams { n: 32, k: 8, ..HerkParams::default() };
//! let mut bench = HerkBench::<f32>::new(HostDevice::default());
//!
//! let report = run(&mut bench, &params, &RunConfig::default()).unwrap();
//! assert_eq!(report.routine, "cherk");
//! assert_eq!(report.iterations, 10);
//! ```
//!
//! ## What's inside
//!
//! - Layout resolver for A and C (row/column major, N/T/C)
//! - Naive and multi-threaded host herk kernels
//! - A host device with explicit allocation, upload and download
//! - Standard and round-trip timing modes

pub mod device;
pub mod element;
pub mod error;
pub mod harness;
pub mod kernels;
pub mod layout;
pub mod timer;

pub use element::HerkReal;
pub use error::{BenchError, DeviceError, LayoutError};
pub use layout::{MatrixLayoutSpec, ResolvedLayout, resolve};

use num_complex::Complex;

use kernels::{Backend, HerkArgs};

/// Hermitian rank-k update on host slices: `C := alpha * op(A) * op(A)^H + beta * C`.
///
/// Picks the multi-threaded kernel with one thread per available core.
///
/// # Errors
///
/// Returns an error if a leading dimension is too small for the layout or
/// a slice is shorter than its leading dimension, vector count and offset
/// require.
pub fn herk<R: HerkReal>(args: &HerkArgs<R>, a: &[Complex<R>], c: &mut [Complex<R>]) -> Result<(), DeviceError> {
    args.validate(a.len(), c.len())?;
    Backend::default().herk(args, a, c);
    Ok(())
}
