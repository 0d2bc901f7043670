//! Host implementations of the Hermitian rank-k update.
//!
//! `C := alpha * op(A) * op(A)^H + beta * C`, where C is an n×n Hermitian
//! matrix of which only the `uplo` triangle is referenced, and op(A) is A
//! (n×k) or A^H (A stored k×n). alpha and beta are real.
//!
//! Available implementations:
//! - `naive`: element-by-element reference
//! - `threaded`: splits the stored vectors of C across threads

pub mod naive;
pub mod threaded;

use num_complex::Complex;
use serde::Serialize;

use crate::element::HerkReal;
use crate::error::DeviceError;
use crate::layout::{MatrixLayoutSpec, Operand, Order, Transpose, Uplo, resolve};

/// Flop count of one herk call, `4 * k * n * (n + 1)`.
pub fn flops(n: usize, k: usize) -> f64 {
    4.0 * k as f64 * n as f64 * (n as f64 + 1.0)
}

/// Everything a herk kernel needs besides the two buffers.
///
/// Leading dimensions here are explicit; the auto value 0 is resolved
/// before arguments reach a kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HerkArgs<R> {
    pub order: Order,
    pub uplo: Uplo,
    pub trans_a: Transpose,
    pub n: usize,
    pub k: usize,
    pub alpha: R,
    pub beta: R,
    pub offa: usize,
    pub lda: usize,
    pub offc: usize,
    pub ldc: usize,
}

impl<R: HerkReal> HerkArgs<R> {
    /// Check strides and buffer lengths so a kernel can index without bounds failures.
    pub fn validate(&self, a_len: usize, c_len: usize) -> Result<(), DeviceError> {
        if self.lda == 0 || self.ldc == 0 {
            return Err(DeviceError::InvalidArgument(format!(
                "leading dimensions must be explicit (lda={}, ldc={})",
                self.lda, self.ldc
            )));
        }

        let spec = MatrixLayoutSpec {
            order: self.order,
            trans_a: self.trans_a,
            n: self.n,
            k: self.k,
            lda: self.lda,
            ldc: self.ldc,
        };
        let layout = resolve(&spec)?;

        for (operand, offset, actual) in [(Operand::A, self.offa, a_len), (Operand::C, self.offc, c_len)] {
            let required = layout.element_count(operand, offset)?;
            if actual < required {
                return Err(DeviceError::BufferTooSmall {
                    operand,
                    required,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Element (i, p) of op(A).
    #[inline(always)]
    fn op_a(&self, a: &[Complex<R>], i: usize, p: usize) -> Complex<R> {
        match self.trans_a {
            Transpose::NoTrans => a[self.offa + self.order.index(i, p, self.lda)],
            // T and C share a storage shape; herk conjugates for both
            Transpose::Trans | Transpose::ConjTrans => a[self.offa + self.order.index(p, i, self.lda)].conj(),
        }
    }

    /// New value of C(i, j) given its old value.
    #[inline(always)]
    fn updated(&self, a: &[Complex<R>], i: usize, j: usize, old: Complex<R>) -> Complex<R> {
        let mut value = Complex::new(R::zero(), R::zero());

        if self.alpha != R::zero() {
            let mut sum = Complex::new(R::zero(), R::zero());
            for p in 0..self.k {
                sum = sum + self.op_a(a, i, p) * self.op_a(a, j, p).conj();
            }
            value = sum * self.alpha;
        }

        // beta == 0 means C is write-only, so NaNs in it must not leak through
        if self.beta != R::zero() {
            value = value + old * self.beta;
        }

        if i == j {
            value.im = R::zero();
        }
        value
    }
}

#[inline(always)]
fn in_triangle(uplo: Uplo, i: usize, j: usize) -> bool {
    match uplo {
        Uplo::Upper => i <= j,
        Uplo::Lower => i >= j,
    }
}

/// Which host kernel executes herk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Backend {
    Naive,
    Threaded { threads: usize },
}

impl Default for Backend {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Backend::Threaded { threads }
    }
}

impl Backend {
    pub fn name(&self) -> String {
        match self {
            Backend::Naive => "naive".to_string(),
            Backend::Threaded { threads } => format!("threaded x{}", threads),
        }
    }

    /// Run herk on already validated arguments.
    pub fn herk<R: HerkReal>(&self, args: &HerkArgs<R>, a: &[Complex<R>], c: &mut [Complex<R>]) {
        match *self {
            Backend::Naive => naive::herk_naive(args, a, c),
            Backend::Threaded { threads } => threaded::herk_threaded(args, a, c, threads),
        }
    }
}
