//! The two element kinds herk is benchmarked over: single and double
//! precision complex. Buffers hold `Complex<R>`; `R` selects the routine.

use std::fmt;

use num_complex::Complex;
use num_traits::Float;
use rand::Rng;
use rand::distr::uniform::SampleUniform;
use serde::Serialize;

/// Seed for the host buffer fill, so every iteration sees the same data.
pub const FILL_SEED: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Precision {
    Single,
    Double,
}

impl Precision {
    /// Bytes per complex element.
    pub fn element_size(self) -> usize {
        match self {
            Precision::Single => 8,
            Precision::Double => 16,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::Single => "single complex",
            Precision::Double => "double complex",
        })
    }
}

/// Real scalar type behind a complex herk element.
///
/// alpha and beta of a herk call are real, so kernels are generic over the
/// real type and operate on `Complex<Self>`.
pub trait HerkReal:
    Float + SampleUniform + Default + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// BLAS routine name, `cherk` or `zherk`.
    const ROUTINE: &'static str;
    const PRECISION: Precision;
    const UPPER_BOUND: Self;
    const RANDOM_SCALE: Self;

    fn from_f64(v: f64) -> Self;

    /// One pseudo-random element, each component in `[0, UPPER_BOUND) / RANDOM_SCALE`.
    fn random_element<G: Rng>(rng: &mut G) -> Complex<Self> {
        let re = rng.random_range(Self::zero()..Self::UPPER_BOUND);
        let im = rng.random_range(Self::zero()..Self::UPPER_BOUND);
        Complex::new(re / Self::RANDOM_SCALE, im / Self::RANDOM_SCALE)
    }
}

impl HerkReal for f32 {
    const ROUTINE: &'static str = "cherk";
    const PRECISION: Precision = Precision::Single;
    const UPPER_BOUND: Self = 16.0;
    const RANDOM_SCALE: Self = 8.0;

    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl HerkReal for f64 {
    const ROUTINE: &'static str = "zherk";
    const PRECISION: Precision = Precision::Double;
    const UPPER_BOUND: Self = 32.0;
    const RANDOM_SCALE: Self = 16.0;

    fn from_f64(v: f64) -> Self {
        v
    }
}
