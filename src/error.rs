//! Error types for layout resolution, the host device and the benchmark harness.

use thiserror::Error;

use crate::layout::Operand;

/// A BLAS layout parameter set that cannot describe a valid buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("leading dimension of {operand} too small: requested {requested}, minimum {minimum}")]
    LeadingDimensionTooSmall {
        operand: Operand,
        requested: usize,
        minimum: usize,
    },

    #[error("dimension {dim} must be positive")]
    ZeroDimension { dim: char },

    #[error("element count for {operand} overflows usize")]
    Overflow { operand: Operand },
}

/// Failures of the host device: allocation, transfers and kernel launch checks.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("out of device memory: requested {requested} bytes, {available} available")]
    OutOfResources { requested: usize, available: usize },

    #[error("transfer out of bounds: offset {offset} + len {len} > capacity {capacity}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    #[error("buffer {operand} is read-only")]
    ReadOnlyBuffer { operand: Operand },

    #[error("buffer {operand} too small: need {required} elements, have {actual}")]
    BufferTooSmall {
        operand: Operand,
        required: usize,
        actual: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Errors surfaced by [`crate::harness::HerkBench`] and [`crate::harness::run`].
#[derive(Debug, Error)]
pub enum BenchError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("host allocation of {elements} elements for {operand} failed")]
    HostAllocation { operand: Operand, elements: usize },

    #[error("{0} called before buffers were set up")]
    NotSetUp(&'static str),

    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

/// Error for string forms of the BLAS enums.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}
