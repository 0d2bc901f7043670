//! BLAS-style matrix layout descriptors and the leading-dimension resolver.
//!
//! A herk call touches two buffers: the rank-k operand A and the Hermitian
//! output C. How many vectors each buffer stores, and how far apart they
//! are, depends on the storage order and on whether A is transposed. The
//! [`resolve`] function derives both from a [`MatrixLayoutSpec`] and
//! rejects leading dimensions that are too small to hold a vector.

pub mod resolve;

pub use resolve::{OperandLayout, ResolvedLayout, resolve, resolve_a, resolve_c};

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ParseEnumError;

/// Storage order of a matrix buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Order {
    /// Rows are contiguous.
    RowMajor,
    /// Columns are contiguous.
    #[default]
    ColumnMajor,
}

impl Order {
    /// Linear index of logical element (row, col) in a buffer with leading dimension `ld`.
    #[inline(always)]
    pub fn index(self, row: usize, col: usize, ld: usize) -> usize {
        match self {
            Order::RowMajor => row * ld + col,
            Order::ColumnMajor => col * ld + row,
        }
    }
}

/// Transpose flag applied to operand A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Transpose {
    #[default]
    NoTrans,
    Trans,
    ConjTrans,
}

impl Transpose {
    pub fn is_transposed(self) -> bool {
        !matches!(self, Transpose::NoTrans)
    }
}

/// Which triangle of C is referenced and updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Uplo {
    #[default]
    Upper,
    Lower,
}

/// The two buffers of a herk call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operand {
    A,
    C,
}

/// Input to [`resolve`]. A leading dimension of 0 means "pick the tightest one".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MatrixLayoutSpec {
    pub order: Order,
    pub trans_a: Transpose,
    pub n: usize,
    pub k: usize,
    pub lda: usize,
    pub ldc: usize,
}

impl MatrixLayoutSpec {
    /// Spec with both leading dimensions left to auto-compute.
    pub fn new(order: Order, trans_a: Transpose, n: usize, k: usize) -> Self {
        Self {
            order,
            trans_a,
            n,
            k,
            lda: 0,
            ldc: 0,
        }
    }

    pub fn with_lda(mut self, lda: usize) -> Self {
        self.lda = lda;
        self
    }

    pub fn with_ldc(mut self, ldc: usize) -> Self {
        self.ldc = ldc;
        self
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::RowMajor => "row",
            Order::ColumnMajor => "column",
        })
    }
}

impl fmt::Display for Transpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transpose::NoTrans => "N",
            Transpose::Trans => "T",
            Transpose::ConjTrans => "C",
        })
    }
}

impl fmt::Display for Uplo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Uplo::Upper => "U",
            Uplo::Lower => "L",
        })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operand::A => "A",
            Operand::C => "C",
        })
    }
}

impl FromStr for Order {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "r" | "row" | "rowmajor" | "row-major" => Ok(Order::RowMajor),
            "c" | "col" | "column" | "colmajor" | "column-major" => Ok(Order::ColumnMajor),
            _ => Err(ParseEnumError {
                kind: "order",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Transpose {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "notrans" => Ok(Transpose::NoTrans),
            "t" | "trans" => Ok(Transpose::Trans),
            "c" | "conjtrans" => Ok(Transpose::ConjTrans),
            _ => Err(ParseEnumError {
                kind: "transpose",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Uplo {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u" | "upper" => Ok(Uplo::Upper),
            "l" | "lower" => Ok(Uplo::Lower),
            _ => Err(ParseEnumError {
                kind: "uplo",
                value: s.to_string(),
            }),
        }
    }
}
