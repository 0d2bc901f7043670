use serde::Serialize;

use super::{MatrixLayoutSpec, Operand, Order};
use crate::error::LayoutError;

/// Leading dimension and vector count of a single buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OperandLayout {
    pub leading_dim: usize,
    pub vectors: usize,
}

impl OperandLayout {
    /// Elements needed to hold every vector, without any offset.
    /// `None` if the product does not fit in `usize`.
    pub fn checked_len(&self) -> Option<usize> {
        self.leading_dim.checked_mul(self.vectors)
    }
}

/// Validated strides and vector counts for A and C.
///
/// `lda * a_vectors` and `ldc * c_vectors` are the minimum element counts of
/// the two buffers before any caller offset is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedLayout {
    pub lda: usize,
    pub ldc: usize,
    pub a_vectors: usize,
    pub c_vectors: usize,
}

impl ResolvedLayout {
    pub fn operand(&self, operand: Operand) -> OperandLayout {
        match operand {
            Operand::A => OperandLayout {
                leading_dim: self.lda,
                vectors: self.a_vectors,
            },
            Operand::C => OperandLayout {
                leading_dim: self.ldc,
                vectors: self.c_vectors,
            },
        }
    }

    /// Length of the host-side copy of `operand`: `ld * vectors`.
    pub fn host_len(&self, operand: Operand) -> Result<usize, LayoutError> {
        self.operand(operand)
            .checked_len()
            .ok_or(LayoutError::Overflow { operand })
    }

    /// Device buffer size in elements: `ld * vectors + offset`.
    pub fn element_count(&self, operand: Operand, offset: usize) -> Result<usize, LayoutError> {
        self.host_len(operand)?
            .checked_add(offset)
            .ok_or(LayoutError::Overflow { operand })
    }
}

/// Resolve leading dimensions and vector counts for both herk operands.
///
/// C is checked before A, so when both leading dimensions are undersized
/// the error names C.
///
/// # Example
///
/// ```
/// use herk::layout::{resolve, MatrixLayoutSpec, Order, Transpose};
///
/// let spec = MatrixLayoutSpec::new(Order::RowMajor, Transpose::NoTrans, 4, 3);
/// let layout = resolve(&spec).unwrap();
///
/// assert_eq!((layout.lda, layout.a_vectors), (3, 4));
/// assert_eq!((layout.ldc, layout.c_vectors), (4, 4));
/// ```
pub fn resolve(spec: &MatrixLayoutSpec) -> Result<ResolvedLayout, LayoutError> {
    let c = resolve_c(spec)?;
    let a = resolve_a(spec)?;

    Ok(ResolvedLayout {
        lda: a.leading_dim,
        ldc: c.leading_dim,
        a_vectors: a.vectors,
        c_vectors: c.vectors,
    })
}

/// C is always n vectors of at least n elements, whatever the order or transpose.
pub fn resolve_c(spec: &MatrixLayoutSpec) -> Result<OperandLayout, LayoutError> {
    check_dims(spec)?;
    let leading_dim = pick_leading_dim(Operand::C, spec.ldc, spec.n)?;
    Ok(OperandLayout {
        leading_dim,
        vectors: spec.n,
    })
}

/// A is n×k without transpose and k×n with it; the order decides which
/// dimension is the stored vector and which is the stride.
pub fn resolve_a(spec: &MatrixLayoutSpec) -> Result<OperandLayout, LayoutError> {
    check_dims(spec)?;
    let (n, k) = (spec.n, spec.k);

    // (vectors, minimum leading dimension); auto equals the minimum
    let (vectors, minimum) = match (spec.order, spec.trans_a.is_transposed()) {
        (Order::RowMajor, false) => (n, k),
        (Order::RowMajor, true) => (k, n),
        (Order::ColumnMajor, false) => (k, n),
        (Order::ColumnMajor, true) => (n, k),
    };

    let leading_dim = pick_leading_dim(Operand::A, spec.lda, minimum)?;
    Ok(OperandLayout {
        leading_dim,
        vectors,
    })
}

fn check_dims(spec: &MatrixLayoutSpec) -> Result<(), LayoutError> {
    if spec.n == 0 {
        return Err(LayoutError::ZeroDimension { dim: 'n' });
    }
    if spec.k == 0 {
        return Err(LayoutError::ZeroDimension { dim: 'k' });
    }
    Ok(())
}

fn pick_leading_dim(operand: Operand, requested: usize, minimum: usize) -> Result<usize, LayoutError> {
    match requested {
        0 => Ok(minimum),
        r if r < minimum => Err(LayoutError::LeadingDimensionTooSmall {
            operand,
            requested: r,
            minimum,
        }),
        r => Ok(r),
    }
}

