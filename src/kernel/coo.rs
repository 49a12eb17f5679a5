//! Coordinate-list baseline multiply
//!
//! The unoptimized reference point of the sparse sweep: both operands are
//! converted to COO lists and every pair of entries is compared, adding the
//! product into a dense output when the inner indices meet. Cost is
//! `nnz(A) · nnz(B)` regardless of structure.

use crate::matrix::{dense_to_coo, DenseMatrix};

/// Computes `c += a · b` by pairing every COO entry of `a` with every entry of `b`
///
/// The COO conversion is part of the call, as it is part of the baseline's cost.
pub fn coo_multiply(a: &DenseMatrix, b: &DenseMatrix, c: &mut DenseMatrix) {
    assert_eq!(a.size(), b.size(), "Matrix dimensions must be compatible for multiplication");
    assert_eq!(a.size(), c.size(), "Output matrix must match the operand size");

    let a_entries = dense_to_coo(a);
    let b_entries = dense_to_coo(b);

    for ea in &a_entries {
        for eb in &b_entries {
            if ea.col == eb.row {
                let current = c.get(ea.row, eb.col);
                c.set(ea.row, eb.col, current + ea.val * eb.val);
            }
        }
    }
}
