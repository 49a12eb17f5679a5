//! Reference multiplies used as correctness oracles
//!
//! Neither function is tuned; they exist so tests can compare the blocked and
//! Gustavson kernels against something obviously correct.

use std::collections::HashMap;
use std::ops::AddAssign;

use num_traits::Num;

use crate::matrix::{DenseMatrix, SparseMatrixCSR};

/// Textbook i-j-k multiply of two dense matrices into a new matrix
pub fn reference_dense_multiply(a: &DenseMatrix, b: &DenseMatrix) -> DenseMatrix {
    assert_eq!(a.size(), b.size(), "Matrix dimensions must be compatible for multiplication");

    let n = a.size();
    let mut c = DenseMatrix::zeros(n);
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for k in 0..n {
                sum += a.get(i, k) * b.get(k, j);
            }
            c.set(i, j, sum);
        }
    }
    c
}

/// Sparse multiply with a hashmap accumulator per row
///
/// Every column reached by at least one product is stored, even if the sum
/// cancels to zero, so the structure matches the Gustavson kernel.
pub fn reference_spgemm<T>(a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>) -> SparseMatrixCSR<T>
where
    T: Copy + Num + AddAssign,
{
    assert_eq!(
        a.n_cols, b.n_rows,
        "Matrix dimensions must be compatible for multiplication"
    );

    let mut row_ptr = Vec::with_capacity(a.n_rows + 1);
    let mut col_idx = Vec::new();
    let mut values = Vec::new();
    row_ptr.push(0);

    for i in 0..a.n_rows {
        let mut accum: HashMap<usize, T> = HashMap::new();

        for (k, &a_val) in a.row_iter(i) {
            for (j, &b_val) in b.row_iter(k) {
                *accum.entry(j).or_insert(T::zero()) += a_val * b_val;
            }
        }

        let mut row_entries: Vec<_> = accum.into_iter().collect();
        row_entries.sort_by_key(|&(col, _)| col);

        for (j, val) in row_entries {
            col_idx.push(j);
            values.push(val);
        }
        row_ptr.push(col_idx.len());
    }

    SparseMatrixCSR::new(a.n_rows, b.n_cols, row_ptr, col_idx, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_dense_two_by_two() {
        let a = DenseMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]);
        let b = DenseMatrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]);
        let c = reference_dense_multiply(&a, &b);
        assert_eq!(c, DenseMatrix::from_rows(&[[19.0, 22.0], [43.0, 50.0]]));
    }

    #[test]
    fn test_reference_spgemm() {
        // A = [1 2; 0 3], B = [4 5; 6 7] -> C = [16 19; 18 21]
        let a = SparseMatrixCSR::new(2, 2, vec![0, 2, 3], vec![0, 1, 1], vec![1, 2, 3]);
        let b = SparseMatrixCSR::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![4, 5, 6, 7]);

        let result = reference_spgemm(&a, &b);

        assert_eq!(result.nnz(), 4);
        assert_eq!(result.to_row_major(), vec![16, 19, 18, 21]);
    }

    #[test]
    fn test_reference_spgemm_keeps_cancelled_entries() {
        // [1 1] * [1; -1] has a structural entry that sums to zero
        let a = SparseMatrixCSR::new(1, 2, vec![0, 2], vec![0, 1], vec![1, 1]);
        let b = SparseMatrixCSR::new(2, 1, vec![0, 1, 2], vec![0, 0], vec![1, -1]);

        let result = reference_spgemm(&a, &b);

        assert_eq!(result.nnz(), 1);
        assert_eq!(result.values, vec![0]);
    }
}
