//! Gustavson row-expansion sparse multiply
//!
//! Each output row `i` is the sum of the rows `k` of `B` scaled by the
//! nonzeros `A[i][k]`. Products are gathered in a dense scratch buffer sized
//! to the output column count and reused across all rows of one call. A
//! parallel marker buffer remembers which row last touched each column, so the
//! scratch is never cleared between rows: a column whose marker differs from
//! the current row is treated as empty.
//!
//! Work is proportional to the number of multiply-adds performed, not to
//! `n³`. Only structural zeros are pruned: a column reached by some product is
//! stored even if its sum cancels to zero.

use std::ops::AddAssign;

use num_traits::Num;

use crate::constants::UNMARKED;
use crate::matrix::SparseMatrixCSR;

/// Dense value buffer plus "last touched by row" markers
///
/// Scratch is valid for one multiply call only; row stamps from a previous
/// call would alias rows of the next.
pub struct MarkerAccumulator<T> {
    /// Partial sums, meaningful only where `marker[col] == current row`
    values: Vec<T>,

    /// Row that last initialized each column
    marker: Vec<usize>,
}

impl<T> MarkerAccumulator<T>
where
    T: Copy + Num + AddAssign,
{
    pub fn new(n_cols: usize) -> Self {
        Self {
            values: vec![T::zero(); n_cols],
            marker: vec![UNMARKED; n_cols],
        }
    }

    /// Adds `val` to column `col` of row `row`
    ///
    /// Returns true when this is the first contribution to the column in this row.
    #[inline]
    pub fn accumulate(&mut self, row: usize, col: usize, val: T) -> bool {
        if self.marker[col] != row {
            self.marker[col] = row;
            self.values[col] = val;
            true
        } else {
            self.values[col] += val;
            false
        }
    }

    /// Appends every column stamped with `row` to the output lists
    ///
    /// Columns are scanned in ascending order, which is what keeps the output
    /// row sorted. Returns the number of entries appended.
    pub fn flush_row(&self, row: usize, col_idx: &mut Vec<usize>, values: &mut Vec<T>) -> usize {
        let before = col_idx.len();
        for (col, (&mark, &val)) in self.marker.iter().zip(&self.values).enumerate() {
            if mark == row {
                col_idx.push(col);
                values.push(val);
            }
        }
        col_idx.len() - before
    }
}

/// Multiplies two CSR matrices with Gustavson's algorithm
///
/// # Panics
///
/// Panics if `a.n_cols != b.n_rows`.
pub fn gustavson_spgemm<T>(a: &SparseMatrixCSR<T>, b: &SparseMatrixCSR<T>) -> SparseMatrixCSR<T>
where
    T: Copy + Num + AddAssign,
{
    assert_eq!(
        a.n_cols, b.n_rows,
        "Matrix dimensions must be compatible for multiplication"
    );

    let n_rows = a.n_rows;
    let n_cols = b.n_cols;

    let mut scratch = MarkerAccumulator::new(n_cols);
    let mut row_ptr = Vec::with_capacity(n_rows + 1);
    let mut col_idx = Vec::new();
    let mut values = Vec::new();
    row_ptr.push(0);

    for i in 0..n_rows {
        let mut row_nnz = 0;

        for a_idx in a.row_ptr[i]..a.row_ptr[i + 1] {
            let k = a.col_idx[a_idx];
            let a_val = a.values[a_idx];

            for b_idx in b.row_ptr[k]..b.row_ptr[k + 1] {
                if scratch.accumulate(i, b.col_idx[b_idx], a_val * b.values[b_idx]) {
                    row_nnz += 1;
                }
            }
        }

        let appended = scratch.flush_row(i, &mut col_idx, &mut values);
        debug_assert_eq!(appended, row_nnz);
        row_ptr.push(row_ptr[i] + row_nnz);
    }

    SparseMatrixCSR::new(n_rows, n_cols, row_ptr, col_idx, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_marks_first_touch() {
        let mut acc = MarkerAccumulator::<f64>::new(4);
        assert!(acc.accumulate(0, 2, 1.5));
        assert!(!acc.accumulate(0, 2, 2.5));
        assert!(acc.accumulate(0, 0, 1.0));

        let (mut cols, mut vals) = (Vec::new(), Vec::new());
        assert_eq!(acc.flush_row(0, &mut cols, &mut vals), 2);
        assert_eq!(cols, vec![0, 2]);
        assert_eq!(vals, vec![1.0, 4.0]);
    }

    #[test]
    fn test_accumulator_logical_reset_between_rows() {
        let mut acc = MarkerAccumulator::<i64>::new(3);
        acc.accumulate(0, 1, 10);
        acc.accumulate(0, 2, 20);

        // Row 1 touches column 1 again; the stale 10 must not leak in
        assert!(acc.accumulate(1, 1, 7));

        let (mut cols, mut vals) = (Vec::new(), Vec::new());
        acc.flush_row(1, &mut cols, &mut vals);
        assert_eq!(cols, vec![1]);
        assert_eq!(vals, vec![7]);
    }

    #[test]
    fn test_gustavson_rows() {
        // A = [1 2 0; 0 3 4; 5 0 6], B = diag(7, 8, 9)
        let a = SparseMatrixCSR::new(
            3, 3,
            vec![0, 2, 4, 6],
            vec![0, 1, 1, 2, 0, 2],
            vec![1, 2, 3, 4, 5, 6],
        );
        let b = SparseMatrixCSR::new(3, 3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![7, 8, 9]);

        let c = gustavson_spgemm(&a, &b);

        assert_eq!(c.row_ptr, vec![0, 2, 4, 6]);
        assert_eq!(c.col_idx, vec![0, 1, 1, 2, 0, 2]);
        assert_eq!(c.values, vec![7, 16, 24, 36, 35, 54]);
    }

    #[test]
    fn test_gustavson_keeps_cancellation() {
        // Row [1 1] times column [1; -1]: one stored entry whose value is zero
        let a = SparseMatrixCSR::new(1, 2, vec![0, 2], vec![0, 1], vec![1.0, 1.0]);
        let b = SparseMatrixCSR::new(2, 1, vec![0, 1, 2], vec![0, 0], vec![1.0, -1.0]);

        let c = gustavson_spgemm(&a, &b);

        assert_eq!(c.nnz(), 1);
        assert_eq!(c.values, vec![0.0]);
    }

    #[test]
    #[should_panic(expected = "Matrix dimensions must be compatible")]
    fn test_incompatible_dimensions() {
        let a = SparseMatrixCSR::<f64>::zeros(2, 3);
        let b = SparseMatrixCSR::<f64>::zeros(2, 2);
        gustavson_spgemm(&a, &b);
    }
}
