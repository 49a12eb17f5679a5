//! Conversion functions between matrix formats

use num_traits::Num;

use crate::matrix::{DenseMatrix, SparseMatrixCSR};

/// One stored entry of a coordinate-list (COO) matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooEntry<T> {
    pub row: usize,
    pub col: usize,
    pub val: T,
}

impl<T: Copy + Num> SparseMatrixCSR<T> {
    /// Builds a CSR matrix from row-major values, keeping only nonzero entries
    ///
    /// Rows are scanned with ascending column index, so every row of the
    /// result has strictly increasing columns by construction.
    pub fn from_row_major(n_rows: usize, n_cols: usize, values: &[T]) -> Self {
        assert_eq!(values.len(), n_rows * n_cols, "values.len() must be n_rows * n_cols");

        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        let mut col_idx = Vec::new();
        let mut vals = Vec::new();
        row_ptr.push(0);

        for row in values.chunks_exact(n_cols.max(1)).take(n_rows) {
            for (j, &v) in row.iter().enumerate() {
                if !v.is_zero() {
                    col_idx.push(j);
                    vals.push(v);
                }
            }
            row_ptr.push(col_idx.len());
        }
        // n_cols == 0 leaves no chunks; every row is empty
        row_ptr.resize(n_rows + 1, col_idx.len());

        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values: vals,
        }
    }

    /// Expands the matrix into row-major values, zeros included
    pub fn to_row_major(&self) -> Vec<T> {
        let mut out = vec![T::zero(); self.n_rows * self.n_cols];
        for i in 0..self.n_rows {
            for (j, &v) in self.row_iter(i) {
                out[i * self.n_cols + j] = v;
            }
        }
        out
    }

    /// Stored entries as a coordinate list in row-major order
    pub fn to_coo(&self) -> Vec<CooEntry<T>> {
        (0..self.n_rows)
            .flat_map(|i| self.row_iter(i).map(move |(col, &val)| CooEntry { row: i, col, val }))
            .collect()
    }
}

impl SparseMatrixCSR<f64> {
    /// Builds a CSR matrix from the nonzero entries of a dense matrix
    pub fn from_dense(m: &DenseMatrix) -> Self {
        Self::from_row_major(m.size(), m.size(), m.as_slice())
    }

    /// Expands a square CSR matrix into a dense matrix
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    pub fn to_dense(&self) -> DenseMatrix {
        assert_eq!(self.n_rows, self.n_cols, "matrix must be square");
        DenseMatrix::from_row_major(self.n_rows, &self.to_row_major())
    }
}

/// Nonzero entries of a dense matrix as a coordinate list in row-major order
pub fn dense_to_coo(m: &DenseMatrix) -> Vec<CooEntry<f64>> {
    let n = m.size();
    let mut entries = Vec::new();
    for i in 0..n {
        for (j, &val) in m.row(i).iter().enumerate() {
            if val != 0.0 {
                entries.push(CooEntry { row: i, col: j, val });
            }
        }
    }
    entries
}
