//! Utilities for converting between our matrix formats and external libraries

use crate::matrix::{DenseMatrix, SparseMatrixCSR};
use ndarray::Array2;
use num_traits::Num;
use sprs::CsMat;

/// Converts our CSR matrix format to sprs CsMat format
pub fn to_sprs_csr<T>(matrix: &SparseMatrixCSR<T>) -> CsMat<T>
where
    T: Copy + Num + Default,
{
    CsMat::new(
        (matrix.n_rows, matrix.n_cols),
        matrix.row_ptr.clone(),
        matrix.col_idx.clone(),
        matrix.values.clone(),
    )
}

/// Converts sprs CsMat to our SparseMatrixCSR format
pub fn from_sprs_csr<T>(matrix: CsMat<T>) -> SparseMatrixCSR<T>
where
    T: Copy + Num + Default,
{
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let shape = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    SparseMatrixCSR::new(shape.0, shape.1, indptr, indices, data)
}

/// Copies a dense matrix into an ndarray
pub fn to_ndarray(matrix: &DenseMatrix) -> Array2<f64> {
    let n = matrix.size();
    Array2::from_shape_fn((n, n), |(i, j)| matrix.get(i, j))
}

/// Copies a square ndarray into a dense matrix
///
/// # Panics
///
/// Panics if `array` is not square.
pub fn from_ndarray(array: &Array2<f64>) -> DenseMatrix {
    let (rows, cols) = array.dim();
    assert_eq!(rows, cols, "Dense matrices must be square");

    // Iteration is in logical order regardless of the array's memory layout
    let values: Vec<f64> = array.iter().copied().collect();
    DenseMatrix::from_row_major(rows, &values)
}
