//! Compressed Sparse Row (CSR) matrix format

use std::fmt;

use num_traits::Num;

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// - `row_ptr`: `n_rows + 1` offsets into `col_idx`/`values`; `row_ptr[0] == 0`,
///   `row_ptr[n_rows] == nnz`, non-decreasing
/// - `col_idx`: column of every stored entry, strictly increasing within a row
/// - `values`: stored entries, parallel to `col_idx`
///
/// Matrices are produced once (by conversion from a dense scan or as the
/// output of a multiply) and only read afterwards.
#[derive(Clone)]
pub struct SparseMatrixCSR<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Row offsets (size: n_rows + 1)
    pub row_ptr: Vec<usize>,

    /// Column indices (size: nnz)
    pub col_idx: Vec<usize>,

    /// Stored values (size: nnz)
    pub values: Vec<T>,
}

impl<T> SparseMatrixCSR<T>
where
    T: Copy + Num,
{
    /// Creates a new CSR matrix from raw parts
    ///
    /// # Panics
    ///
    /// Panics if the arrays are inconsistent:
    /// - row_ptr.len() must be n_rows + 1
    /// - col_idx.len() must equal values.len()
    /// - row_ptr[n_rows] must equal col_idx.len()
    /// - every column index must be below n_cols
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(row_ptr.len(), n_rows + 1, "row_ptr.len() must be n_rows + 1");
        assert_eq!(col_idx.len(), values.len(), "col_idx.len() must equal values.len()");
        assert_eq!(
            row_ptr[n_rows],
            col_idx.len(),
            "row_ptr[n_rows] must equal col_idx.len()"
        );

        for &col in &col_idx {
            assert!(col < n_cols, "Column index {} out of bounds (n_cols = {})", col, n_cols);
        }

        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Creates a structurally empty matrix (nnz = 0)
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; n_rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Number of stored entries in row `i`
    pub fn row_nnz(&self, i: usize) -> usize {
        self.row_ptr[i + 1] - self.row_ptr[i]
    }

    /// Iterates the stored `(col, &value)` pairs of row `i` in column order
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(i < self.n_rows, "Row index out of bounds");

        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];

        self.col_idx[start..end]
            .iter()
            .zip(&self.values[start..end])
            .map(|(&col, val)| (col, val))
    }

    /// Checks every structural invariant of the format
    ///
    /// Returns a description of the first violation found.
    pub fn check_structure(&self) -> Result<(), String> {
        if self.row_ptr.len() != self.n_rows + 1 {
            return Err(format!(
                "row_ptr has {} entries, expected {}",
                self.row_ptr.len(),
                self.n_rows + 1
            ));
        }
        if self.row_ptr[0] != 0 {
            return Err(format!("row_ptr[0] = {}, expected 0", self.row_ptr[0]));
        }
        if self.row_ptr[self.n_rows] != self.nnz() || self.col_idx.len() != self.nnz() {
            return Err(format!(
                "row_ptr[last] = {}, col_idx has {}, values has {}",
                self.row_ptr[self.n_rows],
                self.col_idx.len(),
                self.nnz()
            ));
        }
        for i in 0..self.n_rows {
            let (start, end) = (self.row_ptr[i], self.row_ptr[i + 1]);
            if start > end {
                return Err(format!("row_ptr decreases at row {}", i));
            }
            let cols = &self.col_idx[start..end];
            if let Some(&col) = cols.iter().find(|&&c| c >= self.n_cols) {
                return Err(format!("row {} has column {} >= {}", i, col, self.n_cols));
            }
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format!("row {} columns are not strictly increasing", i));
            }
        }
        Ok(())
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for SparseMatrixCSR<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SparseMatrixCSR {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n_rows, self.n_cols)?;
        writeln!(f, "  nnz: {}", self.nnz())?;

        let max_rows_to_print = 5.min(self.n_rows);
        for i in 0..max_rows_to_print {
            write!(f, "    row {}: ", i)?;
            let entries: Vec<_> = self.row_iter(i).take(5).collect();
            if entries.is_empty() {
                writeln!(f, "(empty)")?;
                continue;
            }
            for (col, val) in &entries {
                write!(f, "({}, {:?}) ", col, val)?;
            }
            if self.row_nnz(i) > entries.len() {
                write!(f, "... ({} more)", self.row_nnz(i) - entries.len())?;
            }
            writeln!(f)?;
        }
        if self.n_rows > max_rows_to_print {
            writeln!(f, "    ... ({} more rows)", self.n_rows - max_rows_to_print)?;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SparseMatrixCSR<i32> {
        SparseMatrixCSR::new(
            3, 3,
            vec![0, 2, 3, 5],
            vec![0, 1, 1, 0, 2],
            vec![1, 2, 3, 4, 5],
        )
    }

    #[test]
    fn test_row_iter() {
        let matrix = sample();

        let row0: Vec<_> = matrix.row_iter(0).collect();
        assert_eq!(row0, vec![(0, &1), (1, &2)]);
        assert_eq!(matrix.row_nnz(1), 1);

        let row2: Vec<_> = matrix.row_iter(2).collect();
        assert_eq!(row2, vec![(0, &4), (2, &5)]);
    }

    #[test]
    fn test_identity_and_zeros_are_well_formed() {
        let identity = SparseMatrixCSR::<i32>::identity(3);
        assert_eq!(identity.row_ptr, vec![0, 1, 2, 3]);
        assert!(identity.check_structure().is_ok());

        let empty = SparseMatrixCSR::<f64>::zeros(4, 4);
        assert_eq!(empty.nnz(), 0);
        assert!(empty.check_structure().is_ok());
    }

    #[test]
    fn test_check_structure_rejects_unsorted_row() {
        let mut matrix = sample();
        matrix.col_idx.swap(0, 1);
        let err = matrix.check_structure().unwrap_err();
        assert!(err.contains("row 0"));
    }

    #[test]
    fn test_check_structure_rejects_duplicate_column() {
        let matrix = SparseMatrixCSR::new(1, 3, vec![0, 2], vec![1, 1], vec![1.0, 2.0]);
        assert!(matrix.check_structure().is_err());
    }

    #[test]
    #[should_panic(expected = "row_ptr.len() must be n_rows + 1")]
    fn test_invalid_row_ptr() {
        SparseMatrixCSR::new(3, 3, vec![0, 2, 3], vec![0, 1, 1, 0, 2], vec![1, 2, 3, 4, 5]);
    }
}
