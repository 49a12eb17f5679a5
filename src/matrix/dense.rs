//! Square dense matrix stored row-major in one aligned buffer

use std::fmt;

use aligned_vec::AVec;

/// Alignment of the row-major buffer, one cache line
const DENSE_ALIGN: usize = 64;

/// A square `n × n` matrix of `f64` in row-major order
///
/// All rows live in a single cache-line aligned buffer, so row `i` is the
/// contiguous slice `data[i * n .. (i + 1) * n]`. The vectorized dense kernel
/// relies on that contiguity for its lane loads.
#[derive(Clone)]
pub struct DenseMatrix {
    /// Side length (rows == cols == n)
    n: usize,

    /// Row-major values (size: n * n)
    data: AVec<f64>,
}

impl DenseMatrix {
    /// Creates an all-zero matrix of side `n`
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: AVec::from_iter(DENSE_ALIGN, (0..n * n).map(|_| 0.0f64)),
        }
    }

    /// Creates a matrix from row-major values
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != n * n`.
    pub fn from_row_major(n: usize, values: &[f64]) -> Self {
        assert_eq!(values.len(), n * n, "values.len() must be n * n");
        Self {
            n,
            data: AVec::from_slice(DENSE_ALIGN, values),
        }
    }

    /// Creates a matrix from a slice of equally long rows
    ///
    /// # Panics
    ///
    /// Panics if the rows do not form a square grid.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Self {
        let n = rows.len();
        for row in rows {
            assert_eq!(row.as_ref().len(), n, "matrix must be square");
        }
        Self {
            n,
            data: AVec::from_iter(
                DENSE_ALIGN,
                rows.iter().flat_map(|row| row.as_ref().iter().copied()),
            ),
        }
    }

    /// Creates a matrix from row-major 32-bit integers, the on-disk element type
    pub fn from_ints(n: usize, values: &[i32]) -> Self {
        assert_eq!(values.len(), n * n, "values.len() must be n * n");
        Self {
            n,
            data: AVec::from_iter(DENSE_ALIGN, values.iter().map(|&v| f64::from(v))),
        }
    }

    /// Creates the identity matrix of side `n`
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.n + j] = value;
    }

    /// Row `i` as a contiguous slice
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Zero-fills every entry in place, keeping the allocation
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Returns true when every entry is exactly zero
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }

    /// Returns the transpose as a new matrix
    pub fn transpose(&self) -> Self {
        let n = self.n;
        let mut t = Self::zeros(n);
        for i in 0..n {
            let row = self.row(i);
            for (j, &v) in row.iter().enumerate() {
                t.data[j * n + i] = v;
            }
        }
        t
    }

    /// Reads and rewrites every entry so all pages are resident before timing
    pub fn pre_touch(&mut self) {
        for v in self.data.iter_mut() {
            *v = std::hint::black_box(*v + 0.0);
        }
    }

    /// Largest absolute entry-wise difference to `other`
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ.
    pub fn max_abs_diff(&self, other: &DenseMatrix) -> f64 {
        assert_eq!(self.n, other.n, "matrix sizes must match");
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

impl fmt::Debug for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DenseMatrix {{")?;
        writeln!(f, "  dimensions: {} × {}", self.n, self.n)?;

        let max_rows_to_print = 5.min(self.n);
        for i in 0..max_rows_to_print {
            let row = self.row(i);
            let shown = 5.min(self.n);
            write!(f, "    row {}: {:?}", i, &row[..shown])?;
            if self.n > shown {
                write!(f, " ... ({} more)", self.n - shown)?;
            }
            writeln!(f)?;
        }
        if self.n > max_rows_to_print {
            writeln!(f, "    ... ({} more rows)", self.n - max_rows_to_print)?;
        }

        write!(f, "}}")
    }
}

impl PartialEq for DenseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n && self.as_slice() == other.as_slice()
    }
}
