//! Multiply kernels and the abstraction the sweep drives them through
//!
//! A sweep is the same load → measure → emit loop whichever kernel is plugged
//! in. The [`Kernel`] trait is the seam: it converts the loaded integer grid
//! into the kernel's operand format, owns the output's lifecycle and performs
//! one multiply.

pub mod blocked;
pub mod coo;
pub mod gustavson;
pub mod simd;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;
use crate::matrix::{DenseMatrix, SparseMatrixCSR};
use crate::sweep::record::RecordShape;

pub use blocked::{multiply_blocked, multiply_blocked_parallel};
pub use coo::coo_multiply;
pub use gustavson::{gustavson_spgemm, MarkerAccumulator};
pub use simd::{dot_lanes, dot_scalar, portable_dot, select_dot};

/// A multiply kernel as seen by the harness and the sweep
pub trait Kernel {
    /// Operand format; shared read-only across every run of an input group
    type Matrix: Sync;

    /// Result storage, reused across the repetitions of one configuration
    type Output;

    /// Implementation name written to records
    fn label(&self) -> &str;

    /// Which record schema this kernel's runs are emitted with
    fn record_shape(&self) -> RecordShape;

    /// Converts a loaded matrix into the operand format (outside any timing)
    fn prepare_input(raw: DenseMatrix) -> Self::Matrix;

    /// Allocates the output for side length `n`
    fn allocate_output(&self, n: usize) -> Self::Output;

    /// Brings the output back to its empty state before a run (outside timing)
    fn reset_output(&self, out: &mut Self::Output);

    /// Performs one multiply; runs to completion
    fn multiply(&self, a: &Self::Matrix, b: &Self::Matrix, out: &mut Self::Output);
}

/// Blocked dense kernel with optional vector lanes and worker pool
pub struct DenseKernel {
    block_size: usize,
    vectorize: bool,
    threads: usize,
    pool: Option<ThreadPool>,
}

impl DenseKernel {
    /// Creates the kernel; `threads > 1` builds a dedicated pool of that many workers
    pub fn new(block_size: usize, vectorize: bool, threads: usize) -> Result<Self> {
        let pool = if threads > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("matbench-worker-{}", i))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self {
            block_size,
            vectorize,
            threads,
            pool,
        })
    }

    pub fn vectorize(&self) -> bool {
        self.vectorize
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Kernel for DenseKernel {
    type Matrix = DenseMatrix;
    type Output = DenseMatrix;

    fn label(&self) -> &str {
        "blocked"
    }

    fn record_shape(&self) -> RecordShape {
        RecordShape::Dense
    }

    fn prepare_input(mut raw: DenseMatrix) -> DenseMatrix {
        raw.pre_touch();
        raw
    }

    fn allocate_output(&self, n: usize) -> DenseMatrix {
        let mut out = DenseMatrix::zeros(n);
        out.pre_touch();
        out
    }

    fn reset_output(&self, out: &mut DenseMatrix) {
        out.clear();
    }

    fn multiply(&self, a: &DenseMatrix, b: &DenseMatrix, out: &mut DenseMatrix) {
        match &self.pool {
            Some(pool) => {
                multiply_blocked_parallel(a, b, out, self.block_size, self.vectorize, pool)
            }
            None => multiply_blocked(a, b, out, self.block_size, self.vectorize),
        }
    }
}

/// Gustavson sparse kernel over CSR operands
#[derive(Debug, Default, Clone, Copy)]
pub struct GustavsonKernel;

impl Kernel for GustavsonKernel {
    type Matrix = SparseMatrixCSR<f64>;
    type Output = SparseMatrixCSR<f64>;

    fn label(&self) -> &str {
        "optimized"
    }

    fn record_shape(&self) -> RecordShape {
        RecordShape::Sparse
    }

    fn prepare_input(raw: DenseMatrix) -> SparseMatrixCSR<f64> {
        SparseMatrixCSR::from_dense(&raw)
    }

    fn allocate_output(&self, n: usize) -> SparseMatrixCSR<f64> {
        SparseMatrixCSR::zeros(n, n)
    }

    fn reset_output(&self, out: &mut SparseMatrixCSR<f64>) {
        // Dropping the previous result here keeps its free out of the timed call
        *out = SparseMatrixCSR::zeros(out.n_rows, out.n_cols);
    }

    fn multiply(
        &self,
        a: &SparseMatrixCSR<f64>,
        b: &SparseMatrixCSR<f64>,
        out: &mut SparseMatrixCSR<f64>,
    ) {
        *out = gustavson_spgemm(a, b);
    }
}

/// COO all-pairs baseline kernel
#[derive(Debug, Default, Clone, Copy)]
pub struct CooBaselineKernel;

impl Kernel for CooBaselineKernel {
    type Matrix = DenseMatrix;
    type Output = DenseMatrix;

    fn label(&self) -> &str {
        "unoptimized"
    }

    fn record_shape(&self) -> RecordShape {
        RecordShape::Sparse
    }

    fn prepare_input(raw: DenseMatrix) -> DenseMatrix {
        raw
    }

    fn allocate_output(&self, n: usize) -> DenseMatrix {
        DenseMatrix::zeros(n)
    }

    fn reset_output(&self, out: &mut DenseMatrix) {
        out.clear();
    }

    fn multiply(&self, a: &DenseMatrix, b: &DenseMatrix, out: &mut DenseMatrix) {
        coo_multiply(a, b, out);
    }
}
