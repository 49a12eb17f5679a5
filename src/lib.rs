//! # matbench: instrumented matrix-multiplication kernels
//!
//! matbench measures matrix-multiplication kernels under a sweep of
//! configurations (matrix size, sparsity level, vectorization, thread count)
//! and records timing, memory and CPU-load metrics for every run.
//!
//! ## Overview
//!
//! The crate consists of:
//!
//! - **Kernels**: a cache-blocked dense multiply with optional lane-wise
//!   vector accumulation and a worker pool, Gustavson's row-wise sparse
//!   multiply over CSR operands, and an unoptimized COO baseline
//! - **Harness**: wraps one kernel call with a monotonic timer, a concurrent
//!   peak-memory sampler and a CPU-load delta against the previous run
//! - **Sweep controller**: walks the configuration axes, loads inputs,
//!   separates warmup from measured repetitions and emits one record per run
//!
//! ## Usage
//!
//! Multiplying two sparse matrices:
//!
//! ```
//! use matbench::{gustavson_spgemm, SparseMatrixCSR};
//!
//! let a = SparseMatrixCSR::<f64>::identity(3);
//! let b = SparseMatrixCSR::from_row_major(3, 3, &[0.0, 2.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 5.0]);
//! let c = gustavson_spgemm(&a, &b);
//! assert_eq!(c.nnz(), 3);
//! ```
//!
//! Running a small dense sweep into memory:
//!
//! ```
//! use matbench::{DenseKernel, DenseMatrix, Result, RunConfig, RunRecord, SweepConfig, SweepController};
//!
//! let config = SweepConfig {
//!     sizes: vec![8],
//!     vectorization: vec![true],
//!     thread_counts: vec![1],
//!     warmup: 1,
//!     repetitions: 2,
//!     ..SweepConfig::dense_default()
//! }
//! .without_pauses();
//!
//! let source = |_: &str, n: usize, _: Option<u32>| -> Result<DenseMatrix> { Ok(DenseMatrix::identity(n)) };
//! let mut sweep = SweepController::new(config, source, Vec::<RunRecord>::new());
//! let summary = sweep.run(|c: &RunConfig| DenseKernel::new(c.block_size, c.vectorize, c.threads));
//! assert_eq!(summary.emitted, 3);
//! ```

pub mod arch;
pub mod constants;
pub mod error;
pub mod harness;
pub mod io;
pub mod kernel;
pub mod matrix;
pub mod sweep;
pub mod utils;

// Re-export primary components
pub use arch::{detect_architecture, Architecture};
pub use error::{BenchError, Result};
pub use harness::{CpuSample, Harness, HarnessConfig, Measurement, MemorySampler, TrackingAllocator};
pub use io::{BinaryMatrixLoader, CsvSink, MatrixSource, RecordSink};
pub use kernel::{
    coo_multiply, gustavson_spgemm, multiply_blocked, multiply_blocked_parallel, CooBaselineKernel,
    DenseKernel, GustavsonKernel, Kernel, MarkerAccumulator,
};
pub use matrix::{reference_dense_multiply, reference_spgemm, DenseMatrix, SparseMatrixCSR};
pub use sweep::record::{RecordDetails, RecordShape, RunRecord};
pub use sweep::{RunConfig, SweepConfig, SweepController, SweepState, SweepSummary};
pub use utils::{from_ndarray, from_sprs_csr, to_ndarray, to_sprs_csr};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
