//! Centralized constants for the matbench kernels and sweep harness
//!
//! Every default that the sweep, the harness or the kernels fall back to lives
//! here. All of them can be overridden through `SweepConfig`, `HarnessConfig`
//! or the command line; nothing else in the crate hardcodes these values.

use std::time::Duration;

// ============================================================================
// ARCHITECTURE-SPECIFIC CONSTANTS
// ============================================================================

/// Vector width in bytes for AVX-512 architecture
pub const AVX512_VECTOR_WIDTH_BYTES: usize = 64;

/// Vector width in bytes for AVX2 architecture
pub const AVX2_VECTOR_WIDTH_BYTES: usize = 32;

/// Vector width in bytes for ARM NEON architecture
pub const NEON_VECTOR_WIDTH_BYTES: usize = 16;

/// Vector width in bytes for generic/scalar processing
pub const SCALAR_VECTOR_WIDTH_BYTES: usize = 8;

// ============================================================================
// KERNEL CONSTANTS
// ============================================================================

/// Edge length of the square tiles walked by the blocked dense kernel
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Marker value for a scratch column not yet touched by any row
pub const UNMARKED: usize = usize::MAX;

// ============================================================================
// SWEEP AXES
// ============================================================================

/// Matrix sizes visited by the dense sweep
pub const DENSE_MATRIX_SIZES: [usize; 1] = [64];

/// Matrix sizes visited by the sparse sweep
pub const SPARSE_MATRIX_SIZES: [usize; 4] = [64, 128, 256, 512];

/// Sparsity levels (percent of zero entries) visited by the sparse sweep
pub const SPARSITY_LEVELS: [u32; 5] = [0, 50, 75, 90, 95];

/// Vectorization settings visited by the dense sweep (off, then on)
pub const VECTORIZATION_OPTIONS: [bool; 2] = [false, true];

/// Worker counts visited by the dense sweep; 1 means the sequential path
pub const THREAD_COUNTS: [usize; 6] = [1, 2, 4, 6, 8, 10];

// ============================================================================
// REPETITIONS
// ============================================================================

/// Warmup repetitions before measured ones
pub const WARMUP_ITERATIONS: usize = 5;

/// Measured repetitions of the dense sweep
pub const DENSE_REPETITIONS: usize = 15;

/// Measured repetitions of the sparse sweep
pub const SPARSE_REPETITIONS: usize = 10;

// ============================================================================
// PAUSES AND SAMPLING
// ============================================================================

/// Pause after every dense run
pub const DENSE_RUN_PAUSE: Duration = Duration::from_millis(200);

/// Pause after every sparse run
pub const SPARSE_RUN_PAUSE: Duration = Duration::from_millis(2000);

/// Settle delay right before a dense run starts
pub const DENSE_SETTLE_PAUSE: Duration = Duration::from_millis(50);

/// Settle delay after all repetitions of one configuration
pub const CONFIGURATION_PAUSE: Duration = Duration::from_millis(50);

/// Settle delay after all configurations of one input group
pub const GROUP_PAUSE: Duration = Duration::from_millis(100);

/// Polling interval of the peak-memory sampler
pub const MEMORY_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

/// Bytes per reported megabyte
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ============================================================================
// FILES AND RECORDS
// ============================================================================

/// Directory the binary matrix inputs are read from
pub const DEFAULT_MATRIX_DIR: &str = "./matrices";

/// CSV file the run records are appended to
pub const DEFAULT_OUTPUT_CSV: &str = "benchmark_raw_results.csv";

/// Field separator of the CSV sink
pub const CSV_SEPARATOR: char = ';';

/// Notes attached to dense records
pub const DENSE_NOTES: &str = "Pre-touched memory & CPU frequency stabilized";

/// Notes attached to sparse records
pub const SPARSE_NOTES: &str = "No notes";

/// Seed of the input generator
pub const GENERATOR_SEED: u64 = 42;

/// Exclusive upper bound of generated matrix entries
pub const GENERATED_VALUE_BOUND: i32 = 10;

/// Labels of the two operands of every multiply
pub const OPERAND_LABELS: [&str; 2] = ["A", "B"];
