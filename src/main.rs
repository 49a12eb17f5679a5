//! matbench CLI
//!
//! # Commands
//!
//! - `dense` - blocked dense sweep over vectorization and thread counts
//! - `sparse` - sparse sweep over sizes and sparsity levels
//! - `generate` - write the binary input matrices

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use matbench::constants::{
    DEFAULT_MATRIX_DIR, DEFAULT_OUTPUT_CSV, GENERATOR_SEED, SPARSE_MATRIX_SIZES, SPARSITY_LEVELS,
};
use matbench::io::generate_matrix_files;
use matbench::{
    detect_architecture, BinaryMatrixLoader, CooBaselineKernel, CsvSink, DenseKernel,
    GustavsonKernel, Kernel, RecordShape, Result, RunConfig, SweepConfig, SweepController,
    SweepSummary, TrackingAllocator,
};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

/// Instrumented matrix-multiplication benchmark sweeps
#[derive(Parser)]
#[command(name = "matbench")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blocked dense multiply sweep
    ///
    /// Examples:
    ///   matbench dense
    ///   matbench dense --sizes 64,128 --threads 1,4 --vectorization simd
    Dense {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Vectorization modes to sweep
        #[arg(long, value_enum, value_delimiter = ',')]
        vectorization: Option<Vec<Vectorization>>,

        /// Thread counts to sweep
        #[arg(long, value_delimiter = ',')]
        threads: Option<Vec<usize>>,

        /// Block edge length of the tiled loops
        #[arg(long)]
        block_size: Option<usize>,
    },
    /// Sparse multiply sweep
    ///
    /// Examples:
    ///   matbench sparse
    ///   matbench sparse --implementation unoptimized --sparsity 90,95
    Sparse {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Sparsity levels (percent zeros) to sweep
        #[arg(long, value_delimiter = ',')]
        sparsity: Option<Vec<u32>>,

        /// Which sparse kernel to run
        #[arg(long, value_enum, default_value = "optimized")]
        implementation: Implementation,
    },
    /// Generate the binary input matrices
    Generate {
        /// Output directory
        #[arg(long, default_value = DEFAULT_MATRIX_DIR)]
        matrix_dir: PathBuf,

        /// Matrix sizes
        #[arg(long, value_delimiter = ',')]
        sizes: Option<Vec<usize>>,

        /// Sparsity levels of the sparse inputs
        #[arg(long, value_delimiter = ',')]
        sparsity: Option<Vec<u32>>,

        /// Random seed
        #[arg(long, default_value_t = GENERATOR_SEED)]
        seed: u64,
    },
}

/// Options shared by both sweeps; unset values keep the sweep's defaults
#[derive(Args)]
struct SweepArgs {
    /// Matrix sizes to sweep
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Warmup repetitions per configuration
    #[arg(long)]
    warmup: Option<usize>,

    /// Measured repetitions per configuration
    #[arg(long)]
    repetitions: Option<usize>,

    /// Pause after every run, in milliseconds
    #[arg(long)]
    run_pause_ms: Option<u64>,

    /// Pause before every run, in milliseconds
    #[arg(long)]
    settle_pause_ms: Option<u64>,

    /// Pause after each configuration's runs, in milliseconds
    #[arg(long)]
    configuration_pause_ms: Option<u64>,

    /// Pause after each input group, in milliseconds
    #[arg(long)]
    group_pause_ms: Option<u64>,

    /// Polling interval of the peak-memory sampler, in milliseconds
    #[arg(long)]
    sample_interval_ms: Option<u64>,

    /// Directory holding the input matrices
    #[arg(long, default_value = DEFAULT_MATRIX_DIR)]
    matrix_dir: PathBuf,

    /// CSV file records are appended to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_CSV)]
    output: PathBuf,

    /// Skip the concurrent peak-memory sampler
    #[arg(long)]
    no_memory_sampling: bool,
}

impl SweepArgs {
    fn apply(&self, config: &mut SweepConfig) {
        if let Some(sizes) = &self.sizes {
            config.sizes = sizes.clone();
        }
        if let Some(warmup) = self.warmup {
            config.warmup = warmup;
        }
        if let Some(repetitions) = self.repetitions {
            config.repetitions = repetitions;
        }
        if let Some(ms) = self.run_pause_ms {
            config.run_pause = Duration::from_millis(ms);
        }
        if let Some(ms) = self.settle_pause_ms {
            config.settle_pause = Duration::from_millis(ms);
        }
        if let Some(ms) = self.configuration_pause_ms {
            config.configuration_pause = Duration::from_millis(ms);
        }
        if let Some(ms) = self.group_pause_ms {
            config.group_pause = Duration::from_millis(ms);
        }
        if let Some(ms) = self.sample_interval_ms {
            config.sample_interval = Duration::from_millis(ms);
        }
        if self.no_memory_sampling {
            config.sample_memory = false;
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Vectorization {
    None,
    Simd,
}

#[derive(Clone, Copy, ValueEnum)]
enum Implementation {
    Optimized,
    Unoptimized,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Dense {
            sweep,
            vectorization,
            threads,
            block_size,
        } => {
            let mut config = SweepConfig::dense_default();
            sweep.apply(&mut config);
            if let Some(modes) = vectorization {
                config.vectorization = modes
                    .into_iter()
                    .map(|m| matches!(m, Vectorization::Simd))
                    .collect();
            }
            if let Some(threads) = threads {
                config.thread_counts = threads;
            }
            if let Some(block_size) = block_size {
                config.block_size = block_size;
            }

            let arch = detect_architecture();
            info!(
                "Dense sweep on {:?} ({} f64 lanes, {} cores)",
                arch,
                arch.f64_lanes(),
                num_cpus::get()
            );
            info!("Memory pre-touched, CPU frequency assumed stable");

            run_sweep(&sweep, config, RecordShape::Dense, |c: &RunConfig| {
                DenseKernel::new(c.block_size, c.vectorize, c.threads)
            })?;
        }
        Commands::Sparse {
            sweep,
            sparsity,
            implementation,
        } => {
            let mut config = SweepConfig::sparse_default();
            sweep.apply(&mut config);
            if let Some(levels) = sparsity {
                config.sparsity_levels = levels;
            }

            match implementation {
                Implementation::Optimized => {
                    run_sweep(&sweep, config, RecordShape::Sparse, |_: &RunConfig| {
                        Ok(GustavsonKernel)
                    })?;
                }
                Implementation::Unoptimized => {
                    run_sweep(&sweep, config, RecordShape::Sparse, |_: &RunConfig| {
                        Ok(CooBaselineKernel)
                    })?;
                }
            }
        }
        Commands::Generate {
            matrix_dir,
            sizes,
            sparsity,
            seed,
        } => {
            let sizes = sizes.unwrap_or_else(|| SPARSE_MATRIX_SIZES.to_vec());
            let sparsity = sparsity.unwrap_or_else(|| SPARSITY_LEVELS.to_vec());
            let written = generate_matrix_files(&matrix_dir, &sizes, &sparsity, seed)?;
            info!("Wrote {} matrices to {}", written.len(), matrix_dir.display());
        }
    }

    Ok(())
}

fn run_sweep<K, F>(
    args: &SweepArgs,
    config: SweepConfig,
    shape: RecordShape,
    make_kernel: F,
) -> Result<SweepSummary>
where
    K: Kernel,
    F: FnMut(&RunConfig) -> Result<K>,
{
    config.validate()?;
    let loader = BinaryMatrixLoader::new(&args.matrix_dir);
    let mut sink = CsvSink::new(&args.output, shape);
    match sink.prepare() {
        Ok(()) => info!("Writing records to {}", sink.path().display()),
        Err(e) => error!(
            "CSV output {} unavailable, retrying per record: {}",
            sink.path().display(),
            e
        ),
    }

    let mut controller = SweepController::new(config, loader, sink);
    Ok(controller.run(make_kernel))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .init();
}
