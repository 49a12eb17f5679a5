//! Sweep controller
//!
//! Walks the configuration axes in a fixed nesting order (size, then
//! sparsity group, then vectorization, then thread count, then repetition)
//! and drives load → harness → kernel → emit for every leaf. Records are
//! emitted in exactly that order. No failure aborts the sweep: a group whose
//! inputs cannot be loaded is skipped, a kernel that cannot be built skips
//! its configuration, and a record the sink rejects is logged and dropped.

pub mod record;

use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::constants::{
    CONFIGURATION_PAUSE, DEFAULT_BLOCK_SIZE, DENSE_MATRIX_SIZES, DENSE_NOTES, DENSE_REPETITIONS,
    DENSE_RUN_PAUSE, DENSE_SETTLE_PAUSE, GROUP_PAUSE, MEMORY_SAMPLE_INTERVAL, OPERAND_LABELS,
    SPARSE_MATRIX_SIZES, SPARSE_NOTES, SPARSE_REPETITIONS, SPARSE_RUN_PAUSE, SPARSITY_LEVELS,
    THREAD_COUNTS, VECTORIZATION_OPTIONS, WARMUP_ITERATIONS,
};
use crate::error::{BenchError, Result};
use crate::harness::{CpuSample, Harness, HarnessConfig, Measurement};
use crate::io::{MatrixSource, RecordSink};
use crate::kernel::Kernel;

use record::{new_run_id, RecordDetails, RecordShape, RunRecord};

/// Timestamp layout of emitted records (ISO local date-time)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Axes, repetition counts and pauses of one sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub sizes: Vec<usize>,
    /// Empty for dense sweeps: one group per size, no sparsity suffix
    pub sparsity_levels: Vec<u32>,
    pub vectorization: Vec<bool>,
    pub thread_counts: Vec<usize>,
    pub warmup: usize,
    pub repetitions: usize,
    /// After every run
    pub run_pause: Duration,
    /// Before every run
    pub settle_pause: Duration,
    /// After every vectorization × threads configuration
    pub configuration_pause: Duration,
    /// After every size / sparsity group
    pub group_pause: Duration,
    pub sample_memory: bool,
    pub sample_interval: Duration,
    pub block_size: usize,
    pub notes: String,
}

impl SweepConfig {
    /// Blocked dense sweep over vectorization and thread counts
    pub fn dense_default() -> Self {
        Self {
            sizes: DENSE_MATRIX_SIZES.to_vec(),
            sparsity_levels: Vec::new(),
            vectorization: VECTORIZATION_OPTIONS.to_vec(),
            thread_counts: THREAD_COUNTS.to_vec(),
            warmup: WARMUP_ITERATIONS,
            repetitions: DENSE_REPETITIONS,
            run_pause: DENSE_RUN_PAUSE,
            settle_pause: DENSE_SETTLE_PAUSE,
            configuration_pause: CONFIGURATION_PAUSE,
            group_pause: GROUP_PAUSE,
            sample_memory: true,
            sample_interval: MEMORY_SAMPLE_INTERVAL,
            block_size: DEFAULT_BLOCK_SIZE,
            notes: DENSE_NOTES.to_string(),
        }
    }

    /// Sparse sweep over sizes and sparsity levels, one configuration each
    pub fn sparse_default() -> Self {
        Self {
            sizes: SPARSE_MATRIX_SIZES.to_vec(),
            sparsity_levels: SPARSITY_LEVELS.to_vec(),
            vectorization: vec![false],
            thread_counts: vec![1],
            warmup: WARMUP_ITERATIONS,
            repetitions: SPARSE_REPETITIONS,
            run_pause: SPARSE_RUN_PAUSE,
            settle_pause: Duration::ZERO,
            configuration_pause: Duration::ZERO,
            group_pause: Duration::ZERO,
            sample_memory: true,
            sample_interval: MEMORY_SAMPLE_INTERVAL,
            block_size: DEFAULT_BLOCK_SIZE,
            notes: SPARSE_NOTES.to_string(),
        }
    }

    /// Same axes with every pause removed
    pub fn without_pauses(mut self) -> Self {
        self.run_pause = Duration::ZERO;
        self.settle_pause = Duration::ZERO;
        self.configuration_pause = Duration::ZERO;
        self.group_pause = Duration::ZERO;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(BenchError::InvalidConfig("no matrix sizes".into()));
        }
        if self.vectorization.is_empty() {
            return Err(BenchError::InvalidConfig("no vectorization options".into()));
        }
        if self.thread_counts.is_empty() {
            return Err(BenchError::InvalidConfig("no thread counts".into()));
        }
        if self.thread_counts.contains(&0) {
            return Err(BenchError::InvalidConfig("thread count must be positive".into()));
        }
        if let Some(s) = self.sparsity_levels.iter().find(|&&s| s > 100) {
            return Err(BenchError::InvalidConfig(format!(
                "sparsity level {}% is above 100%",
                s
            )));
        }
        if self.block_size == 0 {
            return Err(BenchError::InvalidConfig("block size must be positive".into()));
        }
        if self.sample_memory && self.sample_interval.is_zero() {
            return Err(BenchError::InvalidConfig(
                "memory sample interval must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Repetitions per configuration, warmup included
    pub fn runs_per_configuration(&self) -> usize {
        self.warmup + self.repetitions
    }

    fn sparsity_groups(&self) -> Vec<Option<u32>> {
        if self.sparsity_levels.is_empty() {
            vec![None]
        } else {
            self.sparsity_levels.iter().copied().map(Some).collect()
        }
    }

    fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            warmup_iterations: self.warmup,
            sample_memory: self.sample_memory,
            sample_interval: self.sample_interval,
        }
    }
}

/// One leaf of the configuration space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub size: usize,
    pub sparsity: Option<u32>,
    pub vectorize: bool,
    pub threads: usize,
    pub block_size: usize,
}

/// States of the sweep state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Loading,
    Warmup,
    Measuring,
    Paused,
    SkipConfiguration,
    Exhausted,
}

/// Tally of a finished sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Records accepted by the sink
    pub emitted: usize,
    /// Size / sparsity groups skipped because an input could not be loaded
    pub skipped_groups: usize,
    /// Configurations skipped because the kernel could not be built
    pub skipped_configurations: usize,
    /// Records the sink rejected
    pub failed_emissions: usize,
}

/// Drives one sweep over a [`MatrixSource`] into a [`RecordSink`]
pub struct SweepController<S, R> {
    config: SweepConfig,
    harness: Harness,
    source: S,
    sink: R,
    state: SweepState,
    core_count: usize,
}

impl<S: MatrixSource, R: RecordSink> SweepController<S, R> {
    pub fn new(config: SweepConfig, source: S, sink: R) -> Self {
        let harness = Harness::new(config.harness_config());
        Self {
            config,
            harness,
            source,
            sink,
            state: SweepState::Loading,
            core_count: num_cpus::get(),
        }
    }

    /// Replaces the harness (e.g. one with an injected heap probe)
    pub fn with_harness(mut self, harness: Harness) -> Self {
        self.harness = harness;
        self
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Gives the sink back, e.g. to inspect collected records
    pub fn into_sink(self) -> R {
        self.sink
    }

    /// Runs the whole sweep, building one kernel per configuration
    pub fn run<K, F>(&mut self, mut make_kernel: F) -> SweepSummary
    where
        K: Kernel,
        F: FnMut(&RunConfig) -> Result<K>,
    {
        let mut summary = SweepSummary::default();
        let mut cpu = CpuSample::now();
        let sizes = self.config.sizes.clone();
        let groups = self.config.sparsity_groups();

        for &size in &sizes {
            for &sparsity in &groups {
                self.transition(SweepState::Loading);
                match sparsity {
                    Some(s) => info!("Matrix size={}, sparse={}%", size, s),
                    None => info!("Matrix size={}", size),
                }

                let inputs = match self.load_group::<K>(size, sparsity) {
                    Ok(inputs) => inputs,
                    Err(e) => {
                        self.transition(SweepState::SkipConfiguration);
                        if e.is_missing_input() {
                            warn!("skipping size={} sparsity={:?}: {}", size, sparsity, e);
                        } else {
                            error!("skipping size={} sparsity={:?}: {}", size, sparsity, e);
                        }
                        summary.skipped_groups += 1;
                        continue;
                    }
                };

                self.run_group(size, sparsity, &inputs, &mut make_kernel, &mut cpu, &mut summary);
                pause(self.config.group_pause);
            }
        }

        self.transition(SweepState::Exhausted);
        info!(
            "Sweep finished: {} records, {} groups skipped, {} configurations skipped, {} emissions failed",
            summary.emitted,
            summary.skipped_groups,
            summary.skipped_configurations,
            summary.failed_emissions
        );
        summary
    }

    fn load_group<K: Kernel>(
        &self,
        size: usize,
        sparsity: Option<u32>,
    ) -> Result<(K::Matrix, K::Matrix)> {
        let [a_label, b_label] = OPERAND_LABELS;
        let a = self.source.load(a_label, size, sparsity)?;
        let b = self.source.load(b_label, size, sparsity)?;
        if a.size() != size || b.size() != size {
            return Err(BenchError::DimensionMismatch(format!(
                "expected {}x{} operands, loaded {} and {}",
                size,
                size,
                a.size(),
                b.size()
            )));
        }
        Ok((K::prepare_input(a), K::prepare_input(b)))
    }

    fn run_group<K, F>(
        &mut self,
        size: usize,
        sparsity: Option<u32>,
        inputs: &(K::Matrix, K::Matrix),
        make_kernel: &mut F,
        cpu: &mut CpuSample,
        summary: &mut SweepSummary,
    ) where
        K: Kernel,
        F: FnMut(&RunConfig) -> Result<K>,
    {
        let vectorization = self.config.vectorization.clone();
        let thread_counts = self.config.thread_counts.clone();

        for &vectorize in &vectorization {
            for &threads in &thread_counts {
                let run_config = RunConfig {
                    size,
                    sparsity,
                    vectorize,
                    threads,
                    block_size: self.config.block_size,
                };

                let kernel = match make_kernel(&run_config) {
                    Ok(kernel) => kernel,
                    Err(e) => {
                        self.transition(SweepState::SkipConfiguration);
                        error!("cannot build kernel for {:?}: {}", run_config, e);
                        summary.skipped_configurations += 1;
                        continue;
                    }
                };

                debug!(
                    "Testing size={} vectorization={} threads={} ({})",
                    size,
                    vectorize,
                    threads,
                    kernel.label()
                );
                self.run_configuration(&run_config, &kernel, inputs, cpu, summary);
                pause(self.config.configuration_pause);
            }
        }
    }

    fn run_configuration<K: Kernel>(
        &mut self,
        run_config: &RunConfig,
        kernel: &K,
        inputs: &(K::Matrix, K::Matrix),
        cpu: &mut CpuSample,
        summary: &mut SweepSummary,
    ) {
        let (a, b) = inputs;
        let mut out = kernel.allocate_output(run_config.size);

        for repetition in 1..=self.config.runs_per_configuration() {
            let state = if self.harness.is_warmup(repetition) {
                SweepState::Warmup
            } else {
                SweepState::Measuring
            };
            self.transition(state);
            pause(self.config.settle_pause);

            let (measurement, sample) = self.harness.run(repetition, kernel, a, b, &mut out, cpu);
            *cpu = sample;

            let record = self.build_record(run_config, kernel, &measurement);
            info!("{}", record.summary());
            match self.sink.emit(&record) {
                Ok(()) => summary.emitted += 1,
                Err(e) => {
                    error!("failed to emit {}: {}", record.run_id, e);
                    summary.failed_emissions += 1;
                }
            }

            self.transition(SweepState::Paused);
            pause(self.config.run_pause);
        }
    }

    fn build_record<K: Kernel>(
        &self,
        run_config: &RunConfig,
        kernel: &K,
        measurement: &Measurement,
    ) -> RunRecord {
        let details = match kernel.record_shape() {
            RecordShape::Dense => RecordDetails::Dense {
                vectorize: run_config.vectorize,
                threads: run_config.threads,
                alloc_mem_mb: measurement.allocated_mb(),
                peak_mem_mb: measurement.peak_mb(),
                cpu_load_percent: measurement.cpu_load_percent,
                core_count: self.core_count,
            },
            RecordShape::Sparse => RecordDetails::Sparse {
                sparsity_percent: run_config.sparsity.unwrap_or(0),
                implementation: kernel.label().to_string(),
                memory_usage_mb: measurement.peak_growth_mb(),
            },
        };

        RunRecord {
            run_id: new_run_id(),
            matrix_size: run_config.size,
            details,
            execution_time_ms: measurement.elapsed_ms(),
            repetition: measurement.repetition,
            timestamp: measurement.started_at.format(TIMESTAMP_FORMAT).to_string(),
            warmup: measurement.warmup,
            notes: self.config.notes.clone(),
        }
    }

    fn transition(&mut self, next: SweepState) {
        if self.state != next {
            debug!("sweep state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
