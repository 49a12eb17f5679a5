//! Instrumentation around a single kernel invocation
//!
//! One call to [`Harness::run`] produces one [`Measurement`]:
//!
//! 1. classify the repetition as warmup or measured
//! 2. reset the output, then read heap in use (the "allocated" figure)
//! 3. start the peak-memory sampler
//! 4. time the kernel with the monotonic clock
//! 5. stop and join the sampler, then read its peak
//! 6. take a CPU sample and derive the load since the previous run
//!
//! "Allocated" and "peak" measure different things and are reported side by
//! side: the former is a single reading before the call, the latter the
//! maximum seen concurrently during it.

pub mod cpu;
pub mod memory;

use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::warn;

use crate::constants::{BYTES_PER_MB, MEMORY_SAMPLE_INTERVAL, WARMUP_ITERATIONS};
use crate::kernel::Kernel;

pub use cpu::{process_cpu_time, CpuSample};
pub use memory::{heap_in_use, HeapProbe, MemorySampler, TrackingAllocator};

/// Harness settings
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Repetitions `1..=warmup_iterations` are flagged as warmup
    pub warmup_iterations: usize,

    /// Whether the concurrent peak sampler runs at all
    pub sample_memory: bool,

    /// Polling interval of the peak sampler
    pub sample_interval: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            warmup_iterations: WARMUP_ITERATIONS,
            sample_memory: true,
            sample_interval: MEMORY_SAMPLE_INTERVAL,
        }
    }
}

/// Metrics of one kernel invocation
#[derive(Debug, Clone)]
pub struct Measurement {
    /// 1-based repetition index within the configuration
    pub repetition: usize,
    pub warmup: bool,
    pub elapsed: Duration,
    /// Heap in use right before the call
    pub allocated_bytes: usize,
    /// Peak heap seen by the sampler during the call
    pub peak_bytes: Option<usize>,
    /// CPU load since the previous run's sample
    pub cpu_load_percent: Option<f64>,
    pub started_at: DateTime<Local>,
}

impl Measurement {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    pub fn allocated_mb(&self) -> f64 {
        self.allocated_bytes as f64 / BYTES_PER_MB
    }

    pub fn peak_mb(&self) -> f64 {
        self.peak_bytes.unwrap_or(0) as f64 / BYTES_PER_MB
    }

    /// Heap high-water mark of the call above the pre-call reading
    pub fn peak_growth_mb(&self) -> f64 {
        self.peak_bytes.unwrap_or(0).saturating_sub(self.allocated_bytes) as f64 / BYTES_PER_MB
    }
}

/// Wraps kernel invocations with timing, memory and CPU instrumentation
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
    probe: HeapProbe,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            probe: heap_in_use,
        }
    }

    /// Replaces the heap probe (defaults to [`heap_in_use`])
    pub fn with_probe(mut self, probe: HeapProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn is_warmup(&self, repetition: usize) -> bool {
        repetition <= self.config.warmup_iterations
    }

    /// Runs `kernel` once on `a`, `b` into `out`
    ///
    /// `previous` is the CPU sample returned by the preceding run (or taken at
    /// sweep start); the sample taken here is returned for the next one.
    pub fn run<K: Kernel>(
        &self,
        repetition: usize,
        kernel: &K,
        a: &K::Matrix,
        b: &K::Matrix,
        out: &mut K::Output,
        previous: &CpuSample,
    ) -> (Measurement, CpuSample) {
        let warmup = self.is_warmup(repetition);
        let started_at = Local::now();
        // Any allocation or drop done by the reset stays out of both memory figures
        kernel.reset_output(out);
        let allocated_bytes = (self.probe)();

        let sampler = if self.config.sample_memory {
            match MemorySampler::start(self.config.sample_interval, self.probe) {
                Ok(sampler) => Some(sampler),
                Err(e) => {
                    warn!("memory sampler unavailable, peak not recorded: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let start = std::time::Instant::now();
        kernel.multiply(a, b, out);
        let elapsed = start.elapsed();

        let peak_bytes = sampler.map(MemorySampler::stop);

        let current = CpuSample::now();
        let cpu_load_percent = current.load_since(previous);

        let measurement = Measurement {
            repetition,
            warmup,
            elapsed,
            allocated_bytes,
            peak_bytes,
            cpu_load_percent,
            started_at,
        };
        (measurement, current)
    }
}
