//! Run records and their two CSV row schemas
//!
//! Both schemas share the prefix `run_id, matrix_size` and the suffix
//! `repetition, timestamp, warm-up, notes`; the columns between differ for
//! dense and sparse sweeps.

use uuid::Uuid;

use crate::constants::CSV_SEPARATOR;

/// Which row schema a record is written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    Dense,
    Sparse,
}

impl RecordShape {
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            RecordShape::Dense => &[
                "run_id",
                "matrix_size",
                "vectorization",
                "threads",
                "execution_time_ms",
                "alloc_mem_mb",
                "peak_mem_mb",
                "cpu_usage_percent",
                "num_cores",
                "repetition",
                "timestamp",
                "warm-up",
                "notes",
            ],
            RecordShape::Sparse => &[
                "run_id",
                "matrix_size",
                "sparse_level_percent",
                "implementation",
                "execution_time_ms",
                "memory_usage_mb",
                "repetition",
                "timestamp",
                "warm-up",
                "notes",
            ],
        }
    }

    /// Header joined with the CSV separator
    pub fn header_line(&self) -> String {
        self.header().join(&CSV_SEPARATOR.to_string())
    }
}

/// Columns specific to one sweep variant
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDetails {
    Dense {
        vectorize: bool,
        threads: usize,
        alloc_mem_mb: f64,
        peak_mem_mb: f64,
        cpu_load_percent: Option<f64>,
        core_count: usize,
    },
    Sparse {
        sparsity_percent: u32,
        implementation: String,
        memory_usage_mb: f64,
    },
}

/// One emitted run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub run_id: String,
    pub matrix_size: usize,
    pub details: RecordDetails,
    pub execution_time_ms: f64,
    pub repetition: usize,
    pub timestamp: String,
    pub warmup: bool,
    pub notes: String,
}

/// Fresh identifier of the form `run_xxxxxxxx`
pub fn new_run_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("run_{}", &id[..8])
}

impl RunRecord {
    pub fn shape(&self) -> RecordShape {
        match self.details {
            RecordDetails::Dense { .. } => RecordShape::Dense,
            RecordDetails::Sparse { .. } => RecordShape::Sparse,
        }
    }

    /// Field values in header order, formatted for the CSV sink
    pub fn fields(&self) -> Vec<String> {
        let mut fields = vec![self.run_id.clone(), self.matrix_size.to_string()];

        match &self.details {
            RecordDetails::Dense {
                vectorize,
                threads,
                alloc_mem_mb,
                peak_mem_mb,
                cpu_load_percent,
                core_count,
            } => {
                fields.push(if *vectorize { "simd" } else { "none" }.to_string());
                fields.push(threads.to_string());
                fields.push(format!("{:.3}", self.execution_time_ms));
                fields.push(format!("{:.3}", alloc_mem_mb));
                fields.push(format!("{:.3}", peak_mem_mb));
                fields.push(cpu_load_percent.map(|c| format!("{:.2}", c)).unwrap_or_default());
                fields.push(core_count.to_string());
            }
            RecordDetails::Sparse {
                sparsity_percent,
                implementation,
                memory_usage_mb,
            } => {
                fields.push(sparsity_percent.to_string());
                fields.push(implementation.clone());
                fields.push(format!("{:.3}", self.execution_time_ms));
                fields.push(format!("{:.3}", memory_usage_mb));
            }
        }

        fields.push(self.repetition.to_string());
        fields.push(self.timestamp.clone());
        fields.push(if self.warmup { "1" } else { "0" }.to_string());
        fields.push(self.notes.clone());
        fields
    }

    /// Fields joined with the CSV separator
    pub fn csv_line(&self) -> String {
        self.fields().join(&CSV_SEPARATOR.to_string())
    }

    /// One-line console summary
    pub fn summary(&self) -> String {
        match &self.details {
            RecordDetails::Dense {
                vectorize,
                threads,
                alloc_mem_mb,
                peak_mem_mb,
                cpu_load_percent,
                ..
            } => format!(
                "[{}] size={} vec={} thr={} | time={:.2} ms | alloc={:.2} MB | peak={:.2} MB | cpu={} | warmup={}",
                self.run_id,
                self.matrix_size,
                if *vectorize { "simd" } else { "none" },
                threads,
                self.execution_time_ms,
                alloc_mem_mb,
                peak_mem_mb,
                cpu_load_percent
                    .map(|c| format!("{:.1}%", c))
                    .unwrap_or_else(|| "n/a".to_string()),
                self.warmup
            ),
            RecordDetails::Sparse {
                sparsity_percent,
                implementation,
                memory_usage_mb,
            } => format!(
                "[{}] size={}, sparse={}% ({}) | time={:.2} ms | mem={:.2} MB | warmup={}",
                self.run_id,
                self.matrix_size,
                sparsity_percent,
                implementation,
                self.execution_time_ms,
                memory_usage_mb,
                self.warmup
            ),
        }
    }
}
