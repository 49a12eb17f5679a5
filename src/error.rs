use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("matrix file not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("matrix file {} is truncated: expected {expected} bytes, found {found}", .path.display())]
    Truncated {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BenchError {
    /// True for the "input unavailable" category, which skips a configuration
    pub fn is_missing_input(&self) -> bool {
        matches!(self, BenchError::MissingInput(_) | BenchError::Truncated { .. })
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
