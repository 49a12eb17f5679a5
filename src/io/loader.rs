//! Binary matrix input files
//!
//! One file per operand label and size (and, for sparse sweeps, sparsity
//! level): `size × size` little-endian `i32` values in row-major order, no
//! header. File names are `{label}_{size}.bin` or `{label}_{size}_{sparsity}.bin`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};
use crate::matrix::DenseMatrix;

/// Bytes per stored element
const ELEMENT_BYTES: usize = std::mem::size_of::<i32>();

/// Anything that can produce the operand matrices of a sweep group
pub trait MatrixSource {
    /// Loads operand `label` of side `size`, for `sparsity` percent if given
    fn load(&self, label: &str, size: usize, sparsity: Option<u32>) -> Result<DenseMatrix>;
}

impl<F> MatrixSource for F
where
    F: Fn(&str, usize, Option<u32>) -> Result<DenseMatrix>,
{
    fn load(&self, label: &str, size: usize, sparsity: Option<u32>) -> Result<DenseMatrix> {
        self(label, size, sparsity)
    }
}

/// File name of an operand
pub fn matrix_file_name(label: &str, size: usize, sparsity: Option<u32>) -> String {
    match sparsity {
        Some(s) => format!("{}_{}_{}.bin", label, size, s),
        None => format!("{}_{}.bin", label, size),
    }
}

/// Reads operands from a directory of binary files
#[derive(Debug, Clone)]
pub struct BinaryMatrixLoader {
    dir: PathBuf,
}

impl BinaryMatrixLoader {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, label: &str, size: usize, sparsity: Option<u32>) -> PathBuf {
        self.dir.join(matrix_file_name(label, size, sparsity))
    }
}

impl MatrixSource for BinaryMatrixLoader {
    fn load(&self, label: &str, size: usize, sparsity: Option<u32>) -> Result<DenseMatrix> {
        let path = self.path_for(label, size, sparsity);
        read_matrix_file(&path, size)
    }
}

/// Reads a `size × size` matrix; trailing bytes beyond it are ignored
pub fn read_matrix_file(path: &Path, size: usize) -> Result<DenseMatrix> {
    let expected = size
        .checked_mul(size)
        .and_then(|cells| cells.checked_mul(ELEMENT_BYTES))
        .ok_or_else(|| {
            BenchError::InvalidConfig(format!("matrix size {} overflows the file length", size))
        })?;

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(BenchError::MissingInput(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    if bytes.len() < expected {
        return Err(BenchError::Truncated {
            path: path.to_path_buf(),
            expected,
            found: bytes.len(),
        });
    }

    let values: Vec<i32> = bytes[..expected]
        .chunks_exact(ELEMENT_BYTES)
        .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Ok(DenseMatrix::from_ints(size, &values))
}

/// Writes row-major `values` in the input file format
pub fn write_matrix_file(path: &Path, values: &[i32]) -> Result<()> {
    let mut bytes = Vec::with_capacity(values.len() * ELEMENT_BYTES);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    fs::write(path, bytes)?;
    Ok(())
}
