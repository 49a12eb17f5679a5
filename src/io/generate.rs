//! Seeded generation of the binary input files

use std::fs;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::constants::{GENERATED_VALUE_BOUND, OPERAND_LABELS};
use crate::error::{BenchError, Result};
use crate::io::loader::{matrix_file_name, write_matrix_file};

/// Dense operand: entries uniform in `0..GENERATED_VALUE_BOUND`
pub fn generate_dense_values(rng: &mut ChaCha8Rng, size: usize) -> Vec<i32> {
    (0..size * size)
        .map(|_| rng.gen_range(0..GENERATED_VALUE_BOUND))
        .collect()
}

/// Sparse operand: each entry zero with probability `sparsity / 100`,
/// otherwise uniform in `1..GENERATED_VALUE_BOUND`
pub fn generate_sparse_values(rng: &mut ChaCha8Rng, size: usize, sparsity: u32) -> Vec<i32> {
    let p_zero = f64::from(sparsity.min(100)) / 100.0;
    (0..size * size)
        .map(|_| {
            if rng.gen_bool(p_zero) {
                0
            } else {
                rng.gen_range(1..GENERATED_VALUE_BOUND)
            }
        })
        .collect()
}

/// Writes `A`/`B` inputs for every size, dense and per sparsity level
///
/// Returns the written paths in generation order.
pub fn generate_matrix_files(
    dir: &Path,
    sizes: &[usize],
    sparsity_levels: &[u32],
    seed: u64,
) -> Result<Vec<PathBuf>> {
    if let Some(bad) = sparsity_levels.iter().find(|&&s| s > 100) {
        return Err(BenchError::InvalidConfig(format!(
            "sparsity level {}% is above 100%",
            bad
        )));
    }

    fs::create_dir_all(dir)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut written = Vec::new();

    for &size in sizes {
        for label in OPERAND_LABELS {
            let path = dir.join(matrix_file_name(label, size, None));
            write_matrix_file(&path, &generate_dense_values(&mut rng, size))?;
            info!("Saved {}", path.display());
            written.push(path);

            for &sparsity in sparsity_levels {
                let path = dir.join(matrix_file_name(label, size, Some(sparsity)));
                write_matrix_file(&path, &generate_sparse_values(&mut rng, size, sparsity))?;
                info!("Saved {}", path.display());
                written.push(path);
            }
        }
    }

    Ok(written)
}
