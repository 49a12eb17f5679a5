//! Blocked dense multiply
//!
//! `B` is transposed once so that every `C[i][j]` is a dot product of two
//! contiguous rows, row `i` of `A` and row `j` of `Bᵗ`. The `(ii, jj, kk)`
//! block space is walked in tiles of `block_size`; partial tiles at the edge
//! clamp their bounds to `n`. The kernel accumulates into `C` (`C += A·B`), so
//! callers zero the output first.
//!
//! In parallel mode each worker owns whole block rows (`ii` strides), which
//! are disjoint row ranges of `C`; no synchronization on `C` is needed.

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::kernel::simd::{select_dot, DotFn};
use crate::matrix::DenseMatrix;

/// Computes `c += a · b` sequentially
///
/// # Panics
///
/// Panics if the sizes differ or `block_size` is zero.
pub fn multiply_blocked(
    a: &DenseMatrix,
    b: &DenseMatrix,
    c: &mut DenseMatrix,
    block_size: usize,
    vectorize: bool,
) {
    let n = check_operands(a, b, c, block_size);
    if n == 0 {
        return;
    }

    let bt = b.transpose();
    let dot = select_dot(vectorize);

    for (block, c_rows) in c.as_mut_slice().chunks_mut(block_size * n).enumerate() {
        multiply_block_row(a, &bt, c_rows, block * block_size, block_size, dot);
    }
}

/// Computes `c += a · b` with block rows spread over `pool`
///
/// Returns once every block row has been processed.
pub fn multiply_blocked_parallel(
    a: &DenseMatrix,
    b: &DenseMatrix,
    c: &mut DenseMatrix,
    block_size: usize,
    vectorize: bool,
    pool: &ThreadPool,
) {
    let n = check_operands(a, b, c, block_size);
    if n == 0 {
        return;
    }

    let bt = b.transpose();
    let dot = select_dot(vectorize);
    let c_data = c.as_mut_slice();

    pool.install(|| {
        c_data
            .par_chunks_mut(block_size * n)
            .enumerate()
            .for_each(|(block, c_rows)| {
                multiply_block_row(a, &bt, c_rows, block * block_size, block_size, dot);
            });
    });
}

fn check_operands(a: &DenseMatrix, b: &DenseMatrix, c: &DenseMatrix, block_size: usize) -> usize {
    assert!(block_size > 0, "block_size must be positive");
    assert_eq!(a.size(), b.size(), "Matrix dimensions must be compatible for multiplication");
    assert_eq!(a.size(), c.size(), "Output matrix must match the operand size");
    a.size()
}

/// Processes every `(jj, kk)` tile of the block row starting at `ii`
///
/// `c_rows` holds rows `ii .. min(ii + block_size, n)` of `C`.
fn multiply_block_row(
    a: &DenseMatrix,
    bt: &DenseMatrix,
    c_rows: &mut [f64],
    ii: usize,
    block_size: usize,
    dot: DotFn,
) {
    let n = a.size();
    let i_end = (ii + block_size).min(n);

    for jj in (0..n).step_by(block_size) {
        let j_end = (jj + block_size).min(n);
        for kk in (0..n).step_by(block_size) {
            let k_end = (kk + block_size).min(n);

            for i in ii..i_end {
                let a_seg = &a.row(i)[kk..k_end];
                let c_row = &mut c_rows[(i - ii) * n..(i - ii + 1) * n];
                for j in jj..j_end {
                    c_row[j] += dot(a_seg, &bt.row(j)[kk..k_end]);
                }
            }
        }
    }
}
