//! Benchmarks for the dense and sparse multiply kernels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matbench::{
    coo_multiply, gustavson_spgemm, multiply_blocked, multiply_blocked_parallel, DenseMatrix,
    SparseMatrixCSR,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::ThreadPoolBuilder;

/// Integer-valued matrix with the given percentage of zeros
fn create_matrix(n: usize, sparsity: u32, seed: u64) -> DenseMatrix {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let values: Vec<i32> = (0..n * n)
        .map(|_| {
            if rng.gen_range(0..100) < sparsity {
                0
            } else {
                rng.gen_range(1..10)
            }
        })
        .collect();
    DenseMatrix::from_ints(n, &values)
}

fn bench_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_blocked");

    for &n in &[64usize, 256] {
        let a = create_matrix(n, 0, 1);
        let b = create_matrix(n, 0, 2);
        let mut out = DenseMatrix::zeros(n);

        for (name, vectorize) in [("scalar", false), ("vector", true)] {
            group.bench_with_input(BenchmarkId::new(name, n), &n, |bench, _| {
                bench.iter(|| {
                    out.clear();
                    multiply_blocked(black_box(&a), black_box(&b), &mut out, 64, vectorize);
                })
            });
        }

        for threads in [2, 4] {
            let pool = ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
            group.bench_with_input(
                BenchmarkId::new(format!("parallel_{}", threads), n),
                &n,
                |bench, _| {
                    bench.iter(|| {
                        out.clear();
                        multiply_blocked_parallel(
                            black_box(&a),
                            black_box(&b),
                            &mut out,
                            64,
                            true,
                            &pool,
                        );
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_sparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse");
    let n = 256;

    for &sparsity in &[50u32, 90, 95] {
        let dense_a = create_matrix(n, sparsity, 3);
        let dense_b = create_matrix(n, sparsity, 4);
        let a = SparseMatrixCSR::from_dense(&dense_a);
        let b = SparseMatrixCSR::from_dense(&dense_b);

        group.bench_with_input(BenchmarkId::new("gustavson", sparsity), &sparsity, |bench, _| {
            bench.iter(|| gustavson_spgemm(black_box(&a), black_box(&b)))
        });

        // The all-pairs baseline is quadratic in nnz; keep it to the sparse end
        if sparsity >= 90 {
            let mut out = DenseMatrix::zeros(n);
            group.bench_with_input(BenchmarkId::new("coo", sparsity), &sparsity, |bench, _| {
                bench.iter(|| {
                    out.clear();
                    coo_multiply(black_box(&dense_a), black_box(&dense_b), &mut out);
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_dense, bench_sparse);
criterion_main!(benches);
