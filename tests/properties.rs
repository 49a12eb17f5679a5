//! Property tests over random small matrices

use matbench::{
    gustavson_spgemm, multiply_blocked, reference_dense_multiply, DenseMatrix, SparseMatrixCSR,
};
use proptest::prelude::*;

/// Row-major entries of an `n × n` integer matrix, roughly half zeros
fn entries(n: usize) -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(prop_oneof![Just(0i32), -9i32..10], n * n)
}

/// Square integer matrix of side 1..=12
fn int_matrix() -> impl Strategy<Value = DenseMatrix> {
    (1usize..=12)
        .prop_flat_map(|n| entries(n).prop_map(move |values| DenseMatrix::from_ints(n, &values)))
}

/// Pair of integer matrices with the same side
fn int_pair() -> impl Strategy<Value = (DenseMatrix, DenseMatrix)> {
    (1usize..=12).prop_flat_map(|n| {
        (entries(n), entries(n))
            .prop_map(move |(a, b)| (DenseMatrix::from_ints(n, &a), DenseMatrix::from_ints(n, &b)))
    })
}

proptest! {
    #[test]
    fn scalar_blocked_equals_reference((a, b) in int_pair(), block_size in 1usize..9) {
        let mut c = DenseMatrix::zeros(a.size());
        multiply_blocked(&a, &b, &mut c, block_size, false);
        prop_assert_eq!(c, reference_dense_multiply(&a, &b));
    }

    #[test]
    fn vectorized_blocked_equals_reference((a, b) in int_pair(), block_size in 1usize..9) {
        let mut c = DenseMatrix::zeros(a.size());
        multiply_blocked(&a, &b, &mut c, block_size, true);
        let reference = reference_dense_multiply(&a, &b);
        prop_assert!(c.max_abs_diff(&reference) <= 1e-9);
    }

    #[test]
    fn gustavson_equals_dense_reference((a, b) in int_pair()) {
        let c = gustavson_spgemm(&SparseMatrixCSR::from_dense(&a), &SparseMatrixCSR::from_dense(&b));
        prop_assert_eq!(c.to_dense(), reference_dense_multiply(&a, &b));
    }

    #[test]
    fn gustavson_output_is_well_formed((a, b) in int_pair()) {
        let c = gustavson_spgemm(&SparseMatrixCSR::from_dense(&a), &SparseMatrixCSR::from_dense(&b));

        prop_assert_eq!(c.row_ptr[0], 0);
        prop_assert_eq!(c.row_ptr[c.n_rows], c.nnz());
        prop_assert!(c.row_ptr.windows(2).all(|w| w[0] <= w[1]));
        for i in 0..c.n_rows {
            let cols = &c.col_idx[c.row_ptr[i]..c.row_ptr[i + 1]];
            prop_assert!(cols.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn zero_operand_is_absorbing(a in int_matrix()) {
        let n = a.size();
        let sparse_a = SparseMatrixCSR::from_dense(&a);
        let zero = SparseMatrixCSR::<f64>::zeros(n, n);
        prop_assert_eq!(gustavson_spgemm(&sparse_a, &zero).nnz(), 0);
        prop_assert_eq!(gustavson_spgemm(&zero, &sparse_a).nnz(), 0);

        let mut c = DenseMatrix::zeros(n);
        multiply_blocked(&a, &DenseMatrix::zeros(n), &mut c, 4, true);
        prop_assert!(c.is_zero());
    }

    #[test]
    fn csr_conversion_roundtrips(a in int_matrix()) {
        let sparse = SparseMatrixCSR::from_dense(&a);
        prop_assert!(sparse.check_structure().is_ok());
        prop_assert_eq!(sparse.to_dense(), a);
    }
}
