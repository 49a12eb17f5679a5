// Matrix data structures, conversions and reference multiplies

pub mod conversion;
pub mod csr;
pub mod dense;
pub mod reference;

pub use conversion::{dense_to_coo, CooEntry};
pub use csr::SparseMatrixCSR;
pub use dense::DenseMatrix;
pub use reference::{reference_dense_multiply, reference_spgemm};
