//! Utility functions and helpers

pub mod formats;

pub use formats::{from_ndarray, from_sprs_csr, to_ndarray, to_sprs_csr};
