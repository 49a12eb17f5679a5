//! Input files, record sinks and input generation

pub mod generate;
pub mod loader;
pub mod sink;

pub use generate::generate_matrix_files;
pub use loader::{matrix_file_name, BinaryMatrixLoader, MatrixSource};
pub use sink::{CsvSink, RecordSink};
