//! Destinations for emitted run records

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::sweep::record::{RecordShape, RunRecord};

/// Consumer of run records, called once per run in emission order
pub trait RecordSink {
    fn emit(&mut self, record: &RunRecord) -> Result<()>;
}

/// Collects records in memory
impl RecordSink for Vec<RunRecord> {
    fn emit(&mut self, record: &RunRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn emit(&mut self, record: &RunRecord) -> Result<()> {
        (**self).emit(record)
    }
}

/// Appends `;`-separated rows to a CSV file
///
/// The header is written only when the file is new or empty, so repeated
/// sweeps keep appending to one table. Every row is flushed as it is written.
///
/// The file is opened on first use. When opening or writing fails the handle
/// is dropped and the next record tries again, so an unavailable output costs
/// only the records emitted while it is unavailable.
pub struct CsvSink {
    path: PathBuf,
    shape: RecordShape,
    file: Option<File>,
}

impl CsvSink {
    /// Creates a sink for `path` without touching the filesystem
    pub fn new<P: AsRef<Path>>(path: P, shape: RecordShape) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            shape,
            file: None,
        }
    }

    /// Creates the sink and opens the file right away
    pub fn open<P: AsRef<Path>>(path: P, shape: RecordShape) -> Result<Self> {
        let mut sink = Self::new(path, shape);
        sink.prepare()?;
        Ok(sink)
    }

    /// Opens the file and writes the header if needed; a no-op once open
    pub fn prepare(&mut self) -> Result<()> {
        if self.file.is_none() {
            let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            if file.metadata()?.len() == 0 {
                writeln!(file, "{}", self.shape.header_line())?;
                file.flush()?;
            }
            self.file = Some(file);
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.prepare()?;
        if let Some(file) = self.file.as_mut() {
            writeln!(file, "{}", line)?;
            file.flush()?;
        }
        Ok(())
    }
}

impl RecordSink for CsvSink {
    fn emit(&mut self, record: &RunRecord) -> Result<()> {
        let result = self.write_line(&record.csv_line());
        if result.is_err() {
            self.file = None;
        }
        result
    }
}
