//! CSV export of image records.
//!
//! The header row (`Filename,Description,Tags`) is written together with the
//! first record, so an exporter that never sees a record writes nothing.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::ImageRecord;

/// Column names of the exported file.
pub const CSV_HEADER: [&str; 3] = ["Filename", "Description", "Tags"];

/// A writer that serializes records as CSV rows.
pub struct CsvExporter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl<W: Write> CsvExporter<W> {
    /// Create a new exporter over any writer (file, buffer, stdout).
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
            rows_written: 0,
        }
    }

    /// Write a single record.
    pub fn write(&mut self, record: &ImageRecord) -> Result<()> {
        if self.rows_written == 0 {
            self.writer.write_record(CSV_HEADER)?;
        }
        self.writer.serialize(record)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Write records in order.
    pub fn write_all(&mut self, records: &[ImageRecord]) -> Result<()> {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Number of data rows written (header excluded).
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Write `records` to a CSV file at `path`.
///
/// Returns `Ok(None)` without touching the filesystem when there is nothing
/// to write.
pub fn export_csv(path: &Path, records: &[ImageRecord]) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }

    let file = File::create(path)?;
    let mut exporter = CsvExporter::new(io::BufWriter::new(file));
    exporter.write_all(records)?;
    exporter.flush()?;
    tracing::debug!("Wrote {} row(s) to {}", exporter.rows_written(), path.display());
    Ok(Some(path.to_path_buf()))
}
