//! Atomic CSV destination.
//!
//! Rows go to a temporary file beside the destination, which replaces the
//! destination only on [`CsvSink::finish`]. Dropping the sink before then
//! deletes the temporary file, so an aborted run never leaves a partial
//! export behind under the destination name.

use csv::{Writer, WriterBuilder};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::ExportError;

pub struct CsvSink {
    writer: Writer<BufWriter<NamedTempFile>>,
    final_path: PathBuf,
}

impl CsvSink {
    pub fn create(final_path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let final_path = final_path.as_ref().to_path_buf();
        let parent_dir = match final_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent_dir)?;

        let temp_file = NamedTempFile::new_in(&parent_dir)?;
        // Parent and child rows have different widths.
        let writer = WriterBuilder::new().flexible(true).from_writer(BufWriter::new(temp_file));
        Ok(Self { writer, final_path })
    }

    pub fn writer_mut(&mut self) -> &mut Writer<BufWriter<NamedTempFile>> {
        &mut self.writer
    }

    /// Flush everything and move the file over the destination.
    pub fn finish(self) -> Result<PathBuf, ExportError> {
        let buffered = self.writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
        let temp = buffered.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
        temp
            .persist(&self.final_path)
            .map_err(|e| ExportError::Persist { path: self.final_path.clone(), source: e.error })?;
        Ok(self.final_path)
    }
}
