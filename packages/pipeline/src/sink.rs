//! Record sinks and fan-out.
//!
//! Every write is flushed before the call returns so a crash leaves only
//! complete lines and rows behind.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use public_space_geometry::{COORDINATE_PRECISION, round_geometry_value};
use public_space_models::CanonicalSpace;
use serde::Serialize;

use crate::feature::space_to_feature;
use crate::{PipelineError, SinkError};

/// Destination for records produced by a stage.
pub trait RecordSink<T> {
    /// Writes one record.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the record could not be written.
    fn write(&mut self, record: &T) -> Result<(), SinkError>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if flushing fails.
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// Writes canonical spaces as one `GeoJSON` feature per line.
///
/// Coordinates are rounded to [`COORDINATE_PRECISION`] digits. Each line
/// is serialized in full, written, then flushed.
pub struct NdjsonSink<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl NdjsonSink<BufWriter<File>> {
    /// Creates (or truncates) `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> RecordSink<CanonicalSpace> for NdjsonSink<W> {
    fn write(&mut self, record: &CanonicalSpace) -> Result<(), SinkError> {
        let mut feature = space_to_feature(record);
        if let Some(geometry) = feature.geometry.as_mut() {
            geometry.value = round_geometry_value(&geometry.value, COORDINATE_PRECISION);
        }

        let mut line = serde_json::to_string(&feature)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes serializable rows as CSV.
///
/// The header is written up front from the given column names, so a run
/// with no rows still leaves a header-only file. Rows must serialize their
/// fields in the same order. In append mode the header is only written
/// when the file is empty.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Wraps `writer` and writes the `columns` header.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the header cannot be written.
    pub fn new(writer: W, columns: &[&str]) -> Result<Self, SinkError> {
        Self::start(writer, Some(columns))
    }

    fn start(writer: W, header: Option<&[&str]>) -> Result<Self, SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        if let Some(columns) = header {
            writer.write_record(columns)?;
            writer.flush()?;
        }
        Ok(Self { writer })
    }

    /// Returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if buffered rows cannot be flushed.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(std::io::Error::other(e.to_string())))
    }
}

impl CsvSink<File> {
    /// Creates (or truncates) `path` and writes the header.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the file cannot be created or written.
    pub fn create(path: &Path, columns: &[&str]) -> Result<Self, SinkError> {
        Self::new(File::create(path)?, columns)
    }

    /// Opens `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the file cannot be opened or written.
    pub fn append(path: &Path, columns: &[&str]) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;
        Self::start(file, is_empty.then_some(columns))
    }
}

impl<W: Write, T: Serialize> RecordSink<T> for CsvSink<W> {
    fn write(&mut self, record: &T) -> Result<(), SinkError> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Counts records without storing them.
#[derive(Debug, Default)]
pub struct CountSink {
    count: u64,
}

impl CountSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }
}

impl<T> RecordSink<T> for CountSink {
    fn write(&mut self, _record: &T) -> Result<(), SinkError> {
        self.count += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<T, S: RecordSink<T> + ?Sized> RecordSink<T> for &mut S {
    fn write(&mut self, record: &T) -> Result<(), SinkError> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

struct SinkSlot<'a, T> {
    name: String,
    sink: Box<dyn RecordSink<T> + 'a>,
    open: bool,
}

/// Fans every record out to a set of sinks.
///
/// A sink that fails is closed and its error remembered; the others keep
/// receiving records. [`SinkSet::finish`] flushes whatever is still open
/// and returns the first failure.
pub struct SinkSet<'a, T> {
    slots: Vec<SinkSlot<'a, T>>,
    first_failure: Option<PipelineError>,
}

impl<T> Default for SinkSet<'_, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            first_failure: None,
        }
    }
}

impl<'a, T> SinkSet<'a, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sink under `name`.
    #[must_use]
    pub fn with(mut self, name: &str, sink: impl RecordSink<T> + 'a) -> Self {
        self.add(name, sink);
        self
    }

    /// Registers a sink under `name`.
    pub fn add(&mut self, name: &str, sink: impl RecordSink<T> + 'a) {
        self.slots.push(SinkSlot {
            name: name.to_string(),
            sink: Box::new(sink),
            open: true,
        });
    }

    /// Number of sinks still accepting records.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|s| s.open).count()
    }

    fn fail(&mut self, index: usize, source: SinkError) {
        let slot = &mut self.slots[index];
        log::error!("Sink '{}' failed, closing it: {source}", slot.name);
        slot.open = false;

        if self.first_failure.is_none() {
            self.first_failure = Some(PipelineError::Sink {
                name: slot.name.clone(),
                source,
            });
        }
    }

    /// Writes `record` to every open sink.
    pub fn write(&mut self, record: &T) {
        for i in 0..self.slots.len() {
            if !self.slots[i].open {
                continue;
            }
            if let Err(e) = self.slots[i].sink.write(record) {
                self.fail(i, e);
            }
        }
    }

    /// Flushes and closes every open sink.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure seen during the run or while
    /// flushing.
    pub fn finish(mut self) -> Result<(), PipelineError> {
        for i in 0..self.slots.len() {
            if !self.slots[i].open {
                continue;
            }
            match self.slots[i].sink.flush() {
                Ok(()) => self.slots[i].open = false,
                Err(e) => self.fail(i, e),
            }
        }

        self.first_failure.map_or(Ok(()), Err)
    }
}
