use super::row::RecordRow;
use crate::domain::record::ExceptionRecord;
use crate::error::{RefundError, Result};
use std::io::Read;

/// Reads exception records from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<ExceptionRecord>`.
/// A malformed row yields an error for that row only; the stream carries on.
pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> RecordReader<R> {
    /// Creates a new `RecordReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates records.
    pub fn records(self) -> impl Iterator<Item = Result<ExceptionRecord>> {
        self.reader
            .into_deserialize::<RecordRow>()
            .map(|result| result.map_err(RefundError::from).and_then(ExceptionRecord::try_from))
    }
}
