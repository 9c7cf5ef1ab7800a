use std::io::Write;

use arrow::record_batch::RecordBatch;

use crate::{DataFrame, DataFrameError, Result};

/// Destination for the columnar form of a `DataFrame`.
///
/// The frame does not own any file format; writers plug in here.
pub trait TableSink {
    /// Consume one record batch.
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()>;
}

impl<W: Write> TableSink for arrow_csv::Writer<W> {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.write(batch)
            .map_err(|source| DataFrameError::Arrow { source })
    }
}

/// Collects batches in memory.
impl TableSink for Vec<RecordBatch> {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.push(batch.clone());
        Ok(())
    }
}

impl DataFrame {
    /// Hand the frame to `sink` as a single record batch.
    pub fn write_to(&self, sink: &mut impl TableSink) -> Result<()> {
        let batch = self.to_arrow()?;
        sink.write_batch(&batch)?;
        tracing::debug!(op = "write_to", rows = batch.num_rows(), "verb");
        Ok(())
    }
}
