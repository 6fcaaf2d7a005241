use crate::connectors::{reader::RecordReader, writer::RecordWriter};
use async_trait::async_trait;
use model::{
    execution::errors::BoxError,
    records::{batch::Batch, record::Record},
};

/// Reader with no input at all; the default until a real reader is configured.
#[derive(Debug, Default)]
pub struct NoOpRecordReader;

#[async_trait]
impl RecordReader for NoOpRecordReader {
    async fn read_record(&mut self) -> Result<Option<Record>, BoxError> {
        Ok(None)
    }
}

/// Writer that discards every batch.
#[derive(Debug, Default)]
pub struct NoOpRecordWriter;

#[async_trait]
impl RecordWriter for NoOpRecordWriter {
    async fn write_records(&mut self, _batch: &Batch) -> Result<(), BoxError> {
        Ok(())
    }
}
