use crate::error::ConnectorError;
use async_trait::async_trait;
use engine_core::connectors::{RecordReader, RecordWriter};
use model::{
    execution::errors::BoxError,
    records::{batch::Batch, header::Header, record::Record},
};
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// Reads payloads from memory, numbering records from 1.
pub struct IterableRecordReader {
    payloads: VecDeque<Value>,
    source: String,
    next_number: u64,
}

impl IterableRecordReader {
    pub fn new<I, V>(payloads: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            payloads: payloads.into_iter().map(Into::into).collect(),
            source: "iterable".to_string(),
            next_number: 1,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

#[async_trait]
impl RecordReader for IterableRecordReader {
    async fn read_record(&mut self) -> Result<Option<Record>, BoxError> {
        let Some(payload) = self.payloads.pop_front() else {
            return Ok(None);
        };
        let header = Header::new(self.next_number, self.source.clone());
        self.next_number += 1;
        Ok(Some(Record::new(header, payload)))
    }
}

/// Collects every written record into a shared vector.
#[derive(Clone, Default)]
pub struct CollectionRecordWriter {
    records: Arc<Mutex<Vec<Record>>>,
}

impl CollectionRecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the collected records; stays valid after the writer moved into a job.
    pub fn records(&self) -> Arc<Mutex<Vec<Record>>> {
        self.records.clone()
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.records
            .lock()
            .map(|records| records.iter().map(|r| r.payload.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordWriter for CollectionRecordWriter {
    async fn write_records(&mut self, batch: &Batch) -> Result<(), BoxError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| ConnectorError::Lock("record collection poisoned".into()))?;
        records.extend(batch.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn numbers_records_from_one() {
        let mut reader = IterableRecordReader::new(["a", "b"]).with_source("letters");

        let first = reader.read_record().await.unwrap().unwrap();
        let second = reader.read_record().await.unwrap().unwrap();
        assert_eq!((first.number(), second.number()), (1, 2));
        assert_eq!(second.header.source, "letters");
        assert_eq!(second.payload, json!("b"));
        assert!(reader.read_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collects_written_batches() {
        let mut writer = CollectionRecordWriter::new();
        let handle = writer.records();

        let batch = Batch::from(vec![
            Record::new(Header::new(1, "t"), 1),
            Record::new(Header::new(2, "t"), 2),
        ]);
        writer.write_records(&batch).await.unwrap();

        assert_eq!(handle.lock().unwrap().len(), 2);
        assert_eq!(writer.payloads(), vec![json!(1), json!(2)]);
    }
}
