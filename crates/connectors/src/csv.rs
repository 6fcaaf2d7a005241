//! Delimited text input. Each data row becomes one record whose payload is an
//! object keyed by the header row, or an array of cells without headers.

use crate::error::ConnectorError;
use async_trait::async_trait;
use engine_core::connectors::RecordReader;
use model::{
    execution::errors::BoxError,
    records::{header::Header, record::Record},
};
use serde_json::{Map, Value};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

pub struct CsvRecordReader {
    path: PathBuf,
    delimiter: u8,
    has_headers: bool,
    headers: Vec<String>,
    rows: Option<::csv::StringRecordsIntoIter<File>>,
    next_number: u64,
}

impl CsvRecordReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter: b',',
            has_headers: true,
            headers: Vec::new(),
            rows: None,
            next_number: 1,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn has_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    fn to_payload(&self, row: &::csv::StringRecord) -> Value {
        if self.headers.is_empty() {
            return Value::Array(row.iter().map(|c| Value::String(c.to_string())).collect());
        }

        let mut object = Map::with_capacity(self.headers.len());
        for (i, name) in self.headers.iter().enumerate() {
            let cell = row.get(i).map_or(Value::Null, |c| Value::String(c.to_string()));
            object.insert(name.clone(), cell);
        }
        Value::Object(object)
    }
}

#[async_trait]
impl RecordReader for CsvRecordReader {
    async fn open(&mut self) -> Result<(), BoxError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConnectorError::NotFound(self.path.clone()),
            _ => ConnectorError::Io(e),
        })?;

        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(file);

        self.headers = if self.has_headers {
            reader
                .headers()
                .map_err(ConnectorError::from)?
                .iter()
                .map(|h| h.trim().to_string())
                .collect()
        } else {
            Vec::new()
        };
        self.rows = Some(reader.into_records());
        self.next_number = 1;
        Ok(())
    }

    async fn read_record(&mut self) -> Result<Option<Record>, BoxError> {
        let rows = self
            .rows
            .as_mut()
            .ok_or(ConnectorError::NotOpen("csv reader"))?;

        let Some(row) = rows.next() else {
            return Ok(None);
        };
        let row = row.map_err(ConnectorError::from)?;

        let payload = self.to_payload(&row);
        let header = Header::new(self.next_number, self.path.display().to_string());
        self.next_number += 1;
        Ok(Some(Record::new(header, payload)))
    }

    async fn close(&mut self) -> Result<(), BoxError> {
        self.rows = None;
        Ok(())
    }
}
