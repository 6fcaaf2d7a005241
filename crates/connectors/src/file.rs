//! Line-oriented file connectors: one record per line on both sides.

use crate::error::ConnectorError;
use async_trait::async_trait;
use engine_core::connectors::{RecordReader, RecordWriter};
use model::{
    execution::errors::BoxError,
    records::{batch::Batch, header::Header, record::Record},
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines},
};
use tracing::debug;

pub struct FileRecordReader {
    path: PathBuf,
    source: String,
    lines: Option<Lines<BufReader<File>>>,
    next_number: u64,
}

impl FileRecordReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            source: path.display().to_string(),
            path,
            lines: None,
            next_number: 1,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordReader for FileRecordReader {
    async fn open(&mut self) -> Result<(), BoxError> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Err(ConnectorError::NotFound(self.path.clone()).into());
        }
        let file = File::open(&self.path).await.map_err(ConnectorError::from)?;
        self.lines = Some(BufReader::new(file).lines());
        self.next_number = 1;
        debug!(path = %self.source, "Opened file for reading");
        Ok(())
    }

    async fn read_record(&mut self) -> Result<Option<Record>, BoxError> {
        let lines = self
            .lines
            .as_mut()
            .ok_or(ConnectorError::NotOpen("file reader"))?;

        let Some(line) = lines.next_line().await.map_err(ConnectorError::from)? else {
            return Ok(None);
        };

        let header = Header::new(self.next_number, self.source.clone());
        self.next_number += 1;
        Ok(Some(Record::new(header, Value::String(line))))
    }

    async fn close(&mut self) -> Result<(), BoxError> {
        self.lines = None;
        Ok(())
    }
}

/// Writes each payload as one line. Strings are written verbatim, other
/// payloads as compact JSON.
pub struct FileRecordWriter {
    path: PathBuf,
    append: bool,
    writer: Option<BufWriter<File>>,
}

impl FileRecordWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            append: false,
            writer: None,
        }
    }

    /// Appends to an existing file instead of truncating it.
    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }
}

#[async_trait]
impl RecordWriter for FileRecordWriter {
    async fn open(&mut self) -> Result<(), BoxError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.append)
            .truncate(!self.append)
            .open(&self.path)
            .await
            .map_err(ConnectorError::from)?;
        self.writer = Some(BufWriter::new(file));
        debug!(path = %self.path.display(), append = self.append, "Opened file for writing");
        Ok(())
    }

    async fn write_records(&mut self, batch: &Batch) -> Result<(), BoxError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(ConnectorError::NotOpen("file writer"))?;

        for record in batch {
            let mut line = record.payload_text();
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
        }
        writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BoxError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
        }
        Ok(())
    }
}
