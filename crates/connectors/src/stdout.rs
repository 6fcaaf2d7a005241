use async_trait::async_trait;
use engine_core::connectors::RecordWriter;
use model::{execution::errors::BoxError, records::batch::Batch};
use tokio::io::{AsyncWriteExt, Stdout, stdout};

/// Prints each payload on its own line.
pub struct StandardOutputRecordWriter {
    out: Stdout,
}

impl StandardOutputRecordWriter {
    pub fn new() -> Self {
        Self { out: stdout() }
    }
}

impl Default for StandardOutputRecordWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordWriter for StandardOutputRecordWriter {
    async fn write_records(&mut self, batch: &Batch) -> Result<(), BoxError> {
        let mut buf = String::new();
        for record in batch {
            buf.push_str(&record.payload_text());
            buf.push('\n');
        }
        self.out.write_all(buf.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}
