use async_trait::async_trait;
use model::{execution::errors::BoxError, records::batch::Batch};

/// Sink side of a job. Receives whole batches, never empty ones.
#[async_trait]
pub trait RecordWriter: Send {
    async fn open(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    async fn write_records(&mut self, batch: &Batch) -> Result<(), BoxError>;

    async fn close(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[async_trait]
impl<W: RecordWriter + ?Sized> RecordWriter for Box<W> {
    async fn open(&mut self) -> Result<(), BoxError> {
        (**self).open().await
    }

    async fn write_records(&mut self, batch: &Batch) -> Result<(), BoxError> {
        (**self).write_records(batch).await
    }

    async fn close(&mut self) -> Result<(), BoxError> {
        (**self).close().await
    }
}
