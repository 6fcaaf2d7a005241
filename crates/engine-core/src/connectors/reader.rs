use async_trait::async_trait;
use model::{execution::errors::BoxError, records::record::Record};

/// Source side of a job.
///
/// The engine calls `open` once, then `read_record` until it returns `Ok(None)`
/// (end of input) or an error, and always attempts `close` afterwards.
#[async_trait]
pub trait RecordReader: Send {
    async fn open(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    async fn read_record(&mut self) -> Result<Option<Record>, BoxError>;

    async fn close(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[async_trait]
impl<R: RecordReader + ?Sized> RecordReader for Box<R> {
    async fn open(&mut self) -> Result<(), BoxError> {
        (**self).open().await
    }

    async fn read_record(&mut self) -> Result<Option<Record>, BoxError> {
        (**self).read_record().await
    }

    async fn close(&mut self) -> Result<(), BoxError> {
        (**self).close().await
    }
}
