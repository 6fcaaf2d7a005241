use async_trait::async_trait;
use model::{execution::errors::BoxError, records::record::Record};
use std::sync::Arc;

/// Processing stage applied to every record read by a job.
///
/// Returning `Ok(None)` filters the record out: it is counted but never written.
#[async_trait]
pub trait RecordProcessor: Send + Sync {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError>;
}

#[async_trait]
impl<P: RecordProcessor + ?Sized> RecordProcessor for Arc<P> {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        (**self).process_record(record).await
    }
}

#[async_trait]
impl<P: RecordProcessor + ?Sized> RecordProcessor for Box<P> {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        (**self).process_record(record).await
    }
}

/// Passes every record through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProcessor;

#[async_trait]
impl RecordProcessor for IdentityProcessor {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        Ok(Some(record))
    }
}
