use crate::{error::JobError, listeners::HookResult};
use async_trait::async_trait;
use model::records::batch::Batch;
use std::sync::Arc;

#[async_trait]
pub trait RecordWriterListener: Send + Sync {
    async fn before_record_writing(&self, _batch: &Batch) -> HookResult {
        Ok(())
    }

    async fn after_record_writing(&self, _batch: &Batch) -> HookResult {
        Ok(())
    }

    async fn on_record_writing_exception(&self, _batch: &Batch, _error: &JobError) -> HookResult {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct CompositeRecordWriterListener {
    listeners: Vec<Arc<dyn RecordWriterListener>>,
}

impl CompositeRecordWriterListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn RecordWriterListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[async_trait]
impl RecordWriterListener for CompositeRecordWriterListener {
    async fn before_record_writing(&self, batch: &Batch) -> HookResult {
        for listener in &self.listeners {
            listener.before_record_writing(batch).await?;
        }
        Ok(())
    }

    async fn after_record_writing(&self, batch: &Batch) -> HookResult {
        for listener in &self.listeners {
            listener.after_record_writing(batch).await?;
        }
        Ok(())
    }

    async fn on_record_writing_exception(&self, batch: &Batch, error: &JobError) -> HookResult {
        for listener in &self.listeners {
            listener.on_record_writing_exception(batch, error).await?;
        }
        Ok(())
    }
}
