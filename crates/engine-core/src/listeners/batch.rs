use crate::{error::JobError, listeners::HookResult};
use async_trait::async_trait;
use model::records::batch::Batch;
use std::sync::Arc;

#[async_trait]
pub trait BatchListener: Send + Sync {
    async fn before_batch_reading(&self) -> HookResult {
        Ok(())
    }

    /// Called once per batch, including empty ones.
    async fn after_batch_processing(&self, _batch: &Batch) -> HookResult {
        Ok(())
    }

    async fn after_batch_writing(&self, _batch: &Batch) -> HookResult {
        Ok(())
    }

    async fn on_batch_writing_exception(&self, _batch: &Batch, _error: &JobError) -> HookResult {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct CompositeBatchListener {
    listeners: Vec<Arc<dyn BatchListener>>,
}

impl CompositeBatchListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn BatchListener>) {
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
impl BatchListener for CompositeBatchListener {
    async fn before_batch_reading(&self) -> HookResult {
        for listener in &self.listeners {
            listener.before_batch_reading().await?;
        }
        Ok(())
    }

    async fn after_batch_processing(&self, batch: &Batch) -> HookResult {
        for listener in &self.listeners {
            listener.after_batch_processing(batch).await?;
        }
        Ok(())
    }

    async fn after_batch_writing(&self, batch: &Batch) -> HookResult {
        for listener in &self.listeners {
            listener.after_batch_writing(batch).await?;
        }
        Ok(())
    }

    async fn on_batch_writing_exception(&self, batch: &Batch, error: &JobError) -> HookResult {
        for listener in &self.listeners {
            listener.on_batch_writing_exception(batch, error).await?;
        }
        Ok(())
    }
}
