use crate::{error::JobError, listeners::HookResult};
use async_trait::async_trait;
use model::records::record::Record;
use std::sync::Arc;

#[async_trait]
pub trait PipelineListener: Send + Sync {
    async fn before_record_processing(&self, _record: &Record) -> HookResult {
        Ok(())
    }

    /// Only called when the processor produced an output record.
    async fn after_record_processing(&self, _input: &Record, _output: &Record) -> HookResult {
        Ok(())
    }

    async fn on_record_processing_exception(&self, _record: &Record, _error: &JobError) -> HookResult {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct CompositePipelineListener {
    listeners: Vec<Arc<dyn PipelineListener>>,
}

impl CompositePipelineListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn PipelineListener>) {
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
impl PipelineListener for CompositePipelineListener {
    async fn before_record_processing(&self, record: &Record) -> HookResult {
        for listener in &self.listeners {
            listener.before_record_processing(record).await?;
        }
        Ok(())
    }

    async fn after_record_processing(&self, input: &Record, output: &Record) -> HookResult {
        for listener in &self.listeners {
            listener.after_record_processing(input, output).await?;
        }
        Ok(())
    }

    async fn on_record_processing_exception(&self, record: &Record, error: &JobError) -> HookResult {
        for listener in &self.listeners {
            listener.on_record_processing_exception(record, error).await?;
        }
        Ok(())
    }
}
