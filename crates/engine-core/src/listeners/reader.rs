use crate::{error::JobError, listeners::HookResult};
use async_trait::async_trait;
use model::records::record::Record;
use std::sync::Arc;

#[async_trait]
pub trait RecordReaderListener: Send + Sync {
    async fn before_record_reading(&self) -> HookResult {
        Ok(())
    }

    /// Not called at end of input.
    async fn after_record_reading(&self, _record: &Record) -> HookResult {
        Ok(())
    }

    async fn on_record_reading_exception(&self, _error: &JobError) -> HookResult {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct CompositeRecordReaderListener {
    listeners: Vec<Arc<dyn RecordReaderListener>>,
}

impl CompositeRecordReaderListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn RecordReaderListener>) {
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
impl RecordReaderListener for CompositeRecordReaderListener {
    async fn before_record_reading(&self) -> HookResult {
        for listener in &self.listeners {
            listener.before_record_reading().await?;
        }
        Ok(())
    }

    async fn after_record_reading(&self, record: &Record) -> HookResult {
        for listener in &self.listeners {
            listener.after_record_reading(record).await?;
        }
        Ok(())
    }

    async fn on_record_reading_exception(&self, error: &JobError) -> HookResult {
        for listener in &self.listeners {
            listener.on_record_reading_exception(error).await?;
        }
        Ok(())
    }
}
