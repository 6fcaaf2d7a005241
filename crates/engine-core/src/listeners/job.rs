use crate::{listeners::HookResult, report::JobReport};
use async_trait::async_trait;
use model::execution::parameters::JobParameters;
use std::sync::Arc;

#[async_trait]
pub trait JobListener: Send + Sync {
    async fn before_job_start(&self, _parameters: &JobParameters) -> HookResult {
        Ok(())
    }

    async fn after_job_end(&self, _report: &JobReport) -> HookResult {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct CompositeJobListener {
    listeners: Vec<Arc<dyn JobListener>>,
}

impl CompositeJobListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn JobListener>) {
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
impl JobListener for CompositeJobListener {
    async fn before_job_start(&self, parameters: &JobParameters) -> HookResult {
        for listener in &self.listeners {
            listener.before_job_start(parameters).await?;
        }
        Ok(())
    }

    async fn after_job_end(&self, report: &JobReport) -> HookResult {
        for listener in &self.listeners {
            listener.after_job_end(report).await?;
        }
        Ok(())
    }
}
