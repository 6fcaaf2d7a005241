use crate::{error::EngineError, job::BatchJob, job::JobListeners};
use engine_core::{
    connectors::{
        RecordProcessor, RecordReader, RecordWriter,
        noop::{NoOpRecordReader, NoOpRecordWriter},
    },
    listeners::{
        BatchListener, JobListener, PipelineListener, RecordReaderListener, RecordWriterListener,
    },
    monitor::{JobMonitor, TracingMonitor},
};
use engine_processing::CompositeRecordProcessor;
use model::execution::parameters::JobParameters;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fluent assembly of a [`BatchJob`].
///
/// Anything left unset falls back to a default: a reader with no records, a
/// writer that discards batches, a pass-through processor and the default
/// parameters.
#[derive(Default)]
pub struct JobBuilder {
    parameters: JobParameters,
    reader: Option<Box<dyn RecordReader>>,
    writer: Option<Box<dyn RecordWriter>>,
    processors: CompositeRecordProcessor,
    listeners: JobListeners,
    monitor: Option<Arc<dyn JobMonitor>>,
    cancel: Option<CancellationToken>,
}

impl JobBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.parameters.name = name.into();
        self
    }

    /// Replaces every parameter at once.
    pub fn parameters(mut self, parameters: JobParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn reader<R: RecordReader + 'static>(mut self, reader: R) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    pub fn writer<W: RecordWriter + 'static>(mut self, writer: W) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Appends a processor; processors run in the order they were added.
    pub fn processor<P: RecordProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.parameters.batch_size = batch_size;
        self
    }

    pub fn error_threshold(mut self, error_threshold: u64) -> Self {
        self.parameters.error_threshold = error_threshold;
        self
    }

    pub fn enable_monitoring(mut self, enabled: bool) -> Self {
        self.parameters.monitoring_enabled = enabled;
        self
    }

    /// Sets the monitor and turns monitoring on.
    pub fn monitor<M: JobMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Some(Arc::new(monitor));
        self.parameters.monitoring_enabled = true;
        self
    }

    pub fn job_listener(mut self, listener: Arc<dyn JobListener>) -> Self {
        self.listeners.job.add_listener(listener);
        self
    }

    pub fn batch_listener(mut self, listener: Arc<dyn BatchListener>) -> Self {
        self.listeners.batch.add_listener(listener);
        self
    }

    pub fn reader_listener(mut self, listener: Arc<dyn RecordReaderListener>) -> Self {
        self.listeners.reader.add_listener(listener);
        self
    }

    pub fn writer_listener(mut self, listener: Arc<dyn RecordWriterListener>) -> Self {
        self.listeners.writer.add_listener(listener);
        self
    }

    pub fn pipeline_listener(mut self, listener: Arc<dyn PipelineListener>) -> Self {
        self.listeners.pipeline.add_listener(listener);
        self
    }

    /// Checked once per batch; a cancelled token fails the job as interrupted.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self) -> Result<BatchJob, EngineError> {
        self.parameters.validate()?;

        let monitor = match (self.parameters.monitoring_enabled, self.monitor) {
            (false, _) => None,
            (true, Some(monitor)) => Some(monitor),
            (true, None) => Some(Arc::new(TracingMonitor) as Arc<dyn JobMonitor>),
        };

        Ok(BatchJob::new(
            self.parameters,
            self.reader.unwrap_or_else(|| Box::new(NoOpRecordReader)),
            self.writer.unwrap_or_else(|| Box::new(NoOpRecordWriter)),
            Arc::new(self.processors),
            self.listeners,
            monitor,
            self.cancel,
        ))
    }
}
