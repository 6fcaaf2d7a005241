//! Read-process-write engine.
//!
//! A [`BatchJob`] reads records one at a time, runs each through the processing
//! stage, collects the results into batches of at most `batch_size` records and
//! hands every non-empty batch to the writer. Every step is awaited in order on
//! a single control path; listeners and the monitor are notified inline.

mod listeners;
mod outcome;

pub use listeners::JobListeners;

use crate::error::EngineError;
use chrono::Utc;
use engine_core::{
    connectors::{RecordProcessor, RecordReader, RecordWriter},
    error::JobError,
    listeners::{
        BatchListener, JobListener, PipelineListener, RecordReaderListener, RecordWriterListener,
    },
    monitor::JobMonitor,
    report::JobReport,
    status::JobStatus,
};
use model::{
    execution::{errors::BoxError, parameters::JobParameters},
    records::{batch::Batch, record::Record},
};
use outcome::{BatchOutcome, LoopOutcome, ProcessOutcome, ReadOutcome, WriteOutcome};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Upper bound on the slots reserved up front for a batch.
const MAX_PREALLOCATED_RECORDS: usize = 1024;

/// A single, non-reentrant execution of a read-process-write job.
///
/// Build one with [`crate::JobBuilder`]. `run` may be called exactly once; any
/// further call, concurrent or not, fails with [`EngineError::AlreadyExecuted`].
pub struct BatchJob {
    parameters: JobParameters,
    report: JobReport,
    reader: Mutex<Box<dyn RecordReader>>,
    writer: Mutex<Box<dyn RecordWriter>>,
    processor: Arc<dyn RecordProcessor>,
    listeners: JobListeners,
    monitor: Option<Arc<dyn JobMonitor>>,
    cancel: Option<CancellationToken>,
    executed: AtomicBool,
}

/// Resources borrowed for the duration of a run, along with which of them had
/// an open attempt and therefore need a close attempt.
struct Resources<'a> {
    reader: &'a mut Box<dyn RecordReader>,
    writer: &'a mut Box<dyn RecordWriter>,
    reader_acquired: bool,
    writer_acquired: bool,
}

impl BatchJob {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        parameters: JobParameters,
        reader: Box<dyn RecordReader>,
        writer: Box<dyn RecordWriter>,
        processor: Arc<dyn RecordProcessor>,
        listeners: JobListeners,
        monitor: Option<Arc<dyn JobMonitor>>,
        cancel: Option<CancellationToken>,
    ) -> Self {
        BatchJob {
            report: JobReport::new(parameters.clone()),
            parameters,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
            processor,
            listeners,
            monitor,
            cancel,
            executed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.parameters.name
    }

    pub fn parameters(&self) -> &JobParameters {
        &self.parameters
    }

    /// Live handle on the report; usable while the job is running.
    pub fn report(&self) -> JobReport {
        self.report.clone()
    }

    /// Executes the job and returns its final report.
    ///
    /// Failures of the job itself are recorded on the report (`FAILED` status and
    /// last error); the only error returned here is a second invocation.
    pub async fn run(&self) -> Result<JobReport, EngineError> {
        if self.executed.swap(true, Ordering::AcqRel) {
            return Err(EngineError::AlreadyExecuted {
                name: self.name().to_string(),
                execution_id: self.report.execution_id().to_string(),
            });
        }

        let mut reader = self.reader.lock().await;
        let mut writer = self.writer.lock().await;
        let mut resources = Resources {
            reader: &mut *reader,
            writer: &mut *writer,
            reader_acquired: false,
            writer_acquired: false,
        };

        let before_start = self.listeners.job.before_job_start(&self.parameters).await;
        self.start().await;

        match before_start {
            Err(source) => {
                self.abort(Arc::new(JobError::Listener {
                    hook: "before_job_start",
                    source,
                }))
                .await;
            }
            Ok(()) => match self.execute(&mut resources).await {
                LoopOutcome::Exhausted => {
                    self.advance(JobStatus::Stopping);
                    self.release(&mut resources).await;
                    self.finish(JobStatus::Completed).await;
                }
                LoopOutcome::Aborted(err) => {
                    self.abort(err).await;
                    self.release(&mut resources).await;
                }
            },
        }

        if let Err(source) = self.listeners.job.after_job_end(&self.report).await {
            let err = JobError::Listener {
                hook: "after_job_end",
                source,
            };
            warn!(job = %self.name(), error = %err, "Job listener failed after job end");
            self.report.set_last_error(err);
        }

        Ok(self.report.clone())
    }

    async fn start(&self) {
        self.advance(JobStatus::Starting);
        self.report.metrics().mark_started(Utc::now());

        info!("Starting job '{}'", self.name());
        info!("Batch size: {}", self.parameters.batch_size);
        info!(
            "Error threshold: {}",
            self.parameters.error_threshold_display()
        );
        info!("Monitoring: {}", self.parameters.monitoring_enabled);

        if let Some(monitor) = &self.monitor
            && let Err(e) = monitor.register(&self.report).await
        {
            warn!(job = %self.name(), error = %e, "Unable to register job with monitor");
        }
    }

    /// Opens both resources and drives the batch loop until input runs out or
    /// a fatal error occurs.
    async fn execute(&self, res: &mut Resources<'_>) -> LoopOutcome {
        res.reader_acquired = true;
        if let Err(source) = res.reader.open().await {
            let err = JobError::OpenReader { source };
            error!(job = %self.name(), error = %err, "Unable to open record reader");
            return LoopOutcome::Aborted(Arc::new(err));
        }

        res.writer_acquired = true;
        if let Err(source) = res.writer.open().await {
            let err = JobError::OpenWriter { source };
            error!(job = %self.name(), error = %err, "Unable to open record writer");
            return LoopOutcome::Aborted(Arc::new(err));
        }

        self.advance(JobStatus::Started);
        info!("Job '{}' started", self.name());

        loop {
            if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                warn!(job = %self.name(), "Cancellation requested, aborting job");
                return LoopOutcome::Aborted(Arc::new(JobError::Interrupted));
            }

            match self.run_batch(res).await {
                BatchOutcome::Continue => continue,
                BatchOutcome::EndOfInput => return LoopOutcome::Exhausted,
                BatchOutcome::Aborted(err) => return LoopOutcome::Aborted(err),
            }
        }
    }

    async fn run_batch(&self, res: &mut Resources<'_>) -> BatchOutcome {
        if let Err(source) = self.listeners.batch.before_batch_reading().await {
            return BatchOutcome::Aborted(self.listener_failure("before_batch_reading", source));
        }

        let mut batch = Batch::with_capacity(self.parameters.batch_size.min(MAX_PREALLOCATED_RECORDS));
        let mut end_of_input = false;

        for _ in 0..self.parameters.batch_size {
            let record = match self.read_next(res.reader).await {
                ReadOutcome::Record(record) => record,
                ReadOutcome::EndOfInput => {
                    end_of_input = true;
                    break;
                }
                ReadOutcome::Failed(err) => return BatchOutcome::Aborted(err),
            };

            match self.process(record).await {
                ProcessOutcome::Processed(output) => batch.add_record(output),
                ProcessOutcome::Filtered | ProcessOutcome::Recoverable => {}
                ProcessOutcome::Fatal(err) => return BatchOutcome::Aborted(err),
            }
        }

        if let Err(source) = self.listeners.batch.after_batch_processing(&batch).await {
            return BatchOutcome::Aborted(self.listener_failure("after_batch_processing", source));
        }

        match self.write(res.writer, &batch).await {
            WriteOutcome::Failed(err) => return BatchOutcome::Aborted(err),
            WriteOutcome::Written => {
                if let Err(source) = self.listeners.batch.after_batch_writing(&batch).await {
                    return BatchOutcome::Aborted(self.listener_failure("after_batch_writing", source));
                }
            }
            WriteOutcome::Skipped => {}
        }

        if end_of_input {
            BatchOutcome::EndOfInput
        } else {
            BatchOutcome::Continue
        }
    }

    async fn read_next(&self, reader: &mut Box<dyn RecordReader>) -> ReadOutcome {
        match self.try_read(reader).await {
            Ok(Some(record)) => ReadOutcome::Record(record),
            Ok(None) => ReadOutcome::EndOfInput,
            Err(source) => {
                let err = JobError::Read { source };
                error!(job = %self.name(), error = %err, "Unable to read next record");
                if let Err(e) = self.listeners.reader.on_record_reading_exception(&err).await {
                    warn!(job = %self.name(), error = %e, "Reader listener failed on exception");
                }
                ReadOutcome::Failed(Arc::new(err))
            }
        }
    }

    async fn try_read(&self, reader: &mut Box<dyn RecordReader>) -> Result<Option<Record>, BoxError> {
        self.listeners.reader.before_record_reading().await?;
        let Some(record) = reader.read_record().await? else {
            return Ok(None);
        };
        self.report.metrics().increment_read_count();
        self.listeners.reader.after_record_reading(&record).await?;
        Ok(Some(record))
    }

    async fn process(&self, record: Record) -> ProcessOutcome {
        let source = match self.try_process(&record).await {
            Ok(Some(output)) => return ProcessOutcome::Processed(output),
            Ok(None) => {
                debug!("{record} has been filtered");
                self.report.metrics().increment_filtered_count();
                return ProcessOutcome::Filtered;
            }
            Err(source) => source,
        };

        let err = JobError::Process {
            record_number: record.number(),
            source,
        };
        error!(job = %self.name(), error = %err, "Unable to process {record}");
        if let Err(e) = self
            .listeners
            .pipeline
            .on_record_processing_exception(&record, &err)
            .await
        {
            warn!(job = %self.name(), error = %e, "Pipeline listener failed on exception");
        }

        let errors = self.report.metrics().increment_error_count();
        let err = Arc::new(err);
        self.report.set_last_error(err.clone());

        if errors > self.parameters.error_threshold {
            error!(
                job = %self.name(),
                errors,
                threshold = self.parameters.error_threshold,
                "Error threshold exceeded. Aborting execution"
            );
            ProcessOutcome::Fatal(err)
        } else {
            ProcessOutcome::Recoverable
        }
    }

    async fn try_process(&self, record: &Record) -> Result<Option<Record>, BoxError> {
        self.listeners.pipeline.before_record_processing(record).await?;
        self.notify_monitor().await;
        let Some(output) = self.processor.process_record(record.clone()).await? else {
            return Ok(None);
        };
        self.listeners
            .pipeline
            .after_record_processing(record, &output)
            .await?;
        Ok(Some(output))
    }

    async fn write(&self, writer: &mut Box<dyn RecordWriter>, batch: &Batch) -> WriteOutcome {
        if batch.is_empty() {
            return WriteOutcome::Skipped;
        }

        match self.try_write(writer, batch).await {
            Ok(()) => {
                self.report
                    .metrics()
                    .increment_write_count(batch.size() as u64);
                debug!(job = %self.name(), records = batch.size(), "Batch written");
                WriteOutcome::Written
            }
            Err(source) => {
                let err = JobError::Write {
                    batch_size: batch.size(),
                    source,
                };
                error!(job = %self.name(), error = %err, "Unable to write records");
                if let Err(e) = self
                    .listeners
                    .writer
                    .on_record_writing_exception(batch, &err)
                    .await
                {
                    warn!(job = %self.name(), error = %e, "Writer listener failed on exception");
                }
                if let Err(e) = self
                    .listeners
                    .batch
                    .on_batch_writing_exception(batch, &err)
                    .await
                {
                    warn!(job = %self.name(), error = %e, "Batch listener failed on exception");
                }
                WriteOutcome::Failed(Arc::new(err))
            }
        }
    }

    async fn try_write(&self, writer: &mut Box<dyn RecordWriter>, batch: &Batch) -> Result<(), BoxError> {
        self.listeners.writer.before_record_writing(batch).await?;
        writer.write_records(batch).await?;
        self.listeners.writer.after_record_writing(batch).await
    }

    /// Closes every resource that had an open attempt. Close failures are
    /// recorded but never change the status.
    async fn release(&self, res: &mut Resources<'_>) {
        if res.reader_acquired
            && let Err(source) = res.reader.close().await
        {
            let err = JobError::CloseReader { source };
            warn!(job = %self.name(), error = %err, "Unable to close record reader");
            self.report.set_last_error(err);
        }

        if res.writer_acquired
            && let Err(source) = res.writer.close().await
        {
            let err = JobError::CloseWriter { source };
            warn!(job = %self.name(), error = %err, "Unable to close record writer");
            self.report.set_last_error(err);
        }
    }

    async fn abort(&self, err: Arc<JobError>) {
        self.report.set_last_error(err);
        self.finish(JobStatus::Failed).await;
    }

    async fn finish(&self, status: JobStatus) {
        if let Err(e) = self.report.finish(status) {
            warn!(job = %self.name(), error = %e, "Unable to finish job report");
        }
        info!(
            "Job '{}' finished with status: {}",
            self.name(),
            self.report.status()
        );
        self.notify_monitor().await;
    }

    fn advance(&self, status: JobStatus) {
        if let Err(e) = self.report.advance(status) {
            warn!(job = %self.name(), error = %e, "Ignoring job status change");
        }
    }

    fn listener_failure(&self, hook: &'static str, source: BoxError) -> Arc<JobError> {
        let err = JobError::Listener { hook, source };
        error!(job = %self.name(), error = %err, "Batch listener failed");
        Arc::new(err)
    }

    async fn notify_monitor(&self) {
        if let Some(monitor) = &self.monitor
            && let Err(e) = monitor.notify_report_update(&self.report).await
        {
            warn!(job = %self.name(), error = %e, "Unable to notify monitor");
        }
    }
}
