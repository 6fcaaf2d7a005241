//! Scriptable readers, writers, processors and listeners shared by the tests.

use async_trait::async_trait;
use connectors::{CollectionRecordWriter, IterableRecordReader};
use engine_core::{
    connectors::{RecordProcessor, RecordReader, RecordWriter},
    error::JobError,
    listeners::{
        BatchListener, HookResult, JobListener, PipelineListener, RecordReaderListener,
        RecordWriterListener,
    },
    report::JobReport,
};
use model::{
    execution::{errors::BoxError, parameters::JobParameters},
    records::{batch::Batch, record::Record},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Lifecycle call counters, shared with the test after the probe moved into a job.
#[derive(Clone, Default)]
pub struct Calls {
    pub open: Arc<AtomicUsize>,
    pub close: Arc<AtomicUsize>,
    pub read: Arc<AtomicUsize>,
    pub write: Arc<AtomicUsize>,
}

impl Calls {
    pub fn opens(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.close.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.read.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.write.load(Ordering::SeqCst)
    }
}

/// Serves the payloads `1..=n`.
pub struct ProbeReader {
    inner: IterableRecordReader,
    pub calls: Calls,
    pub fail_open: bool,
    pub fail_close: bool,
    /// 1-based `read_record` call that fails.
    pub fail_read_at: Option<usize>,
}

impl ProbeReader {
    pub fn numbers(n: u64) -> Self {
        Self {
            inner: IterableRecordReader::new(1..=n).with_source("probe"),
            calls: Calls::default(),
            fail_open: false,
            fail_close: false,
            fail_read_at: None,
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn failing_read_at(mut self, call: usize) -> Self {
        self.fail_read_at = Some(call);
        self
    }
}

#[async_trait]
impl RecordReader for ProbeReader {
    async fn open(&mut self) -> Result<(), BoxError> {
        self.calls.open.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err("source unavailable".into());
        }
        self.inner.open().await
    }

    async fn read_record(&mut self) -> Result<Option<Record>, BoxError> {
        let call = self.calls.read.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_read_at == Some(call) {
            return Err(format!("read call {call} failed").into());
        }
        self.inner.read_record().await
    }

    async fn close(&mut self) -> Result<(), BoxError> {
        self.calls.close.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err("source close failed".into());
        }
        self.inner.close().await
    }
}

/// Collects written batches as lists of record numbers.
#[derive(Default)]
pub struct ProbeWriter {
    inner: CollectionRecordWriter,
    pub calls: Calls,
    pub batches: Arc<Mutex<Vec<Vec<u64>>>>,
    pub fail_open: bool,
    pub fail_close: bool,
    /// 1-based `write_records` call that fails.
    pub fail_write_at: Option<usize>,
}

impl ProbeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn failing_write_at(mut self, call: usize) -> Self {
        self.fail_write_at = Some(call);
        self
    }

    pub fn written(&self) -> Arc<Mutex<Vec<Vec<u64>>>> {
        self.batches.clone()
    }
}

#[async_trait]
impl RecordWriter for ProbeWriter {
    async fn open(&mut self) -> Result<(), BoxError> {
        self.calls.open.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err("sink unavailable".into());
        }
        Ok(())
    }

    async fn write_records(&mut self, batch: &Batch) -> Result<(), BoxError> {
        let call = self.calls.write.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_write_at == Some(call) {
            return Err(format!("write call {call} failed").into());
        }
        self.inner.write_records(batch).await?;
        self.batches
            .lock()
            .unwrap()
            .push(batch.iter().map(Record::number).collect());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BoxError> {
        self.calls.close.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err("sink close failed".into());
        }
        Ok(())
    }
}

/// Fails on some record numbers, filters others and passes the rest.
#[derive(Default)]
pub struct ScriptedProcessor {
    pub fail_on: Vec<u64>,
    pub filter_on: Vec<u64>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedProcessor {
    pub fn failing_on(numbers: impl IntoIterator<Item = u64>) -> Self {
        Self {
            fail_on: numbers.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn filtering(numbers: impl IntoIterator<Item = u64>) -> Self {
        Self {
            filter_on: numbers.into_iter().collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl RecordProcessor for ScriptedProcessor {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let n = record.number();
        if self.fail_on.contains(&n) {
            return Err(format!("record {n} is malformed").into());
        }
        if self.filter_on.contains(&n) {
            return Ok(None);
        }
        Ok(Some(record))
    }
}

/// Records every hook it sees, across all five extension points.
#[derive(Clone)]
pub struct RecordingListener {
    pub tag: &'static str,
    pub log: EventLog,
}

impl RecordingListener {
    pub fn new(log: &EventLog) -> Arc<Self> {
        Self::tagged("", log)
    }

    pub fn tagged(tag: &'static str, log: &EventLog) -> Arc<Self> {
        Arc::new(Self {
            tag,
            log: log.clone(),
        })
    }

    fn push(&self, event: String) -> HookResult {
        self.log.lock().unwrap().push(format!("{}{event}", self.tag));
        Ok(())
    }
}

#[async_trait]
impl JobListener for RecordingListener {
    async fn before_job_start(&self, _parameters: &JobParameters) -> HookResult {
        self.push("job.before_start".into())
    }

    async fn after_job_end(&self, report: &JobReport) -> HookResult {
        self.push(format!("job.after_end:{}", report.status()))
    }
}

#[async_trait]
impl BatchListener for RecordingListener {
    async fn before_batch_reading(&self) -> HookResult {
        self.push("batch.before_reading".into())
    }

    async fn after_batch_processing(&self, batch: &Batch) -> HookResult {
        self.push(format!("batch.after_processing:{}", batch.size()))
    }

    async fn after_batch_writing(&self, batch: &Batch) -> HookResult {
        self.push(format!("batch.after_writing:{}", batch.size()))
    }

    async fn on_batch_writing_exception(&self, batch: &Batch, error: &JobError) -> HookResult {
        self.push(format!("batch.on_writing_exception:{}:{}", batch.size(), error.kind()))
    }
}

#[async_trait]
impl RecordReaderListener for RecordingListener {
    async fn before_record_reading(&self) -> HookResult {
        self.push("reader.before".into())
    }

    async fn after_record_reading(&self, record: &Record) -> HookResult {
        self.push(format!("reader.after:{}", record.number()))
    }

    async fn on_record_reading_exception(&self, error: &JobError) -> HookResult {
        self.push(format!("reader.on_exception:{}", error.kind()))
    }
}

#[async_trait]
impl RecordWriterListener for RecordingListener {
    async fn before_record_writing(&self, batch: &Batch) -> HookResult {
        self.push(format!("writer.before:{}", batch.size()))
    }

    async fn after_record_writing(&self, batch: &Batch) -> HookResult {
        self.push(format!("writer.after:{}", batch.size()))
    }

    async fn on_record_writing_exception(&self, batch: &Batch, error: &JobError) -> HookResult {
        self.push(format!("writer.on_exception:{}:{}", batch.size(), error.kind()))
    }
}

#[async_trait]
impl PipelineListener for RecordingListener {
    async fn before_record_processing(&self, record: &Record) -> HookResult {
        self.push(format!("pipeline.before:{}", record.number()))
    }

    async fn after_record_processing(&self, input: &Record, _output: &Record) -> HookResult {
        self.push(format!("pipeline.after:{}", input.number()))
    }

    async fn on_record_processing_exception(&self, record: &Record, error: &JobError) -> HookResult {
        self.push(format!("pipeline.on_exception:{}:{}", record.number(), error.kind()))
    }
}

/// Fails the named hook; every other hook succeeds.
pub struct FailingHook {
    pub hook: &'static str,
}

impl FailingHook {
    pub fn new(hook: &'static str) -> Arc<Self> {
        Arc::new(Self { hook })
    }

    fn check(&self, hook: &str) -> HookResult {
        if self.hook == hook {
            Err(format!("listener refused {hook}").into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl JobListener for FailingHook {
    async fn before_job_start(&self, _parameters: &JobParameters) -> HookResult {
        self.check("before_job_start")
    }

    async fn after_job_end(&self, _report: &JobReport) -> HookResult {
        self.check("after_job_end")
    }
}

#[async_trait]
impl BatchListener for FailingHook {
    async fn before_batch_reading(&self) -> HookResult {
        self.check("before_batch_reading")
    }

    async fn after_batch_processing(&self, _batch: &Batch) -> HookResult {
        self.check("after_batch_processing")
    }

    async fn after_batch_writing(&self, _batch: &Batch) -> HookResult {
        self.check("after_batch_writing")
    }

    async fn on_batch_writing_exception(&self, _batch: &Batch, _error: &JobError) -> HookResult {
        self.check("on_batch_writing_exception")
    }
}

#[async_trait]
impl RecordReaderListener for FailingHook {
    async fn before_record_reading(&self) -> HookResult {
        self.check("before_record_reading")
    }

    async fn after_record_reading(&self, _record: &Record) -> HookResult {
        self.check("after_record_reading")
    }

    async fn on_record_reading_exception(&self, _error: &JobError) -> HookResult {
        self.check("on_record_reading_exception")
    }
}

#[async_trait]
impl RecordWriterListener for FailingHook {
    async fn before_record_writing(&self, _batch: &Batch) -> HookResult {
        self.check("before_record_writing")
    }

    async fn after_record_writing(&self, _batch: &Batch) -> HookResult {
        self.check("after_record_writing")
    }

    async fn on_record_writing_exception(&self, _batch: &Batch, _error: &JobError) -> HookResult {
        self.check("on_record_writing_exception")
    }
}

#[async_trait]
impl PipelineListener for FailingHook {
    async fn before_record_processing(&self, _record: &Record) -> HookResult {
        self.check("before_record_processing")
    }

    async fn after_record_processing(&self, _input: &Record, _output: &Record) -> HookResult {
        self.check("after_record_processing")
    }

    async fn on_record_processing_exception(&self, _record: &Record, _error: &JobError) -> HookResult {
        self.check("on_record_processing_exception")
    }
}
