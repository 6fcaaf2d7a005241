use engine_core::listeners::{
    CompositeBatchListener, CompositeJobListener, CompositePipelineListener,
    CompositeRecordReaderListener, CompositeRecordWriterListener,
};

/// One broadcaster per extension point of a job.
#[derive(Clone, Default)]
pub struct JobListeners {
    pub job: CompositeJobListener,
    pub batch: CompositeBatchListener,
    pub reader: CompositeRecordReaderListener,
    pub writer: CompositeRecordWriterListener,
    pub pipeline: CompositePipelineListener,
}
