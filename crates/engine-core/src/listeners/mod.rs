//! Extension points of a job run.
//!
//! Each extension point has a listener trait whose hooks default to no-ops, and a
//! composite that fans a hook out to every registered listener in registration
//! order. The first failing listener stops the fan-out and its error is handed
//! back to the engine, which treats it like a failure of the guarded operation.

pub mod batch;
pub mod job;
pub mod pipeline;
pub mod reader;
pub mod writer;

pub use batch::{BatchListener, CompositeBatchListener};
pub use job::{CompositeJobListener, JobListener};
pub use pipeline::{CompositePipelineListener, PipelineListener};
pub use reader::{CompositeRecordReaderListener, RecordReaderListener};
pub use writer::{CompositeRecordWriterListener, RecordWriterListener};

use model::execution::errors::BoxError;

pub type HookResult = Result<(), BoxError>;
