use engine_core::error::JobError;
use model::records::record::Record;
use std::sync::Arc;

/// Result of one read attempt, including its listener hooks.
pub(crate) enum ReadOutcome {
    Record(Record),
    EndOfInput,
    Failed(Arc<JobError>),
}

/// Result of running one record through the processing stage.
pub(crate) enum ProcessOutcome {
    Processed(Record),
    Filtered,
    /// Counted against the error threshold, which still holds.
    Recoverable,
    /// The error threshold has been exceeded.
    Fatal(Arc<JobError>),
}

pub(crate) enum WriteOutcome {
    Written,
    Skipped,
    Failed(Arc<JobError>),
}

pub(crate) enum BatchOutcome {
    Continue,
    EndOfInput,
    Aborted(Arc<JobError>),
}

/// How the open + batch loop phase ended.
pub(crate) enum LoopOutcome {
    Exhausted,
    Aborted(Arc<JobError>),
}
