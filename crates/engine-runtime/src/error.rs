use model::execution::errors::ParameterError;
use thiserror::Error;

/// Usage errors of the engine.
///
/// Operational failures of a run never show up here; they are recorded on the
/// returned report.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A job instance is single-use.
    #[error("Job '{name}' has already been executed (execution id {execution_id})")]
    AlreadyExecuted { name: String, execution_id: String },

    #[error("Invalid job parameters: {0}")]
    InvalidParameters(#[from] ParameterError),

    /// The task running the job panicked or was cancelled.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Job executor has been shut down")]
    ExecutorClosed,
}
