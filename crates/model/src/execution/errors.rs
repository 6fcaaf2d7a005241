use thiserror::Error;

/// Error type used at every pluggable seam (readers, writers, processors, listeners).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("batch size must be greater than zero")]
    ZeroBatchSize,

    #[error("job name must not be blank")]
    BlankName,
}
