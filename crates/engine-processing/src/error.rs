use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    Transient, // worth another attempt (timeouts, unavailable lookups)
    Permanent, // the record itself is bad
}

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Temporarily unavailable: {0}")]
    TemporarilyUnavailable(String),

    #[error("Transformation failed: {0}")]
    Transformation(String),

    #[error("Validation failed: {rule} - {message}")]
    ValidationFailed { rule: String, message: String },
}

impl ProcessingError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            ProcessingError::TemporarilyUnavailable(_) => ErrorType::Transient,
            ProcessingError::Transformation(_) => ErrorType::Permanent,
            ProcessingError::ValidationFailed { .. } => ErrorType::Permanent,
        }
    }
}
