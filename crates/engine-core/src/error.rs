use crate::status::JobStatus;
use model::execution::errors::BoxError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failures recorded on a job report.
///
/// A failing listener hook is reported as a failure of the operation it guards,
/// e.g. an error in `before_record_reading` surfaces as [`JobError::Read`].
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Unable to open record reader: {source}")]
    OpenReader {
        #[source]
        source: BoxError,
    },

    #[error("Unable to open record writer: {source}")]
    OpenWriter {
        #[source]
        source: BoxError,
    },

    #[error("Unable to read next record: {source}")]
    Read {
        #[source]
        source: BoxError,
    },

    #[error("Unable to process record #{record_number}: {source}")]
    Process {
        record_number: u64,
        #[source]
        source: BoxError,
    },

    #[error("Unable to write batch of {batch_size} records: {source}")]
    Write {
        batch_size: usize,
        #[source]
        source: BoxError,
    },

    #[error("Unable to close record reader: {source}")]
    CloseReader {
        #[source]
        source: BoxError,
    },

    #[error("Unable to close record writer: {source}")]
    CloseWriter {
        #[source]
        source: BoxError,
    },

    #[error("Job listener hook '{hook}' failed: {source}")]
    Listener {
        hook: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Job interrupted before reaching the end of input")]
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Open,
    Read,
    Process,
    Write,
    Close,
    Listener,
    Interrupted,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Open => "open",
            ErrorKind::Read => "read",
            ErrorKind::Process => "process",
            ErrorKind::Write => "write",
            ErrorKind::Close => "close",
            ErrorKind::Listener => "listener",
            ErrorKind::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl JobError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::OpenReader { .. } | JobError::OpenWriter { .. } => ErrorKind::Open,
            JobError::Read { .. } => ErrorKind::Read,
            JobError::Process { .. } => ErrorKind::Process,
            JobError::Write { .. } => ErrorKind::Write,
            JobError::CloseReader { .. } | JobError::CloseWriter { .. } => ErrorKind::Close,
            JobError::Listener { .. } => ErrorKind::Listener,
            JobError::Interrupted => ErrorKind::Interrupted,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Illegal job status transition from {from} to {to}")]
    IllegalTransition { from: JobStatus, to: JobStatus },

    #[error("Job cannot finish with non-terminal status {0}")]
    NotTerminal(JobStatus),

    #[error("Job end time has already been recorded")]
    AlreadyFinished,
}
