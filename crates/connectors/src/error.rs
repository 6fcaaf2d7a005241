use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("{0} has not been opened")]
    NotOpen(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("Lock error: {0}")]
    Lock(String),
}
