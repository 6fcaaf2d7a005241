use model::execution::errors::ParameterError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when loading job settings from files or the environment.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unable to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An environment variable is set but cannot be parsed.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Parameters(#[from] ParameterError),
}
