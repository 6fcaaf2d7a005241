use crate::execution::errors::ParameterError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_JOB_NAME: &str = "job";
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_ERROR_THRESHOLD: u64 = u64::MAX;

/// Immutable configuration of a single job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobParameters {
    pub name: String,
    pub batch_size: usize,
    /// Number of processing errors tolerated before the run is aborted.
    pub error_threshold: u64,
    pub monitoring_enabled: bool,
}

impl JobParameters {
    pub fn new(name: impl Into<String>) -> Self {
        JobParameters {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_error_threshold(mut self, error_threshold: u64) -> Self {
        self.error_threshold = error_threshold;
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitoring_enabled = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.batch_size == 0 {
            return Err(ParameterError::ZeroBatchSize);
        }
        if self.name.trim().is_empty() {
            return Err(ParameterError::BlankName);
        }
        Ok(())
    }

    /// Human readable threshold, `N/A` when errors are never fatal.
    pub fn error_threshold_display(&self) -> String {
        format_error_threshold(self.error_threshold)
    }
}

impl Default for JobParameters {
    fn default() -> Self {
        JobParameters {
            name: DEFAULT_JOB_NAME.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            monitoring_enabled: false,
        }
    }
}

pub fn format_error_threshold(threshold: u64) -> String {
    if threshold == DEFAULT_ERROR_THRESHOLD {
        "N/A".to_string()
    } else {
        threshold.to_string()
    }
}
