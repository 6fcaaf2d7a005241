//! Job settings gathered from a JSON file and environment variables.
//!
//! Every field is optional so sources can be layered with [`JobSettings::merge`];
//! whatever no source provides keeps its [`JobParameters`] default.

pub mod error;

use error::SettingsError;
use model::execution::parameters::JobParameters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_NAME: &str = "BATCHJOB_NAME";
pub const ENV_BATCH_SIZE: &str = "BATCHJOB_BATCH_SIZE";
pub const ENV_ERROR_THRESHOLD: &str = "BATCHJOB_ERROR_THRESHOLD";
pub const ENV_MONITORING: &str = "BATCHJOB_MONITORING";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobSettings {
    pub name: Option<String>,
    pub batch_size: Option<usize>,
    pub error_threshold: Option<u64>,
    pub monitoring: Option<bool>,
}

impl JobSettings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded job settings file");
        Ok(settings)
    }

    /// Reads the `BATCHJOB_*` variables through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(JobSettings {
            name: var(ENV_NAME),
            batch_size: var(ENV_BATCH_SIZE)
                .map(|v| parse_number(ENV_BATCH_SIZE, &v))
                .transpose()?,
            error_threshold: var(ENV_ERROR_THRESHOLD)
                .map(|v| parse_number(ENV_ERROR_THRESHOLD, &v))
                .transpose()?,
            monitoring: var(ENV_MONITORING)
                .map(|v| parse_flag(ENV_MONITORING, &v))
                .transpose()?,
        })
    }

    /// Layers `other` on top of `self`: fields set in `other` win.
    pub fn merge(self, other: JobSettings) -> JobSettings {
        JobSettings {
            name: other.name.or(self.name),
            batch_size: other.batch_size.or(self.batch_size),
            error_threshold: other.error_threshold.or(self.error_threshold),
            monitoring: other.monitoring.or(self.monitoring),
        }
    }

    pub fn apply_to(&self, mut parameters: JobParameters) -> JobParameters {
        if let Some(name) = &self.name {
            parameters.name = name.clone();
        }
        if let Some(batch_size) = self.batch_size {
            parameters.batch_size = batch_size;
        }
        if let Some(error_threshold) = self.error_threshold {
            parameters.error_threshold = error_threshold;
        }
        if let Some(monitoring) = self.monitoring {
            parameters.monitoring_enabled = monitoring;
        }
        parameters
    }

    pub fn into_parameters(self) -> Result<JobParameters, SettingsError> {
        let parameters = self.apply_to(JobParameters::default());
        parameters.validate()?;
        Ok(parameters)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
