use thiserror::Error;

/// Errors raised while publishing reports to an external endpoint.
#[derive(Debug, Error)]
pub enum ReportGenerationError {
    #[error("Missing REPORT_CALLBACK_URL environment variable")]
    MissingCallbackUrl,

    #[error("Callback request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Callback rejected the report with status {0}")]
    Rejected(u16),
}
