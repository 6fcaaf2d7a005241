use crate::error::{ErrorType, ProcessingError};
use async_trait::async_trait;
use engine_core::{
    connectors::RecordProcessor,
    retry::{RetryDisposition, RetryError, RetryPolicy},
};
use model::{execution::errors::BoxError, records::record::Record};
use tracing::warn;

/// Retries only errors that a [`ProcessingError`] marks as transient.
pub fn classify_processing_error(err: &BoxError) -> RetryDisposition {
    match err.downcast_ref::<ProcessingError>() {
        Some(e) if e.error_type() == ErrorType::Transient => RetryDisposition::Retry,
        _ => RetryDisposition::Stop,
    }
}

/// Wraps a processor so transient failures are retried before they reach the job.
///
/// Each attempt receives a fresh copy of the input record.
pub struct RetryingProcessor<P> {
    inner: P,
    policy: RetryPolicy,
    classify: fn(&BoxError) -> RetryDisposition,
}

impl<P: RecordProcessor> RetryingProcessor<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            classify: classify_processing_error,
        }
    }

    pub fn with_classifier(mut self, classify: fn(&BoxError) -> RetryDisposition) -> Self {
        self.classify = classify;
        self
    }
}

#[async_trait]
impl<P: RecordProcessor> RecordProcessor for RetryingProcessor<P> {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        let number = record.number();
        self.policy
            .run(
                || self.inner.process_record(record.clone()),
                self.classify,
            )
            .await
            .map_err(|e| {
                if let RetryError::AttemptsExceeded { attempts, .. } = &e {
                    warn!(record = number, attempts, "Giving up on record after retries");
                }
                e.into_inner()
            })
    }
}
