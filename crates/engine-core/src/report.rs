use crate::{
    error::{JobError, ReportError},
    metrics::{JobMetrics, MetricsSnapshot},
    status::JobStatus,
};
use chrono::Utc;
use model::execution::parameters::JobParameters;
use serde::Serialize;
use std::{
    fmt,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU8, Ordering},
    },
};
use uuid::Uuid;

#[derive(Debug)]
struct InnerReport {
    execution_id: Uuid,
    name: String,
    parameters: JobParameters,
    metrics: JobMetrics,
    status: AtomicU8,
    last_error: RwLock<Option<Arc<JobError>>>,
}

/// Outcome of a job run.
///
/// The engine mutates it in place while the run progresses; clones share state,
/// so monitors can poll a live view without blocking the run.
#[derive(Debug, Clone)]
pub struct JobReport {
    inner: Arc<InnerReport>,
}

/// Immutable, serializable view of a report at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    pub execution_id: Uuid,
    pub name: String,
    pub status: JobStatus,
    pub parameters: JobParameters,
    pub metrics: MetricsSnapshot,
    pub last_error: Option<String>,
}

impl JobReport {
    pub fn new(parameters: JobParameters) -> Self {
        JobReport {
            inner: Arc::new(InnerReport {
                execution_id: Uuid::new_v4(),
                name: parameters.name.clone(),
                parameters,
                metrics: JobMetrics::new(),
                status: AtomicU8::new(JobStatus::Idle as u8),
                last_error: RwLock::new(None),
            }),
        }
    }

    pub fn execution_id(&self) -> Uuid {
        self.inner.execution_id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parameters(&self) -> &JobParameters {
        &self.inner.parameters
    }

    pub fn metrics(&self) -> &JobMetrics {
        &self.inner.metrics
    }

    pub fn status(&self) -> JobStatus {
        JobStatus::from_u8(self.inner.status.load(Ordering::Acquire))
    }

    /// Moves the status forward; anything but a legal transition is rejected
    /// and leaves the current status untouched.
    pub fn advance(&self, next: JobStatus) -> Result<(), ReportError> {
        self.inner
            .status
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                JobStatus::from_u8(current)
                    .can_transition_to(next)
                    .then_some(next as u8)
            })
            .map(|_| ())
            .map_err(|current| ReportError::IllegalTransition {
                from: JobStatus::from_u8(current),
                to: next,
            })
    }

    /// Moves to a terminal status and records the end time.
    pub fn finish(&self, status: JobStatus) -> Result<(), ReportError> {
        if !status.is_terminal() {
            return Err(ReportError::NotTerminal(status));
        }
        self.advance(status)?;
        if !self.inner.metrics.mark_ended(Utc::now()) {
            return Err(ReportError::AlreadyFinished);
        }
        Ok(())
    }

    pub fn last_error(&self) -> Option<Arc<JobError>> {
        self.inner
            .last_error
            .read()
            .ok()
            .and_then(|guard| guard.clone())
    }

    pub fn set_last_error(&self, error: impl Into<Arc<JobError>>) {
        if let Ok(mut guard) = self.inner.last_error.write() {
            *guard = Some(error.into());
        }
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            execution_id: self.execution_id(),
            name: self.name().to_string(),
            status: self.status(),
            parameters: self.parameters().clone(),
            metrics: self.metrics().snapshot(),
            last_error: self.last_error().map(|e| e.to_string()),
        }
    }
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.parameters();
        let metrics = self.metrics();
        let time = |t: Option<chrono::DateTime<Utc>>| {
            t.map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "n/a".to_string())
        };

        writeln!(f, "Job Report:")?;
        writeln!(f, "===========")?;
        writeln!(f, "Name: {}", self.name())?;
        writeln!(f, "Execution id: {}", self.execution_id())?;
        writeln!(f, "Status: {}", self.status())?;
        writeln!(f, "Parameters:")?;
        writeln!(f, "\tBatch size = {}", params.batch_size)?;
        writeln!(f, "\tError threshold = {}", params.error_threshold_display())?;
        writeln!(f, "\tMonitoring = {}", params.monitoring_enabled)?;
        writeln!(f, "Metrics:")?;
        writeln!(f, "\tStart time = {}", time(metrics.start_time()))?;
        writeln!(f, "\tEnd time = {}", time(metrics.end_time()))?;
        let duration = metrics
            .duration()
            .map(|d| format!("{}ms", d.num_milliseconds()))
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(f, "\tDuration = {duration}")?;
        writeln!(f, "\tRead count = {}", metrics.read_count())?;
        writeln!(f, "\tWrite count = {}", metrics.write_count())?;
        writeln!(f, "\tFiltered count = {}", metrics.filtered_count())?;
        writeln!(f, "\tError count = {}", metrics.error_count())?;
        for (name, value) in metrics.custom_metrics() {
            writeln!(f, "\t{name} = {value}")?;
        }
        match self.last_error() {
            Some(err) => write!(f, "Last error: {err}"),
            None => write!(f, "Last error: none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> JobReport {
        JobReport::new(JobParameters::new("report-test").with_batch_size(10))
    }

    #[test]
    fn starts_idle_and_walks_forward() {
        let report = report();
        assert_eq!(report.status(), JobStatus::Idle);

        report.advance(JobStatus::Starting).unwrap();
        report.advance(JobStatus::Started).unwrap();
        report.advance(JobStatus::Stopping).unwrap();
        report.finish(JobStatus::Completed).unwrap();

        assert_eq!(report.status(), JobStatus::Completed);
        assert!(report.metrics().end_time().is_some());
    }

    #[test]
    fn rejects_backward_transition() {
        let report = report();
        report.advance(JobStatus::Starting).unwrap();
        report.advance(JobStatus::Started).unwrap();

        let err = report.advance(JobStatus::Starting).unwrap_err();
        assert_eq!(
            err,
            ReportError::IllegalTransition {
                from: JobStatus::Started,
                to: JobStatus::Starting
            }
        );
        assert_eq!(report.status(), JobStatus::Started);
    }

    #[test]
    fn finish_requires_terminal_status_and_happens_once() {
        let report = report();
        report.advance(JobStatus::Starting).unwrap();

        assert_eq!(
            report.finish(JobStatus::Started),
            Err(ReportError::NotTerminal(JobStatus::Started))
        );

        report.finish(JobStatus::Failed).unwrap();
        assert!(report.finish(JobStatus::Failed).is_err());
        assert_eq!(report.status(), JobStatus::Failed);
    }

    #[test]
    fn snapshot_carries_last_error() {
        let report = report();
        report.set_last_error(JobError::Read {
            source: "connection reset".into(),
        });

        let snapshot = report.snapshot();
        assert_eq!(snapshot.name, "report-test");
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("Unable to read next record: connection reset")
        );

        let rendered = report.to_string();
        assert!(rendered.contains("Status: IDLE"));
        assert!(rendered.contains("Error threshold = N/A"));
    }
}
