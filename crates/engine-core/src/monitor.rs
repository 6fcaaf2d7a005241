//! Publication of live report snapshots to observers outside the engine.
//!
//! The engine only knows [`JobMonitor`]; where snapshots end up (logs, an event
//! bus, an HTTP endpoint) is up to the implementation.

use crate::{
    event_bus::EventBus,
    report::{JobReport, ReportSnapshot},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{events::Event, execution::errors::BoxError};
use tracing::debug;
use uuid::Uuid;

#[async_trait]
pub trait JobMonitor: Send + Sync {
    /// Called once, right after the job entered `Starting`.
    async fn register(&self, report: &JobReport) -> Result<(), BoxError>;

    /// Called whenever the report changed in a way worth publishing.
    async fn notify_report_update(&self, report: &JobReport) -> Result<(), BoxError>;
}

/// Logs every snapshot at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMonitor;

#[async_trait]
impl JobMonitor for TracingMonitor {
    async fn register(&self, report: &JobReport) -> Result<(), BoxError> {
        debug!(
            job = %report.name(),
            execution_id = %report.execution_id(),
            "Registered job for monitoring"
        );
        Ok(())
    }

    async fn notify_report_update(&self, report: &JobReport) -> Result<(), BoxError> {
        let metrics = report.metrics();
        debug!(
            job = %report.name(),
            status = %report.status(),
            read = metrics.read_count(),
            written = metrics.write_count(),
            filtered = metrics.filtered_count(),
            errors = metrics.error_count(),
            "Job report updated"
        );
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JobMonitorRegistered {
    pub execution_id: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

impl Event for JobMonitorRegistered {
    fn event_type(&self) -> &'static str {
        "job.registered"
    }
}

#[derive(Debug, Clone)]
pub struct JobReportUpdated {
    pub snapshot: ReportSnapshot,
    pub timestamp: DateTime<Utc>,
}

impl Event for JobReportUpdated {
    fn event_type(&self) -> &'static str {
        "job.report_updated"
    }
}

/// Publishes registration and report snapshots on an [`EventBus`].
#[derive(Clone)]
pub struct EventBusMonitor {
    bus: EventBus,
}

impl EventBusMonitor {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

#[async_trait]
impl JobMonitor for EventBusMonitor {
    async fn register(&self, report: &JobReport) -> Result<(), BoxError> {
        self.bus
            .publish(JobMonitorRegistered {
                execution_id: report.execution_id(),
                name: report.name().to_string(),
                timestamp: Utc::now(),
            })
            .await;
        Ok(())
    }

    async fn notify_report_update(&self, report: &JobReport) -> Result<(), BoxError> {
        self.bus
            .publish(JobReportUpdated {
                snapshot: report.snapshot(),
                timestamp: Utc::now(),
            })
            .await;
        Ok(())
    }
}
