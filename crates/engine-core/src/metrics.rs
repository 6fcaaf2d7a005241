use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    sync::{
        Arc, OnceLock, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

#[derive(Debug, Default)]
struct InnerMetrics {
    read_count: AtomicU64,
    write_count: AtomicU64,
    filtered_count: AtomicU64,
    error_count: AtomicU64,
    start_time: OnceLock<DateTime<Utc>>,
    end_time: OnceLock<DateTime<Utc>>,
    custom: RwLock<BTreeMap<String, serde_json::Value>>,
}

/// Counters of a single job run.
///
/// Cheap to clone; all clones observe the same counters, so a monitor can read
/// them while the run is in progress.
#[derive(Debug, Clone)]
pub struct JobMetrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub read_count: u64,
    pub write_count: u64,
    pub filtered_count: u64,
    pub error_count: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, serde_json::Value>,
}

impl JobMetrics {
    pub fn new() -> Self {
        JobMetrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_read_count(&self) {
        self.inner.read_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_write_count(&self, count: u64) {
        self.inner.write_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_filtered_count(&self) {
        self.inner.filtered_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the error count including this error.
    pub fn increment_error_count(&self) -> u64 {
        self.inner.error_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn read_count(&self) -> u64 {
        self.inner.read_count.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> u64 {
        self.inner.write_count.load(Ordering::Relaxed)
    }

    pub fn filtered_count(&self) -> u64 {
        self.inner.filtered_count.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.inner.error_count.load(Ordering::Relaxed)
    }

    /// Records the start time. Returns `false` if it was already set.
    pub fn mark_started(&self, at: DateTime<Utc>) -> bool {
        self.inner.start_time.set(at).is_ok()
    }

    /// Records the end time, never earlier than the start time.
    /// Returns `false` if it was already set.
    pub fn mark_ended(&self, at: DateTime<Utc>) -> bool {
        let at = match self.start_time() {
            Some(start) if at < start => start,
            _ => at,
        };
        self.inner.end_time.set(at).is_ok()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.inner.start_time.get().copied()
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.inner.end_time.get().copied()
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Publishes a user-defined metric alongside the built-in counters.
    pub fn add_metric(&self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        if let Ok(mut custom) = self.inner.custom.write() {
            custom.insert(name.into(), value.into());
        }
    }

    pub fn custom_metrics(&self) -> BTreeMap<String, serde_json::Value> {
        self.inner
            .custom
            .read()
            .map(|custom| custom.clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            read_count: self.read_count(),
            write_count: self.write_count(),
            filtered_count: self.filtered_count(),
            error_count: self.error_count(),
            start_time: self.start_time(),
            end_time: self.end_time(),
            duration_ms: self.duration().map(|d| d.num_milliseconds()),
            custom: self.custom_metrics(),
        }
    }
}

impl Default for JobMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_counters() {
        let metrics = JobMetrics::new();
        let observer = metrics.clone();

        metrics.increment_read_count();
        metrics.increment_read_count();
        metrics.increment_write_count(2);
        metrics.increment_filtered_count();
        assert_eq!(metrics.increment_error_count(), 1);

        let snapshot = observer.snapshot();
        assert_eq!(snapshot.read_count, 2);
        assert_eq!(snapshot.write_count, 2);
        assert_eq!(snapshot.filtered_count, 1);
        assert_eq!(snapshot.error_count, 1);
    }

    #[test]
    fn end_time_is_recorded_once_and_never_before_start() {
        let metrics = JobMetrics::new();
        let start = Utc::now();

        assert!(metrics.mark_started(start));
        assert!(!metrics.mark_started(start));

        assert!(metrics.mark_ended(start - chrono::Duration::seconds(5)));
        assert_eq!(metrics.end_time(), Some(start));
        assert!(!metrics.mark_ended(start + chrono::Duration::seconds(5)));
        assert_eq!(metrics.duration(), Some(chrono::Duration::zero()));
    }

    #[test]
    fn custom_metrics_show_up_in_snapshot() {
        let metrics = JobMetrics::new();
        metrics.add_metric("rejected_rows", 3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.custom.get("rejected_rows"), Some(&serde_json::json!(3)));
    }
}
