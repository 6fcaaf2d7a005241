use crate::error::ReportGenerationError;
use async_trait::async_trait;
use engine_core::{
    monitor::JobMonitor,
    report::{JobReport, ReportSnapshot},
    retry::{RetryDisposition, RetryPolicy},
};
use model::execution::errors::BoxError;
use serde::Serialize;
use std::{
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

pub const ENV_CALLBACK_URL: &str = "REPORT_CALLBACK_URL";
pub const ENV_AUTH_TOKEN: &str = "AUTH_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackEvent {
    Registered,
    Updated,
}

#[derive(Debug, Serialize)]
struct CallbackPayload<'a> {
    event: CallbackEvent,
    report: &'a ReportSnapshot,
}

/// Posts report snapshots as JSON to an HTTP endpoint.
///
/// Intermediate updates are throttled to one per `min_interval`; registration
/// and terminal snapshots are always sent.
pub struct CallbackMonitor {
    client: reqwest::Client,
    url: String,
    auth_token: Option<String>,
    min_interval: Duration,
    retry: RetryPolicy,
    last_sent: Mutex<Option<Instant>>,
}

impl CallbackMonitor {
    pub fn new(url: impl Into<String>) -> Self {
        CallbackMonitor {
            client: reqwest::Client::new(),
            url: url.into(),
            auth_token: None,
            min_interval: Duration::from_secs(1),
            retry: RetryPolicy::new(5, Duration::from_millis(100), Duration::from_secs(2)),
            last_sent: Mutex::new(None),
        }
    }

    /// Builds a monitor from `REPORT_CALLBACK_URL` and the optional `AUTH_TOKEN`,
    /// resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReportGenerationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_CALLBACK_URL)
            .filter(|u| !u.trim().is_empty())
            .ok_or(ReportGenerationError::MissingCallbackUrl)?;

        let monitor = Self::new(url);
        Ok(match lookup(ENV_AUTH_TOKEN) {
            Some(token) => monitor.with_auth_token(token),
            None => {
                warn!("{ENV_AUTH_TOKEN} not set, sending unauthenticated reports");
                monitor
            }
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Claims the send slot when the last send is older than `min_interval`.
    /// Forced sends always claim it.
    fn try_claim(&self, force: bool) -> bool {
        let Ok(mut last) = self.last_sent.lock() else {
            return force;
        };
        let now = Instant::now();
        let due = force || last.is_none_or(|at| now.duration_since(at) >= self.min_interval);
        if due {
            *last = Some(now);
        }
        due
    }

    pub async fn send(
        &self,
        event: CallbackEvent,
        snapshot: &ReportSnapshot,
    ) -> Result<(), ReportGenerationError> {
        let payload = CallbackPayload {
            event,
            report: snapshot,
        };

        self.retry
            .run(|| self.post(&payload), classify)
            .await
            .map_err(|e| e.into_inner())?;

        debug!(job = %snapshot.name, status = %snapshot.status, ?event, "Report sent");
        Ok(())
    }

    async fn post(&self, payload: &CallbackPayload<'_>) -> Result<(), ReportGenerationError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            warn!(status = %response.status(), "Report callback rejected the request");
            Err(ReportGenerationError::Rejected(response.status().as_u16()))
        }
    }
}

fn classify(err: &ReportGenerationError) -> RetryDisposition {
    match err {
        ReportGenerationError::Request(e) if e.is_builder() => RetryDisposition::Stop,
        ReportGenerationError::Request(_) => RetryDisposition::Retry,
        ReportGenerationError::Rejected(status) if *status >= 500 || *status == 429 => {
            RetryDisposition::Retry
        }
        _ => RetryDisposition::Stop,
    }
}

#[async_trait]
impl JobMonitor for CallbackMonitor {
    async fn register(&self, report: &JobReport) -> Result<(), BoxError> {
        info!(job = %report.name(), url = %self.url, "Publishing job reports to callback");
        self.try_claim(true);
        self.send(CallbackEvent::Registered, &report.snapshot()).await?;
        Ok(())
    }

    async fn notify_report_update(&self, report: &JobReport) -> Result<(), BoxError> {
        if !self.try_claim(report.status().is_terminal()) {
            return Ok(());
        }
        self.send(CallbackEvent::Updated, &report.snapshot()).await?;
        Ok(())
    }
}
