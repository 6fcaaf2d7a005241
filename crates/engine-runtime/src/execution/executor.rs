use crate::{error::EngineError, job::BatchJob};
use engine_core::report::JobReport;
use futures::future::join_all;
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinHandle};
use tracing::{debug, info};

/// Runs independent jobs on the tokio runtime, at most `max_concurrent` at a time.
#[derive(Clone)]
pub struct JobExecutor {
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl JobExecutor {
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Runs the job on the current task once a slot is free.
    pub async fn execute(&self, job: BatchJob) -> Result<JobReport, EngineError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| EngineError::ExecutorClosed)?;
        debug!(job = %job.name(), "Executing job");
        job.run().await
    }

    /// Spawns the job; it starts as soon as a slot is free.
    pub fn submit(&self, job: BatchJob) -> JoinHandle<Result<JobReport, EngineError>> {
        let permits = self.permits.clone();
        tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| EngineError::ExecutorClosed)?;
            debug!(job = %job.name(), "Executing submitted job");
            job.run().await
        })
    }

    /// Submits every job and waits for all of them. Results keep submission order.
    pub async fn submit_all<I>(&self, jobs: I) -> Vec<Result<JobReport, EngineError>>
    where
        I: IntoIterator<Item = BatchJob>,
    {
        let handles: Vec<_> = jobs.into_iter().map(|job| self.submit(job)).collect();
        info!(jobs = handles.len(), "Submitted jobs");

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.map_err(EngineError::from).and_then(|result| result))
            .collect()
    }

    /// Stops accepting work. Running jobs finish; jobs still waiting for a slot
    /// fail with [`EngineError::ExecutorClosed`].
    pub fn shutdown(&self) {
        info!("Shutting down job executor");
        self.permits.close();
    }

    pub fn is_shutdown(&self) -> bool {
        self.permits.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobBuilder;
    use engine_core::status::JobStatus;

    #[tokio::test]
    async fn executes_jobs_and_keeps_submission_order() {
        let executor = JobExecutor::new(2);
        let jobs = ["a", "b", "c"].map(|name| JobBuilder::new().named(name).build().unwrap());

        let results = executor.submit_all(jobs).await;
        let names: Vec<_> = results
            .into_iter()
            .map(|r| {
                let report = r.unwrap();
                assert_eq!(report.status(), JobStatus::Completed);
                report.name().to_string()
            })
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn rejects_work_after_shutdown() {
        let executor = JobExecutor::new(1);
        executor.shutdown();
        assert!(executor.is_shutdown());

        let job = JobBuilder::new().build().unwrap();
        assert!(matches!(
            executor.execute(job).await,
            Err(EngineError::ExecutorClosed)
        ));
    }
}
