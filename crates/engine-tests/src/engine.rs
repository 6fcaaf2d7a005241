#[cfg(test)]
mod tests {
    use crate::utils::{ProbeReader, ProbeWriter, ScriptedProcessor};
    use engine_core::{
        error::{ErrorKind, JobError},
        event_bus::EventBus,
        monitor::{EventBusMonitor, JobMonitorRegistered, JobReportUpdated},
        status::JobStatus,
    };
    use engine_runtime::{JobBuilder, JobExecutor, error::EngineError};
    use std::sync::{Arc, atomic::Ordering};
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn batches_are_bounded_by_batch_size() {
        for (records, batch_size) in [(0u64, 3usize), (1, 1), (4, 2), (5, 2), (7, 3), (3, 10)] {
            let writer = ProbeWriter::new();
            let written = writer.written();

            let report = JobBuilder::new()
                .batch_size(batch_size)
                .reader(ProbeReader::numbers(records))
                .writer(writer)
                .build()
                .unwrap()
                .run()
                .await
                .unwrap();

            let batches = written.lock().unwrap().clone();
            let expected_writes = (records as usize).div_ceil(batch_size);
            assert_eq!(batches.len(), expected_writes, "R={records} B={batch_size}");
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= batch_size));
            if let Some(last) = batches.last() {
                let rem = records as usize % batch_size;
                assert_eq!(last.len(), if rem == 0 { batch_size } else { rem });
            }
            assert_eq!(report.status(), JobStatus::Completed);
            assert_eq!(report.metrics().read_count(), records);
            assert_eq!(report.metrics().write_count(), records);
        }
    }

    #[tokio::test]
    async fn huge_batch_size_reserves_a_bounded_batch() {
        let writer = ProbeWriter::new();
        let written = writer.written();

        let report = JobBuilder::new()
            .batch_size(usize::MAX)
            .reader(ProbeReader::numbers(3))
            .writer(writer)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Completed);
        assert_eq!(*written.lock().unwrap(), vec![vec![1, 2, 3]]);
        assert_eq!(report.metrics().write_count(), 3);
    }

    #[tokio::test]
    #[traced_test]
    async fn reference_run_of_five_records() {
        let writer = ProbeWriter::new();
        let written = writer.written();

        let job = JobBuilder::new()
            .named("reference")
            .batch_size(2)
            .reader(ProbeReader::numbers(5))
            .writer(writer)
            .build()
            .unwrap();
        let report = job.run().await.unwrap();

        assert_eq!(*written.lock().unwrap(), vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(report.status(), JobStatus::Completed);
        let m = report.metrics();
        assert_eq!(
            (m.read_count(), m.write_count(), m.filtered_count(), m.error_count()),
            (5, 5, 0, 0)
        );
        assert!(logs_contain("Starting job 'reference'"));
        assert!(logs_contain("Job 'reference' started"));
        assert!(logs_contain("Error threshold: N/A"));
    }

    #[tokio::test]
    async fn exactly_threshold_errors_complete() {
        let report = JobBuilder::new()
            .error_threshold(2)
            .reader(ProbeReader::numbers(6))
            .processor(ScriptedProcessor::failing_on([2, 5]))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Completed);
        assert_eq!(report.metrics().error_count(), 2);
        assert_eq!(report.metrics().write_count(), 4);
    }

    #[tokio::test]
    async fn one_error_over_threshold_stops_consuming_input() {
        let reader = ProbeReader::numbers(10);
        let reads = reader.calls.clone();

        let report = JobBuilder::new()
            .batch_size(3)
            .error_threshold(2)
            .reader(reader)
            .processor(ScriptedProcessor::failing_on([2, 3, 4]))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Failed);
        assert_eq!(report.metrics().error_count(), 3);
        assert_eq!(report.metrics().read_count(), 4);
        assert_eq!(reads.reads(), 4);
        assert_eq!(reads.closes(), 1);
    }

    #[tokio::test]
    async fn zero_threshold_makes_any_error_fatal() {
        let report = JobBuilder::new()
            .error_threshold(0)
            .reader(ProbeReader::numbers(3))
            .processor(ScriptedProcessor::failing_on([1]))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Failed);
        assert_eq!(report.metrics().read_count(), 1);
        assert_eq!(report.last_error().unwrap().kind(), ErrorKind::Process);
    }

    #[tokio::test]
    async fn accounting_adds_up_in_a_completed_run() {
        let processor = ScriptedProcessor {
            fail_on: vec![3, 7],
            filter_on: vec![1, 4, 9],
            ..Default::default()
        };

        let report = JobBuilder::new()
            .batch_size(4)
            .reader(ProbeReader::numbers(10))
            .processor(processor)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        let m = report.metrics();
        assert_eq!(report.status(), JobStatus::Completed);
        assert_eq!((m.filtered_count(), m.error_count()), (3, 2));
        assert_eq!(m.write_count() + m.filtered_count() + m.error_count(), m.read_count());
    }

    #[tokio::test]
    async fn read_failure_is_fatal() {
        let writer = ProbeWriter::new();
        let written = writer.written();

        let report = JobBuilder::new()
            .batch_size(2)
            .reader(ProbeReader::numbers(5).failing_read_at(4))
            .writer(writer)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Failed);
        assert_eq!(*written.lock().unwrap(), vec![vec![1, 2]]);
        assert_eq!(report.metrics().read_count(), 3);
        assert!(matches!(*report.last_error().unwrap(), JobError::Read { .. }));
    }

    #[tokio::test]
    async fn writer_open_failure_closes_both_resources() {
        let reader = ProbeReader::numbers(3);
        let reader_calls = reader.calls.clone();
        let writer = ProbeWriter::new().failing_open();
        let writer_calls = writer.calls.clone();

        let report = JobBuilder::new()
            .reader(reader)
            .writer(writer)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Failed);
        assert!(matches!(*report.last_error().unwrap(), JobError::OpenWriter { .. }));
        assert_eq!((reader_calls.opens(), reader_calls.closes()), (1, 1));
        assert_eq!((writer_calls.opens(), writer_calls.closes()), (1, 1));
        assert_eq!(reader_calls.reads(), 0);
    }

    #[tokio::test]
    async fn reader_open_failure_never_touches_the_writer() {
        let reader = ProbeReader::numbers(3).failing_open();
        let reader_calls = reader.calls.clone();
        let writer = ProbeWriter::new();
        let writer_calls = writer.calls.clone();

        let report = JobBuilder::new()
            .reader(reader)
            .writer(writer)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Failed);
        assert!(matches!(*report.last_error().unwrap(), JobError::OpenReader { .. }));
        assert_eq!(reader_calls.closes(), 1);
        assert_eq!((writer_calls.opens(), writer_calls.closes()), (0, 0));
    }

    #[tokio::test]
    async fn write_failure_releases_resources_once() {
        let reader = ProbeReader::numbers(6);
        let reader_calls = reader.calls.clone();
        let writer = ProbeWriter::new().failing_write_at(2);
        let writer_calls = writer.calls.clone();

        let report = JobBuilder::new()
            .batch_size(2)
            .reader(reader)
            .writer(writer)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Failed);
        assert_eq!(report.metrics().write_count(), 2);
        assert_eq!(report.metrics().read_count(), 4);
        assert_eq!(reader_calls.closes(), 1);
        assert_eq!(writer_calls.closes(), 1);
    }

    #[tokio::test]
    async fn close_failures_never_change_the_status() {
        let report = JobBuilder::new()
            .reader(ProbeReader::numbers(2).failing_close())
            .writer(ProbeWriter::new().failing_close())
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();
        assert_eq!(report.status(), JobStatus::Completed);
        assert!(matches!(*report.last_error().unwrap(), JobError::CloseWriter { .. }));

        let report = JobBuilder::new()
            .reader(ProbeReader::numbers(2).failing_close())
            .writer(ProbeWriter::new().failing_write_at(1))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();
        assert_eq!(report.status(), JobStatus::Failed);
        assert!(matches!(*report.last_error().unwrap(), JobError::CloseReader { .. }));
    }

    #[tokio::test]
    async fn end_time_is_set_once_the_run_is_terminal() {
        let job = JobBuilder::new()
            .reader(ProbeReader::numbers(3))
            .build()
            .unwrap();
        let live = job.report();
        assert_eq!(live.status(), JobStatus::Idle);
        assert!(live.metrics().end_time().is_none());

        let report = job.run().await.unwrap();
        let m = report.metrics();
        assert!(report.status().is_terminal());
        assert!(m.end_time().unwrap() >= m.start_time().unwrap());
        assert!(m.duration().is_some());
        // the returned report and the live handle share state
        assert_eq!(live.status(), JobStatus::Completed);
    }

    #[tokio::test]
    async fn concurrent_second_run_is_rejected() {
        let job = Arc::new(
            JobBuilder::new()
                .reader(ProbeReader::numbers(100))
                .batch_size(7)
                .build()
                .unwrap(),
        );

        let (a, b) = tokio::join!(
            {
                let job = job.clone();
                async move { job.run().await }
            },
            {
                let job = job.clone();
                async move { job.run().await }
            }
        );

        let results = [a, b];
        let completed = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(EngineError::AlreadyExecuted { .. })))
            .count();
        assert_eq!((completed, rejected), (1, 1));
        assert_eq!(job.report().metrics().read_count(), 100);
    }

    #[tokio::test]
    async fn monitor_receives_registration_pings_and_final_snapshot() {
        let bus = EventBus::new();
        let (_r, mut registered) = bus.subscribe::<JobMonitorRegistered>(8).await;
        let (_u, mut updates) = bus.subscribe::<JobReportUpdated>(64).await;

        let report = JobBuilder::new()
            .named("watched")
            .reader(ProbeReader::numbers(3))
            .monitor(EventBusMonitor::new(bus))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();
        assert_eq!(report.status(), JobStatus::Completed);

        assert_eq!(registered.recv().await.unwrap().name, "watched");

        let mut snapshots = Vec::new();
        while let Ok(update) = updates.try_recv() {
            snapshots.push(update.snapshot.clone());
        }
        // one ping before each record plus the terminal snapshot
        assert_eq!(snapshots.len(), 4);
        let last = snapshots.last().unwrap();
        assert_eq!(last.status, JobStatus::Completed);
        assert_eq!(last.metrics.write_count, 3);
    }

    #[tokio::test]
    async fn monitoring_disabled_publishes_nothing() {
        let bus = EventBus::new();
        let (_u, mut updates) = bus.subscribe::<JobReportUpdated>(64).await;

        JobBuilder::new()
            .reader(ProbeReader::numbers(3))
            .monitor(EventBusMonitor::new(bus))
            .enable_monitoring(false)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert!(updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn cancellation_interrupts_between_batches() {
        let token = CancellationToken::new();
        let processor = ScriptedProcessor::default();
        let processed = processor.calls.clone();

        let job = JobBuilder::new()
            .batch_size(2)
            .reader(ProbeReader::numbers(10))
            .processor(processor)
            .cancellation(token.clone())
            .build()
            .unwrap();

        token.cancel();
        let report = job.run().await.unwrap();

        assert_eq!(report.status(), JobStatus::Failed);
        assert!(matches!(*report.last_error().unwrap(), JobError::Interrupted));
        assert_eq!(processed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn executor_runs_independent_jobs() {
        let executor = JobExecutor::new(2);
        let jobs = (1..=4).map(|n| {
            JobBuilder::new()
                .named(format!("job-{n}"))
                .reader(ProbeReader::numbers(n * 10))
                .build()
                .unwrap()
        });

        let results = executor.submit_all(jobs).await;
        assert_eq!(results.len(), 4);
        for (i, result) in results.into_iter().enumerate() {
            let report = result.unwrap();
            assert_eq!(report.name(), format!("job-{}", i + 1));
            assert_eq!(report.metrics().read_count(), (i as u64 + 1) * 10);
            assert_eq!(report.status(), JobStatus::Completed);
        }
    }

    #[tokio::test]
    async fn submitted_job_can_be_awaited() {
        let executor = JobExecutor::new(1);
        let handle = executor.submit(
            JobBuilder::new()
                .reader(ProbeReader::numbers(2))
                .build()
                .unwrap(),
        );
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.metrics().write_count(), 2);
    }
}
