#[cfg(test)]
mod tests {
    use connectors::{
        CollectionRecordWriter, CsvRecordReader, FileRecordReader, FileRecordWriter,
        IterableRecordReader,
    };
    use engine_config::settings::JobSettings;
    use engine_core::{error::ErrorKind, retry::RetryPolicy, status::JobStatus};
    use engine_processing::{
        CompositeRecordProcessor,
        error::ProcessingError,
        filter::{EmptyRecordFilter, HeaderRecordFilter},
        mapper::MapProcessor,
        retry::RetryingProcessor,
        validation::{ValidationAction, ValidationProcessor},
    };
    use engine_runtime::JobBuilder;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[tokio::test]
    async fn copies_a_text_file_line_by_line() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.txt");
        let output = dir.path().join("output.txt");
        std::fs::write(&input, "header\nfoo\n\nbar\nbaz\n").unwrap();

        let report = JobBuilder::new()
            .named("copy")
            .batch_size(2)
            .reader(FileRecordReader::new(&input))
            .writer(FileRecordWriter::new(&output))
            .processor(HeaderRecordFilter)
            .processor(EmptyRecordFilter)
            .processor(MapProcessor::new(|p: Value| {
                Ok(json!(p.as_str().unwrap_or_default().to_uppercase()))
            }))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Completed);
        assert_eq!(report.metrics().read_count(), 5);
        assert_eq!(report.metrics().filtered_count(), 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "FOO\nBAR\nBAZ\n");
    }

    #[tokio::test]
    async fn missing_input_file_fails_the_job() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("output.txt");

        let report = JobBuilder::new()
            .reader(FileRecordReader::new(dir.path().join("missing.txt")))
            .writer(FileRecordWriter::new(&output))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Failed);
        assert_eq!(report.last_error().unwrap().kind(), ErrorKind::Open);
        // the writer was never opened, so no output file was created
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn validates_csv_rows() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("orders.csv");
        std::fs::write(&input, "id,total\n1,10\n2,-5\n3,abc\n4,7\n").unwrap();

        let writer = CollectionRecordWriter::new();
        let collected = writer.clone();

        let positive_total = |record: &model::records::record::Record| {
            match record.payload["total"].as_str().map(str::parse::<i64>) {
                Some(Ok(n)) if n > 0 => Ok(()),
                Some(Ok(n)) => Err(format!("total {n} is not positive")),
                _ => Err("total is not a number".to_string()),
            }
        };

        let report = JobBuilder::new()
            .error_threshold(1)
            .reader(CsvRecordReader::new(&input))
            .writer(writer)
            .processor(ValidationProcessor::new().rule(
                "positive_total",
                ValidationAction::Fail,
                positive_total,
            ))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        // two invalid rows against a threshold of one
        assert_eq!(report.status(), JobStatus::Failed);
        assert_eq!(report.metrics().error_count(), 2);
        assert!(report
            .last_error()
            .unwrap()
            .to_string()
            .contains("Validation failed: positive_total"));
        assert!(collected.payloads().is_empty());
    }

    #[tokio::test]
    async fn skipping_invalid_csv_rows_completes() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("orders.csv");
        std::fs::write(&input, "id,total\n1,10\n2,\n3,4\n").unwrap();

        let writer = CollectionRecordWriter::new();
        let collected = writer.clone();

        let report = JobBuilder::new()
            .reader(CsvRecordReader::new(&input))
            .writer(writer)
            .processor(ValidationProcessor::new().rule(
                "total_present",
                ValidationAction::Skip,
                |r: &model::records::record::Record| match r.payload["total"].as_str() {
                    Some(t) if !t.is_empty() => Ok(()),
                    _ => Err("missing total".into()),
                },
            ))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Completed);
        assert_eq!(report.metrics().filtered_count(), 1);
        assert_eq!(
            collected.payloads(),
            vec![json!({"id": "1", "total": "10"}), json!({"id": "3", "total": "4"})]
        );
    }

    #[tokio::test]
    async fn retrying_processor_hides_transient_failures_from_the_job() {
        static ATTEMPTS: AtomicUsize = AtomicUsize::new(0);

        let flaky = MapProcessor::new(|p: Value| {
            // every other attempt fails
            if ATTEMPTS.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(ProcessingError::TemporarilyUnavailable("lookup service".into()).into())
            } else {
                Ok(p)
            }
        });

        let writer = CollectionRecordWriter::new();
        let collected = writer.clone();

        let report = JobBuilder::new()
            .error_threshold(0)
            .reader(IterableRecordReader::new([1, 2, 3]))
            .writer(writer)
            .processor(RetryingProcessor::new(flaky, RetryPolicy::immediate(2)))
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.status(), JobStatus::Completed);
        assert_eq!(report.metrics().error_count(), 0);
        assert_eq!(collected.payloads(), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(ATTEMPTS.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn settings_drive_job_parameters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, r#"{ "name": "configured", "batch_size": 3 }"#).unwrap();

        let env = JobSettings::from_lookup(|key| {
            (key == "BATCHJOB_ERROR_THRESHOLD").then(|| "5".to_string())
        })
        .unwrap();
        let parameters = JobSettings::from_file(&path)
            .unwrap()
            .merge(env)
            .into_parameters()
            .unwrap();

        let writer = CollectionRecordWriter::new();
        let records = writer.records();
        let job = JobBuilder::new()
            .parameters(parameters)
            .reader(IterableRecordReader::new(0..7))
            .writer(writer)
            .build()
            .unwrap();

        assert_eq!(job.name(), "configured");
        assert_eq!(job.parameters().error_threshold, 5);
        let report = job.run().await.unwrap();
        assert_eq!(report.metrics().write_count(), 7);
        assert_eq!(records.lock().unwrap().len(), 7);
        assert!(report.to_string().contains("configured"));
    }

    #[tokio::test]
    async fn composite_processor_chains_filters_and_maps() {
        let chain = CompositeRecordProcessor::new()
            .add_processor(EmptyRecordFilter)
            .add_if(true, || {
                MapProcessor::new(|p: Value| Ok(json!(format!("<{}>", p.as_str().unwrap_or("")))))
            });

        let writer = CollectionRecordWriter::new();
        let collected = writer.clone();
        JobBuilder::new()
            .reader(IterableRecordReader::new(["a", "", "b"]))
            .writer(writer)
            .processor(chain)
            .build()
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(collected.payloads(), vec![json!("<a>"), json!("<b>")]);
    }
}
