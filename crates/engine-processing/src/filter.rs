use async_trait::async_trait;
use engine_core::connectors::RecordProcessor;
use model::{execution::errors::BoxError, records::record::Record};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

/// Keeps records for which the predicate returns `true`.
pub struct PredicateFilter<F> {
    predicate: F,
}

impl<F> PredicateFilter<F>
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

#[async_trait]
impl<F> RecordProcessor for PredicateFilter<F>
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        if (self.predicate)(&record) {
            Ok(Some(record))
        } else {
            debug!(record = record.number(), "Record rejected by predicate");
            Ok(None)
        }
    }
}

/// Drops records whose payload is null, an empty or blank string, an empty
/// array or an empty object.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRecordFilter;

impl EmptyRecordFilter {
    fn is_empty(payload: &Value) -> bool {
        match payload {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            _ => false,
        }
    }
}

#[async_trait]
impl RecordProcessor for EmptyRecordFilter {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        if Self::is_empty(&record.payload) {
            Ok(None)
        } else {
            Ok(Some(record))
        }
    }
}

/// Drops the first record of the input (a header line).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderRecordFilter;

#[async_trait]
impl RecordProcessor for HeaderRecordFilter {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        if record.number() == 1 {
            Ok(None)
        } else {
            Ok(Some(record))
        }
    }
}

/// Drops records by their 1-based number.
#[derive(Debug, Clone, Default)]
pub struct RecordNumberFilter {
    excluded: BTreeSet<u64>,
}

impl RecordNumberFilter {
    pub fn new(numbers: impl IntoIterator<Item = u64>) -> Self {
        Self {
            excluded: numbers.into_iter().collect(),
        }
    }
}

#[async_trait]
impl RecordProcessor for RecordNumberFilter {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        if self.excluded.contains(&record.number()) {
            Ok(None)
        } else {
            Ok(Some(record))
        }
    }
}

/// Keeps records numbered `lower..=upper` and drops the rest.
#[derive(Debug, Clone, Copy)]
pub struct RecordRangeFilter {
    lower: u64,
    upper: u64,
}

impl RecordRangeFilter {
    pub fn new(lower: u64, upper: u64) -> Self {
        Self { lower, upper }
    }
}

#[async_trait]
impl RecordProcessor for RecordRangeFilter {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        if (self.lower..=self.upper).contains(&record.number()) {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::records::header::Header;
    use serde_json::json;

    fn record(n: u64, payload: Value) -> Record {
        Record::new(Header::new(n, "test"), payload)
    }

    #[tokio::test]
    async fn predicate_filter_keeps_matching_records() {
        let filter = PredicateFilter::new(|r: &Record| r.payload.as_i64() > Some(2));
        assert!(filter.process_record(record(1, json!(3))).await.unwrap().is_some());
        assert!(filter.process_record(record(2, json!(1))).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_filter_drops_blank_payloads() {
        let filter = EmptyRecordFilter;
        for payload in [json!(null), json!("  "), json!([]), json!({})] {
            assert!(filter.process_record(record(1, payload)).await.unwrap().is_none());
        }
        assert!(filter.process_record(record(1, json!(0))).await.unwrap().is_some());
        assert!(filter.process_record(record(1, json!("x"))).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn header_filter_drops_only_the_first_record() {
        let filter = HeaderRecordFilter;
        assert!(filter.process_record(record(1, json!("id,name"))).await.unwrap().is_none());
        assert!(filter.process_record(record(2, json!("1,foo"))).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn number_filters() {
        let filter = RecordNumberFilter::new([2, 4]);
        assert!(filter.process_record(record(2, json!(1))).await.unwrap().is_none());
        assert!(filter.process_record(record(3, json!(1))).await.unwrap().is_some());

        let range = RecordRangeFilter::new(2, 3);
        assert!(range.process_record(record(1, json!(1))).await.unwrap().is_none());
        assert!(range.process_record(record(3, json!(1))).await.unwrap().is_some());
        assert!(range.process_record(record(4, json!(1))).await.unwrap().is_none());
    }
}
