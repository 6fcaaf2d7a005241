use async_trait::async_trait;
use engine_core::connectors::RecordProcessor;
use model::{execution::errors::BoxError, records::record::Record};
use serde_json::Value;

/// Rewrites the payload of every record, keeping its header.
pub struct MapProcessor<F> {
    map: F,
}

impl<F> MapProcessor<F>
where
    F: Fn(Value) -> Result<Value, BoxError> + Send + Sync,
{
    pub fn new(map: F) -> Self {
        Self { map }
    }
}

#[async_trait]
impl<F> RecordProcessor for MapProcessor<F>
where
    F: Fn(Value) -> Result<Value, BoxError> + Send + Sync,
{
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        let Record { header, payload } = record;
        let payload = (self.map)(payload)?;
        Ok(Some(Record { header, payload }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use model::records::header::Header;
    use serde_json::json;

    #[tokio::test]
    async fn maps_payload_and_keeps_header() {
        let upper = MapProcessor::new(|p: Value| {
            let text = p
                .as_str()
                .ok_or_else(|| ProcessingError::Transformation("expected text".into()))?;
            Ok(json!(text.to_uppercase()))
        });

        let header = Header::new(7, "input.txt");
        let out = upper
            .process_record(Record::new(header.clone(), "abc"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out.header, header);
        assert_eq!(out.payload, json!("ABC"));

        let err = upper
            .process_record(Record::new(Header::new(8, "input.txt"), 5))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Transformation failed: expected text");
    }
}
