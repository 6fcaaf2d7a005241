use async_trait::async_trait;
use engine_core::connectors::RecordProcessor;
use model::{execution::errors::BoxError, records::record::Record};
use std::sync::Arc;

/// Runs a record through an ordered chain of processors.
///
/// The output of one processor feeds the next. A processor returning `None`
/// filters the record and the rest of the chain is skipped. An empty chain
/// passes records through unchanged.
#[derive(Clone, Default)]
pub struct CompositeRecordProcessor {
    processors: Vec<Arc<dyn RecordProcessor>>,
}

impl CompositeRecordProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processor<P: RecordProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Arc::new(processor));
        self
    }

    pub fn push(&mut self, processor: Arc<dyn RecordProcessor>) {
        self.processors.push(processor);
    }

    /// Adds the processor built by `factory` only when `condition` holds.
    pub fn add_if<P, F>(self, condition: bool, factory: F) -> Self
    where
        P: RecordProcessor + 'static,
        F: FnOnce() -> P,
    {
        if condition {
            self.add_processor(factory())
        } else {
            self
        }
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

#[async_trait]
impl RecordProcessor for CompositeRecordProcessor {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        let mut current = record;
        for processor in &self.processors {
            match processor.process_record(current).await? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}
