use crate::error::ProcessingError;
use async_trait::async_trait;
use engine_core::connectors::RecordProcessor;
use model::{execution::errors::BoxError, records::record::Record};
use tracing::warn;

/// What to do with a record that breaks a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationAction {
    /// Filter the record out.
    Skip,
    /// Report a processing error for the record.
    #[default]
    Fail,
    /// Log and let the record through.
    Warn,
}

type Rule = Box<dyn Fn(&Record) -> Result<(), String> + Send + Sync>;

pub struct ValidationRule {
    name: String,
    check: Rule,
    action: ValidationAction,
}

/// Applies named rules to each record; the first violated rule decides the outcome.
#[derive(Default)]
pub struct ValidationProcessor {
    rules: Vec<ValidationRule>,
}

impl ValidationProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<F>(mut self, name: impl Into<String>, action: ValidationAction, check: F) -> Self
    where
        F: Fn(&Record) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push(ValidationRule {
            name: name.into(),
            check: Box::new(check),
            action,
        });
        self
    }
}

#[async_trait]
impl RecordProcessor for ValidationProcessor {
    async fn process_record(&self, record: Record) -> Result<Option<Record>, BoxError> {
        for rule in &self.rules {
            let Err(message) = (rule.check)(&record) else {
                continue;
            };

            match rule.action {
                ValidationAction::Skip => return Ok(None),
                ValidationAction::Fail => {
                    return Err(ProcessingError::ValidationFailed {
                        rule: rule.name.clone(),
                        message,
                    }
                    .into());
                }
                ValidationAction::Warn => {
                    warn!(record = record.number(), rule = %rule.name, "{message}");
                }
            }
        }
        Ok(Some(record))
    }
}
