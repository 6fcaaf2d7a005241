use crate::records::header::Header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single unit of data flowing through a job.
///
/// The engine never looks inside the payload; processors and writers do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub header: Header,
    pub payload: Value,
}

impl Record {
    pub fn new(header: Header, payload: impl Into<Value>) -> Self {
        Record {
            header,
            payload: payload.into(),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Replaces the payload while keeping the original header.
    pub fn with_payload(self, payload: impl Into<Value>) -> Self {
        Record {
            header: self.header,
            payload: payload.into(),
        }
    }

    /// Payload rendered as plain text: strings without quotes, anything else as JSON.
    pub fn payload_text(&self) -> String {
        match &self.payload {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record: {{header=[{}], payload=[{}]}}",
            self.header,
            self.payload_text()
        )
    }
}
