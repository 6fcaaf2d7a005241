use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata attached to every record by the reader that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Physical position of the record in its source, starting at 1.
    pub number: u64,
    /// Name of the data source (file path, collection name, ...).
    pub source: String,
    pub created_at: DateTime<Utc>,
    /// Set by readers that re-read records which were already seen.
    pub scanned: bool,
}

impl Header {
    pub fn new(number: u64, source: impl Into<String>) -> Self {
        Header {
            number,
            source: source.into(),
            created_at: Utc::now(),
            scanned: false,
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "number={}, source=\"{}\", creationDate=\"{}\"",
            self.number,
            self.source,
            self.created_at.to_rfc3339()
        )?;
        if self.scanned {
            write!(f, ", scanned=true")?;
        }
        Ok(())
    }
}
