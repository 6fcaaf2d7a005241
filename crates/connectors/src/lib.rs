pub mod csv;
pub mod error;
pub mod file;
pub mod memory;
pub mod stdout;

pub use crate::csv::CsvRecordReader;
pub use error::ConnectorError;
pub use file::{FileRecordReader, FileRecordWriter};
pub use memory::{CollectionRecordWriter, IterableRecordReader};
pub use stdout::StandardOutputRecordWriter;
