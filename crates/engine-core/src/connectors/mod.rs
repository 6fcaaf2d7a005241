pub mod noop;
pub mod processor;
pub mod reader;
pub mod writer;

pub use processor::RecordProcessor;
pub use reader::RecordReader;
pub use writer::RecordWriter;
