pub mod composite;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod retry;
pub mod validation;

pub use composite::CompositeRecordProcessor;
