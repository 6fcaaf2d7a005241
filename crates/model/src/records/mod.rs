pub mod batch;
pub mod header;
pub mod record;
