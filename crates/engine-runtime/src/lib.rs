pub mod builder;
pub mod error;
pub mod execution;
pub mod job;

pub use builder::JobBuilder;
pub use execution::JobExecutor;
pub use job::BatchJob;
