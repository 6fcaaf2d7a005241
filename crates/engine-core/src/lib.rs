pub mod connectors;
pub mod error;
pub mod event_bus;
pub mod listeners;
pub mod metrics;
pub mod monitor;
pub mod report;
pub mod retry;
pub mod status;
pub mod telemetry;
