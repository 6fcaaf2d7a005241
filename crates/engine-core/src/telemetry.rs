use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING: OnceLock<bool> = OnceLock::new();

/// Installs the process-wide tracing subscriber.
///
/// Safe to call any number of times; only the first call has an effect. The
/// filter comes from `RUST_LOG` and falls back to `info`. Returns `false` when
/// another subscriber was already installed by the host application.
pub fn init_tracing() -> bool {
    *TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .is_ok()
    })
}
