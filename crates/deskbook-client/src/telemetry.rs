//! Logging setup for native binaries and tests

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "deskbook=info";

/// Initialize the logger at [`DEFAULT_FILTER`] unless `RUST_LOG` says otherwise
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Initialize the logger; repeated calls are ignored
pub fn init_tracing_with(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .try_init();
}
