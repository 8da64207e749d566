//! Tracing subscriber setup.

use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError,
};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "taskdesk=info,tower_http=info";

/// Installs the global `fmt` subscriber filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns [`TryInitError`] when a global subscriber is already installed.
pub fn init() -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
