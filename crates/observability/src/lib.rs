//! `shopkeep-observability` — tracing/logging setup (shared).

use tracing_subscriber::EnvFilter;

/// Initialize process-wide tracing/logging.
///
/// Level defaults to `info` and is overridable via `RUST_LOG`. Safe to call
/// multiple times; subsequent calls become no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init();
}
