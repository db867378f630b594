use std::io;

use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise everything at `level` or above is
/// shown.
pub(crate) fn init(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
