//! Logging setup.

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber, writing to stderr.
///
/// The level comes from `log_level` (the `--log-level` flag) when given,
/// then from `RUST_LOG`, and defaults to `default_level`.
pub fn init(
    log_level: Option<Level>,
    default_level: Level,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
}
