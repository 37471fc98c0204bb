use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over the configured filter. Calling this more than once
/// keeps the first subscriber and returns `false`.
pub fn init(cfg: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.filter.as_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(cfg.with_target))
        .with(filter)
        .try_init()
        .is_ok()
}
