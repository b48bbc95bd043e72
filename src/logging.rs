//! Tracing setup. Logs go to stderr so `once` output on stdout stays clean JSON.

use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_LEVEL: &str = "info";

/// `RUST_LOG` wins over the configured level.
pub fn env_filter(configured: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let directive = configured.unwrap_or(DEFAULT_LEVEL);
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    }
}

pub fn init_logging(configured: Option<&str>) {
    fmt::Subscriber::builder()
        .with_env_filter(env_filter(configured))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
