//! Structured logging.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to
//! this crate and the HTTP middleware.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Like [`init_logging`] but writes to stderr, keeping stdout for command output.
pub fn init_cli_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(level).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn default_directives(level: &str) -> String {
    format!("contest_gateway={level},contest_cli={level},tower_http={level}")
}
