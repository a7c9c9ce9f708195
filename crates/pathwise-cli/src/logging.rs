//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate to keep library crates lightweight.
//! Uses tracing with structured JSON output for machine-readable logs.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// # Arguments
/// * `verbosity` - 0 = WARN, 1 = DEBUG, 2+ = TRACE
/// * `json` - If true, log lines on stderr are JSON objects
///
/// Logs always go to stderr; stdout carries only command output.
pub fn init(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG wins for other crates; -v raises our own crates.
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    for krate in ["pathwise_core", "pathwise_cli"] {
        if let Ok(directive) = format!("{krate}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
