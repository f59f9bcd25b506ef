//! Logging setup for hosts embedding the provider.
//!
//! Every handler emits `tracing` spans and events under the
//! `checkpoint_provider` target. These helpers install a subscriber that
//! writes them to **stderr**, leaving stdout to the host.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `checkpoint_provider=debug`)
//!
//! At `debug` request payloads and response bodies are logged; the session
//! identifier never is.
//!
//! ```bash
//! # Log every management command
//! RUST_LOG=checkpoint_provider=debug ./host
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Initialize the default logging subscriber.
///
/// Respects `RUST_LOG` and defaults to `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with `default_level` used when `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
///
/// # Example
///
/// ```ignore
/// use checkpoint_provider::init_logging_with_default;
///
/// init_logging_with_default("debug");
/// ```
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this never panics, so tests and hosts that may
/// set up the provider more than once can call it freely.
pub fn try_init_logging() -> bool {
    subscriber("info").try_init().is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can only be set once per process, so only the
    // filter side is covered here.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("checkpoint_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,checkpoint_provider::application_site=debug").is_ok());
    }

    #[test]
    fn test_try_init_logging_is_idempotent() {
        try_init_logging();
        assert!(!try_init_logging());
    }
}
