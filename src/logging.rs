//! Tracing setup. Logs always go to stderr; stdout belongs to the hook response.
//!
//!   transcript-export --debug ...           # debug logging
//!   RUST_LOG=transcript_export=trace ...    # fine-grained control

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConfig {
    /// Log at debug level unless RUST_LOG is set
    pub debug: bool,
}

fn default_directive(config: &LoggingConfig) -> &'static str {
    if config.debug { "debug" } else { "warn" }
}

/// Install the global subscriber. A subscriber that is already installed is left alone.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.debug)
        .compact()
        .try_init();
}
