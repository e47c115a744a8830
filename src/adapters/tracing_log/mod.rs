// Tracing log adapter - Subscriber installation for the binary and tests

use tracing_subscriber::EnvFilter;

use crate::adapters::toml_config::LoggingSettings;

/// Build the filter: `RUST_LOG` wins over the configured level
pub fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, plain or JSON.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing(settings: &LoggingSettings) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(settings))
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}
