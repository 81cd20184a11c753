//! Structured Logger
//!
//! Wraps `tracing` to provide JSON or console output with environment-based
//! level control. `RUST_LOG` wins over the configured level.

use geovision_config::LogFormat;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const FALLBACK_LEVEL: &str = "info";

/// Build the level filter, preferring `RUST_LOG` when it is set and valid.
pub fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(level))
}

/// Filter for the configured level; an unparseable level becomes `info`.
fn configured_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Initialize the global logger. Later calls are no-ops.
pub fn init_logger(level: &str, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(level_filter(level));

    let _ = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_target(false)
                    .with_ansi(false)
                    .without_time(),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(true),
            )
            .try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_falls_back_to_info() {
        assert_eq!(configured_filter("geovision=loudest").to_string(), "info");
    }

    #[test]
    fn configured_level_is_kept() {
        assert_eq!(configured_filter("geovision=debug").to_string(), "geovision=debug");
        assert_eq!(configured_filter("warn").to_string(), "warn");
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logger("debug", LogFormat::Json);
        init_logger("info", LogFormat::Pretty);
        tracing::info!(attempt = 2, "still logging");
    }
}
