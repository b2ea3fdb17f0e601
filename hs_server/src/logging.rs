//! Structured logging configuration.
//!
//! The match library logs through the `log` facade; the subscriber installed
//! here also captures those records, so both end up in the same output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info";

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var, e.g.
/// `RUST_LOG=hide_seek=debug`.
///
/// # Example
///
/// ```ignore
/// logging::init();
/// tracing::info!("Server starting");
/// ```
pub fn init() {
    let env_filter = filter_from(std::env::var("RUST_LOG").ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Build a filter from a directive string, falling back to the default
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Log the outcome of a finished match with structured fields
pub fn log_match_result(round: usize, winner: &str, captures: usize, seeking_secs: u64) {
    tracing::info!(
        round = round,
        winner = winner,
        captures = captures,
        seeking_secs = seeking_secs,
        "Match finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_falls_back_to_default() {
        assert_eq!(filter_from(None).to_string(), DEFAULT_FILTER);
        assert_eq!(filter_from(Some("hide_seek=debug")).to_string(), "hide_seek=debug");
    }

    #[test]
    fn test_log_match_result() {
        // Just ensure it doesn't panic
        log_match_result(1, "hiders", 0, 300);
    }
}
