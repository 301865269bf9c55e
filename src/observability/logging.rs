//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Helpers that keep log lines short and readable
//!
//! # Design Decisions
//! - `RUST_LOG` wins; the configured level is the fallback
//! - Response bodies are never logged whole

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(default_level: &str) {
    let fallback = format!("cfd_runner={},warn", default_level);
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// First `max_chars` characters of `body` with whitespace runs collapsed.
pub fn preview(body: &str, max_chars: usize) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

/// Format milliseconds as `"1H 02M 03S"`.
pub fn format_hms(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{}H {:02}M {:02}S", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_collapses_whitespace() {
        let body = "<html>\n  <head>\t<title>Just a moment</title>";
        assert_eq!(preview(body, 20), "<html> <head> <title");
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("ééééé", 3), "ééé");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "0H 00M 00S");
        assert_eq!(format_hms(3_723_000), "1H 02M 03S");
        assert_eq!(format_hms(59_999), "0H 00M 59S");
    }
}
