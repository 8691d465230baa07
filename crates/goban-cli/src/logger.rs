//! Logging setup.
//!
//! Library crates only emit `tracing` events; the binary decides what is
//! shown. The filter comes from the command-line flags or the settings file,
//! never from the process environment. Log lines go to stderr so that
//! `inspect` output on stdout stays machine readable.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: &[&str] = &["goban_cli", "goban_bundler", "goban_config"];

/// Build the filter directive for the given flags.
///
/// Precedence: `--verbose`, then `--quiet`, then the settings file's
/// `log_level`, then `info`.
pub fn filter_directive(verbose: bool, quiet: bool, level: Option<&str>) -> String {
    let level = if verbose {
        "debug".to_string()
    } else if quiet {
        "error".to_string()
    } else {
        level.unwrap_or("info").to_ascii_lowercase()
    };

    CRATES
        .iter()
        .map(|krate| format!("{}={}", krate, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool, level: Option<&str>) {
    let filter = EnvFilter::new(filter_directive(verbose, quiet, level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_info() {
        assert_eq!(
            filter_directive(false, false, None),
            "goban_cli=info,goban_bundler=info,goban_config=info"
        );
    }

    #[test]
    fn test_flags_beat_settings() {
        assert!(filter_directive(true, false, Some("warn")).contains("goban_bundler=debug"));
        assert!(filter_directive(false, true, Some("trace")).contains("goban_config=error"));
    }

    #[test]
    fn test_settings_level_is_used() {
        let directive = filter_directive(false, false, Some("WARN"));
        assert!(directive.contains("goban_cli=warn"));
        // Must parse as a filter.
        let _ = EnvFilter::new(directive);
    }
}
