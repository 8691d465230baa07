//! Conversion of CLI errors into miette reports.

use goban_config::SETTINGS_FILE;
use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a report for `main` to print.
///
/// Bundler errors keep their own diagnostic (code, help and per-target
/// related errors); everything else becomes a plain message.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => Report::new(e),
        CliError::Config(e) => miette::miette!(
            help = format!("Check {} in the project root", SETTINGS_FILE),
            "Configuration error: {}",
            e
        ),
        other => miette::miette!("{}", other),
    }
}
