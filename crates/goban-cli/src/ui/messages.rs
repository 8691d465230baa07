//! One-line status messages.

use owo_colors::OwoColorize;

use super::color_enabled;

fn line(glyph: &str, message: &str, paint: fn(&str) -> String) {
    if color_enabled() {
        eprintln!("{}", paint(&format!("{} {}", glyph, message)));
    } else {
        eprintln!("{} {}", glyph, message);
    }
}

pub fn success(message: &str) {
    line("✓", message, |s| s.green().to_string());
}

pub fn info(message: &str) {
    line("ℹ", message, |s| s.blue().to_string());
}

pub fn warning(message: &str) {
    line("⚠", message, |s| s.yellow().to_string());
}

pub fn error(message: &str) {
    line("✗", message, |s| s.red().bold().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        success("Build completed");
        info("Watching src/");
        warning("goban.js is over budget");
        error("tsc failed");
    }
}
