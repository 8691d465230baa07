//! Terminal output: status lines, a spinner and the build summary.
//!
//! Everything here writes to stderr.

mod format;
mod messages;
mod spinner;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_build_summary, summary_rows};
pub use messages::{error, info, success, warning};
pub use spinner::Spinner;

static COLOR: AtomicBool = AtomicBool::new(true);

/// Decide once whether output is colored. `--no-color` always wins;
/// otherwise colors follow what the terminal on stderr supports.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && console::colors_enabled_stderr();
    COLOR.store(enabled, Ordering::Relaxed);
    console::set_colors_enabled_stderr(enabled);
}

pub(crate) fn color_enabled() -> bool {
    COLOR.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_no_color_disables_colors() {
        init_colors(true);
        assert!(!color_enabled());
        COLOR.store(true, Ordering::Relaxed);
    }
}
