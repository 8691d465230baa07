//! Formatting for sizes, durations and the build summary.

use std::path::Path;
use std::time::Duration;

use console::Term;
use goban_bundler::BuildReport;
use owo_colors::OwoColorize;

/// Format a byte count with the largest fitting unit.
///
/// ```
/// use goban_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(2_621_440), "2.50 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

/// Format a duration as `ms`, seconds or `Xm Ys`.
///
/// ```
/// use std::time::Duration;
/// use goban_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One row per emitted bundle (source maps excluded): the path relative to
/// `root` and its size.
pub fn summary_rows(report: &BuildReport, root: &Path) -> Vec<(String, u64)> {
    report
        .targets
        .iter()
        .flat_map(|target| {
            let dir = target
                .out_dir
                .strip_prefix(root)
                .unwrap_or(&target.out_dir)
                .to_path_buf();
            target
                .artifacts
                .iter()
                .filter(|a| !a.is_source_map())
                .map(move |a| (dir.join(&a.file_name).display().to_string(), a.size()))
        })
        .collect()
}

/// Print the per-target table of emitted bundles to stderr.
/// Combined size of the listed artifacts.
pub fn summary_total(rows: &[(String, u64)]) -> u64 {
    rows.iter().map(|(_, size)| size).sum()
}

pub fn print_build_summary(report: &BuildReport, root: &Path) {
    let width = (Term::stderr().size().1 as usize).clamp(20, 80);

    eprintln!("\n{} ({})", "Build Summary".bold().underline(), report.mode);
    eprintln!("{}", "─".repeat(width));

    for target in &report.targets {
        eprintln!(
            "  {} {}",
            target.platform.to_string().bold(),
            format!("({})", format_duration(target.duration)).dimmed()
        );
    }
    let rows = summary_rows(report, root);
    for (path, size) in &rows {
        eprintln!("  {} {} {}", "▸".blue(), path.bright_white(), format_size(*size).dimmed());
    }

    eprintln!("{}", "─".repeat(width));
    let total = summary_total(&rows);
    eprintln!(
        "  {} {} in {}",
        "Total:".bold(),
        format_size(total).green(),
        format_duration(report.duration).green()
    );
}
