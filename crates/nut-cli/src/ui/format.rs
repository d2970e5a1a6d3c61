//! Formatting utilities for durations, the feature matrix and build summaries.

use console::Term;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Duration;

/// Format duration in human-readable format.
///
/// Converts to the most appropriate unit (ms, s, m:s).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use nut_cli::ui::format_duration;
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
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

fn rule() -> String {
    let width = Term::stderr().size().1 as usize;
    "─".repeat(width.clamp(20, 80))
}

/// Print the rendered feature matrix table to stderr.
///
/// The first line of `table` is treated as the header.
pub fn print_feature_matrix(table: &str) {
    let mut lines = table.lines();

    eprintln!("\n{}", "Feature Matrix".bold().underline());
    if let Some(header) = lines.next() {
        eprintln!("  {}", header.dimmed());
    }
    for line in lines {
        if line.contains(" build ") {
            eprintln!("  {}", line.bright_white());
        } else {
            eprintln!("  {}", line.dimmed());
        }
    }
    eprintln!();
}

/// Print a summary of built variants to stderr.
///
/// # Arguments
///
/// * `variants` - (feature name, output directory) per built variant
/// * `duration` - Wall time of the whole build
pub fn print_build_summary(variants: &[(String, PathBuf)], duration: Duration) {
    eprintln!("\n{}", "Build Summary".bold().underline());
    eprintln!("{}", rule());

    for (name, out_dir) in variants {
        eprintln!(
            "  {} {} {}",
            "▸".blue(),
            name.bright_white().bold(),
            out_dir.display().dimmed()
        );
    }

    eprintln!("{}", rule());
    eprintln!(
        "  {} {} variant(s) in {}",
        "Total:".bold(),
        variants.len().green(),
        format_duration(duration).green()
    );
}
