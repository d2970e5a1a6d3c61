//! One-line status output on stderr, prefixed with a colored marker.

use owo_colors::{OwoColorize, Style};

fn line(marker: &str, marker_style: Style, message: &str, message_style: Style) {
    eprintln!(
        "{} {}",
        marker.style(marker_style),
        message.style(message_style)
    );
}

/// A step finished, e.g. "Built 3 variants".
pub fn success(message: &str) {
    line("✓", Style::new().green().bold(), message, Style::new());
}

pub fn info(message: &str) {
    line("ℹ", Style::new().blue().bold(), message, Style::new());
}

/// Something the user should notice but that does not stop the command,
/// such as a dev server restart or an empty variant selection.
pub fn warning(message: &str) {
    line("⚠", Style::new().yellow().bold(), message, Style::new().yellow());
}

/// A failure the command reports and then carries on from.
///
/// Fatal errors go through the miette report in `main` instead.
pub fn error(message: &str) {
    line("✗", Style::new().red().bold(), message, Style::new().red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_prints_without_a_terminal() {
        success("Built 2 variants");
        info("Working directory: /tmp/project");
        warning("No variants selected");
        error("Dev server failed to start");
    }
}
