//! Terminal UI utilities for spinners and formatted output.
//!
//! Handles environment detection (CI, TTY) and degrades to plain output
//! when terminal features aren't available.
//!
//! # Examples
//!
//! ```no_run
//! use nut_cli::ui;
//!
//! ui::init_colors(false);
//!
//! let spinner = ui::Spinner::new("Loading settings...");
//! spinner.finish("Settings loaded");
//!
//! ui::success("Build successful");
//! ui::error("Unknown feature `beta`");
//! ```

mod format;
mod messages;
mod spinner;

pub use format::{format_duration, print_build_summary, print_feature_matrix};
pub use messages::{error, info, success, warning};
pub use spinner::Spinner;

/// Check if running in a CI environment.
///
/// Detects common CI environment variables from GitHub Actions, GitLab CI,
/// CircleCI, and Travis CI.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Initialize color support based on environment.
///
/// Should be called early in `main`, after the global flags are parsed.
/// `no_color` wins over everything else.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}
