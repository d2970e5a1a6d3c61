//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use miette::Report;
use nut_build::BuildError;
use nut_settings::SettingsError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    let code = format!("nut::exit::{}", err.exit_code());
    match help_for(&err) {
        Some(help) => miette::miette!(code = code, help = help, "{}", err),
        None => miette::miette!(code = code, "{}", err),
    }
}

fn help_for(err: &CliError) -> Option<&'static str> {
    match err {
        CliError::Build(BuildError::AnalyzeRequiresSingleTarget) => {
            Some("pass --build-target <FEATURE> together with --analyze")
        }
        CliError::Settings(SettingsError::MissingDependencies(_))
        | CliError::Build(BuildError::Settings(SettingsError::MissingDependencies(_))) => {
            Some("add the packages to package.json and install them")
        }
        CliError::Settings(SettingsError::NotFound(_)) => {
            Some("create nut.toml or pass --config <FILE>")
        }
        CliError::Unexpected(_) => Some("run again with --verbose and report the output"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_carries_message_and_help() {
        let report = cli_error_to_miette(BuildError::AnalyzeRequiresSingleTarget.into());
        assert!(report.to_string().contains("--analyze"));
        assert!(report.help().is_some());
    }

    #[test]
    fn test_report_without_help() {
        let report = cli_error_to_miette(CliError::Server("bind failed".to_string()));
        assert_eq!(report.to_string(), "Server error: bind failed");
        assert!(report.help().is_none());
    }
}
