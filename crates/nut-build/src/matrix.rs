//! Feature matrix expansion.
//!
//! Decides which variants a `build` produces. The result only ever narrows
//! the declared matrix: exclusions first, then an optional single-variant
//! selection that must name one of the remaining variants.

use std::fmt::Write as _;

use nut_settings::FeatureMatrix;

use crate::error::{BuildError, Result};

/// Matrix variant names minus the excluded ones, in matrix order.
pub fn resolve_feature_names(matrix: &FeatureMatrix, excluded: &[String]) -> Vec<String> {
    matrix
        .keys()
        .filter(|name| !excluded.contains(name))
        .cloned()
        .collect()
}

/// Variants to build for one invocation.
///
/// With `only`, the result is exactly that variant, provided it survives the
/// exclusions; anything else is a configuration error and nothing is built.
pub fn select_variants(
    matrix: &FeatureMatrix,
    excluded: &[String],
    only: Option<&str>,
) -> Result<Vec<String>> {
    let available = resolve_feature_names(matrix, excluded);

    match only {
        None => Ok(available),
        Some(name) if available.iter().any(|n| n == name) => Ok(vec![name.to_string()]),
        Some(name) => Err(BuildError::UnknownFeature {
            name: name.to_string(),
            available,
        }),
    }
}

/// Operator-facing table of the matrix: one row per variant with its build
/// status and flags.
pub fn render_feature_matrix(
    matrix: &FeatureMatrix,
    excluded: &[String],
    only: Option<&str>,
) -> String {
    let name_width = matrix.keys().map(String::len).max().unwrap_or(0).max(7);
    let mut out = String::new();

    let _ = writeln!(out, "{:<name_width$}  {:<8}  flags", "feature", "status");
    for (name, flags) in matrix {
        let status = if excluded.contains(name) {
            "excluded"
        } else if only.is_some_and(|only| only != name) {
            "skipped"
        } else {
            "build"
        };

        let flags = if flags.is_empty() {
            "-".to_string()
        } else {
            flags
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let _ = writeln!(out, "{name:<name_width$}  {status:<8}  {flags}");
    }

    out
}
