//! Consistency checks run on loaded settings before any build work starts.

use crate::error::{Result, SettingsError};
use crate::project::ProjectSettings;

/// Validate settings for logical consistency.
///
/// Catches mistakes that serde cannot: references to undeclared variants,
/// proxy prefixes that can never match a request path, and an unusable port.
pub fn validate_project_settings(settings: &ProjectSettings) -> Result<()> {
    if settings.feature_matrix.is_empty() {
        return Err(SettingsError::invalid(
            "featureMatrix",
            "declare at least one feature",
        ));
    }

    for name in &settings.build.exclude_features {
        if !settings.feature_matrix.contains_key(name) {
            return Err(SettingsError::UnknownFeature {
                field: "build.excludeFeatures".to_string(),
                name: name.clone(),
            });
        }
    }

    let dev_server = &settings.dev_server;
    if dev_server.port == 0 {
        return Err(SettingsError::invalid(
            "devServer.port",
            "port must be between 1 and 65535",
        ));
    }

    let prefixes = dev_server
        .api_prefixes
        .iter()
        .map(|prefix| ("devServer.apiPrefixes", prefix))
        .chain(
            dev_server
                .proxy_rewrite
                .keys()
                .map(|prefix| ("devServer.proxyRewrite", prefix)),
        );
    for (field, prefix) in prefixes {
        if !prefix.starts_with('/') {
            return Err(SettingsError::invalid(
                field,
                format!("proxy prefix '{prefix}' must start with '/'"),
            ));
        }
    }

    if !dev_server.api_prefixes.is_empty() && dev_server.default_proxy_domain.is_empty() {
        return Err(SettingsError::invalid(
            "devServer.defaultProxyDomain",
            "apiPrefixes need a domain to forward to",
        ));
    }

    Ok(())
}
