//! Reverse-proxy rules for the dev server.
//!
//! Turns declarative proxy settings (plain API prefixes plus an explicit
//! rewrite map) into one [`ProxyRule`] per entry. Every rule built by one
//! [`construct_proxy_rules`] call shares a single [`ConnectionAgent`], so
//! environment-level proxy settings (`HTTP_PROXY`, `HTTPS_PROXY`,
//! `NO_PROXY`) apply uniformly to forwarded requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use nut_settings::DevServerSettings;
use reqwest::Url;
use tracing::debug;

use crate::error::{BuildError, Result};

/// Proxy configuration in the shape the rule builder consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyOptions {
    /// Scheme for targets that do not carry one.
    pub https: bool,
    /// Prefixes forwarded to the same path on `target_domain`.
    pub prefixes: Vec<String>,
    /// Prefix to target string, e.g. `/api` to `example.com:8080/gateway`.
    pub rewrite: BTreeMap<String, String>,
    pub target_domain: String,
}

impl From<&DevServerSettings> for ProxyOptions {
    fn from(settings: &DevServerSettings) -> Self {
        Self {
            https: settings.proxy_https,
            prefixes: settings.api_prefixes.clone(),
            rewrite: settings.proxy_rewrite.clone(),
            target_domain: settings.default_proxy_domain.clone(),
        }
    }
}

/// Outbound HTTP client shared by the rules of one build call.
#[derive(Debug, Clone)]
pub struct ConnectionAgent {
    client: reqwest::Client,
}

impl ConnectionAgent {
    /// Client configured from the process environment, including system proxies.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| BuildError::ProxyAgent(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// One forwarding rule.
#[derive(Debug, Clone)]
pub struct ProxyRule {
    prefix: String,
    target: String,
    target_path: String,
    change_origin: bool,
    agent: Arc<ConnectionAgent>,
}

impl ProxyRule {
    /// Paths this rule applies to.
    pub fn context(&self) -> &[String] {
        std::slice::from_ref(&self.prefix)
    }

    /// Origin requests are forwarded to: `scheme://host[:port]`, no path.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Rewrite the `Host` header to the target's.
    pub fn change_origin(&self) -> bool {
        self.change_origin
    }

    pub fn agent(&self) -> &Arc<ConnectionAgent> {
        &self.agent
    }

    /// Literal prefix match.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Replace a leading occurrence of the prefix with the target path.
    ///
    /// Paths that do not start with the prefix come back unchanged.
    pub fn path_rewrite(&self, path: &str) -> String {
        match path.strip_prefix(&self.prefix) {
            Some(rest) => format!("{}{rest}", self.target_path),
            None => path.to_string(),
        }
    }
}

/// Build the proxy rules for a dev server.
///
/// Rewrite entries come first, then plain prefixes. Entries are never merged
/// or deduplicated, so a prefix listed in both places yields two rules. A
/// target that fails to parse fails the whole call.
pub fn construct_proxy_rules(options: &ProxyOptions) -> Result<Vec<ProxyRule>> {
    let pairs = options
        .rewrite
        .iter()
        .map(|(prefix, target)| (prefix.clone(), target.clone()))
        .chain(
            options
                .prefixes
                .iter()
                .map(|prefix| (prefix.clone(), format!("{}{prefix}", options.target_domain))),
        );

    let agent = Arc::new(ConnectionAgent::new()?);
    let mut rules = Vec::with_capacity(options.rewrite.len() + options.prefixes.len());

    for (prefix, target) in pairs {
        let (origin, target_path) = resolve_target(&prefix, &target, options.https)?;
        debug!(%prefix, %origin, %target_path, "proxy rule");

        rules.push(ProxyRule {
            prefix,
            target: origin,
            target_path,
            change_origin: true,
            agent: Arc::clone(&agent),
        });
    }

    Ok(rules)
}

/// Split a target string into its origin and path prefix.
fn resolve_target(prefix: &str, target: &str, https: bool) -> Result<(String, String)> {
    let invalid = |reason: String| BuildError::InvalidProxyTarget {
        prefix: prefix.to_string(),
        target: target.to_string(),
        reason,
    };

    // Schemes are case-insensitive, so `HTTP://` is taken as given
    let lowered = target.to_ascii_lowercase();
    let has_scheme = lowered.starts_with("http://") || lowered.starts_with("https://");
    let absolute = if has_scheme {
        target.to_string()
    } else {
        let scheme = if https { "https" } else { "http" };
        format!("{scheme}://{target}")
    };

    let url = Url::parse(&absolute).map_err(|e| invalid(e.to_string()))?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| invalid("missing host".to_string()))?;

    let origin = match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    };

    let authority_and_path = absolute
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    let target_path = if authority_and_path.contains('/') {
        url.path().to_string()
    } else {
        prefix.to_string()
    };

    Ok((origin, target_path))
}
