//! Development server settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path prefixes forwarded as-is to `default_proxy_domain`.
    #[serde(default)]
    pub api_prefixes: Vec<String>,

    /// Path prefixes forwarded to an explicit target, e.g. `{"/api" = "example.com/gateway"}`.
    #[serde(default)]
    pub proxy_rewrite: BTreeMap<String, String>,

    #[serde(default)]
    pub default_proxy_domain: String,

    /// Use `https` for proxy targets that carry no scheme.
    #[serde(default)]
    pub proxy_https: bool,

    #[serde(default = "default_cors")]
    pub cors: bool,

    /// Extra headers added to every dev server response.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Variant served by `nut dev` when none is given on the command line.
    #[serde(default = "default_feature")]
    pub default_feature: String,
}

impl Default for DevServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefixes: Vec::new(),
            proxy_rewrite: BTreeMap::new(),
            default_proxy_domain: String::new(),
            proxy_https: false,
            cors: default_cors(),
            headers: BTreeMap::new(),
            default_feature: default_feature(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8788
}

fn default_cors() -> bool {
    true
}

fn default_feature() -> String {
    "dev".into()
}
