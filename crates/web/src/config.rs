//! Proxy gateway configuration.

use formscout::{PlatformKind, MIN_PLAUSIBLE_BODY_LEN};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// How a proxy wraps the page it fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyResponseFormat {
    /// The body is the page itself.
    #[default]
    Raw,
    /// The body is `{"contents": "<page>"}`, as served by AllOrigins `/get`.
    AllOriginsJson,
}

/// One CORS proxy.
///
/// `template` may contain `{url}` (replaced by the percent-encoded target) or
/// `{raw_url}` (replaced verbatim). Without either placeholder the encoded
/// target is appended.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProxyEndpoint {
    pub template: String,
    #[serde(default)]
    pub format: ProxyResponseFormat,
}

impl ProxyEndpoint {
    /// An endpoint whose response format is inferred from the template.
    pub fn from_template(template: impl Into<String>) -> Self {
        let template = template.into();
        let format = if template.contains("allorigins.win/get") {
            ProxyResponseFormat::AllOriginsJson
        } else {
            ProxyResponseFormat::Raw
        };
        Self { template, format }
    }

    /// The proxy URL that fetches `target`.
    pub fn resolve(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        if self.template.contains("{url}") {
            self.template.replace("{url}", &encoded)
        } else if self.template.contains("{raw_url}") {
            self.template.replace("{raw_url}", target)
        } else {
            format!("{}{}", self.template, encoded)
        }
    }
}

/// The public proxies tried, in order, when none are configured.
pub fn default_proxies() -> Vec<ProxyEndpoint> {
    vec![
        ProxyEndpoint::from_template("https://api.allorigins.win/raw?url={url}"),
        ProxyEndpoint::from_template("https://api.allorigins.win/get?url={url}"),
        ProxyEndpoint::from_template("https://corsproxy.io/?{url}"),
        ProxyEndpoint::from_template("https://cors-anywhere.herokuapp.com/{raw_url}"),
    ]
}

fn default_attempt_timeout_ms() -> u64 {
    5_000
}

fn default_min_body_len() -> usize {
    MIN_PLAUSIBLE_BODY_LEN
}

/// Some public proxies refuse requests that do not look like a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Settings for [`crate::ProxyGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_proxies")]
    pub proxies: Vec<ProxyEndpoint>,
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Bodies with fewer characters than this are rejected as proxy error pages.
    #[serde(default = "default_min_body_len")]
    pub min_body_len: usize,
    /// Per-platform replacements for `min_body_len`.
    #[serde(default)]
    pub min_body_len_overrides: HashMap<PlatformKind, usize>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            proxies: default_proxies(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            min_body_len: default_min_body_len(),
            min_body_len_overrides: HashMap::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl GatewayConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    /// The minimum plausible body length for pages of `platform`.
    pub fn min_body_len_for(&self, platform: PlatformKind) -> usize {
        self.min_body_len_overrides
            .get(&platform)
            .copied()
            .unwrap_or(self.min_body_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_placeholders() {
        let target = "https://docs.google.com/forms/d/e/X/viewform?usp=sf_link";

        let encoded = ProxyEndpoint::from_template("https://proxy.test/raw?url={url}");
        assert_eq!(
            encoded.resolve(target),
            "https://proxy.test/raw?url=https%3A%2F%2Fdocs.google.com%2Fforms%2Fd%2Fe%2FX%2Fviewform%3Fusp%3Dsf_link"
        );

        let raw = ProxyEndpoint::from_template("https://proxy.test/{raw_url}");
        assert_eq!(raw.resolve(target), format!("https://proxy.test/{target}"));

        let appended = ProxyEndpoint::from_template("https://corsproxy.test/?");
        assert!(appended.resolve(target).starts_with("https://corsproxy.test/?https%3A%2F%2F"));
    }

    #[test]
    fn test_format_inferred_from_template() {
        let proxies = default_proxies();
        assert_eq!(proxies.len(), 4);
        assert_eq!(proxies[0].format, ProxyResponseFormat::Raw);
        assert_eq!(proxies[1].format, ProxyResponseFormat::AllOriginsJson);
    }

    #[test]
    fn test_min_body_len_override() {
        let mut config = GatewayConfig::default();
        config.min_body_len_overrides.insert(PlatformKind::Typeform, 300);
        assert_eq!(config.min_body_len_for(PlatformKind::Typeform), 300);
        assert_eq!(config.min_body_len_for(PlatformKind::GoogleForms), 1000);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: GatewayConfig = serde_json::from_str(
            r#"{"proxies":[{"template":"https://p.test/?{url}"}],"min_body_len_overrides":{"GoogleForms":500}}"#,
        )
        .unwrap();
        assert_eq!(config.proxies.len(), 1);
        assert_eq!(config.proxies[0].format, ProxyResponseFormat::Raw);
        assert_eq!(config.attempt_timeout_ms, 5_000);
        assert_eq!(config.min_body_len_for(PlatformKind::GoogleForms), 500);
    }
}
