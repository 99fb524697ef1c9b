//! # formscout-web: Proxy Gateway
//!
//! Fetches survey pages through an ordered list of CORS proxies. Each proxy
//! gets one attempt with its own timeout; the first plausible body wins.

pub mod config;

pub use config::{
    default_proxies, GatewayConfig, ProxyEndpoint, ProxyResponseFormat, DEFAULT_USER_AGENT,
};

use async_trait::async_trait;
use formscout::{detect, ExtractError, HtmlFetcher};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

// --- Error Definitions ---

/// Why a single proxy attempt was rejected. Never surfaced to callers; the
/// gateway logs it and moves on to the next proxy.
#[derive(Error, Debug)]
pub enum ProxyAttemptError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Proxy answered with status {0}")]
    Status(u16),
    #[error("Proxy did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Proxy envelope could not be decoded: {0}")]
    Decode(String),
    #[error("Body of {len} characters is shorter than the {min} character minimum")]
    TooShort { len: usize, min: usize },
}

// --- Gateway ---

#[derive(Deserialize)]
struct AllOriginsEnvelope {
    #[serde(default)]
    contents: Option<String>,
}

/// Fetches pages through the configured proxies, in order.
#[derive(Debug, Clone)]
pub struct ProxyGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl ProxyGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ExtractError::ClientBuild(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Tries each proxy once, in order, returning the first body that is at
    /// least the minimum plausible length for the target's platform.
    pub async fn fetch_via_proxy(&self, url: &str) -> Result<String, ExtractError> {
        let min_len = self.config.min_body_len_for(detect(url));
        let timeout = self.config.attempt_timeout();

        for (index, endpoint) in self.config.proxies.iter().enumerate() {
            let outcome = tokio::time::timeout(timeout, self.attempt(endpoint, url, min_len))
                .await
                .unwrap_or_else(|_| Err(ProxyAttemptError::Timeout(timeout)));

            match outcome {
                Ok(body) => {
                    info!(proxy = index, bytes = body.len(), "Fetched survey page via proxy");
                    return Ok(body);
                }
                Err(ProxyAttemptError::TooShort { len, min }) => {
                    warn!(proxy = index, len, min, "Proxy returned an implausibly short body");
                }
                Err(e) => {
                    warn!(proxy = index, error = %e, "Proxy attempt failed");
                }
            }
        }

        Err(ExtractError::AllProxiesExhausted {
            attempts: self.config.proxies.len(),
        })
    }

    async fn attempt(
        &self,
        endpoint: &ProxyEndpoint,
        target: &str,
        min_len: usize,
    ) -> Result<String, ProxyAttemptError> {
        let proxied = endpoint.resolve(target);
        debug!(url = %proxied, "Trying proxy");

        let response = self
            .client
            .get(&proxied)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml,application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProxyAttemptError::Status(response.status().as_u16()));
        }

        let body = match endpoint.format {
            ProxyResponseFormat::Raw => response.text().await?,
            ProxyResponseFormat::AllOriginsJson => response
                .json::<AllOriginsEnvelope>()
                .await
                .map_err(|e| ProxyAttemptError::Decode(e.to_string()))?
                .contents
                .unwrap_or_default(),
        };

        let len = body.chars().count();
        if len < min_len {
            return Err(ProxyAttemptError::TooShort { len, min: min_len });
        }
        Ok(body)
    }
}

#[async_trait]
impl HtmlFetcher for ProxyGateway {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        self.fetch_via_proxy(url).await
    }
}
