//! # Survey Scanner
//!
//! The top-level entry point: validates the URL, detects the platform,
//! fetches the page and runs the platform strategy, all within one deadline.

use crate::detect::detect;
use crate::errors::ExtractError;
use crate::fetch::HtmlFetcher;
use crate::platforms::ExtractorRegistry;
use crate::privacy;
use crate::types::{ExtractionRequest, PlatformKind, SurveyInfo};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Settings for a [`SurveyScanner`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScannerConfig {
    /// Upper bound on fetch plus extraction.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
    /// Run the personal-data scan on platforms that support it.
    #[serde(default = "default_personal_data_scan")]
    pub personal_data_scan: bool,
}

fn default_deadline_ms() -> u64 {
    12_000
}

fn default_personal_data_scan() -> bool {
    true
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            deadline_ms: default_deadline_ms(),
            personal_data_scan: default_personal_data_scan(),
        }
    }
}

impl ScannerConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

/// Fetches and extracts survey metadata.
pub struct SurveyScanner {
    fetcher: Arc<dyn HtmlFetcher>,
    registry: ExtractorRegistry,
    config: ScannerConfig,
}

/// Builder for [`SurveyScanner`]. A fetcher is required.
#[derive(Default)]
pub struct SurveyScannerBuilder {
    fetcher: Option<Arc<dyn HtmlFetcher>>,
    registry: Option<ExtractorRegistry>,
    config: ScannerConfig,
}

impl SurveyScannerBuilder {
    pub fn fetcher(mut self, fetcher: Arc<dyn HtmlFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline_ms = deadline.as_millis() as u64;
        self
    }

    pub fn personal_data_scan(mut self, enabled: bool) -> Self {
        self.config.personal_data_scan = enabled;
        self
    }

    pub fn build(self) -> Result<SurveyScanner, ExtractError> {
        let fetcher = self.fetcher.ok_or(ExtractError::MissingFetcher)?;
        Ok(SurveyScanner {
            fetcher,
            registry: self.registry.unwrap_or_default(),
            config: self.config,
        })
    }
}

/// Checks that `url` is an absolute http(s) URL and returns it trimmed.
pub fn validate_url(url: &str) -> Result<String, ExtractError> {
    let trimmed = url.trim();
    let invalid = |reason: &str| ExtractError::InvalidUrl {
        url: trimmed.to_string(),
        reason: reason.to_string(),
    };
    if trimmed.is_empty() {
        return Err(invalid("the URL is empty"));
    }
    let parsed = url::Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("only http and https URLs are supported"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("the URL has no host"));
    }
    Ok(trimmed.to_string())
}

impl SurveyScanner {
    pub fn builder() -> SurveyScannerBuilder {
        SurveyScannerBuilder::default()
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn detect(&self, url: &str) -> PlatformKind {
        detect(url)
    }

    /// Extracts metadata for `request.url`.
    ///
    /// Fails with [`ExtractError::ExtractionTimeout`] when fetching and
    /// extracting together exceed the configured deadline.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<SurveyInfo, ExtractError> {
        let url = validate_url(&request.url)?;
        let extractor = self.registry.for_url(&url);
        let platform = extractor.platform();
        info!(?platform, "Starting survey extraction");

        let deadline = self.config.deadline();
        let run = async {
            let html = self.fetcher.fetch(&url).await?;
            let mut survey = extractor.extract(&html, &url)?;
            if self.config.personal_data_scan && extractor.scans_personal_data() {
                let report = privacy::scan(&html);
                survey.has_personal_data_questions = Some(report.has_personal_data);
                survey.detected_keywords = report.keywords;
            }
            Ok::<SurveyInfo, ExtractError>(survey)
        };

        match tokio::time::timeout(deadline, run).await {
            Ok(Ok(survey)) => {
                info!(?platform, questions = %survey.question_count, "Survey extraction finished");
                Ok(survey)
            }
            Ok(Err(e)) => {
                warn!(?platform, error = %e, "Survey extraction failed");
                Err(e)
            }
            Err(_) => {
                warn!(?platform, ?deadline, "Survey extraction timed out");
                Err(ExtractError::ExtractionTimeout(deadline))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url("  https://forms.gle/abc ").unwrap(),
            "https://forms.gle/abc"
        );
        for bad in ["", "   ", "not a url", "ftp://example.com/form", "mailto:a@b.c"] {
            assert!(
                matches!(validate_url(bad), Err(ExtractError::InvalidUrl { .. })),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_builder_requires_fetcher() {
        assert!(matches!(
            SurveyScanner::builder().build(),
            Err(ExtractError::MissingFetcher)
        ));
    }

    #[test]
    fn test_scanner_config_defaults() {
        let config: ScannerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ScannerConfig::default());
        assert_eq!(config.deadline(), Duration::from_secs(12));
        assert!(config.personal_data_scan);
    }
}
