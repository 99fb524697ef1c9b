use crate::errors::ExtractError;
use async_trait::async_trait;

/// Retrieves the raw HTML of a survey page.
///
/// Implementations own their retry policy. The scanner calls `fetch` exactly
/// once per extraction and bounds it with its own deadline.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError>;
}
