use async_trait::async_trait;
use formscout::errors::ExtractError;
use formscout::fetch::HtmlFetcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub mod fixtures;

// --- Mock Fetcher ---

/// An [`HtmlFetcher`] serving canned pages keyed by URL.
///
/// URLs without a programmed page fail with `AllProxiesExhausted`, as the
/// real gateway would after every proxy returned an error page.
#[derive(Clone, Debug, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-programs the HTML returned for `url`.
    pub fn add_page(&self, url: &str, html: &str) {
        let mut pages = self.pages.lock().unwrap();
        pages.insert(url.to_string(), html.to_string());
    }

    /// Makes every fetch sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Retrieves the recorded fetch URLs for assertion.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HtmlFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ExtractError> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let pages = self.pages.lock().unwrap();
        pages
            .get(url)
            .cloned()
            .ok_or(ExtractError::AllProxiesExhausted { attempts: 1 })
    }
}
