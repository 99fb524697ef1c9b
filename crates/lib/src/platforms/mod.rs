//! # Platform Strategies
//!
//! One [`SurveyExtractor`] per supported platform plus a generic fallback,
//! looked up through an [`ExtractorRegistry`].

pub mod generic;
pub mod google;
pub mod jotform;
pub mod microsoft;
pub mod opinionx;
pub mod surveymonkey;
pub mod typeform;

use crate::detect::detect;
use crate::errors::ExtractError;
use crate::types::{PlatformKind, SurveyInfo};
use std::collections::HashMap;

pub use generic::GenericExtractor;
pub use google::GoogleFormsExtractor;
pub use jotform::JotFormExtractor;
pub use microsoft::MicrosoftFormsExtractor;
pub use opinionx::OpinionXExtractor;
pub use surveymonkey::SurveyMonkeyExtractor;
pub use typeform::TypeformExtractor;

/// Turns the raw HTML of one platform's survey page into a [`SurveyInfo`].
///
/// Extraction is synchronous and pure; fetching happens before it.
pub trait SurveyExtractor: Send + Sync {
    fn platform(&self) -> PlatformKind;

    fn can_handle(&self, url: &str) -> bool {
        detect(url) == self.platform()
    }

    fn extract(&self, html: &str, url: &str) -> Result<SurveyInfo, ExtractError>;

    /// One-line description of what the strategy reads.
    fn describe(&self) -> &'static str;

    /// Whether the personal-data scan should run on this platform's pages.
    fn scans_personal_data(&self) -> bool {
        false
    }
}

/// Maps platforms to their extractors, falling back to [`GenericExtractor`].
pub struct ExtractorRegistry {
    extractors: HashMap<PlatformKind, Box<dyn SurveyExtractor>>,
    fallback: GenericExtractor,
}

impl ExtractorRegistry {
    /// A registry with no platform strategies; everything uses the fallback.
    pub fn empty() -> Self {
        Self {
            extractors: HashMap::new(),
            fallback: GenericExtractor,
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(GoogleFormsExtractor));
        registry.register(Box::new(SurveyMonkeyExtractor));
        registry.register(Box::new(TypeformExtractor));
        registry.register(Box::new(MicrosoftFormsExtractor));
        registry.register(Box::new(JotFormExtractor));
        registry.register(Box::new(OpinionXExtractor));
        registry
    }

    /// Registers `extractor`, replacing any previous one for its platform.
    pub fn register(&mut self, extractor: Box<dyn SurveyExtractor>) {
        self.extractors.insert(extractor.platform(), extractor);
    }

    pub fn get(&self, platform: PlatformKind) -> &dyn SurveyExtractor {
        match self.extractors.get(&platform) {
            Some(extractor) => extractor.as_ref(),
            None => &self.fallback,
        }
    }

    pub fn for_url(&self, url: &str) -> &dyn SurveyExtractor {
        self.get(detect(url))
    }

    pub fn platforms(&self) -> Vec<PlatformKind> {
        PlatformKind::ALL
            .into_iter()
            .filter(|p| self.extractors.contains_key(p))
            .collect()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The page `<title>` with any of the platform's branding suffixes removed.
pub(crate) fn title_without_suffix(html: &str, suffixes: &[&str]) -> Option<String> {
    let title = formscout_html::page_title(html)?;
    let stripped = suffixes
        .iter()
        .find_map(|s| title.strip_suffix(s))
        .unwrap_or(&title)
        .trim()
        .to_string();
    (!stripped.is_empty()).then_some(stripped)
}

/// The first usable description meta tag.
pub(crate) fn meta_description(html: &str) -> Option<String> {
    formscout_html::first_meta(html, &["og:description", "description", "twitter:description"])
}
