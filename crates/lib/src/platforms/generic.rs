//! Fallback for URLs no platform strategy recognises.

use super::{meta_description, SurveyExtractor};
use crate::errors::ExtractError;
use crate::pipeline::CountPipeline;
use crate::types::{PlatformKind, SurveyInfo};

/// Reads only the page title and description meta tags.
pub struct GenericExtractor;

impl SurveyExtractor for GenericExtractor {
    fn platform(&self) -> PlatformKind {
        PlatformKind::Unknown
    }

    fn describe(&self) -> &'static str {
        "Reads the page title and description meta tags only"
    }

    fn extract(&self, html: &str, _url: &str) -> Result<SurveyInfo, ExtractError> {
        let mut info = SurveyInfo::new(PlatformKind::Unknown);
        info.set_title(
            formscout_html::page_title(html)
                .or_else(|| formscout_html::meta_content(html, "og:title")),
        );
        info.set_description(meta_description(html));
        CountPipeline::new(PlatformKind::Unknown).run().apply(&mut info);
        info.push_note("This platform is not supported; only the title and description were read.");
        Ok(info)
    }
}
