//! OpinionX.
//!
//! OpinionX renders client-side; the server HTML rarely contains more than
//! the page shell, so results here are best effort.

use super::{meta_description, title_without_suffix, SurveyExtractor};
use crate::errors::ExtractError;
use crate::pipeline::{
    capture_first, collection_len, count_first_matching, detect_pagination, id_patterns,
    next_data, str_at, with_pagination, CountPipeline, MarkerPattern,
};
use crate::types::{PlatformKind, QuestionCount, SurveyInfo};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const TITLE_SUFFIXES: &[&str] = &[" | OpinionX", " - OpinionX"];

const ACCURACY_NOTE: &str =
    "OpinionX renders its surveys dynamically, so this extraction may not be fully accurate.";

static LOGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:sign[ -]in|log[ -]?in|authentication)\b").unwrap());

static SURVEY_ID_URL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[r"opinionx\.co/s/([A-Za-z0-9_-]+)", r"opnx\.to/([A-Za-z0-9_-]+)"])
});

static QUESTION_IDS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| id_patterns(&[r#"\bdata-question-id="([^"]+)""#]));

static QUESTION_MARKERS: LazyLock<Vec<MarkerPattern>> = LazyLock::new(|| {
    vec![
        MarkerPattern::class("question-container"),
        MarkerPattern::class("question-wrapper"),
        MarkerPattern::class("question-item"),
        MarkerPattern::new(r#"<h[1-6]\b[^>]*\bclass="[^"]*\bquestion-text\b[^"]*"[^>]*>"#),
        MarkerPattern::class("question-text"),
        MarkerPattern::attr("data-question-id", ""),
        MarkerPattern::attr("data-question-type", ""),
    ]
});

/// Reads OpinionX pages.
pub struct OpinionXExtractor;

fn survey_node(data: &Value) -> Option<&Value> {
    ["/props/pageProps/survey", "/props/pageProps/study"]
        .into_iter()
        .find_map(|p| data.pointer(p))
}

impl SurveyExtractor for OpinionXExtractor {
    fn platform(&self) -> PlatformKind {
        PlatformKind::OpinionX
    }

    fn describe(&self) -> &'static str {
        "Reads Next.js survey data when server-rendered, then question markup and pagination"
    }

    fn extract(&self, html: &str, url: &str) -> Result<SurveyInfo, ExtractError> {
        let data = next_data(html);
        let survey = data.as_ref().and_then(survey_node);
        let pagination = detect_pagination(html);
        let visible = count_first_matching(html, &QUESTION_MARKERS, &QUESTION_IDS);

        let outcome = CountPipeline::new(PlatformKind::OpinionX)
            .structured("next_data", || {
                survey
                    .and_then(|s| s.get("questions"))
                    .and_then(collection_len)
                    .map(QuestionCount::Exact)
            })
            .markup("question_markers", || visible.map(|n| with_pagination(n, pagination)))
            .run();

        let mut info = SurveyInfo::new(PlatformKind::OpinionX);
        outcome.apply(&mut info);

        if let Some(survey) = survey {
            info.set_title(str_at(survey, "/title").or_else(|| str_at(survey, "/name")));
            info.set_description(str_at(survey, "/description"));
        }
        if info.title == crate::NOT_AVAILABLE {
            info.set_title(
                title_without_suffix(html, TITLE_SUFFIXES)
                    .or_else(|| formscout_html::element_text(html, "h1")),
            );
        }
        if info.description == crate::NOT_AVAILABLE {
            info.set_description(meta_description(html));
        }
        info.form_id = capture_first(url, &SURVEY_ID_URL);

        // A login prompt only counts when no question content rendered.
        let has_content = survey.is_some() || visible.is_some();
        info.requires_login = Some(!has_content && LOGIN_RE.is_match(html));

        info.push_note(ACCURACY_NOTE);
        if let Some(p) = pagination {
            info.total_pages = Some(p.total);
            info.push_note(&format!(
                "The survey spans {} pages; questions on other pages were estimated.",
                p.total
            ));
        }

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_count_with_pagination() {
        let html = r#"<html><head><title>Roadmap Priorities | OpinionX</title></head><body>
            <div class="question-container" data-question-id="q1"></div>
            <div class="question-container" data-question-id="q2"></div>
            <div class="pagination"><button class="next-button">Next</button></div>
            </body></html>"#;
        let info = OpinionXExtractor
            .extract(html, "https://app.opinionx.co/s/roadmap-2025")
            .unwrap();
        assert_eq!(
            info.question_count,
            QuestionCount::Estimated { visible: 2, estimate: 4 }
        );
        assert_eq!(info.total_pages, Some(2));
        assert_eq!(info.title, "Roadmap Priorities");
        assert_eq!(info.form_id.as_deref(), Some("roadmap-2025"));
        assert_eq!(info.requires_login, Some(false));
    }

    #[test]
    fn test_login_shell_without_content() {
        let html = "<html><body><button>Sign in</button></body></html>";
        let info = OpinionXExtractor.extract(html, "https://opnx.to/abc").unwrap();
        assert_eq!(info.requires_login, Some(true));
        assert_eq!(info.form_id.as_deref(), Some("abc"));
        assert!(info.note.unwrap().contains("unverified default"));
    }
}
