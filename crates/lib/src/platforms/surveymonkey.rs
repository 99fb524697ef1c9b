//! SurveyMonkey.
//!
//! SurveyMonkey serves one page of a survey at a time and obfuscates its
//! markup, so counts from markup are often a lower bound and get combined
//! with the detected pagination.

use super::{meta_description, title_without_suffix, SurveyExtractor};
use crate::errors::ExtractError;
use crate::pipeline::{
    capture_first, collection_items, collection_len, count_first_matching, detect_pagination,
    id_patterns, locate_json, str_at, with_pagination, AccessGate, CountPipeline, CountSource,
    MarkerPattern,
};
use crate::types::{PlatformKind, QuestionCount, SurveyInfo};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const TITLE_SUFFIXES: &[&str] = &[" Survey", " | SurveyMonkey", " - SurveyMonkey"];

const ACCURACY_NOTE: &str =
    "SurveyMonkey extraction may not be fully accurate because of its anti-scraping protection.";

static BLOB_LOCATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"window\.SM_SURVEY_DATA\s*=\s*",
        r"window\.__SURVEY_DATA__\s*=\s*",
        r"var\s+surveyData\s*=\s*",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SECTIONS_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)"?sections"?\s*:\s*\[(.*?)\]"#).unwrap());

static SECTION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""section_id"\s*:"#).unwrap());

static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})\s+(?:questions|pertanyaan)\b").unwrap());

static QUESTION_IDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[
        r#"\bdata-question-id="([^"]+)""#,
        r#"\bid="question-field-([^"]+)""#,
        r#"\bid="question-title-([^"]+)""#,
    ])
});

static SECTION_IDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[r#"\bdata-section-id="([^"]+)""#, r#"\bid="section-([^"]+)""#])
});

static QUESTION_MARKERS: LazyLock<Vec<MarkerPattern>> = LazyLock::new(|| {
    vec![
        MarkerPattern::class("question-container"),
        MarkerPattern::class("question-row"),
        MarkerPattern::attr("data-question-id", ""),
        MarkerPattern::attr("id", "question-field-"),
        MarkerPattern::attr("data-question-type", ""),
        MarkerPattern::attr("data-rq-question-type", ""),
        MarkerPattern::class("question-fieldset"),
        MarkerPattern::attr("id", "question-title-"),
        MarkerPattern::class("question-title-container"),
        MarkerPattern::class("question-number"),
        MarkerPattern::class("question-body"),
    ]
});

static SECTION_MARKERS: LazyLock<Vec<MarkerPattern>> = LazyLock::new(|| {
    vec![
        MarkerPattern::class("survey-section"),
        MarkerPattern::attr("data-section-id", ""),
        MarkerPattern::class("section-container"),
    ]
});

static SURVEY_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[
        r"[?&]survey_id=(\d+)",
        r#""survey_id"\s*:\s*"?(\d+)"#,
        r#""surveyId"\s*:\s*"?(\d+)"#,
    ])
});

static SHORT_LINK_RE: LazyLock<Vec<Regex>> =
    LazyLock::new(|| id_patterns(&[r"surveymonkey\.com/r/([A-Za-z0-9_-]+)"]));

static LOCKOUT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![Regex::new(r#"class="[^"]*\b(?:password|login)-required\b"#).unwrap()]
});

const CONTENT_MARKERS: &[&str] = &["SM_SURVEY_DATA", "__SURVEY_DATA__"];

static LOGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:log|sign)\s+in\s+to\s+continue\b|\bthis\s+survey\s+requires\s+you\s+to\s+log\s+in\b",
    )
    .unwrap()
});

static PAID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bpaid\s+feature\b|\bupgrade\s+(?:to\s+(?:get\s+results|unlock)|your\s+plan)\b|\bonly\s+available\s+on\s+paid\s+plans\b",
    )
    .unwrap()
});

/// Reads SurveyMonkey pages.
pub struct SurveyMonkeyExtractor;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BlobTally {
    questions: u32,
    sections: u32,
}

fn survey_blob(html: &str) -> Option<Value> {
    BLOB_LOCATORS
        .iter()
        .filter_map(|locator| locate_json(html, locator))
        .find(Value::is_object)
}

fn tally_blob(data: &Value) -> BlobTally {
    let mut tally = BlobTally::default();
    for page in data.get("pages").map(collection_items).unwrap_or_default() {
        tally.questions += page.get("questions").and_then(collection_len).unwrap_or(0);
    }
    for section in data
        .get("sections")
        .map(collection_items)
        .unwrap_or_default()
    {
        tally.sections += 1;
        tally.questions += section
            .get("questions")
            .and_then(collection_len)
            .unwrap_or(0);
    }
    tally
}

fn section_count(html: &str, blob_sections: u32) -> Option<u32> {
    if blob_sections > 0 {
        return Some(blob_sections);
    }
    let literal = SECTIONS_LITERAL_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| SECTION_ID_RE.find_iter(m.as_str()).count() as u32)
        .filter(|n| *n > 0);
    literal.or_else(|| count_first_matching(html, &SECTION_MARKERS, &SECTION_IDS))
}

fn gate() -> AccessGate<'static> {
    AccessGate {
        lockout_markers: &[],
        lockout_patterns: &LOCKOUT_PATTERNS,
        content_markers: CONTENT_MARKERS,
        content_patterns: &QUESTION_MARKERS,
    }
}

impl SurveyExtractor for SurveyMonkeyExtractor {
    fn platform(&self) -> PlatformKind {
        PlatformKind::SurveyMonkey
    }

    fn describe(&self) -> &'static str {
        "Reads embedded survey data when present, otherwise counts question markup across pages"
    }

    fn extract(&self, html: &str, url: &str) -> Result<SurveyInfo, ExtractError> {
        gate().check(PlatformKind::SurveyMonkey, html)?;

        let blob = survey_blob(html);
        let tally = blob.as_ref().map(tally_blob).unwrap_or_default();
        let pagination = detect_pagination(html);

        let outcome = CountPipeline::new(PlatformKind::SurveyMonkey)
            .structured("survey_data", || Some(QuestionCount::Exact(tally.questions)))
            .markup("summary_text", || {
                let text = formscout_html::strip_tags(html);
                SUMMARY_RE
                    .captures(&text)?
                    .get(1)?
                    .as_str()
                    .parse()
                    .ok()
                    .map(QuestionCount::Exact)
            })
            .markup("question_markers", || {
                count_first_matching(html, &QUESTION_MARKERS, &QUESTION_IDS)
                    .map(|n| with_pagination(n, pagination))
            })
            .run();

        let mut info = SurveyInfo::new(PlatformKind::SurveyMonkey);
        outcome.apply(&mut info);

        if let Some(blob) = &blob {
            info.set_title(str_at(blob, "/title"));
            info.set_description(str_at(blob, "/description"));
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

        info.form_id =
            capture_first(html, &SURVEY_ID_PATTERNS).or_else(|| capture_first(url, &SHORT_LINK_RE));
        info.section_count = section_count(html, tally.sections);
        info.requires_login = Some(LOGIN_RE.is_match(html));
        info.is_paid_feature = Some(PAID_RE.is_match(html));

        info.push_note(ACCURACY_NOTE);
        if let Some(p) = pagination {
            info.total_pages = Some(p.total);
            let page = p.current.unwrap_or(1);
            info.push_note(&format!(
                "The survey has {} pages; only page {} was visible.",
                p.total, page
            ));
            if page == 1 && outcome.source == CountSource::Markup {
                info.push_note("The real question count is likely higher than detected.");
            }
        }
        if let Some(sections) = info.section_count.filter(|n| *n > 1) {
            info.push_note(&format!("The survey is divided into {sections} sections."));
        }

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_questions_across_pages() {
        let html = r#"<html><head><title>Kepuasan Pelanggan Survey</title></head><body>
            <script>window.SM_SURVEY_DATA = {"title":"Kepuasan","pages":[{"questions":[{},{}]},{"questions":[{}]}],"survey_id":"12345"};</script>
            </body></html>"#;
        let info = SurveyMonkeyExtractor
            .extract(html, "https://www.surveymonkey.com/r/ABC")
            .unwrap();
        assert_eq!(info.question_count, QuestionCount::Exact(3));
        assert_eq!(info.title, "Kepuasan");
        assert_eq!(info.form_id.as_deref(), Some("12345"));
        assert!(info.note.as_deref().unwrap().starts_with("SurveyMonkey"));
    }

    #[test]
    fn test_summary_text_and_short_link() {
        let html = "<html><head><title>Feedback Survey</title></head><body><p>This survey has 12 questions.</p></body></html>";
        let info = SurveyMonkeyExtractor
            .extract(html, "https://www.surveymonkey.com/r/KerjaKelompok")
            .unwrap();
        assert_eq!(info.question_count, QuestionCount::Exact(12));
        assert_eq!(info.title, "Feedback");
        assert_eq!(info.form_id.as_deref(), Some("KerjaKelompok"));
        assert_eq!(info.requires_login, Some(false));
    }

    #[test]
    fn test_sections_from_literal() {
        let html = r#"<script>var cfg = {sections: [{"section_id": 1}, {"section_id": 2}, {"section_id": 3}]};</script>
            <div class="question-row"></div>"#;
        let info = SurveyMonkeyExtractor
            .extract(html, "https://www.surveymonkey.com/r/S")
            .unwrap();
        assert_eq!(info.section_count, Some(3));
        assert!(info.note.unwrap().contains("3 sections"));
    }

    #[test]
    fn test_password_page_is_not_public() {
        let html = r#"<div class="page password-required"><input type="password"></div>"#;
        let err = SurveyMonkeyExtractor
            .extract(html, "https://www.surveymonkey.com/r/P")
            .unwrap_err();
        assert!(matches!(err, ExtractError::FormNotPublic { .. }));
    }
}
