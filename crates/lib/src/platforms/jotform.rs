//! JotForm.

use super::{meta_description, title_without_suffix, SurveyExtractor};
use crate::errors::ExtractError;
use crate::pipeline::{
    capture_first, collection_items, count_first_matching, detect_pagination, id_patterns,
    locate_json, str_at, with_pagination, CountPipeline, CountSource, MarkerPattern,
};
use crate::types::{PlatformKind, QuestionCount, SurveyInfo};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const TITLE_SUFFIXES: &[&str] = &[" | JotForm", " - JotForm", " | Jotform", " - Jotform"];

/// Control types that are layout rather than questions.
const NON_QUESTION_TYPES: &[&str] = &[
    "control_head",
    "control_hidden",
    "control_pagebreak",
    "control_button",
];

const PAYMENT_MARKERS: &[&str] = &[
    "control_payment",
    "control_stripe",
    "control_paypal",
    "control_square",
];
const ENCRYPTION_MARKERS: &[&str] = &["isEncrypted\":true", "isEncrypted\": true", "jfEncrypt"];

static INITIAL_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:JotForm\.initialData\s*=|"initialData"\s*:)\s*"#).unwrap()
});

static FORM_ID_URL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[r"jotform\.com/(?:form/)?(\d{6,})", r"[?&]formID=(\d+)"])
});

static LINE_IDS: LazyLock<Vec<Regex>> = LazyLock::new(|| id_patterns(&[r#"\bid="(id_\d+)""#]));

static QUESTION_MARKERS: LazyLock<Vec<MarkerPattern>> = LazyLock::new(|| {
    vec![MarkerPattern::new(r#"<li\b[^>]*\bclass="[^"]*\bform-line\b[^"]*"[^>]*>"#)
        .excluding(NON_QUESTION_TYPES)]
});

/// Reads JotForm pages.
pub struct JotFormExtractor;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ControlTally {
    questions: u32,
    page_breaks: u32,
}

fn tally_controls(data: &Value) -> Option<ControlTally> {
    let questions = data.get("questions")?;
    let mut tally = ControlTally::default();
    for question in collection_items(questions) {
        match question.get("type").and_then(Value::as_str) {
            Some("control_pagebreak") => tally.page_breaks += 1,
            Some(t) if NON_QUESTION_TYPES.contains(&t) => {}
            _ => tally.questions += 1,
        }
    }
    Some(tally)
}

impl SurveyExtractor for JotFormExtractor {
    fn platform(&self) -> PlatformKind {
        PlatformKind::JotForm
    }

    fn describe(&self) -> &'static str {
        "Reads JotForm initialData controls, then form-line markup"
    }

    fn extract(&self, html: &str, url: &str) -> Result<SurveyInfo, ExtractError> {
        let data = locate_json(html, &INITIAL_DATA_RE);
        let tally = data.as_ref().and_then(tally_controls);
        let pagination = detect_pagination(html);

        let outcome = CountPipeline::new(PlatformKind::JotForm)
            .structured("initial_data", || tally.map(|t| QuestionCount::Exact(t.questions)))
            .markup("form_lines", || {
                count_first_matching(html, &QUESTION_MARKERS, &LINE_IDS)
                    .map(|n| with_pagination(n, pagination))
            })
            .run();

        let mut info = SurveyInfo::new(PlatformKind::JotForm);
        outcome.apply(&mut info);

        if let Some(data) = &data {
            info.set_title(str_at(data, "/title"));
            info.form_id = str_at(data, "/id");
        }
        if info.title == crate::NOT_AVAILABLE {
            info.set_title(
                title_without_suffix(html, TITLE_SUFFIXES)
                    .or_else(|| formscout_html::element_text(html, ".form-header")),
            );
        }
        info.set_description(
            formscout_html::element_text(html, ".form-subHeader")
                .or_else(|| meta_description(html)),
        );
        if info.form_id.is_none() {
            info.form_id = capture_first(url, &FORM_ID_URL);
        }
        if let Some(t) = tally.filter(|t| t.page_breaks > 0) {
            info.section_count = Some(t.page_breaks + 1);
        }
        info.has_payment = Some(PAYMENT_MARKERS.iter().any(|m| html.contains(m)));
        info.is_encrypted = Some(ENCRYPTION_MARKERS.iter().any(|m| html.contains(m)));

        if outcome.source == CountSource::Markup {
            info.push_note("Counted from page markup; the number may be inaccurate.");
        }
        if let (Some(p), true) = (pagination, outcome.count.is_estimated()) {
            info.total_pages = Some(p.total);
        }

        Ok(info)
    }
}
