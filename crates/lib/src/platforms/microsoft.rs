//! Microsoft Forms.

use super::{meta_description, title_without_suffix, SurveyExtractor};
use crate::errors::ExtractError;
use crate::pipeline::{
    capture_first, collection_len, count_first_matching, id_patterns, locate_json, str_at,
    CountPipeline, CountSource, MarkerPattern,
};
use crate::types::{PlatformKind, QuestionCount, SurveyInfo};
use regex::Regex;
use std::sync::LazyLock;

const TITLE_SUFFIXES: &[&str] = &[" - Microsoft Forms", " | Microsoft Forms"];

const LOGIN_PHRASES: &[&str] = &[
    "Sign in to continue",
    "Please sign in",
    "Sign in to your account",
];

static APP_STATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:var\s+|window\.)__appState\s*=\s*").unwrap());

static FORM_ID_URL: LazyLock<Vec<Regex>> =
    LazyLock::new(|| id_patterns(&[r"[?&]id=([A-Za-z0-9_-]+)", r"/r/([A-Za-z0-9_-]+)"]));

static QUESTION_IDS: LazyLock<Vec<Regex>> =
    LazyLock::new(|| id_patterns(&[r#"\bid="(QuestionId_[^"]+)""#]));

static QUESTION_MARKERS: LazyLock<Vec<MarkerPattern>> = LazyLock::new(|| {
    vec![
        MarkerPattern::class("office-form-question"),
        MarkerPattern::attr("data-automation-id", "questionItem"),
    ]
});

/// Reads Microsoft Forms pages.
pub struct MicrosoftFormsExtractor;

impl SurveyExtractor for MicrosoftFormsExtractor {
    fn platform(&self) -> PlatformKind {
        PlatformKind::MicrosoftForms
    }

    fn describe(&self) -> &'static str {
        "Reads the __appState form definition, then office-form-question markup"
    }

    fn extract(&self, html: &str, url: &str) -> Result<SurveyInfo, ExtractError> {
        let state = locate_json(html, &APP_STATE_RE);
        let form = state.as_ref().and_then(|s| s.get("form"));

        let outcome = CountPipeline::new(PlatformKind::MicrosoftForms)
            .structured("app_state", || {
                form.and_then(|f| f.get("questions"))
                    .and_then(collection_len)
                    .map(QuestionCount::Exact)
            })
            .markup("question_markers", || {
                count_first_matching(html, &QUESTION_MARKERS, &QUESTION_IDS)
                    .map(QuestionCount::Exact)
            })
            .run();

        let mut info = SurveyInfo::new(PlatformKind::MicrosoftForms);
        outcome.apply(&mut info);

        if let Some(form) = form {
            info.set_title(str_at(form, "/title"));
            info.set_description(str_at(form, "/description"));
            info.form_id = str_at(form, "/id");
        }
        if info.title == crate::NOT_AVAILABLE {
            info.set_title(title_without_suffix(html, TITLE_SUFFIXES));
        }
        if info.description == crate::NOT_AVAILABLE {
            info.set_description(
                formscout_html::element_text(html, ".office-form-subtitle")
                    .or_else(|| meta_description(html)),
            );
        }
        if info.form_id.is_none() {
            info.form_id = capture_first(url, &FORM_ID_URL);
        }
        info.requires_login = Some(LOGIN_PHRASES.iter().any(|p| html.contains(p)));

        if outcome.source == CountSource::Markup {
            info.push_note("Counted from page markup; the number may be inaccurate.");
        }

        Ok(info)
    }
}
