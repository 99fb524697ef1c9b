//! Google Forms.
//!
//! Public forms embed their full definition in `FB_PUBLIC_LOAD_DATA_`, a
//! positional JSON array. The layout read here:
//!
//! | path        | meaning                                   |
//! |-------------|-------------------------------------------|
//! | `[1][0]`    | description                               |
//! | `[1][1]`    | items; `item[3] == 8` is a page break     |
//! | `[1][4]`    | legacy item list on older forms           |
//! | `[1][8]`    | title                                     |
//! | `[1][10]`   | settings: `[0]` quiz, `[1]` sign-in, `[6]` closed |
//! | `[14]`      | published form id                         |

use super::{meta_description, title_without_suffix, SurveyExtractor};
use crate::errors::ExtractError;
use crate::pipeline::{
    blob_script_text, capture_blob, count_first_matching, detect_pagination, id_patterns,
    is_truthy, parse_leading_json, str_at, with_pagination, AccessGate, CountPipeline,
    MarkerPattern,
};
use crate::types::{PlatformKind, QuestionCount, SurveyInfo};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const PAGE_BREAK_TYPE: i64 = 8;
const TITLE_SUFFIXES: &[&str] = &[" - Google Forms", " - Google Formulir"];

/// Number of leading markers tried before the `role="listitem"` stage.
const PRIMARY_MARKERS: usize = 4;

static FB_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var\s+FB_PUBLIC_LOAD_DATA_\s*=\s*").unwrap());

static QUESTION_SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"null,2,").unwrap());

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<[a-zA-Z]+\b[^>]*\brole="listitem"[^>]*>"#).unwrap());

static FORM_ID_URL: LazyLock<Vec<Regex>> =
    LazyLock::new(|| id_patterns(&[r"/forms/d/e/([^/?#]+)", r"/forms/d/([^/?#]+)"]));

static ITEM_IDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[r#"\bdata-item-id="([^"]+)""#, r#"\bdata-question-id="([^"]+)""#])
});

static QUESTION_MARKERS: LazyLock<Vec<MarkerPattern>> = LazyLock::new(|| {
    vec![
        MarkerPattern::class("freebirdFormviewerComponentsQuestionBaseRoot"),
        MarkerPattern::class("freebirdFormviewerViewItemsItemItem"),
        MarkerPattern::class("freebirdFormviewerViewNumberedItemContainer"),
        MarkerPattern::class("freebirdFormviewerComponentsQuestionBaseTitle"),
        MarkerPattern::class("freebirdFormviewerComponentsQuestionBaseRequiredAsterisk"),
        MarkerPattern::new(r#"<[a-zA-Z]+\b[^>]*\bdata-params="[^"]*question[^"]*"[^>]*>"#),
        MarkerPattern::attr("jsname", "OCpkoe"),
        MarkerPattern::new(
            r#"<[a-zA-Z]+\b[^>]*\baria-label="(?:Question|Pertanyaan)\b[^"]*"[^>]*>"#,
        ),
        MarkerPattern::new(r#"<[a-zA-Z]+\b[^>]*\bjscontroller="(?:sWGJ4b|eFy6Rc|HvnK2b)"[^>]*>"#),
    ]
});

static LOCKOUT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"accounts\.google\.com/(?:signin|ServiceLogin|AccountChooser)").unwrap(),
        Regex::new(r#"accounts\.google\.com/[^"'\s<>]*[?&]continue="#).unwrap(),
    ]
});

const LOCKOUT_MARKERS: &[&str] = &[
    "You need permission",
    "Request access",
    "Permission denied",
    "Sign in to continue",
    "You must sign in",
    "Please sign in",
    "Sign in required",
];

const CONTENT_MARKERS: &[&str] = &["FB_PUBLIC_LOAD_DATA_", "freebirdFormviewer"];

/// Reads Google Forms pages.
pub struct GoogleFormsExtractor;

/// Questions and page breaks found in the embedded item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemTally {
    questions: u32,
    page_breaks: u32,
}

fn tally_items(data: &Value) -> Option<ItemTally> {
    if let Some(items) = data.pointer("/1/1").and_then(Value::as_array) {
        let mut tally = ItemTally {
            questions: 0,
            page_breaks: 0,
        };
        for item in items.iter().filter_map(Value::as_array) {
            if item.get(3).and_then(Value::as_i64) == Some(PAGE_BREAK_TYPE) {
                tally.page_breaks += 1;
            } else {
                tally.questions += 1;
            }
        }
        return Some(tally);
    }

    let legacy = data.pointer("/1/4").and_then(Value::as_array)?;
    let questions = legacy
        .iter()
        .filter(|item| item.as_array().is_some_and(|a| !a.is_empty()))
        .count() as u32;
    Some(ItemTally {
        questions,
        page_breaks: 0,
    })
}

fn gate() -> AccessGate<'static> {
    AccessGate {
        lockout_markers: LOCKOUT_MARKERS,
        lockout_patterns: &LOCKOUT_PATTERNS,
        content_markers: CONTENT_MARKERS,
        content_patterns: &QUESTION_MARKERS,
    }
}

fn apply_settings(info: &mut SurveyInfo, data: &Value) {
    let Some(settings) = data.pointer("/1/10").and_then(Value::as_array) else {
        return;
    };
    info.is_quiz = settings.first().map(is_truthy);
    info.requires_login = settings.get(1).map(is_truthy);
    info.accepting_responses = Some(!settings.get(6).is_some_and(is_truthy));
}

impl SurveyExtractor for GoogleFormsExtractor {
    fn platform(&self) -> PlatformKind {
        PlatformKind::GoogleForms
    }

    fn describe(&self) -> &'static str {
        "Reads the embedded FB_PUBLIC_LOAD_DATA_ form definition, falling back to question markup"
    }

    fn scans_personal_data(&self) -> bool {
        true
    }

    fn extract(&self, html: &str, url: &str) -> Result<SurveyInfo, ExtractError> {
        gate().check(PlatformKind::GoogleForms, html)?;

        let blob_text = capture_blob(html, &FB_DATA_RE).map(blob_script_text);
        let data = blob_text.and_then(parse_leading_json);
        let tally = data.as_ref().and_then(tally_items);
        let pagination = detect_pagination(html);

        let outcome = CountPipeline::new(PlatformKind::GoogleForms)
            .structured("fb_public_load_data", || {
                tally.map(|t| QuestionCount::Exact(t.questions))
            })
            .structured("blob_signatures", || {
                let text = blob_text.filter(|_| data.is_none())?;
                Some(QuestionCount::Exact(
                    QUESTION_SIGNATURE_RE.find_iter(text).count() as u32,
                ))
            })
            .markup("question_markers", || {
                count_first_matching(html, &QUESTION_MARKERS[..PRIMARY_MARKERS], &ITEM_IDS)
                    .map(|n| with_pagination(n, pagination))
            })
            .markup("list_items", || {
                let items = LIST_ITEM_RE.find_iter(html).count() as u32;
                (items > 0).then(|| with_pagination(items.saturating_sub(2).max(1), pagination))
            })
            .markup("question_attributes", || {
                count_first_matching(html, &QUESTION_MARKERS[PRIMARY_MARKERS..], &ITEM_IDS)
                    .map(|n| with_pagination(n, pagination))
            })
            .run();

        let mut info = SurveyInfo::new(PlatformKind::GoogleForms);
        outcome.apply(&mut info);

        if let Some(data) = &data {
            info.set_title(str_at(data, "/1/8").or_else(|| str_at(data, "/3")));
            info.set_description(str_at(data, "/1/0"));
            info.form_id = str_at(data, "/14");
            apply_settings(&mut info, data);
        }
        if let Some(tally) = tally {
            info.section_count = Some(tally.page_breaks + 1);
        }
        if info.title == crate::NOT_AVAILABLE {
            info.set_title(title_without_suffix(html, TITLE_SUFFIXES));
        }
        if info.description == crate::NOT_AVAILABLE {
            info.set_description(meta_description(html));
        }
        if info.form_id.is_none() {
            info.form_id = crate::pipeline::capture_first(url, &FORM_ID_URL);
        }
        if let (Some(p), true) = (pagination, outcome.count.is_estimated()) {
            info.total_pages = Some(p.total);
            info.push_note(&format!(
                "Only one of {} pages was visible; the question count is an estimate.",
                p.total
            ));
        }

        Ok(info)
    }
}
