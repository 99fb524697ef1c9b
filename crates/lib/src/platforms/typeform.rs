//! Typeform.
//!
//! Typeform pages carry their form definition in one of three places,
//! depending on the renderer generation: the Next.js `__NEXT_DATA__` script,
//! a `form_specification` literal, or a JSON string passed to
//! `__PRELOADED_STATE__`.

use super::{meta_description, title_without_suffix, SurveyExtractor};
use crate::errors::ExtractError;
use crate::pipeline::{
    capture_first, collection_items, collection_len, count_first_matching, detect_pagination,
    id_patterns, locate_json, next_data, parse_leading_json, str_at, with_pagination,
    CountPipeline, CountSource, MarkerPattern,
};
use crate::types::{PlatformKind, QuestionCount, SurveyInfo};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

const TITLE_SUFFIXES: &[&str] = &[" | Typeform", " - Typeform"];

/// Block types in a preloaded form that are not questions.
const NON_QUESTION_BLOCKS: &[&str] = &["statement", "welcome_screen", "thankyou_screen"];

static FORM_SPEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"var\s+form_specification\s*=\s*").unwrap());

static PRELOADED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.__PRELOADED_STATE__\s*=\s*JSON\.parse\(\s*(["'])"#).unwrap()
});

static FORM_ID_URL: LazyLock<Vec<Regex>> =
    LazyLock::new(|| id_patterns(&[r"/to/([A-Za-z0-9]+)", r"/forms/([A-Za-z0-9]+)"]));

static QUESTION_IDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[
        r#"\bdata-question-ref="([^"]+)""#,
        r#"\bdata-question-id="([^"]+)""#,
    ])
});

static QUESTION_MARKERS: LazyLock<Vec<MarkerPattern>> = LazyLock::new(|| {
    vec![
        MarkerPattern::attr("data-qa", "question-"),
        MarkerPattern::class("question-block"),
        MarkerPattern::class("question-wrapper"),
        MarkerPattern::class("question-title"),
        MarkerPattern::attr("data-question-type", ""),
        MarkerPattern::class("question-input"),
        MarkerPattern::attr("data-question-ref", ""),
        MarkerPattern::attr("data-question-id", ""),
    ]
});

static FORM_BLOCK: LazyLock<MarkerPattern> = LazyLock::new(|| MarkerPattern::class("form-block"));

/// Reads Typeform pages.
pub struct TypeformExtractor;

/// What one of the embedded definitions yielded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct FormDefinition {
    source: &'static str,
    title: Option<String>,
    description: Option<String>,
    questions: u32,
    form_id: Option<String>,
}

fn from_next_data(html: &str) -> Option<FormDefinition> {
    let data = next_data(html)?;
    let form = data.pointer("/props/pageProps/formData")?;
    Some(FormDefinition {
        source: "next_data",
        title: str_at(form, "/title"),
        description: str_at(form, "/welcome_screens/0/properties/description")
            .or_else(|| str_at(form, "/welcome_screens/0/description")),
        questions: form.get("fields").and_then(collection_len).unwrap_or(0),
        form_id: str_at(form, "/id"),
    })
}

fn from_form_specification(html: &str) -> Option<FormDefinition> {
    let literal = locate_json(html, &FORM_SPEC_RE)?;
    let form = literal.get("form").unwrap_or(&literal);
    Some(FormDefinition {
        source: "form_specification",
        title: str_at(form, "/title"),
        description: str_at(form, "/description"),
        questions: form.get("fields").and_then(collection_len).unwrap_or(0),
        form_id: str_at(form, "/id"),
    })
}

/// Decodes the string literal passed to `JSON.parse`.
fn unescape_literal(quote: &str, raw: &str) -> Option<String> {
    if quote == "\"" {
        return serde_json::from_str::<String>(&format!("\"{raw}\"")).ok();
    }
    let double_quoted = raw.replace("\\'", "'").replace('"', "\\\"");
    serde_json::from_str::<String>(&format!("\"{double_quoted}\"")).ok()
}

/// The body of a JS string literal starting right after its opening `quote`,
/// up to the first unescaped closing quote of the same kind.
fn literal_body(rest: &str, quote: char) -> Option<&str> {
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            c if c == quote => return Some(&rest[..i]),
            _ => {}
        }
    }
    None
}

fn from_preloaded_state(html: &str) -> Option<FormDefinition> {
    let caps = PRELOADED_RE.captures(html)?;
    let quote = caps.get(1)?;
    let body = literal_body(&html[quote.end()..], quote.as_str().chars().next()?)?;
    let json = unescape_literal(quote.as_str(), body)?;
    let state = parse_leading_json(&json)?;
    let form = state.get("form")?;
    let questions = form
        .get("blocks")
        .map(collection_items)
        .unwrap_or_default()
        .into_iter()
        .filter(|block| {
            block
                .get("type")
                .and_then(Value::as_str)
                .is_none_or(|t| !NON_QUESTION_BLOCKS.contains(&t))
        })
        .count() as u32;
    Some(FormDefinition {
        source: "preloaded_state",
        title: str_at(form, "/settings/title").or_else(|| str_at(form, "/title")),
        description: str_at(form, "/settings/description"),
        questions,
        form_id: str_at(form, "/id"),
    })
}

fn form_definition(html: &str) -> Option<FormDefinition> {
    let definition = from_next_data(html)
        .or_else(|| from_form_specification(html))
        .or_else(|| from_preloaded_state(html));
    if let Some(d) = &definition {
        debug!(source = d.source, questions = d.questions, "Typeform definition found");
    }
    definition
}

impl SurveyExtractor for TypeformExtractor {
    fn platform(&self) -> PlatformKind {
        PlatformKind::Typeform
    }

    fn describe(&self) -> &'static str {
        "Reads __NEXT_DATA__, form_specification or __PRELOADED_STATE__, then question markup"
    }

    fn extract(&self, html: &str, url: &str) -> Result<SurveyInfo, ExtractError> {
        let definition = form_definition(html);
        let pagination = detect_pagination(html);

        let outcome = CountPipeline::new(PlatformKind::Typeform)
            .structured("form_definition", || {
                definition.as_ref().map(|d| QuestionCount::Exact(d.questions))
            })
            .markup("question_markers", || {
                count_first_matching(html, &QUESTION_MARKERS, &QUESTION_IDS)
                    .map(|n| with_pagination(n, pagination))
            })
            .markup("form_blocks", || {
                let blocks = FORM_BLOCK.count(html, &[]);
                (blocks > 2).then(|| with_pagination(blocks - 2, pagination))
            })
            .run();

        let mut info = SurveyInfo::new(PlatformKind::Typeform);
        outcome.apply(&mut info);

        if let Some(d) = definition {
            info.set_title(d.title);
            info.set_description(d.description);
            info.form_id = d.form_id;
        }
        if info.title == crate::NOT_AVAILABLE {
            info.set_title(title_without_suffix(html, TITLE_SUFFIXES));
        }
        if info.description == crate::NOT_AVAILABLE {
            info.set_description(meta_description(html));
        }
        if info.form_id.is_none() {
            info.form_id = capture_first(url, &FORM_ID_URL);
        }

        if outcome.source == CountSource::Markup {
            info.push_note("Counted from page markup; the number may be inaccurate.");
        }
        if let Some(p) = pagination {
            info.total_pages = Some(p.total);
            info.push_note("Typeform shows one step at a time; later steps could not be read.");
        }

        Ok(info)
    }
}
