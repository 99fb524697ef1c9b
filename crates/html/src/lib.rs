//! # formscout-html: HTML helpers
//!
//! Small, platform-agnostic helpers for pulling metadata and text out of survey
//! pages. Every function is total: malformed markup yields `None` or an empty
//! string, never an error.

use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Tags removed by [`clean_html`] when no explicit list is given.
pub const DEFAULT_CHROME_TAGS: &[&str] = &[
    "script", "style", "meta", "link", "header", "nav", "noscript",
];

const VOID_TAGS: &[&str] = &["meta", "link", "br", "img", "input", "hr"];

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(?:x([0-9a-fA-F]+)|([0-9]+));").unwrap());

/// Returns the trimmed text of the document's `<title>`, if it has a non-empty one.
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

/// Returns the `content` of the first `<meta>` whose `name` or `property` equals `key`.
pub fn meta_content(html: &str, key: &str) -> Option<String> {
    let document = Html::parse_document(html);
    first_meta_in(&document, &[key])
}

/// Like [`meta_content`], trying each key in order.
pub fn first_meta(html: &str, keys: &[&str]) -> Option<String> {
    let document = Html::parse_document(html);
    first_meta_in(&document, keys)
}

fn first_meta_in(document: &Html, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let css = format!("meta[name=\"{key}\"], meta[property=\"{key}\"]");
        let selector = Selector::parse(&css).ok()?;
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .find(|c| !c.is_empty())
    })
}

/// Returns the collapsed text content of the first element matching `css`.
pub fn element_text(html: &str, css: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty())
}

/// Returns the inner HTML of the first element matching `css`.
pub fn element_html(html: &str, css: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.inner_html())
        .filter(|inner| !inner.trim().is_empty())
}

/// Removes the given elements (with their content) from raw HTML.
///
/// `None` removes [`DEFAULT_CHROME_TAGS`]. An empty slice returns the input unchanged.
pub fn clean_html(html: &str, tags: Option<&[&str]>) -> String {
    let tags = tags.unwrap_or(DEFAULT_CHROME_TAGS);
    let mut cleaned = html.to_string();
    for tag in tags {
        let tag = regex::escape(tag);
        let pattern = if VOID_TAGS.contains(&tag.as_str()) {
            format!(r"(?is)<{tag}\b[^>]*>")
        } else {
            format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")
        };
        if let Ok(re) = Regex::new(&pattern) {
            cleaned = re.replace_all(&cleaned, "").into_owned();
        }
    }
    cleaned
}

/// Drops every tag and collapses whitespace, decoding common entities.
pub fn strip_tags(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    collapse_whitespace(&decode_entities(&text))
}

/// Decodes the named entities that show up in titles and descriptions, plus numeric ones.
pub fn decode_entities(text: &str) -> String {
    let named = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'");
    let numeric = NUMERIC_ENTITY_RE.replace_all(&named, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    // `&amp;` last so "&amp;lt;" stays "&lt;".
    numeric.replace("&amp;", "&")
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WS_RE.replace_all(text, " ").trim().to_string()
}
