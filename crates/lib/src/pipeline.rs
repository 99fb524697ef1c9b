//! # Counting Pipeline
//!
//! Building blocks shared by the platform strategies: an ordered fallback
//! pipeline of counting stages, structural marker counting, embedded-blob
//! capture, pagination detection and the access gate.

use crate::errors::ExtractError;
use crate::types::{PlatformKind, QuestionCount, SurveyInfo, DEFAULT_QUESTION_COUNT};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

/// Note attached when no stage produced a count.
pub const DEFAULT_COUNT_NOTE: &str =
    "Question count could not be detected; 10 is an unverified default.";

/// Pages beyond this are assumed to be a misread number, not a page total.
const MAX_PLAUSIBLE_PAGES: u32 = 100;

// --- Count Pipeline ---

/// Where a question count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSource {
    /// Parsed from data the platform embeds for its own renderer.
    Structured,
    /// Counted from HTML markers or summary text.
    Markup,
    /// Nothing matched; [`DEFAULT_QUESTION_COUNT`] was used.
    Default,
}

type Stage<'a> = Box<dyn FnOnce() -> Option<QuestionCount> + 'a>;

/// An ordered list of counting stages. The first stage to yield a count
/// greater than zero wins and later stages are never run.
pub struct CountPipeline<'a> {
    platform: PlatformKind,
    stages: Vec<(&'static str, CountSource, Stage<'a>)>,
}

/// The result of running a [`CountPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountOutcome {
    pub count: QuestionCount,
    pub source: CountSource,
    pub stage: Option<&'static str>,
}

impl<'a> CountPipeline<'a> {
    pub fn new(platform: PlatformKind) -> Self {
        Self {
            platform,
            stages: Vec::new(),
        }
    }

    /// Adds a stage reading embedded structured data.
    pub fn structured(
        mut self,
        name: &'static str,
        stage: impl FnOnce() -> Option<QuestionCount> + 'a,
    ) -> Self {
        self.stages
            .push((name, CountSource::Structured, Box::new(stage)));
        self
    }

    /// Adds a stage counting markup.
    pub fn markup(
        mut self,
        name: &'static str,
        stage: impl FnOnce() -> Option<QuestionCount> + 'a,
    ) -> Self {
        self.stages.push((name, CountSource::Markup, Box::new(stage)));
        self
    }

    pub fn run(self) -> CountOutcome {
        for (name, source, stage) in self.stages {
            match stage() {
                Some(count) if count.lower_bound() > 0 => {
                    debug!(
                        platform = ?self.platform,
                        stage = name,
                        count = %count,
                        "Question count resolved"
                    );
                    return CountOutcome {
                        count,
                        source,
                        stage: Some(name),
                    };
                }
                _ => debug!(platform = ?self.platform, stage = name, "Stage yielded no count"),
            }
        }
        debug!(platform = ?self.platform, "Falling back to default question count");
        CountOutcome {
            count: QuestionCount::Exact(DEFAULT_QUESTION_COUNT),
            source: CountSource::Default,
            stage: None,
        }
    }
}

impl CountOutcome {
    pub fn is_default(&self) -> bool {
        self.source == CountSource::Default
    }

    /// Writes the count into `info`, noting when it is only the default.
    pub fn apply(&self, info: &mut SurveyInfo) {
        info.question_count = self.count;
        if self.is_default() {
            info.push_note(DEFAULT_COUNT_NOTE);
        }
    }
}

// --- Structural Markers ---

/// A pattern matching whole opening tags that mark one question each.
pub struct MarkerPattern {
    regex: Regex,
    excludes: &'static [&'static str],
}

impl MarkerPattern {
    /// Compiles a marker from a raw pattern.
    ///
    /// Only used on constant patterns, so a bad pattern is a programming error.
    pub fn new(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            excludes: &[],
        }
    }

    /// A marker for any opening tag whose `class` list contains exactly the
    /// token `class`; `question-row-label` does not match `question-row`.
    pub fn class(class: &str) -> Self {
        Self::new(&format!(
            r#"<[a-zA-Z][a-zA-Z0-9]*\b[^>]*\bclass="(?:[^"]*\s)?{}(?:\s[^"]*)?"[^>]*>"#,
            regex::escape(class)
        ))
    }

    /// A marker for any opening tag carrying `attr` (optionally with a value prefix).
    pub fn attr(attr: &str, value_prefix: &str) -> Self {
        Self::new(&format!(
            r#"<[a-zA-Z][a-zA-Z0-9]*\b[^>]*\b{}="{}[^"]*"[^>]*>"#,
            regex::escape(attr),
            regex::escape(value_prefix)
        ))
    }

    /// Matches containing any of `excludes` are ignored.
    pub fn excluding(mut self, excludes: &'static [&'static str]) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn is_match(&self, html: &str) -> bool {
        self.regex
            .find_iter(html)
            .any(|m| !self.is_excluded(m.as_str()))
    }

    /// Counts matches, collapsing those that share a captured id.
    pub fn count(&self, html: &str, id_patterns: &[Regex]) -> u32 {
        let mut ids = HashSet::new();
        let mut anonymous = 0u32;
        for m in self.regex.find_iter(html) {
            let tag = m.as_str();
            if self.is_excluded(tag) {
                continue;
            }
            match capture_first(tag, id_patterns) {
                Some(id) => {
                    ids.insert(id);
                }
                None => anonymous += 1,
            }
        }
        anonymous + ids.len() as u32
    }

    fn is_excluded(&self, tag: &str) -> bool {
        self.excludes.iter().any(|e| tag.contains(e))
    }
}

/// Counts with the first pattern that matches anything; later patterns are
/// never consulted and counts are never summed across patterns.
pub fn count_first_matching(
    html: &str,
    patterns: &[MarkerPattern],
    id_patterns: &[Regex],
) -> Option<u32> {
    patterns
        .iter()
        .map(|p| p.count(html, id_patterns))
        .find(|n| *n > 0)
}

/// First capture group of the first pattern that matches `text`.
pub fn capture_first(text: &str, patterns: &[Regex]) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Compiles constant id patterns.
pub fn id_patterns(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

// --- Embedded Blobs ---

static NEXT_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]*\bid="__NEXT_DATA__"[^>]*>(.*?)</script>"#).unwrap()
});

/// Returns the text following the first match of `locator`, which should end
/// right before the embedded JSON value.
pub fn capture_blob<'h>(html: &'h str, locator: &Regex) -> Option<&'h str> {
    locator.find(html).map(|m| &html[m.end()..])
}

/// The blob text up to the end of its `<script>` element.
pub fn blob_script_text(rest: &str) -> &str {
    match rest.find("</script>") {
        Some(end) => &rest[..end],
        None => rest,
    }
}

/// Parses the JSON value at the start of `text`, ignoring whatever follows it.
pub fn parse_leading_json(text: &str) -> Option<Value> {
    let mut values = serde_json::Deserializer::from_str(text.trim_start()).into_iter::<Value>();
    match values.next() {
        Some(Ok(value)) => Some(value),
        Some(Err(e)) => {
            debug!(error = %e, "Embedded JSON blob could not be parsed");
            None
        }
        None => None,
    }
}

/// Locates and parses the blob following `locator`.
pub fn locate_json(html: &str, locator: &Regex) -> Option<Value> {
    capture_blob(html, locator).and_then(parse_leading_json)
}

/// Parses the `__NEXT_DATA__` script of a Next.js page.
pub fn next_data(html: &str) -> Option<Value> {
    let raw = NEXT_DATA_RE.captures(html)?.get(1)?.as_str();
    parse_leading_json(raw)
}

/// Number of entries of a JSON array, or of the values of a JSON object.
pub fn collection_len(value: &Value) -> Option<u32> {
    match value {
        Value::Array(items) => Some(items.len() as u32),
        Value::Object(map) => Some(map.len() as u32),
        _ => None,
    }
}

/// Entries of a JSON array, or the values of a JSON object.
pub fn collection_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}

/// A non-empty string at `pointer`.
pub fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// --- Pagination ---

/// A survey split across several pages, of which one is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: Option<u32>,
    pub total: u32,
}

static TOTAL_PAGE_COUNTERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[
        r#"(?i)\bdata-total-pages="(\d+)""#,
        r#"(?i)\bdata-page-count="(\d+)""#,
        r#"(?i)"?totalPages"?\s*:\s*(\d+)"#,
        r#"(?i)"page_count"\s*:\s*(\d+)"#,
        r#"(?i)"?pageCount"?\s*:\s*(\d+)"#,
    ])
});

static CURRENT_PAGE_COUNTERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    id_patterns(&[
        r#"(?i)\bdata-current-page="(\d+)""#,
        r#"(?i)\bdata-page-number="(\d+)""#,
        r#"(?i)"?currentPage"?\s*:\s*(\d+)"#,
        r#"(?i)"?pageNumber"?\s*:\s*(\d+)"#,
        r#"(?i)"current_page"\s*:\s*(\d+)"#,
    ])
});

static PAGE_PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:page|halaman)\s+(\d{1,3})\s*(?:of|dari|/)\s*(\d{1,3})\b").unwrap()
});

static BARE_PROGRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})\s*(?:of|dari)\s*(\d{1,3})\b").unwrap());

static PAGINATION_CONTROLS: LazyLock<Vec<MarkerPattern>> = LazyLock::new(|| {
    [
        "pagination",
        "page-nav",
        "next-button",
        "prev-button",
        "sm-page-progress",
        "progress-bar",
        "step-counter",
    ]
    .into_iter()
    .map(MarkerPattern::class)
    .collect()
});

fn plausible_total(total: u32) -> bool {
    (2..=MAX_PLAUSIBLE_PAGES).contains(&total)
}

fn parse_pair(caps: regex::Captures<'_>) -> Option<(u32, u32)> {
    let current = caps.get(1)?.as_str().parse().ok()?;
    let total = caps.get(2)?.as_str().parse().ok()?;
    (current >= 1 && current <= total).then_some((current, total))
}

/// Detects a multi-page survey from explicit counters, "page N of M"
/// progress text, or pagination controls.
///
/// Controls without any readable total imply at least two pages.
pub fn detect_pagination(html: &str) -> Option<Pagination> {
    let current = capture_first(html, &CURRENT_PAGE_COUNTERS).and_then(|c| c.parse::<u32>().ok());
    let total = capture_first(html, &TOTAL_PAGE_COUNTERS).and_then(|t| t.parse::<u32>().ok());

    if let Some(total) = total {
        return plausible_total(total).then_some(Pagination { current, total });
    }

    if let Some((page, total)) = PAGE_PROGRESS_RE.captures(html).and_then(parse_pair) {
        return plausible_total(total).then_some(Pagination {
            current: Some(page),
            total,
        });
    }

    if PAGINATION_CONTROLS.iter().any(|p| p.is_match(html)) {
        let text = formscout_html::strip_tags(html);
        let (current, total) = match BARE_PROGRESS_RE.captures(&text).and_then(parse_pair) {
            Some((page, total)) if plausible_total(total) => (Some(page), total),
            _ => (current, 2),
        };
        return Some(Pagination { current, total });
    }

    None
}

/// Combines a visible count with pagination into the final count.
///
/// The estimate is never below the visible count and assumes at least two
/// questions on each unseen page.
pub fn with_pagination(visible: u32, pagination: Option<Pagination>) -> QuestionCount {
    match pagination {
        Some(p) if p.total > 1 && visible > 0 => {
            let unseen = p.total - 1;
            let per_page = visible.saturating_mul(p.total);
            let floor = visible.saturating_add(unseen.saturating_mul(visible.max(2)));
            QuestionCount::Estimated {
                visible,
                estimate: per_page.max(floor),
            }
        }
        _ => QuestionCount::Exact(visible),
    }
}

// --- Access Gate ---

/// Decides whether a page is a lockout (sign-in or permission) page.
///
/// A page is only locked out when a lockout signal is present *and* no form
/// content is; account-switcher chrome on a public form is not a lockout.
pub struct AccessGate<'a> {
    pub lockout_markers: &'a [&'a str],
    pub lockout_patterns: &'a [Regex],
    pub content_markers: &'a [&'a str],
    pub content_patterns: &'a [MarkerPattern],
}

impl AccessGate<'_> {
    pub fn has_lockout_signal(&self, html: &str) -> bool {
        self.lockout_markers.iter().any(|m| html.contains(m))
            || self.lockout_patterns.iter().any(|re| re.is_match(html))
    }

    pub fn has_form_content(&self, html: &str) -> bool {
        self.content_markers.iter().any(|m| html.contains(m))
            || self.content_patterns.iter().any(|p| p.is_match(html))
    }

    pub fn is_locked_out(&self, html: &str) -> bool {
        self.has_lockout_signal(html) && !self.has_form_content(html)
    }

    pub fn check(&self, platform: PlatformKind, html: &str) -> Result<(), ExtractError> {
        if self.is_locked_out(html) {
            debug!(?platform, "Lockout page detected");
            return Err(ExtractError::FormNotPublic { platform });
        }
        Ok(())
    }
}
