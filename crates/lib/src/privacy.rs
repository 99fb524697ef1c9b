//! # Personal-Data Scanner
//!
//! Flags forms whose questions solicit contact details or payout accounts.
//!
//! Only the question region of a page is scanned; account chrome such as the
//! signed-in user's address or a "Switch account" link must never produce a
//! keyword. The one exception is automatic e-mail collection, which Google
//! discloses outside the question list and which therefore needs both a UI
//! indicator and a consent phrase.

use crate::pipeline::parse_leading_json;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// A kind of personal data a form asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PersonalDataCategory {
    Email,
    Phone,
    WhatsApp,
    EWalletReward,
    AutoEmailCollection,
}

impl PersonalDataCategory {
    /// The keyword reported for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalDataCategory::Email => "email",
            PersonalDataCategory::Phone => "nomor hp",
            PersonalDataCategory::WhatsApp => "whatsapp",
            PersonalDataCategory::EWalletReward => "e-wallet/hadiah",
            PersonalDataCategory::AutoEmailCollection => "email otomatis",
        }
    }
}

/// The outcome of a scan. Each category appears in `keywords` at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDataReport {
    pub has_personal_data: bool,
    pub keywords: Vec<String>,
}

/// Patterns per category. Compiled case-insensitively.
const CATEGORY_PATTERNS: &[(PersonalDataCategory, &[&str])] = &[
    (
        PersonalDataCategory::Email,
        &[
            r"\b(?:alamat\s+)?e-?mail\s+(?:address|anda|kamu)\b",
            r"\b(?:masukkan|isi|tulis|input|enter|provide)\s+(?:alamat\s+)?e-?mail\b",
            r"\byour\s+e-?mail\b",
            r"\balamat\s+surel\b",
        ],
    ),
    (
        PersonalDataCategory::Phone,
        &[
            r"\b(?:masukkan|isi|tulis|input|enter)\s+(?:nomor|no\.?)\s+(?:hp|handphone|telepon|telp|ponsel)\b",
            r"\bnomor\s+(?:hp|handphone|telepon|telp|ponsel)\b",
            r"\bno\.?\s+(?:hp|telp)\b",
            r"\b(?:phone|mobile|cell)\s+number\b",
        ],
    ),
    (
        PersonalDataCategory::WhatsApp,
        &[
            r"\b(?:nomor|no\.?)\s+(?:whatsapp|wa)\b",
            r"\bwhatsapp\s+(?:number|nomor|contact)\b",
            r"\bkontak\s+(?:whatsapp|wa)\b",
        ],
    ),
    (
        PersonalDataCategory::EWalletReward,
        &[
            r"\b(?:masukkan|isi|tulis|input|enter)\s+(?:nomor\s+)?(?:dana|gopay|ovo|shopeepay|linkaja|e-?wallet)\b",
            r"\b(?:nomor|akun|no\.?)\s+(?:dana|ovo|gopay|shopeepay|linkaja|e-?wallet)\b",
            r"\b(?:dana|gopay|ovo|shopeepay|linkaja)\s+(?:anda|kamu)\b",
            r"\b(?:transfer|kirim|pengiriman)\s+(?:hadiah|uang|dana)\s+(?:ke|melalui|via)\b",
            r"\b(?:melalui|via)\s+(?:dana|gopay|ovo|shopeepay|linkaja|e-?wallet)\s+(?:nomor|ke)\b",
            r"\b(?:dikirim|diterima)\s+(?:hadiah|reward|prize)\s+(?:melalui|via|ke)\b",
            r"\b(?:hadiah|reward|prize)\s+akan\s+(?:dikirim|diterima|ditransfer|transfer)\b",
            r"\bnomor\s+rekening\b",
        ],
    ),
];

static COMPILED_PATTERNS: LazyLock<Vec<(PersonalDataCategory, Vec<Regex>)>> = LazyLock::new(|| {
    CATEGORY_PATTERNS
        .iter()
        .map(|(category, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
                .collect();
            (*category, compiled)
        })
        .collect()
});

static EMAIL_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<input\b[^>]*(?:\btype="email"|\bname="[^"]*email[^"]*")"#).unwrap()
});

static PHONE_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<input\b[^>]*(?:\btype="tel"|\bname="[^"]*(?:phone|tel|hp)[^"]*")"#).unwrap()
});

static EMAIL_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap()
});

static FB_DATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var\s+FB_PUBLIC_LOAD_DATA_\s*=\s*").unwrap());

static CHROME_PHRASES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)switch\s+account|not\s+shared|ganti\s+akun|tidak\s+dibagikan").unwrap()
});

static EMAIL_CONSENT_RE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)record\s+\S+@\S+\s+as\s+the\s+email\s+to\s+be\s+included",
        r"(?i)email\s+to\s+be\s+included\s+with\s+my\s+response",
        r"(?i)collect(?:s|ing)?\s+email\s+addresses",
        r"(?i)catat\s+\S+@\S+\s+sebagai\s+email",
        r"(?i)sebagai\s+email\s+yang\s+(?:akan\s+)?disertakan",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const QUESTION_CONTAINERS: &[&str] = &[r#"div[role="list"]"#, ".freebirdFormviewerViewItemsList"];

/// The part of a page that holds its questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRegion {
    /// Markup of the region, for input-type checks.
    pub markup: String,
    /// Plain text of the region, for phrase matching.
    pub text: String,
}

/// Isolates the question region, preferring the embedded form definition,
/// then the rendered question list, then the page with its chrome removed.
pub fn question_region(html: &str) -> QuestionRegion {
    let embedded = FB_DATA_RE
        .find(html)
        .and_then(|m| parse_leading_json(&html[m.end()..]));
    if let Some(data) = embedded {
        let text = data.to_string();
        return QuestionRegion {
            markup: String::new(),
            text,
        };
    }

    if let Some(markup) = QUESTION_CONTAINERS
        .iter()
        .find_map(|css| formscout_html::element_html(html, css))
    {
        let text = formscout_html::strip_tags(&markup);
        return QuestionRegion { markup, text };
    }

    let cleaned = formscout_html::clean_html(html, None);
    let cleaned = EMAIL_ADDRESS_RE.replace_all(&cleaned, " ");
    let cleaned = CHROME_PHRASES_RE.replace_all(&cleaned, " ").into_owned();
    let text = formscout_html::strip_tags(&cleaned);
    QuestionRegion {
        markup: cleaned,
        text,
    }
}

/// Whether the page says it will record the respondent's e-mail automatically.
pub fn collects_email_automatically(html: &str) -> bool {
    CHROME_PHRASES_RE.is_match(html) && EMAIL_CONSENT_RE.iter().any(|re| re.is_match(html))
}

/// Scans a page for personal-data questions.
pub fn scan(html: &str) -> PersonalDataReport {
    let region = question_region(html);
    let mut found: Vec<PersonalDataCategory> = Vec::new();

    for (category, patterns) in COMPILED_PATTERNS.iter() {
        if patterns.iter().any(|re| re.is_match(&region.text)) {
            found.push(*category);
        }
    }
    if EMAIL_INPUT_RE.is_match(&region.markup) && !found.contains(&PersonalDataCategory::Email) {
        found.push(PersonalDataCategory::Email);
    }
    if PHONE_INPUT_RE.is_match(&region.markup) && !found.contains(&PersonalDataCategory::Phone) {
        found.push(PersonalDataCategory::Phone);
    }
    if collects_email_automatically(html) {
        found.push(PersonalDataCategory::AutoEmailCollection);
    }

    PersonalDataReport {
        has_personal_data: !found.is_empty(),
        keywords: found.iter().map(|c| c.as_str().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_prefers_embedded_definition() {
        let html = r#"<header>me@example.com Switch account</header>
            <script>var FB_PUBLIC_LOAD_DATA_ = [null,["",[[1,"Nomor WhatsApp",null,0]]]];</script>"#;
        let region = question_region(html);
        assert!(region.text.contains("Nomor WhatsApp"));
        assert!(!region.text.contains("Switch account"));
    }

    #[test]
    fn test_fallback_region_strips_chrome() {
        let html = r#"<html><body><nav>Menu</nav>
            <p>siswa@sekolah.id Ganti akun</p><p>Apa hobi kamu?</p></body></html>"#;
        let region = question_region(html);
        assert!(!region.text.contains("siswa@sekolah.id"));
        assert!(!region.text.to_lowercase().contains("ganti akun"));
        assert!(region.text.contains("Apa hobi kamu?"));
    }

    #[test]
    fn test_input_types_in_region() {
        let html = r#"<div role="list"><div><input type="email" aria-label="x"></div>
            <div><input type="tel"></div></div>"#;
        let report = scan(html);
        assert_eq!(report.keywords, vec!["email", "nomor hp"]);
    }

    #[test]
    fn test_auto_email_collection_needs_both_signals() {
        let consent = "<p>Record me@example.com as the email to be included with my response</p>";
        let indicator = "<p>Switch account</p>";
        assert!(!collects_email_automatically(consent));
        assert!(!collects_email_automatically(indicator));

        let both = format!("{indicator}{consent}<div role=\"list\"><p>Umur?</p></div>");
        let report = scan(&both);
        assert_eq!(report.keywords, vec!["email otomatis"]);
        assert!(report.has_personal_data);
    }

    #[test]
    fn test_e_wallet_reward() {
        let html = r#"<div role="list"><span>Hadiah berupa saldo e-wallet untuk 10 pemenang. Nomor DANA kamu?</span></div>"#;
        assert_eq!(scan(html).keywords, vec!["e-wallet/hadiah"]);

        let mention = r#"<div role="list"><span>Kami menerima pembayaran via e-wallet maupun dompet digital.</span></div>"#;
        assert!(scan(mention).keywords.is_empty());
    }
}
