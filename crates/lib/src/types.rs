use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// --- Shared Constants ---

/// Placeholder for any metadata field that could not be recovered.
pub const NOT_AVAILABLE: &str = "Not available";

/// Question count reported when every counting strategy comes up empty.
pub const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Bodies shorter than this are treated as proxy error pages.
pub const MIN_PLAUSIBLE_BODY_LEN: usize = 1000;

// --- Platform ---

/// The survey platforms the extractor knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformKind {
    #[serde(alias = "googleforms", alias = "google_forms")]
    GoogleForms,
    #[serde(alias = "surveymonkey", alias = "survey_monkey")]
    SurveyMonkey,
    #[serde(alias = "typeform")]
    Typeform,
    #[serde(alias = "microsoftforms", alias = "microsoft_forms")]
    MicrosoftForms,
    #[serde(alias = "jotform", alias = "jot_form")]
    JotForm,
    #[serde(alias = "opinionx", alias = "opinion_x")]
    OpinionX,
    #[serde(alias = "unknown")]
    Unknown,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 7] = [
        PlatformKind::GoogleForms,
        PlatformKind::SurveyMonkey,
        PlatformKind::Typeform,
        PlatformKind::MicrosoftForms,
        PlatformKind::JotForm,
        PlatformKind::OpinionX,
        PlatformKind::Unknown,
    ];

    /// Human-readable platform name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformKind::GoogleForms => "Google Forms",
            PlatformKind::SurveyMonkey => "SurveyMonkey",
            PlatformKind::Typeform => "Typeform",
            PlatformKind::MicrosoftForms => "Microsoft Forms",
            PlatformKind::JotForm => "JotForm",
            PlatformKind::OpinionX => "OpinionX",
            PlatformKind::Unknown => "Unknown",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, PlatformKind::Unknown)
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// --- Question Count ---

/// A question count that is either authoritative or an estimate for a
/// paginated survey of which only one page was visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionCount {
    Exact(u32),
    Estimated { visible: u32, estimate: u32 },
}

impl QuestionCount {
    /// The number of questions actually observed.
    pub fn lower_bound(&self) -> u32 {
        match self {
            QuestionCount::Exact(n) => *n,
            QuestionCount::Estimated { visible, .. } => *visible,
        }
    }

    pub fn is_estimated(&self) -> bool {
        matches!(self, QuestionCount::Estimated { .. })
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionCount::Exact(n) => write!(f, "{n}"),
            QuestionCount::Estimated { visible, estimate } => {
                write!(f, "{visible}+ (estimated: {estimate})")
            }
        }
    }
}

/// Exact counts serialize as numbers, estimates as their display string.
impl Serialize for QuestionCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuestionCount::Exact(n) => serializer.serialize_u32(*n),
            QuestionCount::Estimated { .. } => serializer.collect_str(self),
        }
    }
}

// --- Survey Info ---

/// The normalised metadata record produced for every extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyInfo {
    pub title: String,
    pub description: String,
    pub question_count: QuestionCount,
    pub platform: PlatformKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_quiz: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_login: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepting_responses: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid_feature: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_payment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_encrypted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_personal_data_questions: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detected_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SurveyInfo {
    /// An empty record for `platform` with every text field "Not available"
    /// and the default question count.
    pub fn new(platform: PlatformKind) -> Self {
        Self {
            title: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            question_count: QuestionCount::Exact(DEFAULT_QUESTION_COUNT),
            platform,
            form_id: None,
            section_count: None,
            total_pages: None,
            is_quiz: None,
            requires_login: None,
            accepting_responses: None,
            is_paid_feature: None,
            has_payment: None,
            is_encrypted: None,
            has_personal_data_questions: None,
            detected_keywords: Vec::new(),
            note: None,
        }
    }

    /// Sets the title unless `title` is blank.
    pub fn set_title(&mut self, title: Option<String>) {
        if let Some(t) = title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
            self.title = t;
        }
    }

    /// Sets the description unless `description` is blank.
    pub fn set_description(&mut self, description: Option<String>) {
        if let Some(d) = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
        {
            self.description = d;
        }
    }

    /// Appends a sentence to the caveat note.
    pub fn push_note(&mut self, text: &str) {
        match &mut self.note {
            Some(note) => {
                note.push(' ');
                note.push_str(text);
            }
            None => self.note = Some(text.to_string()),
        }
    }
}

/// Input to an extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub url: String,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
