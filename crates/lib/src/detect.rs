//! # Platform Detection
//!
//! Pure substring matching of a survey URL against a fixed domain table.

use crate::types::PlatformKind;

/// URL fragments and the platform they identify, checked in order.
const PLATFORM_TABLE: &[(&str, PlatformKind)] = &[
    ("docs.google.com/forms", PlatformKind::GoogleForms),
    ("forms.gle", PlatformKind::GoogleForms),
    ("surveymonkey.com", PlatformKind::SurveyMonkey),
    ("typeform.com", PlatformKind::Typeform),
    ("forms.office.com", PlatformKind::MicrosoftForms),
    ("forms.microsoft.com", PlatformKind::MicrosoftForms),
    ("jotform.com", PlatformKind::JotForm),
    ("opinionx.co", PlatformKind::OpinionX),
    ("opnx.to", PlatformKind::OpinionX),
];

/// Classifies `url`, falling back to [`PlatformKind::Unknown`].
pub fn detect(url: &str) -> PlatformKind {
    let lower = url.trim().to_ascii_lowercase();
    PLATFORM_TABLE
        .iter()
        .find(|(fragment, _)| lower.contains(fragment))
        .map(|(_, kind)| *kind)
        .unwrap_or(PlatformKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_platforms() {
        let cases = [
            ("https://docs.google.com/forms/d/e/FAKE123/viewform", PlatformKind::GoogleForms),
            ("https://forms.gle/AbCdEf123", PlatformKind::GoogleForms),
            ("https://www.surveymonkey.com/r/KerjaKelompok", PlatformKind::SurveyMonkey),
            ("https://acme.typeform.com/to/Xy12Ab", PlatformKind::Typeform),
            (
                "https://forms.office.com/Pages/ResponsePage.aspx?id=abc",
                PlatformKind::MicrosoftForms,
            ),
            ("https://forms.microsoft.com/r/abc", PlatformKind::MicrosoftForms),
            ("https://form.jotform.com/230123456789", PlatformKind::JotForm),
            ("https://app.opinionx.co/s/survey-1", PlatformKind::OpinionX),
            ("https://opnx.to/abc", PlatformKind::OpinionX),
        ];
        for (url, expected) in cases {
            assert_eq!(detect(url), expected, "url: {url}");
        }
    }

    #[test]
    fn test_detect_is_case_insensitive_and_falls_back_to_unknown() {
        assert_eq!(
            detect("HTTPS://DOCS.GOOGLE.COM/FORMS/d/e/X/viewform"),
            PlatformKind::GoogleForms
        );
        assert_eq!(detect("https://example.com/survey"), PlatformKind::Unknown);
        assert_eq!(detect(""), PlatformKind::Unknown);
    }
}
