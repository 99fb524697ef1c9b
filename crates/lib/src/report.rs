//! Plain-text rendering of a [`SurveyInfo`] for terminals and logs.

use crate::types::SurveyInfo;
use std::fmt::Write;

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Renders one `Label: value` line per known field. Absent optional fields
/// are omitted.
pub fn render_text(info: &SurveyInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Platform:    {}", info.platform.display_name());
    let _ = writeln!(out, "Title:       {}", info.title);
    let _ = writeln!(out, "Description: {}", info.description);
    let _ = writeln!(out, "Questions:   {}", info.question_count);
    if let Some(sections) = info.section_count {
        let _ = writeln!(out, "Sections:    {sections}");
    }
    if let Some(pages) = info.total_pages {
        let _ = writeln!(out, "Pages:       {pages}");
    }
    if let Some(id) = &info.form_id {
        let _ = writeln!(out, "Form ID:     {id}");
    }

    let flags = [
        ("Quiz", info.is_quiz),
        ("Requires login", info.requires_login),
        ("Accepting responses", info.accepting_responses),
        ("Paid feature", info.is_paid_feature),
        ("Payment fields", info.has_payment),
        ("Encrypted", info.is_encrypted),
    ];
    for (label, value) in flags {
        if let Some(v) = value {
            let _ = writeln!(out, "{label}: {}", yes_no(v));
        }
    }

    if let Some(personal) = info.has_personal_data_questions {
        if info.detected_keywords.is_empty() {
            let _ = writeln!(out, "Personal data: {}", yes_no(personal));
        } else {
            let _ = writeln!(
                out,
                "Personal data: {} ({})",
                yes_no(personal),
                info.detected_keywords.join(", ")
            );
        }
    }
    if let Some(note) = &info.note {
        let _ = writeln!(out, "Note: {note}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PlatformKind, QuestionCount};

    #[test]
    fn test_render_text() {
        let mut info = SurveyInfo::new(PlatformKind::SurveyMonkey);
        info.title = "Kepuasan".to_string();
        info.question_count = QuestionCount::Estimated {
            visible: 5,
            estimate: 15,
        };
        info.total_pages = Some(3);
        info.requires_login = Some(false);
        info.has_personal_data_questions = Some(true);
        info.detected_keywords = vec!["nomor hp".to_string()];

        let text = render_text(&info);
        assert!(text.contains("Platform:    SurveyMonkey"));
        assert!(text.contains("Questions:   5+ (estimated: 15)"));
        assert!(text.contains("Pages:       3"));
        assert!(text.contains("Requires login: no"));
        assert!(text.contains("Personal data: yes (nomor hp)"));
        assert!(!text.contains("Form ID"));
        assert!(!text.contains("Quiz"));
    }
}
