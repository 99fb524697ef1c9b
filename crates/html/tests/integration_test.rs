//! # HTML Crate Integration Tests
//!
//! Covers title/meta lookup, container text and chrome removal.

#[cfg(test)]
mod tests {
    use formscout_html::{clean_html, element_text, first_meta, meta_content, page_title};

    #[test]
    fn test_clean_html() {
        let html_content = r#"
        <html>
            <head>
                <title>Test</title>
                <style>body { color: red; }</style>
                <script>alert("hello");</script>
                <link rel="stylesheet" href="style.css">
            </head>
            <body>
                <h1>Hello</h1>
                <p>This is a test.</p>
                <meta name="author" content="Test">
            </body>
        </html>
        "#;

        // Test with default tags
        let cleaned_default = clean_html(html_content, None);
        assert!(!cleaned_default.contains("<style>"));
        assert!(!cleaned_default.contains("<script>"));
        assert!(!cleaned_default.contains("<link"));
        assert!(!cleaned_default.contains("<meta"));
        assert!(cleaned_default.contains("<h1>Hello</h1>"));

        // Test with custom tags
        let cleaned_custom = clean_html(html_content, Some(&["p", "h1"]));
        assert!(cleaned_custom.contains("<style>")); // Should not be removed
        assert!(!cleaned_custom.contains("<h1>Hello</h1>"));
        assert!(!cleaned_custom.contains("<p>This is a test.</p>"));

        // Test with no tags
        let cleaned_none = clean_html(html_content, Some(&[]));
        assert_eq!(cleaned_none, html_content);
    }

    #[test]
    fn test_page_title_trims_and_decodes() {
        let html = "<html><head><title>\n  Survei Kepuasan &amp; Layanan - Google Forms </title></head></html>";
        assert_eq!(
            page_title(html).as_deref(),
            Some("Survei Kepuasan & Layanan - Google Forms")
        );
        assert_eq!(page_title("<html><head><title>  </title></head></html>"), None);
    }

    #[test]
    fn test_meta_lookup_by_name_or_property() {
        let html = r#"<html><head>
            <meta property="og:description" content="Open graph text">
            <meta name="description" content="  Plain description ">
        </head><body></body></html>"#;

        assert_eq!(
            meta_content(html, "description").as_deref(),
            Some("Plain description")
        );
        assert_eq!(
            meta_content(html, "og:description").as_deref(),
            Some("Open graph text")
        );
        assert_eq!(
            first_meta(html, &["og:title", "og:description"]).as_deref(),
            Some("Open graph text")
        );
        assert_eq!(meta_content(html, "og:title"), None);
    }

    #[test]
    fn test_element_text_selects_container() {
        let html = r#"<div class="header">Switch account</div>
            <div role="list"><div>Nama lengkap</div><div>Nomor HP</div></div>"#;
        assert_eq!(
            element_text(html, r#"div[role="list"]"#).as_deref(),
            Some("Nama lengkap Nomor HP")
        );
        assert_eq!(element_text(html, "section.missing"), None);
    }
}
