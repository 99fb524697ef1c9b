//! Survey page builders shaped like what each platform actually serves.

use serde_json::{json, Value};

/// Pads `html` with an HTML comment until it is at least `len` bytes long.
pub fn pad_to(html: &str, len: usize) -> String {
    if html.len() >= len {
        return html.to_string();
    }
    let filler = "x".repeat(len - html.len());
    format!("{html}<!--{filler}-->")
}

/// A Google Forms page embedding an `FB_PUBLIC_LOAD_DATA_` blob with the
/// given questions, followed by `page_breaks` page-break items.
pub fn google_form_html(
    title: &str,
    description: &str,
    questions: &[&str],
    page_breaks: usize,
) -> String {
    let mut items: Vec<Value> = questions
        .iter()
        .enumerate()
        .map(|(i, text)| json!([1000 + i, text, null, 0, [[2000 + i, null, 0]]]))
        .collect();
    for i in 0..page_breaks {
        items.push(json!([3000 + i, format!("Bagian {}", i + 2), null, 8]));
    }

    let mut data = vec![Value::Null; 15];
    data[1] = json!([
        description,
        items,
        null, null, null, null, null, null,
        title,
        null,
        [0, 0, null, null, null, null, 0]
    ]);
    data[2] = json!("/forms");
    data[3] = json!(title);
    data[14] = json!("1FAIpQLSeFAKE123");

    let blob = Value::Array(data);
    pad_to(
        &format!(
            "<!DOCTYPE html><html><head><title>{title} - Google Forms</title>\
             <meta property=\"og:description\" content=\"{description}\"></head>\
             <body><div class=\"freebirdFormviewerViewFormCard\"></div>\
             <script type=\"text/javascript\" nonce=\"abc\">var FB_PUBLIC_LOAD_DATA_ = {blob};</script>\
             </body></html>"
        ),
        2000,
    )
}

/// A Google sign-in interstitial served instead of a restricted form.
pub fn google_sign_in_html() -> String {
    pad_to(
        "<html><head><title>Google Forms - sign in</title></head><body>\
         <h1>Sign in to continue</h1>\
         <a href=\"https://accounts.google.com/ServiceLogin?continue=https://docs.google.com/forms\">Sign in</a>\
         </body></html>",
        1500,
    )
}

/// A public Google form rendered with account chrome but no embedded blob.
pub fn google_rendered_form_html(account_email: &str, questions: &[&str]) -> String {
    let items: String = questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            format!(
                "<div role=\"listitem\" class=\"freebirdFormviewerComponentsQuestionBaseRoot\" data-item-id=\"{i}\">\
                 <span>{q}</span></div>"
            )
        })
        .collect();
    format!(
        "<html><head><title>Rendered - Google Forms</title></head><body>\
         <header><span>{account_email}</span><a>Switch account</a><span>Not shared</span></header>\
         <div role=\"list\">{items}</div></body></html>"
    )
}

/// One visible page of a paginated SurveyMonkey survey.
pub fn survey_monkey_page_html(visible_questions: usize, current: u32, total: u32) -> String {
    let questions: String = (0..visible_questions)
        .map(|i| {
            format!(
                "<div class=\"question-container\" data-question-id=\"q{i}\"><h4 id=\"question-title-q{i}\">Q{i}</h4></div>"
            )
        })
        .collect();
    format!(
        "<html><head><title>Riset Pasar Survey</title></head><body>\
         <div class=\"pagination\">Page {current} of {total}</div>\
         {questions}\
         <button class=\"next-button\">Next</button></body></html>"
    )
}

/// An OpinionX page whose Next.js payload carries the survey under
/// `props.pageProps.<node>` (`survey` or `study`).
pub fn opinionx_next_data_html(node: &str, title: &str, questions: &[&str]) -> String {
    let items: Vec<Value> = questions
        .iter()
        .enumerate()
        .map(|(i, text)| json!({ "id": format!("q{i}"), "text": text }))
        .collect();
    let data = json!({
        "props": {
            "pageProps": {
                node: {
                    "title": title,
                    "description": "Bantu kami memilih fitur",
                    "questions": items
                }
            }
        },
        "page": "/s/[id]"
    });
    format!(
        "<html><head><title>{title} | OpinionX</title></head><body><div id=\"__next\"></div>\
         <script id=\"__NEXT_DATA__\" type=\"application/json\">{data}</script></body></html>"
    )
}
