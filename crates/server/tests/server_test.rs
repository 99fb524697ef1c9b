//! # Server Endpoint Tests
//!
//! Exercises every route against a spawned server, including the mapping of
//! extraction failures to status codes and suggested user actions.

mod common;

use anyhow::Result;
use common::TestApp;
use formscout_server::config::AppConfig;
use formscout_test_utils::fixtures::{google_form_html, google_sign_in_html};
use formscout_test_utils::MockFetcher;
use serde_json::{json, Value};
use std::time::Duration;

const GOOGLE_URL: &str = "https://docs.google.com/forms/d/e/FAKE123/viewform";

#[tokio::test]
async fn test_root_and_health_check_endpoints() -> Result<()> {
    let app = TestApp::spawn().await?;

    let root = app.client.get(format!("{}/", app.address)).send().await?;
    assert!(root.status().is_success());
    assert_eq!("formscout server is running.", root.text().await?);

    let health = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await?;
    assert!(health.status().is_success());
    assert_eq!("OK", health.text().await?);

    Ok(())
}

#[tokio::test]
async fn test_extract_returns_survey_info() -> Result<()> {
    // Arrange
    let app = TestApp::spawn().await?;
    app.fetcher.add_page(
        GOOGLE_URL,
        &google_form_html("Survei Kantin", "Menu baru", &["Nama", "Menu favorit", "Saran"], 0),
    );

    // Act
    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "url": GOOGLE_URL }))
        .send()
        .await?;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["platform"], "GoogleForms");
    assert_eq!(body["title"], "Survei Kantin");
    assert_eq!(body["questionCount"], 3);
    assert_eq!(body["hasPersonalDataQuestions"], false);
    assert_eq!(app.fetcher.get_calls(), vec![GOOGLE_URL.to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_extract_by_query_string() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.fetcher.add_page(
        GOOGLE_URL,
        &google_form_html("Kuesioner", "", &["Umur", "Kota"], 0),
    );

    let response = app
        .client
        .get(format!("{}/extract", app.address))
        .query(&[("url", GOOGLE_URL)])
        .send()
        .await?;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["questionCount"], 2);

    Ok(())
}

#[tokio::test]
async fn test_invalid_url_is_a_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "url": "not a url" }))
        .send()
        .await?;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["action"], "enter_manually");
    assert!(app.fetcher.get_calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_private_form_is_forbidden() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.fetcher.add_page(GOOGLE_URL, &google_sign_in_html());

    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "url": GOOGLE_URL }))
        .send()
        .await?;

    assert_eq!(403, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["action"], "enter_manually");
    assert!(body["error"].as_str().unwrap().contains("Google Forms"));

    Ok(())
}

#[tokio::test]
async fn test_unreachable_page_is_a_bad_gateway() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "url": "https://www.surveymonkey.com/r/GONE" }))
        .send()
        .await?;

    assert_eq!(502, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["action"], "retry_or_enter_manually");

    Ok(())
}

#[tokio::test]
async fn test_deadline_maps_to_gateway_timeout() -> Result<()> {
    let mut config = AppConfig::default();
    config.scanner.deadline_ms = 50;
    let fetcher = MockFetcher::new().with_delay(Duration::from_millis(500));
    fetcher.add_page(GOOGLE_URL, &google_form_html("Lambat", "", &["A"], 0));
    let app = TestApp::spawn_with(config, fetcher).await?;

    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .json(&json!({ "url": GOOGLE_URL }))
        .send()
        .await?;

    assert_eq!(504, response.status().as_u16());

    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(format!("{}/extract", app.address))
        .header("Content-Type", "application/json")
        .body(r#"{"url": "https://forms.gle/x""#)
        .send()
        .await?;

    assert_eq!(400, response.status().as_u16());

    Ok(())
}

#[tokio::test]
async fn test_detect_does_not_fetch() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .get(format!("{}/detect", app.address))
        .query(&[("url", "https://form.typeform.com/to/abc123")])
        .send()
        .await?;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await?;
    assert_eq!(body["platform"], "Typeform");
    assert_eq!(body["supported"], true);
    assert!(app.fetcher.get_calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_platforms_lists_every_strategy() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .get(format!("{}/platforms", app.address))
        .send()
        .await?;

    let body: Vec<Value> = response.json().await?;
    let names: Vec<&str> = body.iter().filter_map(|p| p["name"].as_str()).collect();
    assert!(names.contains(&"Google Forms"));
    assert!(names.contains(&"SurveyMonkey"));

    Ok(())
}
