//! # Proxy Gateway Tests
//!
//! Exercises proxy fallback, plausibility checks and envelope decoding
//! against local mock proxies.

use formscout::{ExtractError, ExtractionRequest, PlatformKind, QuestionCount, SurveyScanner};
use formscout_test_utils::fixtures::google_form_html;
use formscout_web::{
    GatewayConfig, ProxyEndpoint, ProxyGateway, ProxyResponseFormat, DEFAULT_USER_AGENT,
};
use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

/// Initializes tracing for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

const TARGET: &str = "https://docs.google.com/forms/d/e/FAKE123/viewform";

fn raw_proxy(server: &MockServer, name: &str) -> ProxyEndpoint {
    ProxyEndpoint {
        template: format!("{}/{name}?url={{url}}", server.uri()),
        format: ProxyResponseFormat::Raw,
    }
}

fn gateway(proxies: Vec<ProxyEndpoint>) -> ProxyGateway {
    ProxyGateway::new(GatewayConfig {
        proxies,
        attempt_timeout_ms: 1_000,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_short_body_falls_through_to_next_proxy() {
    // --- 1. Arrange ---
    setup_tracing();
    let server = MockServer::start().await;
    let page = "x".repeat(5000);

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("y".repeat(50)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .and(query_param("url", TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_string(page.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page.clone()))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway(vec![
        raw_proxy(&server, "p1"),
        raw_proxy(&server, "p2"),
        raw_proxy(&server, "p3"),
    ]);

    // --- 2. Act ---
    let body = gateway.fetch_via_proxy(TARGET).await.unwrap();

    // --- 3. Assert ---
    assert_eq!(body.len(), 5000);
    assert_eq!(body, page);
}

#[tokio::test]
async fn test_all_proxies_failing_is_exhausted() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/short"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Blocked</html>"))
        .mount(&server)
        .await;

    let gateway = gateway(vec![raw_proxy(&server, "down"), raw_proxy(&server, "short")]);

    let err = gateway.fetch_via_proxy(TARGET).await.unwrap_err();

    assert!(matches!(err, ExtractError::AllProxiesExhausted { attempts: 2 }));
}

#[tokio::test]
async fn test_slow_proxy_times_out_per_attempt() {
    setup_tracing();
    let server = MockServer::start().await;
    let page = "z".repeat(2000);

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page.clone())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page.clone()))
        .mount(&server)
        .await;

    let gateway = ProxyGateway::new(GatewayConfig {
        proxies: vec![raw_proxy(&server, "slow"), raw_proxy(&server, "fast")],
        attempt_timeout_ms: 200,
        ..Default::default()
    })
    .unwrap();

    let body = gateway.fetch_via_proxy(TARGET).await.unwrap();

    assert_eq!(body, page);
}

#[tokio::test]
async fn test_all_origins_envelope_is_unwrapped() {
    setup_tracing();
    let server = MockServer::start().await;
    let page = format!("<html>{}</html>", "a".repeat(1200));

    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param("url", TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "contents": page,
            "status": {"http_code": 200}
        })))
        .mount(&server)
        .await;

    let gateway = gateway(vec![ProxyEndpoint {
        template: format!("{}/get?url={{url}}", server.uri()),
        format: ProxyResponseFormat::AllOriginsJson,
    }]);

    let body = gateway.fetch_via_proxy(TARGET).await.unwrap();

    assert_eq!(body, page);
}

#[tokio::test]
async fn test_platform_override_lowers_threshold() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("t".repeat(400)))
        .mount(&server)
        .await;

    let mut overrides = HashMap::new();
    overrides.insert(PlatformKind::Typeform, 300);
    let gateway = ProxyGateway::new(GatewayConfig {
        proxies: vec![raw_proxy(&server, "p1")],
        min_body_len_overrides: overrides,
        ..Default::default()
    })
    .unwrap();

    // The override applies to Typeform only.
    assert!(gateway
        .fetch_via_proxy("https://acme.typeform.com/to/abc")
        .await
        .is_ok());
    assert!(gateway.fetch_via_proxy(TARGET).await.is_err());
}

#[tokio::test]
async fn test_scanner_over_gateway() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/raw"))
        .and(query_param("url", TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_string(google_form_html(
            "Survei",
            "Deskripsi",
            &["Satu", "Dua", "Tiga", "Empat", "Lima"],
            1,
        )))
        .mount(&server)
        .await;

    let scanner = SurveyScanner::builder()
        .fetcher(Arc::new(gateway(vec![raw_proxy(&server, "raw")])))
        .build()
        .unwrap();

    let info = scanner.extract(&ExtractionRequest::new(TARGET)).await.unwrap();

    assert_eq!(info.question_count, QuestionCount::Exact(5));
    assert_eq!(info.platform, PlatformKind::GoogleForms);
}

#[tokio::test]
async fn test_threshold_counts_characters_not_bytes() {
    // --- 1. Arrange ---
    setup_tracing();
    let server = MockServer::start().await;
    // 600 characters but 1200 bytes: still too short for a 1000 character minimum.
    let multibyte = "é".repeat(600);
    let page = "ü".repeat(1_000);

    Mock::given(method("GET"))
        .and(path("/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(multibyte))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(vec![raw_proxy(&server, "p1"), raw_proxy(&server, "p2")]);

    // --- 2. Act ---
    let body = gateway.fetch_via_proxy(TARGET).await.unwrap();

    // --- 3. Assert ---
    assert_eq!(body, page);
    assert_eq!(body.chars().count(), 1_000);
}

#[tokio::test]
async fn test_requests_carry_browser_user_agent() {
    setup_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/p1"))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("z".repeat(2_000)))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(vec![raw_proxy(&server, "p1")]);

    let body = gateway.fetch_via_proxy(TARGET).await.unwrap();

    assert!(DEFAULT_USER_AGENT.starts_with("Mozilla/5.0"));
    assert_eq!(body.len(), 2_000);
}
