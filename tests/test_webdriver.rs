mod common;

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use e2e_harness::browser::{ElementState, Locator, Page, WebDriverPage};
use e2e_harness::config::{Browser, BrowserSettings};
use e2e_harness::HarnessError;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

fn value(v: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "value": v }))
}

async fn connected(server: &MockServer) -> WebDriverPage {
    Mock::given(method("POST"))
        .and(path("/session"))
        .and(body_partial_json(json!({
            "capabilities": { "alwaysMatch": { "browserName": "firefox" } }
        })))
        .respond_with(value(json!({ "sessionId": "s1", "capabilities": {} })))
        .expect(1)
        .mount(server)
        .await;

    let settings = BrowserSettings {
        webdriver_url: server.uri(),
        browser: Browser::Firefox,
        headless: true,
    };
    WebDriverPage::connect(&settings, "https://hr.example")
        .await
        .expect("session created")
}

#[test_log::test(tokio::test)]
async fn test_goto_resolves_against_base_url() {
    let server = MockServer::start().await;
    let page = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/url"))
        .and(body_json(json!({ "url": "https://hr.example/web/index.php" })))
        .respond_with(value(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    page.goto("/web/index.php").await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_wait_click_and_count_by_css() {
    let server = MockServer::start().await;
    let page = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/elements"))
        .and(body_json(json!({ "using": "css selector", "value": ".oxd-table-card" })))
        .respond_with(value(json!([{ ELEMENT_KEY: "e1" }, { ELEMENT_KEY: "e2" }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/s1/element/e1/displayed"))
        .respond_with(value(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element/e1/click"))
        .respond_with(value(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let rows = Locator::css(".oxd-table-card");
    page.wait_for(&rows, ElementState::Visible, Duration::from_secs(1))
        .await
        .unwrap();
    page.click(&rows).await.unwrap();
    assert_eq!(page.count(&rows).await.unwrap(), 2);
}

#[test_log::test(tokio::test)]
async fn test_chained_locator_searches_inside_parent() {
    let server = MockServer::start().await;
    let page = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/elements"))
        .respond_with(value(json!([{ ELEMENT_KEY: "row0" }, { ELEMENT_KEY: "row1" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/element/row1/elements"))
        .and(body_json(json!({ "using": "css selector", "value": "button" })))
        .respond_with(value(json!([{ ELEMENT_KEY: "edit" }, { ELEMENT_KEY: "trash" }])))
        .expect(1)
        .mount(&server)
        .await;

    let trash = Locator::css(".oxd-table-card")
        .nth(1)
        .locator(Locator::css("button"))
        .nth(1);
    assert_eq!(page.count(&trash).await.unwrap(), 1);
}

#[test_log::test(tokio::test)]
async fn test_wait_times_out_when_nothing_matches() {
    let server = MockServer::start().await;
    let page = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/elements"))
        .respond_with(value(json!([])))
        .mount(&server)
        .await;

    let err = page
        .wait_for(&Locator::css("#never"), ElementState::Visible, Duration::from_millis(250))
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::InteractionTimeout { timeout_ms: 250, .. }), "got {:?}", err);
    page.wait_for(&Locator::css("#never"), ElementState::Detached, Duration::from_millis(250))
        .await
        .unwrap();
}

#[test_log::test(tokio::test)]
async fn test_driver_errors_surface_message() {
    let server = MockServer::start().await;
    let page = connected(&server).await;
    Mock::given(method("GET"))
        .and(path("/session/s1/title"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "value": { "error": "no such window", "message": "window was closed" }
        })))
        .mount(&server)
        .await;

    let err = page.title().await.unwrap_err();

    match err {
        HarnessError::Browser(message) => {
            assert!(message.contains("no such window"), "message: {}", message);
            assert!(message.contains("window was closed"), "message: {}", message);
        }
        other => panic!("expected Browser error, got {:?}", other),
    }
}

#[test_log::test(tokio::test)]
async fn test_screenshot_decodes_png_to_file() {
    let server = MockServer::start().await;
    let page = connected(&server).await;
    let png = b"\x89PNG\r\n\x1a\nfake";
    Mock::given(method("GET"))
        .and(path("/session/s1/screenshot"))
        .respond_with(value(json!(STANDARD.encode(png))))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("shot.png");
    page.screenshot(&file).await.unwrap();

    assert_eq!(std::fs::read(&file).unwrap(), png.to_vec());
}

#[test_log::test(tokio::test)]
async fn test_close_deletes_session() {
    let server = MockServer::start().await;
    let page = connected(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/session/s1"))
        .respond_with(value(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    page.close().await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_malformed_success_body_is_a_driver_error() {
    let server = MockServer::start().await;
    let page = connected(&server).await;
    Mock::given(method("POST"))
        .and(path("/session/s1/elements"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let err = page.count(&Locator::css(".oxd-table-card")).await.unwrap_err();

    match err {
        HarnessError::Browser(message) => assert!(message.contains("malformed body"), "message: {}", message),
        other => panic!("expected Browser error, got {:?}", other),
    }
}
