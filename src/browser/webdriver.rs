//! [`Page`] over the W3C WebDriver HTTP protocol.
//!
//! Talks to any WebDriver server (chromedriver, geckodriver, Selenium) with
//! plain JSON requests. Role and text selectors are translated to XPath;
//! chained locators are resolved segment by segment from element to element.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::browser::locator::{ElementState, Locator, Selector};
use crate::browser::page::Page;
use crate::config::{Browser, BrowserSettings};
use crate::error::{HarnessError, HarnessResult};

/// Key of element references in WebDriver payloads.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

pub struct WebDriverPage {
    http: Client,
    session_url: String,
    base_url: String,
}

impl WebDriverPage {
    /// Open a new browser session. Relative `goto` targets resolve against
    /// `base_url`.
    pub async fn connect(settings: &BrowserSettings, base_url: impl Into<String>) -> HarnessResult<Self> {
        let http = Client::builder().timeout(COMMAND_TIMEOUT).build()?;
        let server = settings.webdriver_url.trim_end_matches('/');

        info!(
            "Starting {} session on {}",
            settings.browser.capability_name(),
            server
        );
        let value = send(
            &http,
            Method::POST,
            &format!("{}/session", server),
            Some(json!({ "capabilities": capabilities(settings) })),
        )
        .await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| HarnessError::Browser("new session response has no sessionId".to_string()))?;
        debug!("WebDriver session {}", session_id);

        Ok(Self {
            session_url: format!("{}/session/{}", server, session_id),
            http,
            base_url: base_url.into(),
        })
    }

    /// End the browser session.
    pub async fn close(&self) -> HarnessResult<()> {
        self.command(Method::DELETE, "", None).await?;
        info!("Browser session closed");
        Ok(())
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("data:") {
            return url.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        match url.strip_prefix('/') {
            Some(rest) => format!("{}/{}", base, rest),
            None => format!("{}/{}", base, url),
        }
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> HarnessResult<Value> {
        send(&self.http, method, &format!("{}{}", self.session_url, path), body).await
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> HarnessResult<Value> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn find_from(&self, parent: Option<&str>, using: &str, value: &str) -> HarnessResult<Vec<String>> {
        let path = match parent {
            Some(id) => format!("/element/{}/elements", id),
            None => "/elements".to_string(),
        };
        let found = self
            .command(Method::POST, &path, Some(json!({ "using": using, "value": value })))
            .await?;

        Ok(found
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get(ELEMENT_KEY).and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// All element ids matching the full locator chain, in document order.
    async fn find_all(&self, locator: &Locator) -> HarnessResult<Vec<String>> {
        let mut scope: Option<Vec<String>> = None;

        for segment in locator.segments() {
            let (using, value) = strategy(&segment.selector, scope.is_some());
            let mut found = match &scope {
                None => self.find_from(None, using, &value).await?,
                Some(parents) => {
                    let mut children = Vec::new();
                    for parent in parents {
                        children.extend(self.find_from(Some(parent), using, &value).await?);
                    }
                    children
                }
            };
            if let Some(n) = segment.nth {
                found = found.into_iter().nth(n).into_iter().collect();
            }
            if found.is_empty() {
                return Ok(found);
            }
            scope = Some(found);
        }

        Ok(scope.unwrap_or_default())
    }

    async fn first(&self, locator: &Locator) -> HarnessResult<String> {
        self.find_all(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::Browser(format!("no element matches {}", locator)))
    }

    async fn element_command(&self, locator: &Locator, method: Method, action: &str, body: Option<Value>) -> HarnessResult<Value> {
        let id = self.first(locator).await?;
        self.command(method, &format!("/element/{}/{}", id, action), body).await
    }

    async fn is_displayed(&self, id: &str) -> HarnessResult<bool> {
        let value = self
            .command(Method::GET, &format!("/element/{}/displayed", id), None)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn state_reached(&self, locator: &Locator, state: ElementState) -> HarnessResult<bool> {
        let ids = self.find_all(locator).await?;
        match state {
            ElementState::Attached => Ok(!ids.is_empty()),
            ElementState::Detached => Ok(ids.is_empty()),
            ElementState::Visible => match ids.first() {
                Some(id) => self.is_displayed(id).await,
                None => Ok(false),
            },
            ElementState::Hidden => match ids.first() {
                Some(id) => Ok(!self.is_displayed(id).await?),
                None => Ok(true),
            },
        }
    }
}

#[async_trait]
impl Page for WebDriverPage {
    async fn goto(&self, url: &str) -> HarnessResult<()> {
        let url = self.resolve_url(url);
        self.command(Method::POST, "/url", Some(json!({ "url": url }))).await?;
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, state: ElementState, timeout: Duration) -> HarnessResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.state_reached(locator, state).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                // stale references are expected while the DOM re-renders
                Err(e) => debug!("Polling {} failed: {}", locator, e),
            }
            if Instant::now() >= deadline {
                return Err(HarnessError::InteractionTimeout {
                    locator: locator.to_string(),
                    state: state.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, locator: &Locator) -> HarnessResult<()> {
        self.element_command(locator, Method::POST, "click", Some(json!({}))).await?;
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> HarnessResult<()> {
        self.element_command(locator, Method::POST, "clear", Some(json!({}))).await?;
        Ok(())
    }

    async fn focus(&self, locator: &Locator) -> HarnessResult<()> {
        let id = self.first(locator).await?;
        self.execute("arguments[0].focus();", vec![json!({ ELEMENT_KEY: id })])
            .await?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> HarnessResult<()> {
        self.element_command(locator, Method::POST, "value", Some(json!({ "text": value })))
            .await?;
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> HarnessResult<Option<String>> {
        let value = self.element_command(locator, Method::GET, "text", None).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn is_enabled(&self, locator: &Locator) -> HarnessResult<bool> {
        let value = self.element_command(locator, Method::GET, "enabled", None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn count(&self, locator: &Locator) -> HarnessResult<usize> {
        Ok(self.find_all(locator).await?.len())
    }

    async fn title(&self) -> HarnessResult<String> {
        let value = self.command(Method::GET, "/title", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn screenshot(&self, path: &Path) -> HarnessResult<()> {
        let value = self.command(Method::GET, "/screenshot", None).await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| HarnessError::Browser("screenshot response is not a string".to_string()))?;
        let png = STANDARD
            .decode(encoded)
            .map_err(|e| HarnessError::Browser(format!("screenshot is not valid base64: {}", e)))?;
        tokio::fs::write(path, png).await?;
        Ok(())
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> HarnessResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let ready = self.execute("return document.readyState;", vec![]).await?;
            if ready.as_str() == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(HarnessError::InteractionTimeout {
                    locator: "document".to_string(),
                    state: "loaded".to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

/// Issue one WebDriver command and unwrap its `value`.
async fn send(http: &Client, method: Method, url: &str, body: Option<Value>) -> HarnessResult<Value> {
    let mut request = http.request(method.clone(), url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let error = payload["value"]["error"].as_str().unwrap_or("unknown error");
        let message = payload["value"]["message"].as_str().unwrap_or_default();
        return Err(HarnessError::Browser(format!(
            "{} {} returned {}: {} {}",
            method,
            url,
            status.as_u16(),
            error,
            message
        )));
    }
    let payload: Value = serde_json::from_str(&body).map_err(|e| {
        HarnessError::Browser(format!("{} {} returned a malformed body: {}", method, url, e))
    })?;
    Ok(payload.get("value").cloned().unwrap_or(Value::Null))
}

fn capabilities(settings: &BrowserSettings) -> Value {
    let mut always = json!({ "browserName": settings.browser.capability_name() });
    if settings.headless {
        match settings.browser {
            Browser::Chromium => {
                always["goog:chromeOptions"] = json!({ "args": ["--headless=new", "--window-size=1280,720"] })
            }
            Browser::Firefox => always["moz:firefoxOptions"] = json!({ "args": ["-headless"] }),
        }
    }
    json!({ "alwaysMatch": always })
}

/// WebDriver location strategy for one selector. `nested` lookups run
/// relative to a parent element, so absolute XPath is made relative.
fn strategy(selector: &Selector, nested: bool) -> (&'static str, String) {
    match selector {
        Selector::Css(css) => ("css selector", css.clone()),
        Selector::XPath(xpath) if nested && xpath.starts_with('/') => ("xpath", format!(".{}", xpath)),
        Selector::XPath(xpath) => ("xpath", xpath.clone()),
        Selector::Role { role, name, exact } => ("xpath", role_xpath(role, name, *exact)),
        Selector::Text(text) => (
            "xpath",
            format!(".//*[text()[contains(normalize-space(.), {})]]", xpath_literal(text)),
        ),
    }
}

fn role_xpath(role: &str, name: &str, exact: bool) -> String {
    let base = match role {
        "heading" => "*[self::h1 or self::h2 or self::h3 or self::h4 or self::h5 or self::h6 or @role='heading']".to_string(),
        "link" => "*[self::a or @role='link']".to_string(),
        "button" => "*[self::button or @role='button' or (self::input and (@type='button' or @type='submit'))]".to_string(),
        "textbox" => "*[(self::input and (not(@type) or @type='text' or @type='password' or @type='email' or @type='search')) or self::textarea or @role='textbox']".to_string(),
        other => format!("*[@role={}]", xpath_literal(other)),
    };
    if name.is_empty() {
        return format!(".//{}", base);
    }

    let sources = ["normalize-space(.)", "@aria-label", "@placeholder", "@value"];
    let predicate = if exact {
        let literal = xpath_literal(name);
        sources.map(|s| format!("{}={}", s, literal)).join(" or ")
    } else {
        let needle = xpath_literal(&name.to_lowercase());
        sources
            .map(|s| format!("contains(translate({}, '{}', '{}'), {})", s, UPPER, LOWER, needle))
            .join(" or ")
    };
    format!(".//{}[{}]", base, predicate)
}

/// Quote `s` as an XPath string literal.
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{}'", s)
    } else if !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("PIM"), "'PIM'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(xpath_literal("a'b\"c"), "concat('a', \"'\", 'b\"c')");
    }

    #[test]
    fn test_exact_role_xpath() {
        let xpath = role_xpath("link", "PIM", true);
        assert_eq!(
            xpath,
            ".//*[self::a or @role='link'][normalize-space(.)='PIM' or @aria-label='PIM' or @placeholder='PIM' or @value='PIM']"
        );
    }

    #[test]
    fn test_loose_role_xpath_lowercases_needle() {
        let xpath = role_xpath("button", "Yes, Delete", false);
        assert!(xpath.contains("'yes, delete'"));
        assert!(xpath.starts_with(".//*[self::button"));
    }

    #[test]
    fn test_nested_absolute_xpath_made_relative() {
        let sel = Selector::XPath("//button".to_string());
        assert_eq!(strategy(&sel, true), ("xpath", ".//button".to_string()));
        assert_eq!(strategy(&sel, false), ("xpath", "//button".to_string()));
    }

    #[test]
    fn test_headless_chrome_capabilities() {
        let settings = BrowserSettings {
            webdriver_url: "http://localhost:4444".to_string(),
            browser: Browser::Chromium,
            headless: true,
        };
        let caps = capabilities(&settings);
        assert_eq!(caps["alwaysMatch"]["browserName"], "chrome");
        assert_eq!(caps["alwaysMatch"]["goog:chromeOptions"]["args"][0], "--headless=new");
    }
}
