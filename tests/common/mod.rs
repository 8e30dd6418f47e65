#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use e2e_harness::api::session::{SessionState, SessionStore};
use e2e_harness::browser::{ElementActions, ElementState, Locator, Page, WaitPolicy};
use e2e_harness::config::ApiSettings;
use e2e_harness::{HarnessError, HarnessResult};
use serde_json::json;
use tokio::time::Instant;
use wiremock::{Request, Respond, ResponseTemplate};

pub const CLIENT_ID: &str = "client";
pub const CLIENT_SECRET: &str = "s3cret";
pub const TOKEN_PATH: &str = "/v1/oauth2/token";

/// Config map with every API key pointing at `server_uri`.
pub fn api_config(server_uri: &str, session_file: &Path) -> HashMap<String, String> {
    let mut map = HashMap::new();
    map.insert("API_BASE_URL".to_string(), server_uri.to_string());
    map.insert("CLIENT_ID".to_string(), CLIENT_ID.to_string());
    map.insert("CLIENT_SECRET".to_string(), CLIENT_SECRET.to_string());
    map.insert("API_AUTH_URL".to_string(), format!("{}{}", server_uri, TOKEN_PATH));
    map.insert("SESSION_FILE".to_string(), session_file.display().to_string());
    map
}

pub fn api_settings(server_uri: &str, session_file: &Path) -> ApiSettings {
    ApiSettings::load(&api_config(server_uri, session_file)).expect("complete api config")
}

pub async fn write_session(path: &Path, origin: &str, token: &str) -> SessionStore {
    let store = SessionStore::new(path);
    store
        .write(&SessionState::with_token(origin, token))
        .await
        .expect("session file written");
    store
}

/// Token endpoint that fails the first `failures` calls with 500, then hands
/// out `token-<call number>`.
pub struct TokenSequence {
    failures: usize,
    calls: AtomicUsize,
}

impl TokenSequence {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for TokenSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            ResponseTemplate::new(500).set_body_json(json!({ "error": "server_error" }))
        } else {
            ResponseTemplate::new(200).set_body_json(json!({
                "access_token": format!("token-{}", n),
                "token_type": "Bearer",
                "expires_in": 32400
            }))
        }
    }
}

/// Observable side effects of a [`FakePage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Goto(String),
    WaitFor(String, ElementState),
    Click(String),
    Clear(String),
    Focus(String),
    Fill(String, String),
    Screenshot,
    NetworkIdle,
}

struct ClickEffect {
    trigger: String,
    on_click: usize,
    show: Option<String>,
    hide: Option<String>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<Call>,
    goto_times: Vec<Instant>,
    visible: HashSet<String>,
    texts: HashMap<String, String>,
    disabled: HashSet<String>,
    counts: HashMap<String, VecDeque<usize>>,
    clicks: HashMap<String, usize>,
    effects: Vec<ClickEffect>,
    screenshot_fails: bool,
    navigation_fails: bool,
    title: String,
}

impl FakeState {
    fn reached(&self, key: &str, state: ElementState) -> bool {
        let shown = self.visible.contains(key);
        match state {
            ElementState::Visible | ElementState::Attached => shown,
            ElementState::Hidden | ElementState::Detached => !shown,
        }
    }
}

/// In-memory [`Page`]. Elements exist only once shown; waits that cannot be
/// satisfied sleep for the full timeout, so tests run with paused time.
#[derive(Default)]
pub struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn show(&self, locator: &Locator) {
        self.state.lock().unwrap().visible.insert(locator.to_string());
    }

    pub fn hide(&self, locator: &Locator) {
        self.state.lock().unwrap().visible.remove(&locator.to_string());
    }

    pub fn set_text(&self, locator: &Locator, text: &str) {
        let mut state = self.state.lock().unwrap();
        state.visible.insert(locator.to_string());
        state.texts.insert(locator.to_string(), text.to_string());
    }

    pub fn disable(&self, locator: &Locator) {
        self.state.lock().unwrap().disabled.insert(locator.to_string());
    }

    pub fn set_title(&self, title: &str) {
        self.state.lock().unwrap().title = title.to_string();
    }

    /// Successive `count` results; the last one repeats.
    pub fn script_counts(&self, locator: &Locator, counts: &[usize]) {
        self.state
            .lock()
            .unwrap()
            .counts
            .insert(locator.to_string(), counts.iter().copied().collect());
    }

    /// Show `target` once `trigger` has been clicked `on_click` times.
    pub fn show_on_click(&self, trigger: &Locator, on_click: usize, target: &Locator) {
        self.state.lock().unwrap().effects.push(ClickEffect {
            trigger: trigger.to_string(),
            on_click,
            show: Some(target.to_string()),
            hide: None,
        });
    }

    pub fn hide_on_click(&self, trigger: &Locator, on_click: usize, target: &Locator) {
        self.state.lock().unwrap().effects.push(ClickEffect {
            trigger: trigger.to_string(),
            on_click,
            show: None,
            hide: Some(target.to_string()),
        });
    }

    /// Every `goto` errors as if the application were unreachable.
    pub fn fail_navigation(&self) {
        self.state.lock().unwrap().navigation_fails = true;
    }

    pub fn fail_screenshots(&self) {
        self.state.lock().unwrap().screenshot_fails = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn goto_times(&self) -> Vec<Instant> {
        self.state.lock().unwrap().goto_times.clone()
    }

    pub fn clicks(&self, locator: &Locator) -> usize {
        self.state
            .lock()
            .unwrap()
            .clicks
            .get(&locator.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Calls that touched `locator` in any way other than waiting on it.
    pub fn interactions_with(&self, locator: &Locator) -> Vec<Call> {
        let key = locator.to_string();
        self.calls()
            .into_iter()
            .filter(|call| match call {
                Call::Click(k) | Call::Clear(k) | Call::Focus(k) | Call::Fill(k, _) => *k == key,
                _ => false,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn require_visible(&self, locator: &Locator) -> HarnessResult<()> {
        if self.state.lock().unwrap().visible.contains(&locator.to_string()) {
            Ok(())
        } else {
            Err(HarnessError::Browser(format!("no element matches {}", locator)))
        }
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str) -> HarnessResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Goto(url.to_string()));
        state.goto_times.push(Instant::now());
        if state.navigation_fails {
            return Err(HarnessError::Browser("connection refused".to_string()));
        }
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, state: ElementState, timeout: Duration) -> HarnessResult<()> {
        let key = locator.to_string();
        self.record(Call::WaitFor(key.clone(), state));
        let reached = self.state.lock().unwrap().reached(&key, state);
        if reached {
            return Ok(());
        }
        tokio::time::sleep(timeout).await;
        let reached = self.state.lock().unwrap().reached(&key, state);
        if reached {
            return Ok(());
        }
        Err(HarnessError::InteractionTimeout {
            locator: key,
            state: state.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    async fn click(&self, locator: &Locator) -> HarnessResult<()> {
        self.require_visible(locator)?;
        let key = locator.to_string();
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Click(key.clone()));
        let n = {
            let clicks = state.clicks.entry(key.clone()).or_insert(0);
            *clicks += 1;
            *clicks
        };

        let mut shown = Vec::new();
        let mut hidden = Vec::new();
        for effect in state.effects.iter().filter(|e| e.trigger == key && e.on_click == n) {
            shown.extend(effect.show.clone());
            hidden.extend(effect.hide.clone());
        }
        for target in shown {
            state.visible.insert(target);
        }
        for target in hidden {
            state.visible.remove(&target);
        }
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> HarnessResult<()> {
        self.require_visible(locator)?;
        self.record(Call::Clear(locator.to_string()));
        Ok(())
    }

    async fn focus(&self, locator: &Locator) -> HarnessResult<()> {
        self.require_visible(locator)?;
        self.record(Call::Focus(locator.to_string()));
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> HarnessResult<()> {
        self.require_visible(locator)?;
        self.record(Call::Fill(locator.to_string(), value.to_string()));
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> HarnessResult<Option<String>> {
        self.require_visible(locator)?;
        Ok(self.state.lock().unwrap().texts.get(&locator.to_string()).cloned())
    }

    async fn is_enabled(&self, locator: &Locator) -> HarnessResult<bool> {
        self.require_visible(locator)?;
        Ok(!self.state.lock().unwrap().disabled.contains(&locator.to_string()))
    }

    async fn count(&self, locator: &Locator) -> HarnessResult<usize> {
        let key = locator.to_string();
        let mut state = self.state.lock().unwrap();
        let scripted = state.counts.get_mut(&key).and_then(|counts| {
            if counts.len() > 1 {
                counts.pop_front()
            } else {
                counts.front().copied()
            }
        });
        Ok(scripted.unwrap_or_else(|| usize::from(state.visible.contains(&key))))
    }

    async fn title(&self) -> HarnessResult<String> {
        Ok(self.state.lock().unwrap().title.clone())
    }

    async fn screenshot(&self, _path: &Path) -> HarnessResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Screenshot);
        if state.screenshot_fails {
            return Err(HarnessError::Browser("screenshot unavailable".to_string()));
        }
        Ok(())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> HarnessResult<()> {
        self.record(Call::NetworkIdle);
        Ok(())
    }
}

pub fn screenshot_dir() -> PathBuf {
    std::env::temp_dir().join("e2e-harness-test-screenshots")
}

/// Interactions over `page` with the default 5 s element wait.
pub fn actions(page: &Arc<FakePage>) -> ElementActions {
    ElementActions::new(page.clone(), WaitPolicy::default()).with_screenshot_dir(screenshot_dir())
}
