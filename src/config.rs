//! Harness configuration.
//!
//! Settings come from the process environment, optionally primed from
//! `environments/<HARNESS_ENV>.env`. Lookups go through [`ConfigSource`] so
//! callers can substitute an in-memory map.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{error, info};

use crate::error::{HarnessError, HarnessResult};

pub const API_BASE_URL: &str = "API_BASE_URL";
pub const CLIENT_ID: &str = "CLIENT_ID";
pub const CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const API_AUTH_URL: &str = "API_AUTH_URL";
pub const BASE_URL: &str = "BASE_URL";
pub const APP_USER_NAME: &str = "APP_USER_NAME";
pub const APP_PASSWORD: &str = "APP_PASSWORD";
pub const ELEMENT_WAIT_MS: &str = "ELEMENT_WAIT_MS";
pub const BUY_ORDER_ENDPOINT: &str = "BUY_ORDER_ENDPOINT";
pub const SESSION_FILE: &str = "SESSION_FILE";
pub const SCREENSHOT_DIR: &str = "SCREENSHOT_DIR";
pub const WEBDRIVER_URL: &str = "WEBDRIVER_URL";
pub const BROWSER: &str = "BROWSER";
pub const HEADLESS: &str = "HEADLESS";
pub const HARNESS_ENV: &str = "HARNESS_ENV";

/// Keys bootstrap refuses to run without, checked in this order.
pub const REQUIRED_API_KEYS: [&str; 4] = [API_BASE_URL, CLIENT_ID, CLIENT_SECRET, API_AUTH_URL];

const DEFAULT_ENV: &str = "DEV";
const ENV_DIR: &str = "environments";
const DEFAULT_SESSION_FILE: &str = ".auth/user.json";
const DEFAULT_SCREENSHOT_DIR: &str = "test-results/screenshots";
const DEFAULT_BUY_ORDER_ENDPOINT: &str = "/v2/checkout/orders";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
pub const DEFAULT_ELEMENT_WAIT: Duration = Duration::from_millis(5000);

/// Where settings are read from. Empty values are treated as unset.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;

    fn require(&self, key: &str) -> HarnessResult<String> {
        self.get(key).ok_or_else(|| {
            let err = HarnessError::config(key);
            error!("{}", err);
            err
        })
    }
}

/// Reads `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// Load `environments/<HARNESS_ENV>.env` (default `DEV`) under `root` into the
/// process environment. Variables already set win over the file.
pub fn load_env_file(root: &Path) -> HarnessResult<PathBuf> {
    let env_name = ProcessEnv.get(HARNESS_ENV).unwrap_or_else(|| DEFAULT_ENV.to_string());
    let path = root.join(ENV_DIR).join(format!("{}.env", env_name));

    if !path.exists() {
        error!("Environment file is NOT present at: {}", path.display());
        return Err(HarnessError::EnvFileMissing(path));
    }

    dotenvy::from_path(&path).map_err(|e| {
        HarnessError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{}: {}", path.display(), e),
        ))
    })?;
    info!("Loaded {} environment from {}", env_name, path.display());
    Ok(path)
}

/// OAuth2 client credentials. Immutable once loaded.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Everything the API side needs: bootstrap plus the authenticated client.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub credentials: Credentials,
    pub session_file: PathBuf,
    pub buy_order_endpoint: String,
}

impl ApiSettings {
    /// Fails on the first missing required key, naming it.
    pub fn load(source: &dyn ConfigSource) -> HarnessResult<Self> {
        for key in REQUIRED_API_KEYS {
            source.require(key)?;
        }

        Ok(Self {
            base_url: source.require(API_BASE_URL)?,
            credentials: Credentials {
                client_id: source.require(CLIENT_ID)?,
                client_secret: source.require(CLIENT_SECRET)?,
                token_url: source.require(API_AUTH_URL)?,
            },
            session_file: session_file(source),
            buy_order_endpoint: source
                .get(BUY_ORDER_ENDPOINT)
                .unwrap_or_else(|| DEFAULT_BUY_ORDER_ENDPOINT.to_string()),
        })
    }
}

/// Session file location, shared by the writer and every reader.
pub fn session_file(source: &dyn ConfigSource) -> PathBuf {
    source
        .get(SESSION_FILE)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
}

/// UI side settings. Credentials stay optional here; the login orchestrator
/// validates them before its first attempt.
#[derive(Debug, Clone)]
pub struct UiSettings {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub element_wait: Duration,
    pub screenshot_dir: PathBuf,
}

impl UiSettings {
    pub fn load(source: &dyn ConfigSource) -> HarnessResult<Self> {
        let element_wait = match source.get(ELEMENT_WAIT_MS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| {
                    let err = HarnessError::InvalidSetting {
                        key: ELEMENT_WAIT_MS.to_string(),
                        value: raw.clone(),
                        reason: "expected a whole number of milliseconds".to_string(),
                    };
                    error!("{}", err);
                    err
                })?,
            None => DEFAULT_ELEMENT_WAIT,
        };

        Ok(Self {
            base_url: source.require(BASE_URL)?,
            username: source.get(APP_USER_NAME),
            password: source.get(APP_PASSWORD),
            element_wait,
            screenshot_dir: source
                .get(SCREENSHOT_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCREENSHOT_DIR)),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
}

impl Browser {
    /// WebDriver `browserName` capability.
    pub fn capability_name(&self) -> &'static str {
        match self {
            Browser::Chromium => "chrome",
            Browser::Firefox => "firefox",
        }
    }
}

/// Where the WebDriver server lives and which browser to ask it for.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub webdriver_url: String,
    pub browser: Browser,
    pub headless: bool,
}

impl BrowserSettings {
    pub fn load(source: &dyn ConfigSource) -> Self {
        let browser = match source.get(BROWSER).as_deref() {
            Some("firefox") => Browser::Firefox,
            _ => Browser::Chromium,
        };
        let headless = !matches!(source.get(HEADLESS).as_deref(), Some("false") | Some("0"));

        Self {
            webdriver_url: source
                .get(WEBDRIVER_URL)
                .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
            browser,
            headless,
        }
    }
}
