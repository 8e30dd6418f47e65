use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, Method, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info};

use crate::api::session::SessionStore;
use crate::config::ApiSettings;
use crate::error::{HarnessError, HarnessResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully buffered response. The body is read once so it can be logged and
/// still handed to the caller.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> HarnessResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// The authenticated transport domain controllers are built on.
#[async_trait]
pub trait AuthenticatedTransport: Send + Sync {
    /// Fails with `Validation` for bad arguments and `Http` for non-2xx.
    async fn post_json(&self, path: &str, payload: serde_json::Value) -> HarnessResult<ApiResponse>;

    /// Never fails on status; the caller inspects it.
    async fn get(&self, path: &str) -> HarnessResult<ApiResponse>;

    /// Never fails on status; the caller inspects it.
    async fn delete(&self, path: &str) -> HarnessResult<ApiResponse>;
}

/// HTTP client that injects the persisted bearer token into every call.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    store: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
            store,
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(settings.base_url.clone(), SessionStore::new(settings.session_file.clone()))
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// `Authorization: Bearer <token>` from the session file, or an empty map
    /// when the file is missing, unreadable or has no token.
    pub async fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let state = match self.store.read().await {
            Ok(state) => state,
            Err(e) => {
                error!("Could not read token from {}: {}", self.store.path().display(), e);
                return headers;
            }
        };

        let Some(token) = state.access_token() else {
            error!("No accessToken entry in {}", self.store.path().display());
            return headers;
        };

        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(e) => error!("Stored token is not a valid header value: {}", e),
        }
        headers
    }

    /// POST a JSON object. `payload` must serialize to an object; arrays and
    /// scalars are rejected before any request is made.
    pub async fn post<P: Serialize + ?Sized>(&self, path: &str, payload: &P) -> HarnessResult<ApiResponse> {
        let value = serde_json::to_value(payload)?;
        self.post_json(path, value).await
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    async fn send(&self, method: Method, path: &str, payload: Option<&serde_json::Value>) -> HarnessResult<ApiResponse> {
        let url = self.url(path);
        info!("Attempting {} to: {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.auth_headers().await)
            .timeout(REQUEST_TIMEOUT);
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("{} {} failed: {}", method, url, e);
            HarnessError::Network(e)
        })?;

        let status = response.status();
        let body = response.text().await?;
        let response = ApiResponse::new(status, body);
        log_details(&method, path, &response);
        Ok(response)
    }
}

#[async_trait]
impl AuthenticatedTransport for ApiClient {
    async fn post_json(&self, path: &str, payload: serde_json::Value) -> HarnessResult<ApiResponse> {
        if path.trim().is_empty() {
            error!("POST rejected: endpoint path is empty");
            return Err(HarnessError::Validation("endpoint path must be a non-empty string".to_string()));
        }
        if !payload.is_object() {
            error!("POST rejected: payload is not a JSON object");
            return Err(HarnessError::Validation(format!(
                "payload must be a JSON object, got {}",
                json_kind(&payload)
            )));
        }

        let response = self.send(Method::POST, path, Some(&payload)).await?;
        if !response.is_success() {
            return Err(HarnessError::Http {
                status: response.status().as_u16(),
                status_text: response.status_text().to_string(),
            });
        }
        Ok(response)
    }

    async fn get(&self, path: &str) -> HarnessResult<ApiResponse> {
        self.send(Method::GET, path, None).await
    }

    async fn delete(&self, path: &str) -> HarnessResult<ApiResponse> {
        self.send(Method::DELETE, path, None).await
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Log the call and, for failures, the status plus the JSON error body.
fn log_details(method: &Method, path: &str, response: &ApiResponse) {
    info!("API Request | {} -> {} | {}", method, path, response.status().as_u16());
    if response.is_success() {
        return;
    }

    error!("Status: {} {}", response.status().as_u16(), response.status_text());
    match serde_json::from_str::<serde_json::Value>(response.text()) {
        Ok(body) => error!(
            "[ERROR BODY]: {}",
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
        ),
        Err(e) => {
            debug!("Error body parse failure: {}", e);
            error!("Could not parse the JSON response.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, SessionStore::new("unused.json"))
    }

    #[test]
    fn test_url_joining() {
        let c = client("https://api.example/");
        assert_eq!(c.url("/v2/orders"), "https://api.example/v2/orders");
        assert_eq!(c.url("v2/orders"), "https://api.example/v2/orders");
        assert_eq!(c.url("https://other.example/x"), "https://other.example/x");
    }

    #[test]
    fn test_response_helpers() {
        let r = ApiResponse::new(StatusCode::CREATED, r#"{"id":"A"}"#);
        assert!(r.is_success());
        assert_eq!(r.status_text(), "Created");
        let v: serde_json::Value = r.json().unwrap();
        assert_eq!(v["id"], "A");
    }
}
