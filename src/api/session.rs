//! Persisted authentication state.
//!
//! The file layout mirrors a browser storage-state dump:
//!
//! ```json
//! { "origins": [ { "origin": "https://api.example",
//!                  "localStorage": [ { "name": "accessToken", "value": "..." } ] } ] }
//! ```
//!
//! The token is always found by entry name, never by position. Writes replace
//! the whole file; nothing edits it in place.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{HarnessError, HarnessResult};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginState {
    pub origin: String,
    #[serde(rename = "localStorage", default)]
    pub local_storage: Vec<StorageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub origins: Vec<OriginState>,
}

impl SessionState {
    /// State holding a single origin with its access token.
    pub fn with_token(origin: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            origins: vec![OriginState {
                origin: origin.into(),
                local_storage: vec![StorageEntry {
                    name: ACCESS_TOKEN_KEY.to_string(),
                    value: token.into(),
                }],
            }],
        }
    }

    /// The `accessToken` value of the first origin.
    pub fn access_token(&self) -> Option<&str> {
        self.origins
            .first()?
            .local_storage
            .iter()
            .find(|entry| entry.name == ACCESS_TOKEN_KEY)
            .map(|entry| entry.value.as_str())
    }
}

/// Reads and writes the session file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> HarnessResult<SessionState> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let state = serde_json::from_str(&contents)?;
        Ok(state)
    }

    /// Overwrite the file with `state`, creating the parent directory if
    /// needed. The content goes to a sibling temp file first and is renamed
    /// into place, so readers never observe a half-written file.
    pub async fn write(&self, state: &SessionState) -> HarnessResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !tokio::fs::try_exists(parent).await.unwrap_or(false) {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    let err = HarnessError::Persistence {
                        path: parent.to_path_buf(),
                        source,
                    };
                    error!("Failed to create authentication directory. {}", err);
                    err
                })?;
                info!("Created authentication directory at {}", parent.display());
            }
        }

        let contents = serde_json::to_string_pretty(state)?;
        let staging = self.staging_path();
        let persist = async {
            tokio::fs::write(&staging, contents).await?;
            tokio::fs::rename(&staging, &self.path).await
        };
        persist.await.map_err(|source| {
            let err = HarnessError::Persistence {
                path: self.path.clone(),
                source,
            };
            error!("Failed to write authentication state. {}", err);
            err
        })?;

        debug!("Session state written to {}", self.path.display());
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}
