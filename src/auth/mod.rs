//! Token storage for the attendance feed.
//!
//! Tokens are persisted as a small JSON document under the config directory.
//! Clearing records a `cleared_at` timestamp; any path that wants to reuse a
//! stored token (for example a login page auto-fill) must check `is_fresh()`,
//! which only holds when the token was saved after the last clear.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{ConfigError, Result};

const TOKENS_FILE: &str = "tokens.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenState {
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,

    /// Epoch seconds of the last save
    #[serde(default)]
    saved_at: i64,

    /// Epoch seconds of the last clear
    #[serde(default)]
    cleared_at: i64,
}

/// Persistent store for the feed access/refresh token pair.
pub struct TokenStore {
    path: PathBuf,
    state: Mutex<TokenState>,
}

impl TokenStore {
    /// Open the store at the default location (`~/.rollcall/tokens.json`)
    pub fn open() -> Result<Self> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;
        Self::open_at(home.join(".rollcall").join(TOKENS_FILE))
    }

    /// Open the store at a specific path (for testing)
    pub fn open_at(path: PathBuf) -> Result<Self> {
        let state = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Unparseable token store at {}: {}", path.display(), err);
                TokenState::default()
            }),
            Err(_) => TokenState::default(),
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.lock().ok()?.access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.lock().ok()?.refresh_token.clone()
    }

    /// Save a new access token and stamp `saved_at`
    pub fn save_access_token(&self, token: &str) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ConfigError::Invalid("token store poisoned".to_string()))?;
        state.access_token = Some(token.to_string());
        state.saved_at = Utc::now().timestamp();
        log::debug!("Saved access token (length={})", token.len());
        self.persist(&state)
    }

    /// Save a refresh token if one was issued
    pub fn save_refresh_token(&self, token: Option<&str>) -> Result<()> {
        let Some(token) = token else {
            log::debug!("No refresh token to save");
            return Ok(());
        };
        let mut state = self
            .state
            .lock()
            .map_err(|_| ConfigError::Invalid("token store poisoned".to_string()))?;
        state.refresh_token = Some(token.to_string());
        self.persist(&state)
    }

    /// Drop both tokens and stamp `cleared_at`
    pub fn clear(&self) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ConfigError::Invalid("token store poisoned".to_string()))?;
        state.access_token = None;
        state.refresh_token = None;
        state.cleared_at = Utc::now().timestamp();
        log::info!("Cleared stored tokens");
        self.persist(&state)
    }

    /// A token is only reusable when it was saved after the last clear.
    pub fn is_fresh(&self) -> bool {
        match self.state.lock() {
            Ok(state) => state.access_token.is_some() && state.saved_at > state.cleared_at,
            Err(_) => false,
        }
    }

    fn persist(&self, state: &TokenState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&self.path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }
}
