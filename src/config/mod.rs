//! Configuration management for rollcall

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Default feed base URL, used when no config file is present.
pub const DEFAULT_BASE_URL: &str = "https://attendance.example.edu/attendance-student-pc";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Attendance feed base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Login page URL for external re-authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,

    /// URL prefix that signals a completed login redirect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_prefix: Option<String>,

    /// Term number for the weekly schedule request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_no: Option<i64>,

    /// Week number for the weekly schedule request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<i64>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Page size for water-list verification queries
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    10
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            page_size: default_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_url: Some(format!("{}/#/login", DEFAULT_BASE_URL)),
            redirect_prefix: Some(format!("{}/#/home", DEFAULT_BASE_URL)),
            term_no: None,
            week: None,
            preferences: Preferences::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".rollcall").join("config.yaml"))
    }

    /// Load configuration from a specific path, falling back to hardcoded
    /// defaults when the file is absent or unparseable.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        match serde_yaml::from_str::<Config>(&contents) {
            Ok(config) => Ok(config),
            Err(err) => {
                log::warn!(
                    "Unparseable config at {} ({}), using defaults",
                    path.display(),
                    err
                );
                Ok(Self::default())
            }
        }
    }

    /// Resolve a path override or fall back to the default location
    pub fn resolve_path(path_override: Option<&str>) -> Result<PathBuf> {
        match path_override {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional path override
    pub fn load_at(path_override: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path_override)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Config may sit next to token material; keep it private on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Base URL without a trailing slash, ready for endpoint joining
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
