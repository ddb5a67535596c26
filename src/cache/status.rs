//! Weekly cache status derivation
//!
//! `WeeklyCacheStatus` is never persisted; it is recomputed from the cached
//! weekly document and the current date on every check.

use chrono::NaiveDate;

use super::{WEEKLY_CACHE_FILE, storage::FileStore};

/// Derived state of the weekly schedule cache.
#[derive(Debug, Clone)]
pub struct WeeklyCacheStatus {
    pub exists: bool,
    pub is_expired: bool,
    pub expires_date: Option<String>,
    pub size_bytes: u64,
    pub last_modified: i64,
}

impl WeeklyCacheStatus {
    pub fn valid(&self) -> bool {
        self.exists && !self.is_expired
    }
}

/// Compute the weekly cache status against `today`.
///
/// The cache counts as expired whenever the file is missing, the embedded
/// `expires` field is missing, blank, or unparseable, or `today` is strictly
/// past the expiry date. The comparison is date-only.
pub fn weekly_status(store: &FileStore, today: NaiveDate) -> WeeklyCacheStatus {
    let info = store.file_info(WEEKLY_CACHE_FILE);
    let (size_bytes, last_modified) = info
        .as_ref()
        .map(|i| (i.size, i.last_modified))
        .unwrap_or((0, 0));

    let Some(content) = store.read(WEEKLY_CACHE_FILE) else {
        return WeeklyCacheStatus {
            exists: false,
            is_expired: true,
            expires_date: None,
            size_bytes,
            last_modified,
        };
    };

    let expires_date = serde_json::from_str::<serde_json::Value>(&content)
        .ok()
        .and_then(|v| v.get("expires").and_then(|e| e.as_str().map(String::from)))
        .filter(|s| !s.trim().is_empty());

    let is_expired = match expires_date
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    {
        Some(expires) => today > expires,
        None => {
            log::debug!("Weekly cache has no parseable expires field");
            true
        }
    };

    WeeklyCacheStatus {
        exists: true,
        is_expired,
        expires_date,
        size_bytes,
        last_modified,
    }
}
