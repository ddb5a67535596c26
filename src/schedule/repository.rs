//! Weekly schedule repository: cache-first fetch with expiry injection.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;

use super::week_sunday;
use crate::cache::{
    FileStore, WEEKLY_CACHE_FILE, WEEKLY_RAW_CACHE_FILE, WEEKLY_RAW_META_FILE, WeeklyCacheStatus,
    status::weekly_status,
};
use crate::client::{FeedApi, WeeklyRequest, WeeklyResponse};
use crate::error::Result;

/// Serves the weekly schedule from cache while it is valid, refreshing from
/// the feed otherwise.
pub struct WeeklyRepository {
    client: Arc<dyn FeedApi>,
    store: Arc<FileStore>,
    request: WeeklyRequest,
}

impl WeeklyRepository {
    pub fn new(client: Arc<dyn FeedApi>, store: Arc<FileStore>, request: WeeklyRequest) -> Self {
        Self {
            client,
            store,
            request,
        }
    }

    /// Current weekly cache status against `today`.
    pub fn cache_status(&self, today: NaiveDate) -> WeeklyCacheStatus {
        weekly_status(&self.store, today)
    }

    /// Get the weekly schedule, serving a valid cache unless forced.
    pub async fn get_weekly(&self, force_refresh: bool, today: NaiveDate) -> Result<WeeklyResponse> {
        if !force_refresh && self.cache_status(today).valid() {
            if let Some(cached) = self.read_cached() {
                log::debug!("Serving weekly schedule from cache");
                return Ok(cached);
            }
            log::warn!("Valid-looking weekly cache failed to parse, refetching");
        }
        self.fetch_and_cache(today).await
    }

    /// Fetch from the feed and rewrite the three weekly cache entries.
    ///
    /// A cache write failure is logged and does not fail the fetch; the
    /// stale cache simply persists until the next attempt.
    pub async fn fetch_and_cache(&self, today: NaiveDate) -> Result<WeeklyResponse> {
        let mut fetch = self.client.fetch_weekly(&self.request).await?;

        let expires = week_sunday(today).format("%Y-%m-%d").to_string();
        fetch.parsed.expires = expires.clone();
        if let Some(obj) = fetch.raw.as_object_mut() {
            obj.insert("expires".to_string(), json!(expires));
        }

        match serde_json::to_string_pretty(&fetch.parsed) {
            Ok(processed) => {
                if !self.store.write(WEEKLY_CACHE_FILE, &processed) {
                    log::warn!("Failed to write processed weekly cache");
                }
            }
            Err(err) => log::warn!("Failed to serialize processed weekly: {}", err),
        }

        match serde_json::to_string_pretty(&fetch.raw) {
            Ok(raw) => {
                if !self.store.write(WEEKLY_RAW_CACHE_FILE, &raw) {
                    log::warn!("Failed to write raw weekly cache");
                }
            }
            Err(err) => log::warn!("Failed to serialize raw weekly: {}", err),
        }

        let meta = json!({
            "last_fetched": today.format("%Y-%m-%d").to_string(),
            "expires": expires,
        });
        if !self.store.write(WEEKLY_RAW_META_FILE, &meta.to_string()) {
            log::warn!("Failed to write weekly cache metadata");
        }

        log::info!("Weekly schedule refreshed, cache expires {}", expires);
        Ok(fetch.parsed)
    }

    fn read_cached(&self) -> Option<WeeklyResponse> {
        let content = self.store.read(WEEKLY_CACHE_FILE)?;
        serde_json::from_str(&content).ok()
    }
}
