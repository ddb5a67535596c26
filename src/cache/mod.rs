//! Local file cache for feed data
//!
//! One whole JSON document per well-known key, stored under an app-private
//! data directory. Content is opaque to the store; expiry lives with the
//! callers, except for the weekly cache which embeds its own `expires` field.

pub mod status;
pub mod storage;

/// Processed weekly schedule (with embedded `expires`)
pub const WEEKLY_CACHE_FILE: &str = "weekly.json";

/// Raw weekly feed response (with `expires` injected)
pub const WEEKLY_RAW_CACHE_FILE: &str = "weekly_raw.json";

/// Fetch metadata: `{last_fetched, expires}`
pub const WEEKLY_RAW_META_FILE: &str = "weekly_raw_meta.json";

/// Normalized timeslot map produced by the cleaner
pub const WEEKLY_CLEANED_FILE: &str = "weekly_cleaned.json";

/// Append-only verification query log
pub const QUERY_LOG_FILE: &str = "api2_query_log.json";

/// Last raw water-list response
pub const WATER_LIST_CACHE_FILE: &str = "api2_waterlist_response.json";

pub use status::WeeklyCacheStatus;
pub use storage::{CacheFileInfo, FileStore};
