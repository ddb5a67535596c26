//! Verification query log
//!
//! Append-only record of every executed verification query. The log is
//! diagnostic; it is bounded so a long-lived install cannot grow it without
//! limit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cache::{FileStore, QUERY_LOG_FILE};

/// Oldest records beyond this count are dropped on append.
const MAX_RECORDS: usize = 1000;

/// Response details longer than this are truncated.
const MAX_DETAIL_LEN: usize = 2000;

/// One verification query outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogRecord {
    pub key: String,
    pub date: String,
    pub queried_at: String,
    pub success: bool,
    pub detail: String,
}

/// Append-only query log backed by the cache store.
pub struct QueryLog<'a> {
    store: &'a FileStore,
}

impl<'a> QueryLog<'a> {
    pub fn new(store: &'a FileStore) -> Self {
        Self { store }
    }

    /// Append a record; a corrupt existing log is replaced rather than
    /// aborting the append.
    pub fn record(
        &self,
        key: &str,
        date: &str,
        queried_at: NaiveDateTime,
        success: bool,
        detail: &str,
    ) {
        let mut records = self.load();

        let detail = if detail.len() > MAX_DETAIL_LEN {
            let mut end = MAX_DETAIL_LEN;
            while !detail.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &detail[..end])
        } else {
            detail.to_string()
        };

        records.push(QueryLogRecord {
            key: key.to_string(),
            date: date.to_string(),
            queried_at: queried_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            success,
            detail,
        });

        if records.len() > MAX_RECORDS {
            let excess = records.len() - MAX_RECORDS;
            records.drain(..excess);
        }

        match serde_json::to_string_pretty(&records) {
            Ok(json) => {
                if !self.store.write(QUERY_LOG_FILE, &json) {
                    log::warn!("Failed to persist query log");
                }
            }
            Err(err) => log::warn!("Failed to serialize query log: {}", err),
        }
    }

    /// All records, oldest first. A missing or corrupt log reads as empty.
    pub fn load(&self) -> Vec<QueryLogRecord> {
        self.store
            .read(QUERY_LOG_FILE)
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }
}
