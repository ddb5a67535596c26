//! Attendance window matcher
//!
//! Walks the cleaned timeslot map and, for every slot whose start time is
//! close to "now", queries the check-in feed and matches the returned
//! records by time proximity and location substring. A slot with no match
//! raises the "no check-in" alert, which is the whole point of the system.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use super::log::QueryLog;
use crate::auth::TokenStore;
use crate::cache::{FileStore, WATER_LIST_CACHE_FILE};
use crate::client::FeedApi;
use crate::error::{ApiError, Error, Result};
use crate::notify::{Alert, AlertSink};
use crate::schedule::{CleanedEntry, load_cleaned};

/// Query window around a slot's start: from 5 minutes before to 10 minutes
/// after.
const WINDOW_BEFORE_MIN: i64 = -5;
const WINDOW_AFTER_MIN: i64 = 10;

/// A check-in counts for a slot when its time is within this many minutes of
/// the slot's start.
const MATCH_TOLERANCE_MIN: i64 = 15;

/// Outcome counts for one matcher pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PassSummary {
    /// Slots found on today's date
    pub evaluated: usize,
    /// Slots inside the query window that were queried
    pub queried: usize,
    /// Queried slots with a matching check-in
    pub matched: usize,
    /// Queried slots with no matching check-in
    pub missed: usize,
}

/// Evaluates today's slots against the check-in feed.
pub struct AttendanceMatcher<'a> {
    client: Arc<dyn FeedApi>,
    store: &'a FileStore,
    tokens: &'a TokenStore,
    alerts: &'a dyn AlertSink,
    page_size: usize,
}

/// Collapse whitespace (including non-breaking space) and case before the
/// substring comparison.
fn normalize_location(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Append `:00` when a time carries no seconds component.
fn ensure_seconds(time: &str) -> String {
    if time.matches(':').count() == 1 {
        format!("{}:00", time)
    } else {
        time.to_string()
    }
}

/// Whether one check-in record satisfies a slot.
///
/// Time proximity comes first; the location check only applies when an
/// expected location is known, and accepts a substring in either direction
/// because device names embed room names inconsistently.
fn is_attendance_match(item: &Value, expected_loc: Option<&str>, slot_start: NaiveDateTime) -> bool {
    let intime_str = item
        .get("intime")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            item.get("watertime")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        });
    let Some(intime_str) = intime_str else {
        return false;
    };

    let Ok(intime) = NaiveDateTime::parse_from_str(intime_str.trim(), "%Y-%m-%d %H:%M:%S") else {
        return false;
    };

    if (slot_start - intime).num_minutes().abs() > MATCH_TOLERANCE_MIN {
        return false;
    }

    if let Some(expected) = expected_loc {
        let a = normalize_location(expected);
        let b = normalize_location(
            item.get("eqno").and_then(Value::as_str).unwrap_or_default(),
        );
        if !a.is_empty() && !b.is_empty() {
            return a.contains(&b) || b.contains(&a);
        }
    }

    // time proximity alone decides when no location is known
    true
}

impl<'a> AttendanceMatcher<'a> {
    pub fn new(
        client: Arc<dyn FeedApi>,
        store: &'a FileStore,
        tokens: &'a TokenStore,
        alerts: &'a dyn AlertSink,
        page_size: usize,
    ) -> Self {
        Self {
            client,
            store,
            tokens,
            alerts,
            page_size,
        }
    }

    /// Evaluate every cleaned slot against `now`.
    ///
    /// Per-slot failures become failed log records and the pass moves on; an
    /// auth error short-circuits the whole pass after clearing the token.
    pub async fn run_pass(&self, now: NaiveDateTime) -> Result<PassSummary> {
        let Some(cleaned) = load_cleaned(self.store) else {
            log::debug!("No cleaned weekly map, nothing to verify");
            return Ok(PassSummary::default());
        };

        let today = now.date().format("%Y-%m-%d").to_string();
        let query_log = QueryLog::new(self.store);
        let mut summary = PassSummary::default();

        for (key, entries) in &cleaned {
            let Some((date_part, time_part)) = key.split_once(' ') else {
                continue;
            };

            // cleaned keys always carry a clock time; tolerate strays from
            // older caches anyway
            if !time_part.contains(':') {
                log::debug!("Skipping key {} with no start time", key);
                continue;
            }

            // same-day only: slots on other dates are never queried
            if date_part != today {
                continue;
            }

            let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") else {
                continue;
            };
            let Ok(time) = NaiveTime::parse_from_str(&ensure_seconds(time_part), "%H:%M:%S") else {
                log::warn!("Unparseable start time in key {}", key);
                continue;
            };
            let slot_start = NaiveDateTime::new(date, time);
            summary.evaluated += 1;

            let diff_minutes = (slot_start - now).num_minutes();
            if !(WINDOW_BEFORE_MIN..=WINDOW_AFTER_MIN).contains(&diff_minutes) {
                continue;
            }

            log::debug!(
                "Slot {} inside query window (diff={}min), querying check-ins",
                key,
                diff_minutes
            );
            summary.queried += 1;

            let response = match self
                .client
                .fetch_water_list(date_part, self.page_size, 1)
                .await
            {
                Ok(value) => value,
                Err(Error::Api(ApiError::AuthRequired)) => {
                    query_log.record(key, date_part, now, false, "auth required");
                    return Err(self.fail_auth(key));
                }
                Err(err) => {
                    query_log.record(key, date_part, now, false, &err.to_string());
                    continue;
                }
            };

            if let Ok(serialized) = serde_json::to_string_pretty(&response) {
                self.store.write(WATER_LIST_CACHE_FILE, &serialized);
            }

            let code = response.get("code").and_then(Value::as_i64).unwrap_or(-1);
            if matches!(code, 400 | 401 | 403) {
                query_log.record(key, date_part, now, false, &response.to_string());
                return Err(self.fail_auth(key));
            }
            if code != 0 {
                query_log.record(key, date_part, now, false, &response.to_string());
                continue;
            }

            let empty = Vec::new();
            let records = response
                .pointer("/data/list")
                .and_then(Value::as_array)
                .unwrap_or(&empty);

            let expected_loc = entries
                .first()
                .map(|e| e.location.as_str())
                .filter(|loc| !loc.is_empty());

            let matched = records
                .iter()
                .any(|item| is_attendance_match(item, expected_loc, slot_start));

            if matched {
                query_log.record(key, date_part, now, true, &response.to_string());
                summary.matched += 1;
            } else {
                query_log.record(
                    key,
                    date_part,
                    now,
                    false,
                    &format!("no attendance found: {}", response),
                );
                self.alert_no_attendance(key, entries);
                summary.missed += 1;
            }
        }

        log::debug!(
            "Matcher pass finished: {} queried, {} matched, {} missed",
            summary.queried,
            summary.matched,
            summary.missed
        );
        Ok(summary)
    }

    /// Auth failure: clear the token, raise the re-login alert, and abort
    /// the pass so the remaining slots do not each fire a false alarm.
    fn fail_auth(&self, key: &str) -> Error {
        log::warn!("Auth error during verification of {}, aborting pass", key);
        if let Err(err) = self.tokens.clear() {
            log::error!("Failed to clear token store: {}", err);
        }
        self.alerts.alert(&Alert::auth_invalid());
        ApiError::AuthRequired.into()
    }

    fn alert_no_attendance(&self, key: &str, entries: &[CleanedEntry]) {
        let (subject, time_display, location) = entries
            .first()
            .map(|e| (e.subject.as_str(), e.time_display.as_str(), e.location.as_str()))
            .unwrap_or(("", "", ""));
        self.alerts
            .alert(&Alert::no_attendance(key, subject, time_display, location));
    }
}
