//! Weekly schedule cleaner
//!
//! Reads the cached raw weekly payload and rewrites it as a map keyed by
//! `"YYYY-MM-DD HH:MM:SS"`, one entry list per timeslot. The map is
//! regenerated wholesale on every pass; there is no incremental merge.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::periods::PeriodTimeTable;
use super::week_monday;
use crate::cache::{FileStore, WEEKLY_CLEANED_FILE, WEEKLY_RAW_CACHE_FILE};

/// Bundled demo dataset, only reachable through the explicit demo flag.
const SAMPLE_WEEKLY: &str = include_str!("../../assets/sample_weekly.json");

/// One course occurrence inside a timeslot.
///
/// Field names follow the feed's wire vocabulary so downstream consumers of
/// the cleaned file see familiar keys. `eqno` duplicates `location` for
/// compatibility with check-in records, which name the device by location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CleanedEntry {
    pub weekday: String,
    pub location: String,
    pub eqno: String,
    #[serde(rename = "subjectSName")]
    pub subject: String,
    pub time_display: String,
    pub watertime: String,
}

/// The normalized timeslot map.
pub type CleanedWeekly = BTreeMap<String, Vec<CleanedEntry>>;

/// Transforms the raw weekly cache into the normalized timeslot map.
pub struct Cleaner<'a> {
    store: &'a FileStore,
    periods: &'a PeriodTimeTable,
    demo_fallback: bool,
}

/// Append `:00` when a time carries no seconds component.
fn ensure_seconds(time: &str) -> String {
    if time.matches(':').count() == 1 {
        format!("{}:00", time)
    } else {
        time.to_string()
    }
}

/// Stringify a JSON field that may arrive as string or number.
fn field_string(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn weekday_label(weekday: u32) -> &'static str {
    match weekday {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Sunday",
    }
}

impl<'a> Cleaner<'a> {
    pub fn new(store: &'a FileStore, periods: &'a PeriodTimeTable) -> Self {
        Self {
            store,
            periods,
            demo_fallback: false,
        }
    }

    /// Allow falling back to the bundled sample dataset when no raw cache
    /// exists. Off by default; only the demo path enables it.
    pub fn with_demo_fallback(mut self, enabled: bool) -> Self {
        self.demo_fallback = enabled;
        self
    }

    /// Regenerate `weekly_cleaned.json` for the week containing `today`.
    ///
    /// Returns false, without failing the caller, when no raw data is
    /// available or the raw cache is not a JSON object.
    pub fn generate_cleaned(&self, today: NaiveDate) -> bool {
        let raw_text = match self.store.read(WEEKLY_RAW_CACHE_FILE) {
            Some(text) => text,
            None if self.demo_fallback => {
                log::warn!("No raw weekly cache, using bundled sample dataset (demo mode)");
                SAMPLE_WEEKLY.to_string()
            }
            None => {
                log::warn!("No raw weekly data available, skipping clean");
                return false;
            }
        };

        let raw: Value = match serde_json::from_str(&raw_text) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) | Err(_) => {
                log::error!("Raw weekly cache is not a JSON object");
                return false;
            }
        };

        let empty = Vec::new();
        let records = raw
            .get("data")
            .and_then(Value::as_array)
            .unwrap_or(&empty);

        let monday = week_monday(today);
        let mut cleaned: CleanedWeekly = BTreeMap::new();
        let mut skipped = 0usize;

        for item in records {
            let Some(entry) = self.clean_record(item, monday) else {
                skipped += 1;
                continue;
            };
            let (key, entry) = entry;
            cleaned.entry(key).or_default().push(entry);
        }

        if skipped > 0 {
            log::warn!("Skipped {} raw records during cleaning", skipped);
        }

        let serialized = match serde_json::to_string_pretty(&cleaned) {
            Ok(json) => json,
            Err(err) => {
                log::error!("Failed to serialize cleaned weekly: {}", err);
                return false;
            }
        };

        let saved = self.store.write(WEEKLY_CLEANED_FILE, &serialized);
        if saved {
            log::debug!(
                "Generated cleaned weekly: {} slots from {} records",
                cleaned.len(),
                records.len()
            );
        }
        saved
    }

    fn clean_record(&self, item: &Value, monday: NaiveDate) -> Option<(String, CleanedEntry)> {
        let weeknum = field_string(item, "accountWeeknum").parse::<i64>().ok()?;
        // source uses 0 and 7 interchangeably for Sunday
        let weekday = if weeknum == 0 { 7 } else { weeknum };
        if !(1..=7).contains(&weekday) {
            return None;
        }
        let weekday = weekday as u32;

        let date = monday + Days::new(u64::from(weekday - 1));
        let date_str = date.format("%Y-%m-%d").to_string();

        let slot = field_string(item, "accountJtNo");
        let Some((start, display)) = self.periods.resolve(&slot) else {
            // no clock time resolvable: reject rather than emit an
            // unparseable key the matcher would have to tolerate
            log::warn!("Rejecting record with unresolvable period slot {:?}", slot);
            return None;
        };
        let start = ensure_seconds(start);

        let building = field_string(item, "buildName");
        let room = field_string(item, "roomRoomnum");
        let location = match (building.is_empty(), room.is_empty()) {
            (false, false) => format!("{}-{}", building, room),
            (false, true) => building,
            (true, false) => room,
            (true, true) => String::new(),
        };

        let key = format!("{} {}", date_str, start);
        let entry = CleanedEntry {
            weekday: weekday_label(weekday).to_string(),
            eqno: location.clone(),
            location,
            subject: field_string(item, "subjectSName"),
            time_display: display.to_string(),
            watertime: format!("{} {}", date_str, start),
        };

        Some((key, entry))
    }
}

/// Read the cleaned timeslot map back from the cache.
pub fn load_cleaned(store: &FileStore) -> Option<CleanedWeekly> {
    let text = store.read(WEEKLY_CLEANED_FILE)?;
    match serde_json::from_str(&text) {
        Ok(map) => Some(map),
        Err(err) => {
            log::error!("Cleaned weekly cache is invalid: {}", err);
            None
        }
    }
}
