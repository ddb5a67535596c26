//! Calendar export of cleaned timeslots
//!
//! The actual calendar backend is a collaborator behind `CalendarSink`; this
//! module only decides what to write. Events are deduplicated by a unique id
//! embedded in the event location as `ID:<uid>` so repeated syncs never
//! duplicate a slot.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::schedule::CleanedWeekly;

/// Calendar events default to a short check-in block.
const EVENT_MINUTES: i64 = 30;

/// One event to be written to a calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub title: String,
    /// Human location plus the `ID:<uid>` dedup marker
    pub location: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Destination calendar.
pub trait CalendarSink {
    /// Look up an event by the uid embedded in its location field.
    fn find_existing_event(&self, uid: &str) -> Option<CalendarEvent>;

    fn insert_event(&self, event: &CalendarEvent) -> Result<()>;
}

/// Counts from one calendar sync.
#[derive(Debug, Default, PartialEq)]
pub struct CalendarSyncStats {
    pub inserted: usize,
    pub skipped: usize,
}

/// Write every cleaned slot into the sink, skipping slots already present.
pub fn sync_cleaned(cleaned: &CleanedWeekly, sink: &dyn CalendarSink) -> CalendarSyncStats {
    let mut stats = CalendarSyncStats::default();

    for (key, entries) in cleaned {
        let Ok(start) = NaiveDateTime::parse_from_str(key, "%Y-%m-%d %H:%M:%S") else {
            log::warn!("Skipping calendar export for unparseable slot key {}", key);
            stats.skipped += entries.len();
            continue;
        };

        for (index, entry) in entries.iter().enumerate() {
            let uid = format!("cleaned_{}_{}", key, index);

            if sink.find_existing_event(&uid).is_some() {
                stats.skipped += 1;
                continue;
            }

            let location = if entry.location.is_empty() {
                format!("ID:{}", uid)
            } else {
                format!("{} ID:{}", entry.location, uid)
            };

            let event = CalendarEvent {
                title: entry.subject.clone(),
                location,
                description: format!(
                    "{} {} {}",
                    entry.weekday, entry.time_display, entry.location
                ),
                start,
                end: start + Duration::minutes(EVENT_MINUTES),
                uid,
            };

            match sink.insert_event(&event) {
                Ok(()) => stats.inserted += 1,
                Err(err) => {
                    log::error!("Failed to insert calendar event {}: {}", event.uid, err);
                    stats.skipped += 1;
                }
            }
        }
    }

    stats
}

/// JSON-file-backed calendar, the bundled sink implementation.
pub struct JsonFileCalendar {
    path: PathBuf,
}

impl JsonFileCalendar {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Vec<CalendarEvent> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }
}

impl CalendarSink for JsonFileCalendar {
    fn find_existing_event(&self, uid: &str) -> Option<CalendarEvent> {
        let marker = format!("ID:{}", uid);
        self.load()
            .into_iter()
            .find(|event| event.location.contains(&marker))
    }

    fn insert_event(&self, event: &CalendarEvent) -> Result<()> {
        let mut events = self.load();
        events.push(event.clone());
        let serialized = serde_json::to_string_pretty(&events)?;
        std::fs::write(&self.path, serialized)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::CleanedEntry;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn cleaned_fixture() -> CleanedWeekly {
        let mut map = BTreeMap::new();
        map.insert(
            "2024-03-04 08:00:00".to_string(),
            vec![
                CleanedEntry {
                    weekday: "Monday".to_string(),
                    location: "教2-101".to_string(),
                    eqno: "教2-101".to_string(),
                    subject: "高等数学".to_string(),
                    time_display: "08:00-08:50".to_string(),
                    watertime: "2024-03-04 08:00:00".to_string(),
                },
                CleanedEntry {
                    weekday: "Monday".to_string(),
                    location: "教2-102".to_string(),
                    eqno: "教2-102".to_string(),
                    subject: "大学英语".to_string(),
                    time_display: "08:00-08:50".to_string(),
                    watertime: "2024-03-04 08:00:00".to_string(),
                },
            ],
        );
        map
    }

    #[test]
    fn sync_inserts_each_slot_entry_once() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileCalendar::new(dir.path().join("calendar.json"));
        let cleaned = cleaned_fixture();

        let stats = sync_cleaned(&cleaned, &sink);
        assert_eq!(stats, CalendarSyncStats { inserted: 2, skipped: 0 });

        // a second sync finds everything by uid and writes nothing
        let stats = sync_cleaned(&cleaned, &sink);
        assert_eq!(stats, CalendarSyncStats { inserted: 0, skipped: 2 });
    }

    #[test]
    fn events_embed_the_uid_marker_in_location() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileCalendar::new(dir.path().join("calendar.json"));
        sync_cleaned(&cleaned_fixture(), &sink);

        let event = sink
            .find_existing_event("cleaned_2024-03-04 08:00:00_0")
            .unwrap();
        assert!(event.location.starts_with("教2-101 ID:cleaned_"));
        assert_eq!(event.title, "高等数学");
        assert_eq!(
            event.end - event.start,
            Duration::minutes(EVENT_MINUTES)
        );
    }

    #[test]
    fn unparseable_keys_are_skipped() {
        let dir = TempDir::new().unwrap();
        let sink = JsonFileCalendar::new(dir.path().join("calendar.json"));

        let mut cleaned = CleanedWeekly::new();
        cleaned.insert(
            "not a timestamp".to_string(),
            vec![CleanedEntry {
                weekday: "Monday".to_string(),
                location: String::new(),
                eqno: String::new(),
                subject: "x".to_string(),
                time_display: String::new(),
                watertime: String::new(),
            }],
        );

        let stats = sync_cleaned(&cleaned, &sink);
        assert_eq!(stats, CalendarSyncStats { inserted: 0, skipped: 1 });
    }
}
