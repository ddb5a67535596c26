//! Period-number to clock-time lookup table
//!
//! Loaded once from the bundled lookup resource; read-only afterwards.

use serde::Deserialize;
use std::collections::HashMap;

const PERIODS_JSON: &str = include_str!("../../assets/periods.json");

#[derive(Debug, Deserialize)]
struct PeriodsDocument {
    #[serde(default)]
    data: Vec<PeriodRow>,
}

#[derive(Debug, Deserialize)]
struct PeriodRow {
    #[serde(default)]
    jc: String,
    #[serde(default)]
    starttime: String,
    #[serde(default)]
    endtime: String,
}

/// Mapping from period number to start time and display range.
pub struct PeriodTimeTable {
    start_full: HashMap<String, String>,
    display: HashMap<String, String>,
}

/// Drop a trailing seconds component: `08:00:00` becomes `08:00`.
fn strip_seconds(time: &str) -> String {
    time.split(':').take(2).collect::<Vec<_>>().join(":")
}

impl PeriodTimeTable {
    /// Load the bundled period table.
    pub fn load() -> Self {
        // The bundled resource is part of the binary; a parse failure is a
        // build defect, so an empty table is the quiet fallback.
        Self::from_json(PERIODS_JSON).unwrap_or_else(|err| {
            log::error!("Bundled periods resource is invalid: {}", err);
            Self {
                start_full: HashMap::new(),
                display: HashMap::new(),
            }
        })
    }

    /// Parse a period table from a JSON document of `{data: [{jc, starttime, endtime}]}`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let doc: PeriodsDocument = serde_json::from_str(text)?;

        let mut start_full = HashMap::new();
        let mut display = HashMap::new();
        for row in doc.data {
            let jc = row.jc.trim();
            let start = row.starttime.trim();
            if jc.is_empty() || start.is_empty() {
                continue;
            }
            start_full.insert(jc.to_string(), start.to_string());

            let ds = strip_seconds(start);
            let end = row.endtime.trim();
            let range = if end.is_empty() {
                ds
            } else {
                format!("{}-{}", ds, strip_seconds(end))
            };
            display.insert(jc.to_string(), range);
        }

        Ok(Self {
            start_full,
            display,
        })
    }

    /// Resolve a period-slot string to `(start HH:MM:SS, display range)`.
    ///
    /// A compound slot like `"7-8"` that has no direct entry falls back to
    /// its first component. Unresolvable slots return `None`.
    pub fn resolve(&self, slot: &str) -> Option<(&str, &str)> {
        let slot = slot.trim();
        if let Some(start) = self.start_full.get(slot) {
            return Some((start, self.display.get(slot).map(String::as_str)?));
        }
        if slot.contains('-') {
            let first = slot.split('-').next().unwrap_or("").trim();
            if let Some(start) = self.start_full.get(first) {
                return Some((start, self.display.get(first).map(String::as_str)?));
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.start_full.is_empty()
    }
}
