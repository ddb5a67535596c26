//! Output formatting for CLI results

pub mod table;

use serde::Serialize;

pub use table::format_table;

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(data)
}
