//! Cache management commands

use chrono::Local;
use serde_json::json;

use crate::cache::{
    FileStore, QUERY_LOG_FILE, WATER_LIST_CACHE_FILE, WEEKLY_CACHE_FILE, WEEKLY_CLEANED_FILE,
    WEEKLY_RAW_CACHE_FILE, WEEKLY_RAW_META_FILE,
};
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;

const KNOWN_FILES: [&str; 6] = [
    WEEKLY_CACHE_FILE,
    WEEKLY_RAW_CACHE_FILE,
    WEEKLY_RAW_META_FILE,
    WEEKLY_CLEANED_FILE,
    QUERY_LOG_FILE,
    WATER_LIST_CACHE_FILE,
];

/// Show weekly cache status and per-file details
pub fn status(ctx: &CommandContext) -> Result<()> {
    let today = Local::now().date_naive();
    let weekly = ctx.repository().cache_status(today);

    match ctx.format {
        OutputFormat::Json => {
            let files: Vec<_> = KNOWN_FILES
                .iter()
                .map(|name| {
                    let info = ctx.store.file_info(name);
                    json!({
                        "name": name,
                        "exists": info.is_some(),
                        "size_bytes": info.as_ref().map(|i| i.size),
                        "last_modified": info.as_ref().map(|i| i.last_modified),
                    })
                })
                .collect();
            let out = json!({
                "weekly": {
                    "exists": weekly.exists,
                    "is_expired": weekly.is_expired,
                    "expires_date": weekly.expires_date,
                    "size_bytes": weekly.size_bytes,
                },
                "files": files,
                "path": ctx.store.dir().display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", ctx.store.dir().display());
            println!(
                "Weekly cache:   {}",
                if !weekly.exists {
                    "absent".to_string()
                } else if weekly.is_expired {
                    format!(
                        "expired ({})",
                        weekly.expires_date.as_deref().unwrap_or("no expiry")
                    )
                } else {
                    format!(
                        "valid until {}",
                        weekly.expires_date.as_deref().unwrap_or("unknown")
                    )
                }
            );
            println!();
            for name in KNOWN_FILES {
                match ctx.store.file_info(name) {
                    Some(info) => println!("{:32} {:>8} bytes", name, info.size),
                    None => println!("{:32} {:>8}", name, "-"),
                }
            }
        }
    }

    Ok(())
}

/// Clear all cache entries
pub fn clear(ctx: &CommandContext) -> Result<()> {
    let stats = ctx.store.clear_all()?;
    println!("Removed {} cache file(s).", stats.entries_removed);
    Ok(())
}

/// Print cache directory path
pub fn path() -> Result<()> {
    println!("{}", FileStore::data_dir()?.display());
    Ok(())
}
