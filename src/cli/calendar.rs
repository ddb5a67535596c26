//! Calendar export command

use colored::Colorize;

use crate::calendar::{JsonFileCalendar, sync_cleaned};
use crate::cli::CommandContext;
use crate::error::Result;
use crate::schedule::load_cleaned;

const CALENDAR_STORE_FILE: &str = "calendar_events.json";

/// Write cleaned timeslots into the calendar store, skipping known events.
pub fn sync(ctx: &CommandContext) -> Result<()> {
    let Some(cleaned) = load_cleaned(&ctx.store) else {
        println!("{} No cleaned timeslots; run 'rollcall sync' first", "✗".red());
        return Ok(());
    };

    let sink = JsonFileCalendar::new(ctx.store.dir().join(CALENDAR_STORE_FILE));
    let stats = sync_cleaned(&cleaned, &sink);

    println!(
        "{} Calendar sync: {} inserted, {} already present",
        "✓".green(),
        stats.inserted,
        stats.skipped
    );
    Ok(())
}
