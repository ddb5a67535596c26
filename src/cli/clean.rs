//! Clean command implementation

use chrono::Local;
use colored::Colorize;

use crate::cli::CommandContext;
use crate::error::Result;
use crate::schedule::{Cleaner, load_cleaned};

/// Regenerate the cleaned timeslot map from the cached raw feed.
pub fn run(ctx: &CommandContext, demo: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let cleaner = Cleaner::new(&ctx.store, &ctx.periods).with_demo_fallback(demo);

    if !cleaner.generate_cleaned(today) {
        println!("{} No raw weekly data to clean", "✗".red());
        if !demo {
            println!("  → Run 'rollcall sync' first, or pass --demo for sample data");
        }
        return Ok(());
    }

    let slots = load_cleaned(&ctx.store).map(|m| m.len()).unwrap_or(0);
    println!("{} Generated {} timeslot(s)", "✓".green(), slots);
    Ok(())
}
