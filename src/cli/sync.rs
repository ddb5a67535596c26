//! Sync command implementation

use std::sync::Arc;

use chrono::Local;
use colored::Colorize;

use crate::cli::CommandContext;
use crate::error::Result;
use crate::notify::LogAlertSink;
use crate::schedule::Cleaner;
use crate::watch::{LoggingScheduler, RefreshOrchestrator, RefreshOutcome};

/// Run one refresh invocation, then report the outcome.
pub async fn run(ctx: &CommandContext, force: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let repository = Arc::new(ctx.repository());

    if force {
        println!("Forcing weekly schedule refresh...");
        repository.fetch_and_cache(today).await?;
        let cleaner = Cleaner::new(&ctx.store, &ctx.periods);
        if cleaner.generate_cleaned(today) {
            println!("{} Schedule refreshed and timeslots regenerated", "✓".green());
        } else {
            println!("{} Schedule refreshed but cleaning produced no output", "⚠".yellow());
        }
        return Ok(());
    }

    let orchestrator = RefreshOrchestrator::new(
        repository,
        ctx.store.clone(),
        ctx.periods.clone(),
        Arc::new(LoggingScheduler),
        Arc::new(LogAlertSink),
    );

    match orchestrator.run(1, today).await {
        RefreshOutcome::ServedCache => {
            println!("{} Weekly cache is still valid; nothing to fetch", "✓".green());
        }
        RefreshOutcome::Refreshed => {
            println!("{} Schedule refreshed and timeslots regenerated", "✓".green());
        }
        RefreshOutcome::AuthRequired => {
            println!("{} The feed rejected your credentials", "✗".red());
            println!("  → Run 'rollcall init' to log in again");
            if let Some(login_url) = ctx.config.login_url.as_deref() {
                println!("  → Tokens come from the login page: {}", login_url);
            }
        }
        RefreshOutcome::RetryScheduled { next_attempt } => {
            println!(
                "{} Fetch failed; attempt {} is due in 20 minutes (re-run sync)",
                "⚠".yellow(),
                next_attempt
            );
        }
        RefreshOutcome::Failed => {
            println!("{} Backend unreachable after repeated retries", "✗".red());
        }
    }

    Ok(())
}
