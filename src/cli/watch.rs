//! Watch command implementation
//!
//! Cooperative in-process loop: each tick is an independent unit of work
//! that refreshes the weekly cache when needed and runs one matcher pass.
//! Failed refreshes park a delayed retry instead of blocking the loop.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Local;
use colored::Colorize;
use tokio::time::Instant;

use crate::cli::CommandContext;
use crate::error::{ApiError, Error, Result};
use crate::notify::{AlertSink, DesktopAlertSink, LogAlertSink};
use crate::watch::{AttendanceMatcher, RefreshOrchestrator, RefreshOutcome, RetryScheduler};

/// Retry queue drained by the watch loop.
#[derive(Default)]
struct PendingRetries {
    due: Mutex<Vec<(Instant, u32)>>,
}

impl PendingRetries {
    fn take_due(&self) -> Vec<u32> {
        let now = Instant::now();
        let mut pending = self.due.lock().unwrap();
        let (ready, rest): (Vec<_>, Vec<_>) = pending.drain(..).partition(|(at, _)| *at <= now);
        *pending = rest;
        ready.into_iter().map(|(_, attempt)| attempt).collect()
    }

    fn has_pending(&self) -> bool {
        !self.due.lock().unwrap().is_empty()
    }
}

impl RetryScheduler for PendingRetries {
    fn schedule_retry(&self, next_attempt: u32, delay: Duration) {
        self.due
            .lock()
            .unwrap()
            .push((Instant::now() + delay, next_attempt));
        log::info!(
            "Parked refresh attempt {} for {} minutes",
            next_attempt,
            delay.as_secs() / 60
        );
    }
}

/// Run the watch loop.
pub async fn run(ctx: &CommandContext, interval: u64, once: bool, notify: bool) -> Result<()> {
    let alerts: Arc<dyn AlertSink> = if notify {
        Arc::new(DesktopAlertSink)
    } else {
        Arc::new(LogAlertSink)
    };
    let scheduler = Arc::new(PendingRetries::default());

    let orchestrator = RefreshOrchestrator::new(
        Arc::new(ctx.repository()),
        ctx.store.clone(),
        ctx.periods.clone(),
        scheduler.clone(),
        alerts.clone(),
    );

    println!(
        "Watching today's timeslots (every {}s). Press Ctrl-C to stop.",
        interval
    );

    loop {
        let today = Local::now().date_naive();

        let due = scheduler.take_due();
        let refresh_outcome = if !due.is_empty() {
            let mut last = RefreshOutcome::ServedCache;
            for attempt in due {
                last = orchestrator.run(attempt, today).await;
            }
            Some(last)
        } else if !scheduler.has_pending() {
            Some(orchestrator.run(1, today).await)
        } else {
            // a retry is parked; leave the backend alone until it is due
            None
        };

        if let Some(RefreshOutcome::AuthRequired) = refresh_outcome {
            println!("{} Login expired; run 'rollcall init' and restart watch", "✗".red());
            return Ok(());
        }

        let matcher = AttendanceMatcher::new(
            ctx.client.clone() as Arc<dyn crate::client::FeedApi>,
            &ctx.store,
            &ctx.tokens,
            alerts.as_ref(),
            ctx.config.preferences.page_size,
        );

        match matcher.run_pass(Local::now().naive_local()).await {
            Ok(summary) => {
                if summary.queried > 0 {
                    println!(
                        "[{}] queried {} slot(s): {} matched, {} missing",
                        Local::now().format("%H:%M:%S"),
                        summary.queried,
                        summary.matched,
                        summary.missed
                    );
                }
            }
            Err(Error::Api(ApiError::AuthRequired)) => {
                println!("{} Login expired; run 'rollcall init' and restart watch", "✗".red());
                return Ok(());
            }
            Err(err) => {
                log::error!("Matcher pass failed: {}", err);
            }
        }

        if once {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(interval)).await;
    }
}
