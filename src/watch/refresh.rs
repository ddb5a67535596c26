//! Weekly refresh orchestration
//!
//! One invocation walks CHECK_CACHE → FETCH. A failed fetch hands a retry to
//! the scheduler collaborator and terminates; the retry is a separate unit
//! of work, never a blocking loop inside this one.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::cache::FileStore;
use crate::error::{ApiError, Error};
use crate::notify::{Alert, AlertSink};
use crate::schedule::{Cleaner, PeriodTimeTable, WeeklyRepository};

/// Give up and alert after this many attempts.
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay before a retry attempt.
pub const RETRY_DELAY: Duration = Duration::from_secs(20 * 60);

/// Terminal state of one refresh invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Cache was valid; nothing fetched
    ServedCache,
    /// Fetched and re-cleaned successfully
    Refreshed,
    /// Credentials rejected; external re-login needed, no retry
    AuthRequired,
    /// Fetch failed; a retry was handed to the scheduler
    RetryScheduled { next_attempt: u32 },
    /// Fetch failed on the final attempt
    Failed,
}

/// Hands retry attempts to the host's background scheduler.
pub trait RetryScheduler: Send + Sync {
    fn schedule_retry(&self, next_attempt: u32, delay: Duration);
}

/// Scheduler that only notes the retry; the surrounding process is expected
/// to be re-invoked externally (cron, service timer).
pub struct LoggingScheduler;

impl RetryScheduler for LoggingScheduler {
    fn schedule_retry(&self, next_attempt: u32, delay: Duration) {
        log::warn!(
            "Weekly refresh failed; attempt {} due in {} minutes",
            next_attempt,
            delay.as_secs() / 60
        );
    }
}

/// Drives the cache-or-fetch refresh cycle.
pub struct RefreshOrchestrator {
    repository: Arc<WeeklyRepository>,
    store: Arc<FileStore>,
    periods: Arc<PeriodTimeTable>,
    scheduler: Arc<dyn RetryScheduler>,
    alerts: Arc<dyn AlertSink>,
    // at most one refresh in flight per process; waiters re-check the cache
    inflight: Mutex<()>,
}

impl RefreshOrchestrator {
    pub fn new(
        repository: Arc<WeeklyRepository>,
        store: Arc<FileStore>,
        periods: Arc<PeriodTimeTable>,
        scheduler: Arc<dyn RetryScheduler>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            repository,
            store,
            periods,
            scheduler,
            alerts,
            inflight: Mutex::new(()),
        }
    }

    /// Run one refresh invocation at `attempt` (1-based).
    pub async fn run(&self, attempt: u32, today: NaiveDate) -> RefreshOutcome {
        let _guard = self.inflight.lock().await;

        if self.repository.cache_status(today).valid() {
            log::debug!("Weekly cache valid, serving cache");
            return RefreshOutcome::ServedCache;
        }

        log::info!("Weekly cache invalid or expired, fetching (attempt {})", attempt);
        match self.repository.fetch_and_cache(today).await {
            Ok(_) => {
                let cleaner = Cleaner::new(&self.store, &self.periods);
                if !cleaner.generate_cleaned(today) {
                    log::warn!("Refresh succeeded but cleaning produced no output");
                }
                RefreshOutcome::Refreshed
            }
            Err(Error::Api(ApiError::AuthRequired)) => {
                log::warn!("Weekly refresh needs re-authentication");
                self.alerts.alert(&Alert::auth_invalid());
                RefreshOutcome::AuthRequired
            }
            Err(err) => {
                log::error!("Weekly refresh attempt {} failed: {}", attempt, err);
                if attempt < MAX_ATTEMPTS {
                    let next_attempt = attempt + 1;
                    self.scheduler.schedule_retry(next_attempt, RETRY_DELAY);
                    RefreshOutcome::RetryScheduled { next_attempt }
                } else {
                    self.alerts.alert(&Alert::backend_unreachable());
                    RefreshOutcome::Failed
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{WEEKLY_CACHE_FILE, WEEKLY_CLEANED_FILE};
    use crate::client::mock::{MockFeedClient, Scripted, weekly_with_records};
    use crate::client::{FeedApi, WeeklyRequest};
    use crate::notify::MemoryAlertSink;
    use serde_json::json;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingScheduler {
        retries: StdMutex<Vec<(u32, Duration)>>,
    }

    impl RetryScheduler for RecordingScheduler {
        fn schedule_retry(&self, next_attempt: u32, delay: Duration) {
            self.retries.lock().unwrap().push((next_attempt, delay));
        }
    }

    struct Fixture {
        client: Arc<MockFeedClient>,
        store: Arc<FileStore>,
        scheduler: Arc<RecordingScheduler>,
        alerts: Arc<MemoryAlertSink>,
        orchestrator: RefreshOrchestrator,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::open_at(dir.path()).unwrap());
        let client = Arc::new(MockFeedClient::new());
        let scheduler = Arc::new(RecordingScheduler::default());
        let alerts = Arc::new(MemoryAlertSink::new());
        let repository = Arc::new(WeeklyRepository::new(
            client.clone() as Arc<dyn FeedApi>,
            store.clone(),
            WeeklyRequest::default(),
        ));
        let orchestrator = RefreshOrchestrator::new(
            repository,
            store.clone(),
            Arc::new(PeriodTimeTable::load()),
            scheduler.clone(),
            alerts.clone(),
        );
        Fixture {
            client,
            store,
            scheduler,
            alerts,
            orchestrator,
            _dir: dir,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn valid_cache_short_circuits_to_served_cache() {
        let fx = fixture();
        fx.store.write(
            WEEKLY_CACHE_FILE,
            r#"{"code":200,"success":true,"data":[{}],"expires":"2024-03-10"}"#,
        );

        let outcome = fx.orchestrator.run(1, day("2024-03-06")).await;
        assert_eq!(outcome, RefreshOutcome::ServedCache);
        assert_eq!(fx.client.weekly_call_count(), 0);
    }

    #[tokio::test]
    async fn successful_fetch_refreshes_and_cleans() {
        let fx = fixture();
        fx.client.push_weekly(Scripted::Ok(weekly_with_records(vec![
            json!({"accountWeeknum":"1","accountJtNo":"1","buildName":"教2","roomRoomnum":"101","subjectSName":"高等数学"}),
        ])));

        let outcome = fx.orchestrator.run(1, day("2024-03-06")).await;
        assert_eq!(outcome, RefreshOutcome::Refreshed);
        assert!(fx.store.exists(WEEKLY_CLEANED_FILE));
    }

    #[tokio::test]
    async fn auth_failure_is_terminal_without_retry() {
        let fx = fixture();
        fx.client.push_weekly(Scripted::AuthRequired);

        let outcome = fx.orchestrator.run(1, day("2024-03-06")).await;
        assert_eq!(outcome, RefreshOutcome::AuthRequired);
        assert!(fx.scheduler.retries.lock().unwrap().is_empty());
        assert_eq!(fx.alerts.count_with_prefix("auth_invalid"), 1);
    }

    #[tokio::test]
    async fn timeout_schedules_retry_before_attempt_limit() {
        let fx = fixture();
        fx.client.push_weekly(Scripted::Timeout);

        let outcome = fx.orchestrator.run(1, day("2024-03-06")).await;
        assert_eq!(outcome, RefreshOutcome::RetryScheduled { next_attempt: 2 });

        let retries = fx.scheduler.retries.lock().unwrap();
        assert_eq!(*retries, vec![(2, RETRY_DELAY)]);
        assert!(fx.alerts.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn final_attempt_failure_alerts_backend_unreachable() {
        let fx = fixture();
        fx.client.push_weekly(Scripted::Fail("502".to_string()));

        let outcome = fx.orchestrator.run(MAX_ATTEMPTS, day("2024-03-06")).await;
        assert_eq!(outcome, RefreshOutcome::Failed);
        assert!(fx.scheduler.retries.lock().unwrap().is_empty());
        assert_eq!(fx.alerts.count_with_prefix("backend_unreachable"), 1);
    }

    #[tokio::test]
    async fn concurrent_runs_fetch_only_once() {
        let fx = fixture();
        fx.client.push_weekly(Scripted::Ok(weekly_with_records(vec![
            json!({"accountWeeknum":"1","accountJtNo":"1","subjectSName":"a"}),
        ])));

        let today = day("2024-03-06");
        let (first, second) = tokio::join!(
            fx.orchestrator.run(1, today),
            fx.orchestrator.run(1, today)
        );

        // one invocation fetched, the other observed the refreshed cache
        assert_eq!(fx.client.weekly_call_count(), 1);
        let outcomes = [first, second];
        assert!(outcomes.contains(&RefreshOutcome::Refreshed));
        assert!(outcomes.contains(&RefreshOutcome::ServedCache));
    }
}
