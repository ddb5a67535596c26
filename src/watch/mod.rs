//! Attendance verification: window matching, query logging, and refresh
//! orchestration.

pub mod log;
pub mod matcher;
pub mod refresh;

pub use log::{QueryLog, QueryLogRecord};
pub use matcher::{AttendanceMatcher, PassSummary};
pub use refresh::{LoggingScheduler, RefreshOrchestrator, RefreshOutcome, RetryScheduler};
