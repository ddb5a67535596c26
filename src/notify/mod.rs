//! User-facing alerts
//!
//! Components raise alerts through the `AlertSink` trait; the CLI picks the
//! sink at startup. This is the explicit channel between the engine and
//! whatever front end is listening.

/// A fire-and-forget user alert.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Stable id so repeated alerts can be collapsed by the sink
    pub dedup_id: String,
    pub title: String,
    pub body: String,
}

impl Alert {
    /// Credentials were rejected; the user must log in again.
    pub fn auth_invalid() -> Self {
        Self {
            dedup_id: "auth_invalid".to_string(),
            title: "Login expired".to_string(),
            body: "The attendance feed rejected your credentials. Run `rollcall init` to log in again.".to_string(),
        }
    }

    /// The weekly feed stayed unreachable through every retry.
    pub fn backend_unreachable() -> Self {
        Self {
            dedup_id: "backend_unreachable".to_string(),
            title: "Attendance backend unreachable".to_string(),
            body: "Could not refresh the weekly schedule after repeated retries. Check connectivity or contact support.".to_string(),
        }
    }

    /// No check-in record was found for a slot inside its query window.
    pub fn no_attendance(key: &str, subject: &str, time_display: &str, location: &str) -> Self {
        let place = if location.is_empty() {
            String::new()
        } else {
            format!(" ({})", location)
        };
        Self {
            dedup_id: format!("no_attendance:{}", key),
            title: "No check-in record found".to_string(),
            body: format!("{} at {}{} has no check-in record yet.", subject, time_display, place),
        }
    }
}

/// Destination for alerts. Implementations must not block or fail the caller.
pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: &Alert);
}

/// Default sink: alerts land in the log.
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn alert(&self, alert: &Alert) {
        log::warn!("[alert] {}: {}", alert.title, alert.body);
    }
}

/// Desktop notification sink.
pub struct DesktopAlertSink;

impl AlertSink for DesktopAlertSink {
    fn alert(&self, alert: &Alert) {
        let shown = notify_rust::Notification::new()
            .summary(&alert.title)
            .body(&alert.body)
            .show();
        if let Err(err) = shown {
            log::warn!("Desktop notification failed ({}), falling back to log", err);
            log::warn!("[alert] {}: {}", alert.title, alert.body);
        }
    }
}

/// Recording sink for tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryAlertSink {
    pub alerts: std::sync::Mutex<Vec<Alert>>,
}

#[cfg(test)]
impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.dedup_id.starts_with(prefix))
            .count()
    }
}

#[cfg(test)]
impl AlertSink for MemoryAlertSink {
    fn alert(&self, alert: &Alert) {
        self.alerts.lock().unwrap().push(alert.clone());
    }
}
