//! Attendance feed client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub mod feed;
#[cfg(test)]
pub mod mock;

pub use feed::FeedClient;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockFeedClient;

/// Request body for the weekly schedule endpoint.
///
/// Both fields are optional; the backend accepts an empty object and serves
/// the current term/week.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeeklyRequest {
    #[serde(rename = "termNo", skip_serializing_if = "Option::is_none")]
    pub term_no: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<i64>,
}

/// Parsed weekly schedule response.
///
/// `data` elements are kept as raw JSON; the cleaner extracts what it needs
/// and tolerates unknown fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyResponse {
    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub data: Vec<Value>,

    #[serde(default)]
    pub msg: String,

    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub expires: String,
}

impl WeeklyResponse {
    /// A usable response carries `success=true` and at least one record.
    pub fn is_usable(&self) -> bool {
        self.success && !self.data.is_empty()
    }

    /// Whether an unusable response looks like an auth failure rather than a
    /// transient backend problem: an auth-class code, or a login prompt in
    /// the message.
    pub fn looks_like_auth_failure(&self) -> bool {
        matches!(self.code, 400 | 401 | 403)
            || self.msg.contains("请登录")
            || self.msg.contains("未登录")
    }
}

/// A fetched weekly schedule: the typed view plus the raw document.
///
/// The raw form is cached verbatim so fields the typed model does not know
/// about survive a round trip through the cache.
#[derive(Debug, Clone)]
pub struct WeeklyFetch {
    pub parsed: WeeklyResponse,
    pub raw: Value,
}

/// Attendance feed API surface.
///
/// `fetch_water_list` returns raw JSON because its shape varies by use site;
/// callers pick out the fields they need.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// Fetch the weekly schedule feed
    async fn fetch_weekly(&self, request: &WeeklyRequest) -> Result<WeeklyFetch>;

    /// Fetch check-in records for a single day
    async fn fetch_water_list(
        &self,
        date_filter: &str,
        page_size: usize,
        page: usize,
    ) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_requires_success_and_data() {
        let mut resp = WeeklyResponse {
            code: 200,
            success: true,
            data: vec![serde_json::json!({})],
            msg: "操作成功".to_string(),
            date: String::new(),
            expires: String::new(),
        };
        assert!(resp.is_usable());

        resp.data.clear();
        assert!(!resp.is_usable());

        resp.data.push(serde_json::json!({}));
        resp.success = false;
        assert!(!resp.is_usable());
    }

    #[test]
    fn auth_failure_detected_by_code_or_message() {
        let by_code = WeeklyResponse {
            code: 401,
            success: false,
            data: vec![],
            msg: String::new(),
            date: String::new(),
            expires: String::new(),
        };
        assert!(by_code.looks_like_auth_failure());

        let by_msg = WeeklyResponse {
            code: 0,
            success: false,
            data: vec![],
            msg: "请登录后重试".to_string(),
            date: String::new(),
            expires: String::new(),
        };
        assert!(by_msg.looks_like_auth_failure());

        let generic = WeeklyResponse {
            code: 500,
            success: false,
            data: vec![],
            msg: "internal error".to_string(),
            date: String::new(),
            expires: String::new(),
        };
        assert!(!generic.looks_like_auth_failure());
    }

    #[test]
    fn weekly_response_parses_with_missing_fields() {
        let resp: WeeklyResponse = serde_json::from_str(r#"{"code":200}"#).unwrap();
        assert_eq!(resp.code, 200);
        assert!(!resp.success);
        assert!(resp.data.is_empty());
    }

    #[test]
    fn weekly_request_omits_absent_fields() {
        let body = serde_json::to_string(&WeeklyRequest::default()).unwrap();
        assert_eq!(body, "{}");

        let body = serde_json::to_string(&WeeklyRequest {
            term_no: Some(5),
            week: Some(12),
        })
        .unwrap();
        assert!(body.contains("\"termNo\":5"));
        assert!(body.contains("\"week\":12"));
    }
}
