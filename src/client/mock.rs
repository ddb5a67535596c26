//! Mock attendance feed client for testing
//!
//! Scripted responses are consumed in order; the mock also records call
//! counts and the date filters passed to water-list queries.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{FeedApi, WeeklyFetch, WeeklyRequest, WeeklyResponse};
use crate::error::{ApiError, Error, Result};

/// A scripted reply for one call.
pub enum Scripted<T> {
    Ok(T),
    AuthRequired,
    Timeout,
    Fail(String),
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Scripted::Ok(value) => Ok(value),
            Scripted::AuthRequired => Err(ApiError::AuthRequired.into()),
            Scripted::Timeout => Err(ApiError::Timeout.into()),
            Scripted::Fail(msg) => Err(ApiError::FetchFailed(msg).into()),
        }
    }
}

/// Mock feed client.
///
/// Queue responses with `push_weekly`/`push_water_list`; each call pops one.
/// An exhausted queue fails the call, which keeps tests honest about how
/// many requests they expect.
#[derive(Default)]
pub struct MockFeedClient {
    weekly: Mutex<VecDeque<Scripted<WeeklyResponse>>>,
    water: Mutex<VecDeque<Scripted<Value>>>,
    pub weekly_calls: Mutex<usize>,
    pub water_calls: Mutex<usize>,
    pub water_dates: Mutex<Vec<String>>,
}

impl MockFeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_weekly(&self, scripted: Scripted<WeeklyResponse>) {
        self.weekly.lock().unwrap().push_back(scripted);
    }

    pub fn push_water_list(&self, scripted: Scripted<Value>) {
        self.water.lock().unwrap().push_back(scripted);
    }

    pub fn weekly_call_count(&self) -> usize {
        *self.weekly_calls.lock().unwrap()
    }

    pub fn water_call_count(&self) -> usize {
        *self.water_calls.lock().unwrap()
    }
}

#[async_trait]
impl FeedApi for MockFeedClient {
    async fn fetch_weekly(&self, _request: &WeeklyRequest) -> Result<WeeklyFetch> {
        *self.weekly_calls.lock().unwrap() += 1;
        let scripted = self
            .weekly
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Other("no scripted weekly response".to_string()))?;
        let parsed = scripted.into_result()?;
        let raw = serde_json::to_value(&parsed)?;
        Ok(WeeklyFetch { parsed, raw })
    }

    async fn fetch_water_list(
        &self,
        date_filter: &str,
        _page_size: usize,
        _page: usize,
    ) -> Result<Value> {
        *self.water_calls.lock().unwrap() += 1;
        self.water_dates
            .lock()
            .unwrap()
            .push(date_filter.to_string());
        let scripted = self
            .water
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Other("no scripted water-list response".to_string()))?;
        scripted.into_result()
    }
}

/// Build a usable weekly response around raw schedule records.
pub fn weekly_with_records(records: Vec<Value>) -> WeeklyResponse {
    WeeklyResponse {
        code: 200,
        success: true,
        data: records,
        msg: "操作成功".to_string(),
        date: String::new(),
        expires: String::new(),
    }
}
