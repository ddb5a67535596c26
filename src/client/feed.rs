//! HTTP implementation of the attendance feed client

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::{FeedApi, WeeklyFetch, WeeklyRequest, WeeklyResponse};
use crate::auth::TokenStore;
use crate::error::{ApiError, Result};

/// Weekly schedule endpoint path
const WEEKLY_PATH: &str = "/attendance-student/rankClass/getWeekSchedule2";

/// Check-in record ("water list") endpoint path
const WATER_LIST_PATH: &str = "/attendance-student/rankClass/getWaterList";

/// Token refresh endpoint path
const REFRESH_PATH: &str = "/auth/refresh";

/// Request budget: the watch loop can fan out one query per slot
const RATE_LIMIT_PER_SECOND: u32 = 6;

/// Prefix a token with `bearer ` unless it already carries one.
pub fn normalize_bearer(token: &str) -> String {
    if token.len() >= 7 && token[..7].eq_ignore_ascii_case("bearer ") {
        token.to_string()
    } else {
        format!("bearer {}", token)
    }
}

/// Attendance feed client.
///
/// Sends the normalized bearer token in both `Authorization` and the
/// vendor-specific `synjones-auth` header; the backend reads one or the
/// other depending on deployment.
pub struct FeedClient {
    http: HttpClient,
    base_url: String,
    tokens: Arc<TokenStore>,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    refresh_lock: Mutex<()>,
}

#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl FeedClient {
    /// Create a new feed client against `base_url` (no trailing slash).
    pub fn new(base_url: &str, tokens: Arc<TokenStore>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap());

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            refresh_lock: Mutex::new(()),
        })
    }

    /// POST a JSON body to `path`, injecting the auth headers.
    async fn post_json(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(&url).json(body);

        if let Some(token) = self.tokens.access_token() {
            let normalized = normalize_bearer(&token);
            request = request
                .header("Authorization", &normalized)
                .header("synjones-auth", &normalized);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        Ok(response)
    }

    /// POST with one transparent token-refresh retry on HTTP 401/403.
    async fn post_authed(&self, path: &str, body: &Value) -> Result<reqwest::Response> {
        let token_used = self.tokens.access_token();
        let response = self.post_json(path, body).await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                log::debug!("HTTP {} from {}, attempting token refresh", response.status(), path);
                self.refresh_access_token(token_used.as_deref()).await?;
                let retried = self.post_json(path, body).await?;
                if matches!(
                    retried.status(),
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
                ) {
                    self.tokens.clear()?;
                    return Err(ApiError::AuthRequired.into());
                }
                Ok(retried)
            }
            _ => Ok(response),
        }
    }

    /// Refresh the access token, single-flight.
    ///
    /// Concurrent 401s funnel through one refresh: waiters re-read the store
    /// after acquiring the lock and skip the network call when the token has
    /// already moved past the one their failed request used.
    async fn refresh_access_token(&self, stale: Option<&str>) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.tokens.access_token() {
            if stale != Some(current.as_str()) {
                log::debug!("Token already refreshed by another caller, reusing");
                return Ok(current);
            }
        }

        let Some(refresh) = self.tokens.refresh_token() else {
            self.tokens.clear()?;
            return Err(ApiError::AuthRequired.into());
        };

        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "refresh_token": refresh }))
            .send()
            .await
            .map_err(ApiError::from)?;

        if !response.status().is_success() {
            self.tokens.clear()?;
            return Err(ApiError::AuthRequired.into());
        }

        let parsed: TokenRefreshResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("refresh response: {}", e)))?;

        let Some(access) = parsed.access_token else {
            self.tokens.clear()?;
            return Err(ApiError::AuthRequired.into());
        };

        let bearer = normalize_bearer(&access);
        self.tokens.save_access_token(&bearer)?;
        self.tokens.save_refresh_token(parsed.refresh_token.as_deref())?;
        log::info!("Access token refreshed");
        Ok(bearer)
    }
}

#[async_trait]
impl FeedApi for FeedClient {
    async fn fetch_weekly(&self, request: &WeeklyRequest) -> Result<WeeklyFetch> {
        let body = serde_json::to_value(request)?;
        let response = self.post_authed(WEEKLY_PATH, &body).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                ApiError::FetchFailed(format!("weekly feed returned HTTP {}", status)).into(),
            );
        }

        let text = response.text().await.map_err(ApiError::from)?;
        let raw: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("weekly feed: {}", e)))?;
        let parsed: WeeklyResponse = serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::InvalidResponse(format!("weekly feed: {}", e)))?;

        if !parsed.is_usable() {
            if parsed.looks_like_auth_failure() {
                log::warn!("Weekly feed rejected credentials: code={} msg={}", parsed.code, parsed.msg);
                self.tokens.clear()?;
                return Err(ApiError::AuthRequired.into());
            }
            return Err(ApiError::FetchFailed(format!(
                "weekly feed unusable: success={} records={} msg={}",
                parsed.success,
                parsed.data.len(),
                parsed.msg
            ))
            .into());
        }

        Ok(WeeklyFetch { parsed, raw })
    }

    async fn fetch_water_list(
        &self,
        date_filter: &str,
        page_size: usize,
        page: usize,
    ) -> Result<Value> {
        let body = json!({
            "startdate": date_filter,
            "enddate": date_filter,
            "pageSize": page_size,
            "current": page,
        });

        let response = self.post_authed(WATER_LIST_PATH, &body).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(
                ApiError::FetchFailed(format!("water list returned HTTP {}", status)).into(),
            );
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("water list: {}", e)))?;
        Ok(parsed)
    }
}
