//! Command execution context
//!
//! One place to construct the config, cache store, token store, and feed
//! client; commands receive everything explicitly instead of reaching for
//! shared globals.

use std::sync::Arc;

use crate::auth::TokenStore;
use crate::cache::FileStore;
use crate::cli::OutputFormat;
use crate::client::{FeedClient, WeeklyRequest};
use crate::config::Config;
use crate::error::Result;
use crate::schedule::{PeriodTimeTable, WeeklyRepository};

/// Shared state for command execution.
pub struct CommandContext {
    pub config: Config,
    pub store: Arc<FileStore>,
    pub tokens: Arc<TokenStore>,
    pub client: Arc<FeedClient>,
    pub periods: Arc<PeriodTimeTable>,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Build the full context from an optional config path override.
    pub fn new(format: OutputFormat, config_path: Option<&str>) -> Result<Self> {
        let config = Config::load_at(config_path)?;
        let store = Arc::new(FileStore::open()?);
        let tokens = Arc::new(TokenStore::open()?);
        let client = Arc::new(FeedClient::new(config.base_url_trimmed(), tokens.clone())?);
        let periods = Arc::new(PeriodTimeTable::load());

        Ok(Self {
            config,
            store,
            tokens,
            client,
            periods,
            format,
        })
    }

    /// Weekly request body drawn from config.
    pub fn weekly_request(&self) -> WeeklyRequest {
        WeeklyRequest {
            term_no: self.config.term_no,
            week: self.config.week,
        }
    }

    /// Repository over this context's client and store.
    pub fn repository(&self) -> WeeklyRepository {
        WeeklyRepository::new(
            self.client.clone() as Arc<dyn crate::client::FeedApi>,
            self.store.clone(),
            self.weekly_request(),
        )
    }
}
