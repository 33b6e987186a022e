use std::time::Duration;

use crate::adapters::DEFAULT_BASE_URL;
use crate::data_source::{PRIMARY_TIMEOUT, RETRY_TIMEOUT};
use crate::http_client::DEFAULT_USER_AGENT;
use crate::throttling::DEFAULT_MIN_INTERVAL;
use crate::validation::DEFAULT_TICKER_WARNING_THRESHOLD;

/// Timeout of the health probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Reference ticker fetched by the health probe.
pub const PROBE_TICKER: &str = "AAPL";

/// Tunables of a [`FetchPipeline`](crate::FetchPipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub min_interval: Duration,
    pub primary_timeout: Duration,
    pub retry_timeout: Duration,
    pub probe_timeout: Duration,
    pub probe_ticker: String,
    pub ticker_warning_threshold: usize,
    pub base_url: String,
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            primary_timeout: PRIMARY_TIMEOUT,
            retry_timeout: RETRY_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
            probe_ticker: String::from(PROBE_TICKER),
            ticker_warning_threshold: DEFAULT_TICKER_WARNING_THRESHOLD,
            base_url: String::from(DEFAULT_BASE_URL),
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }
}

impl PipelineConfig {
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
