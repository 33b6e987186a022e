//! Upstream data source contract.
//!
//! [`HistorySource`] is the single outbound dependency of the pipeline: a bulk
//! historical-quotes fetch keyed by tickers, window, interval and behavior
//! flags. [`YahooChartSource`](crate::adapters::YahooChartSource) is the
//! production implementation; tests substitute in-process fakes.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::{Interval, Period, TickerSet};
use crate::request::DownloadFlags;
use crate::table::RawSeries;

/// Timeout of the first upstream attempt.
pub const PRIMARY_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout of the single degraded retry.
pub const RETRY_TIMEOUT: Duration = Duration::from_secs(15);

/// Time span to fetch: a relative period, or an explicit date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchWindow {
    Period(Period),
    Range {
        start: Option<Date>,
        end: Option<Date>,
    },
}

/// Parameters of one upstream attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub tickers: TickerSet,
    pub window: FetchWindow,
    pub interval: Interval,
    pub flags: DownloadFlags,
    pub timeout: Duration,
    /// Fetch tickers concurrently when true.
    pub parallel: bool,
}

impl FetchParams {
    /// First-attempt parameters: primary timeout, parallel fetch.
    pub fn primary(
        tickers: TickerSet,
        window: FetchWindow,
        interval: Interval,
        flags: DownloadFlags,
    ) -> Self {
        Self {
            tickers,
            window,
            interval,
            flags,
            timeout: PRIMARY_TIMEOUT,
            parallel: true,
        }
    }

    /// Degraded settings for the retry: shorter timeout, sequential fetch.
    pub fn degraded(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            parallel: false,
            ..self.clone()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Error category for source failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceErrorKind {
    Unavailable,
    Timeout,
    Parse,
    InvalidRequest,
    Internal,
}

impl SourceErrorKind {
    /// Type tag reported as `error_class` in unexpected-error responses.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unavailable => "Unavailable",
            Self::Timeout => "Timeout",
            Self::Parse => "Parse",
            Self::InvalidRequest => "InvalidRequest",
            Self::Internal => "Internal",
        }
    }
}

impl Display for SourceErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured source error.
///
/// `retryable` is advisory: it records whether the failure looks transient and
/// is logged with it. The pipeline retries every failed attempt once whatever
/// the flag says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Parse,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn class_name(&self) -> &'static str {
        self.kind.as_str()
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SourceError {}

/// Bulk historical-quotes provider.
///
/// `Ok(None)` and an empty table both mean the provider answered with no
/// rows; `Err` means the attempt itself failed.
pub trait HistorySource: Send + Sync {
    fn id(&self) -> &'static str;

    fn fetch<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RawSeries>, SourceError>> + Send + 'a>>;
}
