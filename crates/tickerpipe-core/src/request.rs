//! Inbound download request and its echo form.
//!
//! [`DownloadRequest`] keeps the caller's raw strings so every response can
//! echo them unchanged, even when they fail validation. Typed values live in
//! [`ValidatedRequest`](crate::validation::ValidatedRequest).

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Interval, Period};

/// Parameters of a `download_stock_data` call.
///
/// Absent and `null` fields both fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tickers: String,
    #[serde(default = "default_period", deserialize_with = "period_or_default")]
    pub period: String,
    #[serde(default = "default_interval", deserialize_with = "interval_or_default")]
    pub interval: String,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: bool,
    #[serde(default = "default_true", deserialize_with = "true_or_default")]
    pub auto_adjust: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prepost: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repair: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keepna: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rounding: bool,
}

impl Default for DownloadRequest {
    fn default() -> Self {
        Self {
            tickers: String::new(),
            period: default_period(),
            interval: default_interval(),
            start: None,
            end: None,
            actions: false,
            auto_adjust: true,
            prepost: false,
            repair: false,
            keepna: false,
            rounding: false,
        }
    }
}

impl DownloadRequest {
    pub fn new(tickers: impl Into<String>) -> Self {
        Self {
            tickers: tickers.into(),
            ..Self::default()
        }
    }

    pub fn with_period(mut self, period: impl Into<String>) -> Self {
        self.period = period.into();
        self
    }

    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = interval.into();
        self
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn with_flags(mut self, flags: DownloadFlags) -> Self {
        self.actions = flags.actions;
        self.auto_adjust = flags.auto_adjust;
        self.prepost = flags.prepost;
        self.repair = flags.repair;
        self.keepna = flags.keepna;
        self.rounding = flags.rounding;
        self
    }

    /// Start date, treating an empty string as absent.
    pub fn start(&self) -> Option<&str> {
        self.start.as_deref().filter(|value| !value.is_empty())
    }

    /// End date, treating an empty string as absent.
    pub fn end(&self) -> Option<&str> {
        self.end.as_deref().filter(|value| !value.is_empty())
    }

    /// A date range always wins over `period` when fetching.
    pub fn has_date_range(&self) -> bool {
        self.start().is_some() || self.end().is_some()
    }

    pub fn flags(&self) -> DownloadFlags {
        DownloadFlags {
            actions: self.actions,
            auto_adjust: self.auto_adjust,
            prepost: self.prepost,
            repair: self.repair,
            keepna: self.keepna,
            rounding: self.rounding,
        }
    }

    /// Window label echoed in successful responses: the period, or
    /// `"<start> to <end>"` with `N/A` for a missing bound.
    pub fn window_label(&self) -> String {
        if self.has_date_range() {
            format!(
                "{} to {}",
                self.start().unwrap_or("N/A"),
                self.end().unwrap_or("N/A")
            )
        } else {
            self.period.clone()
        }
    }

    pub fn params(&self) -> RequestParams {
        RequestParams {
            tickers: self.tickers.clone(),
            period: self.period.clone(),
            interval: self.interval.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

/// Behavior flags forwarded to the upstream fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadFlags {
    /// Include dividend and split columns.
    pub actions: bool,
    /// Adjust OHLC by the adjusted-close ratio and drop `Adj Close`.
    pub auto_adjust: bool,
    /// Include pre- and post-market rows.
    pub prepost: bool,
    /// Repair 100x currency-unit mix-ups.
    pub repair: bool,
    /// Keep rows whose every value is missing.
    pub keepna: bool,
    /// Round prices to two decimals.
    pub rounding: bool,
}

impl Default for DownloadFlags {
    fn default() -> Self {
        Self {
            actions: false,
            auto_adjust: true,
            prepost: false,
            repair: false,
            keepna: false,
            rounding: false,
        }
    }
}

/// Request parameters echoed in error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    pub tickers: String,
    pub period: String,
    pub interval: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn default_period() -> String {
    Period::default().as_str().to_owned()
}

fn default_interval() -> String {
    Interval::default().as_str().to_owned()
}

const fn default_true() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn period_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_period))
}

fn interval_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_interval))
}

fn true_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}
