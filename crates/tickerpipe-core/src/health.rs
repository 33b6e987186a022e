use serde::Serialize;

use crate::data_source::SourceError;
use crate::domain::UtcDateTime;
use crate::response::DATA_SOURCE_LABEL;
use crate::table::RawSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerState {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamConnection {
    Ok,
    Degraded,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub server: &'static str,
    pub data_source: &'static str,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            server: env!("CARGO_PKG_VERSION"),
            data_source: DATA_SOURCE_LABEL,
        }
    }
}

/// Result of `get_server_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub server: ServerState,
    pub upstream_connection: UpstreamConnection,
    pub last_test: UtcDateTime,
    pub version: VersionInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerStatus {
    /// Classify the outcome of the probe fetch.
    pub fn from_probe(outcome: Result<Option<RawSeries>, SourceError>) -> Self {
        match outcome {
            Ok(Some(series)) if !series.is_empty() => {
                Self::new(ServerState::Healthy, UpstreamConnection::Ok, None)
            }
            Ok(_) => Self::new(ServerState::Healthy, UpstreamConnection::Degraded, None),
            Err(error) => Self::probe_failed(error.to_string()),
        }
    }

    pub fn probe_failed(message: impl Into<String>) -> Self {
        Self::new(
            ServerState::Degraded,
            UpstreamConnection::Error,
            Some(message.into()),
        )
    }

    /// The upstream check did not run because the rate limiter had no free
    /// slot and no earlier result was cached.
    pub fn check_skipped() -> Self {
        Self::new(
            ServerState::Healthy,
            UpstreamConnection::Degraded,
            Some(String::from("upstream check skipped: rate limiter busy")),
        )
    }

    fn new(
        server: ServerState,
        upstream_connection: UpstreamConnection,
        error: Option<String>,
    ) -> Self {
        Self {
            server,
            upstream_connection,
            last_test: UtcDateTime::now(),
            version: VersionInfo::default(),
            error,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.server == ServerState::Healthy
    }
}
