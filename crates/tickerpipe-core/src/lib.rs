//! # Tickerpipe Core
//!
//! Transport-agnostic core of the `tickerpipe` historical price server.
//!
//! ## Overview
//!
//! A download request flows through one [`FetchPipeline`]:
//!
//! 1. [`Validator`] checks every parameter and accumulates errors.
//! 2. [`RateLimiter`] spaces outbound calls (500 ms by default).
//! 3. A [`HistorySource`] fetches the table, with one degraded retry.
//! 4. [`normalize`](normalize::normalize) turns the table into records and
//!    summary statistics.
//!
//! Every outcome is a [`ToolResponse`]: a [`NormalizedResult`] or an
//! [`ErrorResponse`] tagged `validation_error`, `no_data` or
//! `unexpected_error`.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo Finance chart adapter |
//! | [`config`] | Pipeline tunables |
//! | [`data_source`] | Upstream source trait, fetch parameters, source errors |
//! | [`domain`] | Period, interval, ticker and timestamp types |
//! | [`error`] | Core error types |
//! | [`health`] | Health probe result |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Table to records and summary |
//! | [`pipeline`] | The fetch pipeline |
//! | [`request`] | Inbound request and its echo form |
//! | [`response`] | Success and error envelopes |
//! | [`table`] | Upstream table model |
//! | [`throttling`] | Outbound call spacing |
//! | [`validation`] | Parameter validation |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickerpipe_core::{DownloadRequest, FetchPipeline, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = FetchPipeline::from_config(PipelineConfig::default());
//!     let request = DownloadRequest::new("AAPL").with_period("1mo");
//!
//!     let response = pipeline.download(request).await;
//!     println!("{}", response.to_pretty_json()?);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod health;
pub mod http_client;
pub mod normalize;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod table;
pub mod throttling;
pub mod validation;

// Upstream
pub use adapters::YahooChartSource;
pub use data_source::{FetchParams, FetchWindow, HistorySource, SourceError, SourceErrorKind};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Domain and request
pub use domain::{Interval, Period, Symbol, TickerSet, UtcDateTime};
pub use request::{DownloadFlags, DownloadRequest, RequestParams};
pub use table::{Cell, MultiSeriesTable, RawSeries, Row, SeriesColumn, SingleSeriesTable};

// Pipeline stages
pub use config::PipelineConfig;
pub use pipeline::FetchPipeline;
pub use throttling::RateLimiter;
pub use validation::{ValidatedRequest, ValidationReport, Validator};

// Responses
pub use health::{ServerState, ServerStatus, UpstreamConnection};
pub use normalize::{ColumnStats, NormalizedTable, Record, Summary};
pub use response::{ErrorDetail, ErrorResponse, Metadata, NormalizedResult, ToolResponse};

// Errors
pub use error::{CoreError, ValidationError};
