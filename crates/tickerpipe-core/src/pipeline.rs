//! The fetch pipeline: validate, throttle, fetch with one degraded retry,
//! normalize.
//!
//! [`FetchPipeline::download`] never fails: every outcome, including upstream
//! failures, comes back as a [`ToolResponse`].

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::adapters::YahooChartSource;
use crate::config::PipelineConfig;
use crate::data_source::{FetchParams, FetchWindow, HistorySource, SourceError};
use crate::domain::{Interval, Period, TickerSet, UtcDateTime};
use crate::health::ServerStatus;
use crate::http_client::ReqwestHttpClient;
use crate::normalize::normalize;
use crate::request::{DownloadFlags, DownloadRequest};
use crate::response::{
    rounded_seconds, ErrorResponse, Metadata, NormalizedResult, ToolResponse, DATA_SOURCE_LABEL,
};
use crate::table::RawSeries;
use crate::throttling::RateLimiter;
use crate::validation::Validator;

pub struct FetchPipeline {
    source: Arc<dyn HistorySource>,
    limiter: Arc<RateLimiter>,
    validator: Validator,
    config: PipelineConfig,
    last_status: Mutex<Option<ServerStatus>>,
}

impl FetchPipeline {
    pub fn new(source: Arc<dyn HistorySource>, limiter: Arc<RateLimiter>) -> Self {
        Self::with_config(source, limiter, PipelineConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn HistorySource>,
        limiter: Arc<RateLimiter>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            limiter,
            validator: Validator::new(config.ticker_warning_threshold),
            config,
            last_status: Mutex::new(None),
        }
    }

    /// Production pipeline: Yahoo chart source over reqwest.
    pub fn from_config(config: PipelineConfig) -> Self {
        let http_client = Arc::new(ReqwestHttpClient::new(&config.user_agent));
        let source = Arc::new(YahooChartSource::new(http_client, config.base_url.clone()));
        let limiter = Arc::new(RateLimiter::new(config.min_interval));
        Self::with_config(source, limiter, config)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Run one `download_stock_data` call end to end.
    pub async fn download(&self, request: DownloadRequest) -> ToolResponse {
        let span = tracing::info_span!(
            "download",
            request_id = %Uuid::new_v4(),
            tickers = %request.tickers,
        );
        self.run_download(&request).instrument(span).await
    }

    async fn run_download(&self, request: &DownloadRequest) -> ToolResponse {
        let started = Instant::now();
        let request_time = UtcDateTime::now();
        tracing::info!(
            period = %request.period,
            interval = %request.interval,
            "processing download request"
        );

        let validated = match self.validator.validated(request) {
            Ok(validated) => validated,
            Err(report) => {
                tracing::error!(errors = ?report.errors, "validation failed");
                return ErrorResponse::validation(report.errors, request).into();
            }
        };

        if !validated.warnings.is_empty() {
            tracing::warn!(warnings = ?validated.warnings, "parameter warnings");
        }

        self.limiter.acquire().await;

        let params = FetchParams::primary(
            validated.tickers,
            validated.window,
            validated.interval,
            validated.flags,
        )
        .with_timeout(self.config.primary_timeout);

        let series = match self.fetch_with_retry(&params).await {
            Ok(Some(series)) if !series.is_empty() => series,
            Ok(_) => {
                tracing::warn!("no data returned for request");
                return ErrorResponse::no_data(request).into();
            }
            Err(error) => {
                tracing::error!(%error, "upstream fetch failed after retry");
                return ErrorResponse::unexpected(
                    error.message(),
                    error.class_name(),
                    started.elapsed(),
                    request,
                )
                .into();
            }
        };

        tracing::info!(
            rows = series.row_count(),
            columns = series.column_count(),
            "retrieved upstream data"
        );

        let table = normalize(&series);
        let metadata = Metadata {
            request_time,
            processing_time_seconds: rounded_seconds(started.elapsed()),
            data_source: DATA_SOURCE_LABEL,
            warnings: validated.warnings,
        };

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "download completed"
        );
        NormalizedResult::new(request, table, metadata).into()
    }

    /// One attempt, then one retry with the retry timeout and sequential
    /// fetching. The retry does not wait on the rate limiter again.
    async fn fetch_with_retry(
        &self,
        params: &FetchParams,
    ) -> Result<Option<RawSeries>, SourceError> {
        match self.source.fetch(params).await {
            Ok(series) => Ok(series),
            Err(error) => {
                tracing::error!(
                    source = self.source.id(),
                    %error,
                    retryable = error.retryable(),
                    "upstream fetch failed"
                );
                tracing::info!("retrying with conservative settings");
                let retry = params.degraded(self.config.retry_timeout);
                self.source.fetch(&retry).await
            }
        }
    }

    /// Check the upstream with a minimal one-day fetch of the reference
    /// ticker, never retried.
    ///
    /// The check only runs when the rate limiter has a free slot right now, so
    /// status polling never queues ahead of downloads. Otherwise the last
    /// result is returned, or a skipped status when there is none yet.
    pub async fn server_status(&self) -> ServerStatus {
        let tickers = match TickerSet::parse(&self.config.probe_ticker) {
            Ok(tickers) => tickers,
            Err(error) => return ServerStatus::probe_failed(error.to_string()),
        };

        if !self.limiter.try_acquire() {
            tracing::debug!("rate limiter busy, upstream check skipped");
            return self
                .last_status
                .lock()
                .await
                .clone()
                .unwrap_or_else(ServerStatus::check_skipped);
        }

        let params = FetchParams::primary(
            tickers,
            FetchWindow::Period(Period::OneDay),
            Interval::OneDay,
            DownloadFlags::default(),
        )
        .with_timeout(self.config.probe_timeout);

        let outcome = self.source.fetch(&params).await;
        if let Err(error) = &outcome {
            tracing::warn!(%error, "upstream health check failed");
        }

        let status = ServerStatus::from_probe(outcome);
        *self.last_status.lock().await = Some(status.clone());
        status
    }
}
