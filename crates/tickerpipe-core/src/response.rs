//! Response envelopes returned by the pipeline.
//!
//! Success and failure share one envelope style: a `success` discriminant, and
//! on failure an `error_type` tag, an RFC 3339 `timestamp` and the echoed
//! `request_params`.

use std::time::Duration;

use serde::Serialize;

use crate::domain::UtcDateTime;
use crate::normalize::{NormalizedTable, Record, Summary};
use crate::request::{DownloadRequest, RequestParams};
use crate::CoreError;

pub const DATA_SOURCE_LABEL: &str = "Yahoo Finance";

const NO_DATA_CAUSES: &[&str] = &[
    "Invalid ticker symbol(s)",
    "No trading data for the specified period",
    "Market closed or data not yet available",
    "Yahoo Finance API temporary issues",
];

const NO_DATA_SUGGESTIONS: &[&str] = &[
    "Verify ticker symbols are correct",
    "Try a different time period",
    "Check if markets are open",
    "Retry the request after a few moments",
];

const COMMON_SOLUTIONS: &[&str] = &[
    "Check internet connectivity",
    "Verify Yahoo Finance is accessible",
    "Try reducing the number of tickers",
    "Use a shorter time period",
    "Retry after a few minutes",
];

const CONTACT_INFO: &str = "Check Yahoo Finance chart API status for known issues";

/// Seconds rounded to millisecond precision.
pub fn rounded_seconds(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 1_000.0).round() / 1_000.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub request_time: UtcDateTime,
    pub processing_time_seconds: f64,
    pub data_source: &'static str,
    pub warnings: Vec<String>,
}

/// Successful download.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResult {
    pub success: bool,
    pub tickers: String,
    /// The requested period, or `"<start> to <end>"` for a date range.
    pub period: String,
    pub interval: String,
    pub shape: [usize; 2],
    pub columns: Vec<String>,
    pub data: Vec<Record>,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl NormalizedResult {
    pub fn new(request: &DownloadRequest, table: NormalizedTable, metadata: Metadata) -> Self {
        Self {
            success: true,
            tickers: request.tickers.clone(),
            period: request.window_label(),
            interval: request.interval.clone(),
            shape: table.shape,
            columns: table.columns,
            data: table.data,
            metadata,
            summary: table.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Troubleshooting {
    pub common_solutions: &'static [&'static str],
    pub contact_info: &'static str,
}

/// Failure kinds, tagged by `error_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum ErrorDetail {
    ValidationError {
        errors: Vec<String>,
    },
    NoData {
        message: String,
        possible_causes: &'static [&'static str],
        suggestions: &'static [&'static str],
    },
    UnexpectedError {
        error_message: String,
        error_class: String,
        processing_time_seconds: f64,
        troubleshooting: Troubleshooting,
    },
}

impl ErrorDetail {
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "validation_error",
            Self::NoData { .. } => "no_data",
            Self::UnexpectedError { .. } => "unexpected_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    #[serde(flatten)]
    pub detail: ErrorDetail,
    pub timestamp: UtcDateTime,
    pub request_params: RequestParams,
}

impl ErrorResponse {
    fn new(detail: ErrorDetail, request_params: RequestParams) -> Self {
        Self {
            success: false,
            detail,
            timestamp: UtcDateTime::now(),
            request_params,
        }
    }

    pub fn validation(errors: Vec<String>, request: &DownloadRequest) -> Self {
        Self::new(ErrorDetail::ValidationError { errors }, request.params())
    }

    pub fn no_data(request: &DownloadRequest) -> Self {
        Self::new(
            ErrorDetail::NoData {
                message: format!("No data found for ticker(s): {}", request.tickers),
                possible_causes: NO_DATA_CAUSES,
                suggestions: NO_DATA_SUGGESTIONS,
            },
            request.params(),
        )
    }

    pub fn unexpected(
        error_message: impl Into<String>,
        error_class: impl Into<String>,
        elapsed: Duration,
        request: &DownloadRequest,
    ) -> Self {
        Self::new(
            ErrorDetail::UnexpectedError {
                error_message: error_message.into(),
                error_class: error_class.into(),
                processing_time_seconds: rounded_seconds(elapsed),
                troubleshooting: Troubleshooting {
                    common_solutions: COMMON_SOLUTIONS,
                    contact_info: CONTACT_INFO,
                },
            },
            request.params(),
        )
    }

    pub const fn error_type(&self) -> &'static str {
        self.detail.error_type()
    }
}

/// Outcome of a `download_stock_data` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Success(Box<NormalizedResult>),
    Failure(ErrorResponse),
}

impl ToolResponse {
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn as_success(&self) -> Option<&NormalizedResult> {
        match self {
            Self::Success(result) => Some(result),
            Self::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<NormalizedResult> for ToolResponse {
    fn from(value: NormalizedResult) -> Self {
        Self::Success(Box::new(value))
    }
}

impl From<ErrorResponse> for ToolResponse {
    fn from(value: ErrorResponse) -> Self {
        Self::Failure(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn validation_error_shape() {
        let request = DownloadRequest::new("").with_period("7y");
        let response = ErrorResponse::validation(vec![String::from("bad")], &request);

        let value = serde_json::to_value(&response).expect("serializes");
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error_type"], json!("validation_error"));
        assert_eq!(value["errors"], json!(["bad"]));
        assert_eq!(
            value["request_params"],
            json!({
                "tickers": "",
                "period": "7y",
                "interval": "1d",
                "start": null,
                "end": null
            })
        );
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn no_data_lists_causes_and_suggestions() {
        let response = ErrorResponse::no_data(&DownloadRequest::new("ZZZZ"));
        let value = serde_json::to_value(&response).expect("serializes");

        assert_eq!(value["error_type"], json!("no_data"));
        assert_eq!(value["message"], json!("No data found for ticker(s): ZZZZ"));
        assert_eq!(value["possible_causes"].as_array().map(Vec::len), Some(4));
        assert_eq!(value["suggestions"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn unexpected_error_carries_troubleshooting() {
        let response = ErrorResponse::unexpected(
            "connection reset",
            "Unavailable",
            Duration::from_millis(1_234),
            &DownloadRequest::new("AAPL"),
        );
        let value = serde_json::to_value(&response).expect("serializes");

        assert_eq!(value["error_type"], json!("unexpected_error"));
        assert_eq!(value["error_class"], json!("Unavailable"));
        assert_eq!(value["processing_time_seconds"], json!(1.234));
        assert_eq!(
            value["troubleshooting"]["common_solutions"]
                .as_array()
                .map(Vec::len),
            Some(5)
        );
        assert!(matches!(
            value["troubleshooting"]["contact_info"],
            Value::String(_)
        ));
    }

    #[test]
    fn rounds_to_milliseconds() {
        assert_eq!(rounded_seconds(Duration::from_micros(1_234_567)), 1.235);
        assert_eq!(rounded_seconds(Duration::ZERO), 0.0);
    }
}
