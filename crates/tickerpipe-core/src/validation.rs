//! Request validation.
//!
//! Every check runs and errors accumulate, so a caller sees all problems with
//! a request at once. Warnings never block execution.

use std::str::FromStr;

use serde::Serialize;

use crate::data_source::FetchWindow;
use crate::domain::{parse_calendar_date, split_tickers, Interval, Period, TickerSet};
use crate::request::{DownloadFlags, DownloadRequest};
use crate::ValidationError;

/// Above this many tickers a request is allowed but flagged as slow.
pub const DEFAULT_TICKER_WARNING_THRESHOLD: usize = 10;

/// Outcome of validating one request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// A request whose parameters all parsed, ready to be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub tickers: TickerSet,
    pub window: FetchWindow,
    pub interval: Interval,
    pub flags: DownloadFlags,
    pub warnings: Vec<String>,
}

/// Stateless parameter checker.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    ticker_warning_threshold: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_TICKER_WARNING_THRESHOLD)
    }
}

impl Validator {
    pub const fn new(ticker_warning_threshold: usize) -> Self {
        Self {
            ticker_warning_threshold,
        }
    }

    /// Run every check against `request` and collect errors and warnings.
    pub fn validate(&self, request: &DownloadRequest) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let ticker_count = split_tickers(&request.tickers).count();
        if ticker_count == 0 {
            errors.push(ValidationError::EmptyTickers.to_string());
        } else if ticker_count > self.ticker_warning_threshold {
            warnings.push(format!(
                "Requesting {ticker_count} tickers may cause timeouts. Consider smaller batches."
            ));
        }

        if !request.period.is_empty() {
            if let Err(error) = Period::from_str(&request.period) {
                errors.push(error.to_string());
            }
        }

        if let Err(error) = Interval::from_str(&request.interval) {
            errors.push(error.to_string());
        }

        if let Some(start) = request.start() {
            if let Err(error) = parse_calendar_date("start", start) {
                errors.push(error.to_string());
            }
        }

        if let Some(end) = request.end() {
            if let Err(error) = parse_calendar_date("end", end) {
                errors.push(error.to_string());
            }
        }

        if request.has_date_range() && request.period != Period::default().as_str() {
            warnings.push(String::from(
                "Both date range and period specified. Date range will take precedence.",
            ));
        }

        ValidationReport::from_parts(errors, warnings)
    }

    /// Validate and, when the report is clean, convert into typed values.
    pub fn validated(
        &self,
        request: &DownloadRequest,
    ) -> Result<ValidatedRequest, ValidationReport> {
        let report = self.validate(request);
        if !report.is_valid() {
            return Err(report);
        }

        into_validated(request, report.warnings).map_err(|error| {
            ValidationReport::from_parts(vec![error.to_string()], Vec::new())
        })
    }
}

fn into_validated(
    request: &DownloadRequest,
    warnings: Vec<String>,
) -> Result<ValidatedRequest, ValidationError> {
    let tickers = TickerSet::parse(&request.tickers)?;
    let interval = Interval::from_str(&request.interval)?;

    let window = if request.has_date_range() {
        FetchWindow::Range {
            start: request
                .start()
                .map(|value| parse_calendar_date("start", value))
                .transpose()?,
            end: request
                .end()
                .map(|value| parse_calendar_date("end", value))
                .transpose()?,
        }
    } else if request.period.is_empty() {
        FetchWindow::Period(Period::default())
    } else {
        FetchWindow::Period(Period::from_str(&request.period)?)
    };

    Ok(ValidatedRequest {
        tickers,
        window,
        interval,
        flags: request.flags(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_request_has_no_findings() {
        let report = Validator::default().validate(&DownloadRequest::new("AAPL"));

        assert!(report.is_valid());
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn errors_accumulate_instead_of_short_circuiting() {
        let request = DownloadRequest::new("   ")
            .with_period("7y")
            .with_interval("2h")
            .with_start("2024/01/01")
            .with_end("yesterday");

        let report = Validator::default().validate(&request);

        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 5);
        assert_eq!(
            report.errors[0],
            "Tickers parameter is required and cannot be empty"
        );
    }

    #[test]
    fn empty_period_is_not_checked() {
        let report = Validator::default().validate(&DownloadRequest::new("AAPL").with_period(""));
        assert!(report.is_valid());
    }

    #[test]
    fn default_period_with_range_does_not_warn() {
        let request = DownloadRequest::new("AAPL").with_start("2024-01-01");
        let report = Validator::default().validate(&request);

        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn validated_request_uses_range_over_period() {
        let request = DownloadRequest::new("aapl msft")
            .with_period("5d")
            .with_start("2024-01-01")
            .with_end("2024-02-01");

        let validated = Validator::default()
            .validated(&request)
            .expect("request is valid");

        assert_eq!(validated.tickers.len(), 2);
        assert!(matches!(
            validated.window,
            FetchWindow::Range {
                start: Some(_),
                end: Some(_)
            }
        ));
        assert_eq!(validated.warnings.len(), 1);
    }

    #[test]
    fn threshold_is_configurable() {
        let report = Validator::new(1).validate(&DownloadRequest::new("AAPL MSFT"));

        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            vec![String::from(
                "Requesting 2 tickers may cause timeouts. Consider smaller batches."
            )]
        );
    }
}
