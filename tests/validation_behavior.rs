//! Behavior-driven tests for request validation
//!
//! These tests verify HOW the validator treats caller parameters: which
//! problems block a request, which only warn, and what the messages say.

use tickerpipe_core::{DownloadRequest, ValidationReport, Validator};

fn validate(request: &DownloadRequest) -> ValidationReport {
    Validator::default().validate(request)
}

// =============================================================================
// Validation: Ticker Set
// =============================================================================

#[test]
fn when_more_than_ten_tickers_requested_system_warns_but_accepts() {
    // Given: A request for eleven tickers
    let tickers = "AAPL MSFT GOOG AMZN META NVDA TSLA NFLX AMD INTC ORCL";

    // When: The request is validated
    let report = validate(&DownloadRequest::new(tickers));

    // Then: It is valid, with a single timeout advisory
    assert!(report.valid);
    assert!(report.errors.is_empty());
    assert_eq!(
        report.warnings,
        vec![String::from(
            "Requesting 11 tickers may cause timeouts. Consider smaller batches."
        )]
    );
}

#[test]
fn when_exactly_ten_tickers_requested_system_does_not_warn() {
    let tickers = "A B C D E F G H I J";

    let report = validate(&DownloadRequest::new(tickers));

    assert!(report.valid);
    assert!(report.warnings.is_empty());
}

#[test]
fn when_tickers_are_blank_system_rejects_request() {
    for blank in ["", "   ", "\t\n"] {
        let report = validate(&DownloadRequest::new(blank));

        assert!(!report.valid, "blank tickers {blank:?} must be rejected");
        assert_eq!(
            report.errors,
            vec![String::from(
                "Tickers parameter is required and cannot be empty"
            )]
        );
    }
}

// =============================================================================
// Validation: Dates
// =============================================================================

#[test]
fn when_start_uses_slashes_system_names_field_and_value() {
    // Given: A start date in the wrong format
    let request = DownloadRequest::new("AAPL").with_start("2024/01/01");

    // When: The request is validated
    let report = validate(&request);

    // Then: The error names the field and echoes the value
    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![String::from(
            "Invalid start date format '2024/01/01'. Use YYYY-MM-DD format."
        )]
    );
}

#[test]
fn when_end_is_malformed_system_reports_end_field() {
    let request = DownloadRequest::new("AAPL").with_end("01-31-2024");

    let report = validate(&request);

    assert!(!report.valid);
    assert!(report.errors[0].starts_with("Invalid end date format '01-31-2024'"));
}

#[test]
fn when_empty_dates_are_sent_system_treats_them_as_absent() {
    let request = DownloadRequest::new("AAPL").with_start("").with_end("");

    let report = validate(&request);

    assert!(report.valid);
    assert!(report.warnings.is_empty());
}

// =============================================================================
// Validation: Period and Interval
// =============================================================================

#[test]
fn when_period_is_unknown_system_lists_allowed_periods() {
    let report = validate(&DownloadRequest::new("AAPL").with_period("3y"));

    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![String::from(
            "Invalid period '3y'. Valid options: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max"
        )]
    );
}

#[test]
fn when_interval_is_unknown_system_lists_allowed_intervals() {
    let report = validate(&DownloadRequest::new("AAPL").with_interval("4h"));

    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![String::from(
            "Invalid interval '4h'. Valid options: 1m, 2m, 5m, 15m, 30m, 60m, 90m, 1h, 1d, 5d, 1wk, 1mo, 3mo"
        )]
    );
}

#[test]
fn when_period_and_range_are_both_given_system_warns_range_wins() {
    // Given: A non-default period alongside an explicit range
    let request = DownloadRequest::new("AAPL")
        .with_period("6mo")
        .with_start("2024-01-01")
        .with_end("2024-03-01");

    // When: The request is validated
    let report = validate(&request);

    // Then: It stays valid and carries the precedence warning
    assert!(report.valid);
    assert_eq!(
        report.warnings,
        vec![String::from(
            "Both date range and period specified. Date range will take precedence."
        )]
    );
}

#[test]
fn when_every_parameter_is_wrong_system_reports_all_errors_at_once() {
    let request = DownloadRequest::new("")
        .with_period("forever")
        .with_interval("1s")
        .with_start("yesterday")
        .with_end("2024-13-01");

    let report = validate(&request);

    assert!(!report.valid);
    assert_eq!(report.errors.len(), 5);
    assert!(report.errors[1].starts_with("Invalid period 'forever'"));
    assert!(report.errors[2].starts_with("Invalid interval '1s'"));
    assert!(report.errors[3].contains("start"));
    assert!(report.errors[4].contains("end"));
}

#[test]
fn report_serializes_valid_errors_and_warnings() {
    let report = validate(&DownloadRequest::new("AAPL").with_period("7y"));

    let value = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(value["valid"], serde_json::json!(false));
    assert_eq!(value["errors"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["warnings"], serde_json::json!([]));
}
