use thiserror::Error;

use crate::domain::{Interval, Period};

/// Validation and contract errors exposed by `tickerpipe-core`.
///
/// The display strings double as the messages reported back to tool callers,
/// so they are phrased for humans rather than for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Tickers parameter is required and cannot be empty")]
    EmptyTickers,

    #[error("Invalid period '{value}'. Valid options: {}", Period::options())]
    InvalidPeriod { value: String },
    #[error("Invalid interval '{value}'. Valid options: {}", Interval::options())]
    InvalidInterval { value: String },

    #[error("Invalid {field} date format '{value}'. Use YYYY-MM-DD format.")]
    InvalidDate { field: &'static str, value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_error_lists_allowed_values() {
        let message = ValidationError::InvalidPeriod {
            value: String::from("7y"),
        }
        .to_string();

        assert!(message.starts_with("Invalid period '7y'."));
        assert!(message.contains("1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max"));
    }

    #[test]
    fn date_error_names_field_and_value() {
        let message = ValidationError::InvalidDate {
            field: "start",
            value: String::from("2024/01/01"),
        }
        .to_string();

        assert_eq!(
            message,
            "Invalid start date format '2024/01/01'. Use YYYY-MM-DD format."
        );
    }
}
