use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

const CALENDAR_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const INDEX_LABEL: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
);

/// RFC3339 timestamp pinned to UTC, used for response timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc3339(self) -> String {
        // Years 0..=9999 with a UTC offset always format.
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date. `field` names the request
/// parameter so the error can point back at it.
pub fn parse_calendar_date(field: &'static str, input: &str) -> Result<Date, ValidationError> {
    Date::parse(input, CALENDAR_DATE).map_err(|_| ValidationError::InvalidDate {
        field,
        value: input.to_owned(),
    })
}

/// Row-index label, e.g. `2024-01-02 00:00:00-05:00`.
pub fn format_index_label(value: OffsetDateTime) -> String {
    value
        .format(INDEX_LABEL)
        .unwrap_or_else(|_| value.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_iso_calendar_date() {
        let date = parse_calendar_date("start", "2024-02-29").expect("leap day is valid");
        assert_eq!(date.to_string(), "2024-02-29");
    }

    #[test]
    fn rejects_slashes_and_impossible_dates() {
        for raw in ["2024/01/01", "2023-02-29", "20240101", "2024-01-01T00:00:00Z", ""] {
            let err = parse_calendar_date("end", raw).expect_err("must fail");
            assert_eq!(
                err,
                ValidationError::InvalidDate {
                    field: "end",
                    value: raw.to_owned(),
                }
            );
        }
    }

    #[test]
    fn formats_index_label_with_offset() {
        let label = format_index_label(datetime!(2024-01-02 00:00:00 -5));
        assert_eq!(label, "2024-01-02 00:00:00-05:00");
    }

    #[test]
    fn formats_utc_timestamp() {
        let ts = UtcDateTime(datetime!(2024-01-01 00:00:00 UTC));
        assert_eq!(ts.format_rfc3339(), "2024-01-01T00:00:00Z");
    }
}
