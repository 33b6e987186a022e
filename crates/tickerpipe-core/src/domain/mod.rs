//! # Domain Models
//!
//! Strongly-typed request vocabulary for historical price downloads.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Period`] | Relative lookback window (`1mo`, `1y`, `ytd`, ...) |
//! | [`Interval`] | Row granularity (`1m` ... `3mo`) |
//! | [`Symbol`] | Normalized ticker |
//! | [`TickerSet`] | Ordered, de-duplicated tickers of one request |
//! | [`UtcDateTime`] | UTC response timestamp |
//!
//! Parsing is strict: unknown periods and intervals, and dates that are not
//! `YYYY-MM-DD`, return a [`ValidationError`](crate::ValidationError) whose
//! message is suitable for echoing to the caller.

mod interval;
mod period;
mod ticker;
mod timestamp;

pub use interval::Interval;
pub use period::Period;
pub use ticker::{split_tickers, Symbol, TickerSet};
pub use timestamp::{format_index_label, parse_calendar_date, UtcDateTime};
