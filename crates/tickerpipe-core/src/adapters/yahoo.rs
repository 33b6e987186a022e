//! Yahoo Finance chart (v8) adapter.
//!
//! One `GET {base}/v8/finance/chart/{symbol}` per ticker. Rows are indexed in
//! the exchange's local time, using the offset its time zone had at each row
//! (the response's fixed `gmtoffset` when the zone is unknown); daily and
//! longer intervals are pinned to local midnight. Several tickers are joined
//! on the exact instant for intraday bars and on the calendar date otherwise,
//! so exchanges in different zones share one row per trading day. Behavior flags are applied here, before the table leaves the
//! adapter:
//!
//! | Flag | Effect |
//! |------|--------|
//! | `auto_adjust` | OHLC scaled by `adjclose / close`, `Adj Close` dropped |
//! | `actions` | `Dividends` and `Stock Splits` columns, `0.0` when no event |
//! | `repair` | prices ~100x off the column median are rescaled |
//! | `keepna` | keep rows whose prices are all missing |
//! | `rounding` | prices rounded to two decimals |

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{Offset, TimeZone};
use chrono_tz::Tz;
use futures::future::join_all;
use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime, Time, UtcOffset};

use crate::data_source::{FetchParams, FetchWindow, HistorySource, SourceError};
use crate::domain::{Interval, Symbol};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::request::DownloadFlags;
use crate::table::{Cell, MultiSeriesTable, RawSeries, Row, SeriesColumn, SingleSeriesTable};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

const NOT_FOUND_CODE: &str = "Not Found";
/// Lookback used when only an end date is given (roughly 99 years).
const OPEN_START_LOOKBACK: Duration = Duration::days(99 * 365 + 24);
/// One-minute bars are only served for the last seven days.
const ONE_MINUTE_LOOKBACK: Duration = Duration::days(7);

/// Price and event columns, in the order they appear in a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    AdjClose,
    Close,
    Dividends,
    High,
    Low,
    Open,
    StockSplits,
    Volume,
}

impl Field {
    const fn label(self) -> &'static str {
        match self {
            Self::AdjClose => "Adj Close",
            Self::Close => "Close",
            Self::Dividends => "Dividends",
            Self::High => "High",
            Self::Low => "Low",
            Self::Open => "Open",
            Self::StockSplits => "Stock Splits",
            Self::Volume => "Volume",
        }
    }
}

fn fields_for(flags: DownloadFlags) -> Vec<Field> {
    let mut fields = Vec::with_capacity(8);
    if !flags.auto_adjust {
        fields.push(Field::AdjClose);
    }
    fields.push(Field::Close);
    if flags.actions {
        fields.push(Field::Dividends);
    }
    fields.extend([Field::High, Field::Low, Field::Open]);
    if flags.actions {
        fields.push(Field::StockSplits);
    }
    fields.push(Field::Volume);
    fields
}

/// Historical prices from the Yahoo Finance chart endpoint.
#[derive(Clone)]
pub struct YahooChartSource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl Default for YahooChartSource {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()))
    }
}

impl YahooChartSource {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http_client,
            base_url,
        }
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self::new(http_client, DEFAULT_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chart URL for one symbol; `now` anchors open-ended date ranges.
    pub fn chart_url(&self, symbol: &Symbol, params: &FetchParams, now: OffsetDateTime) -> String {
        let mut query = vec![
            format!("interval={}", params.interval.as_str()),
            format!("includePrePost={}", params.flags.prepost),
        ];

        match params.window {
            FetchWindow::Period(period) => query.push(format!("range={}", period.as_str())),
            FetchWindow::Range { start, end } => {
                let (period1, period2) = range_bounds(start, end, params.interval, now);
                query.push(format!("period1={period1}"));
                query.push(format!("period2={period2}"));
            }
        }

        if params.flags.actions {
            query.push(format!("events={}", urlencoding::encode("div,splits")));
        }

        format!(
            "{}/v8/finance/chart/{}?{}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            query.join("&")
        )
    }

    async fn fetch_symbol(
        &self,
        symbol: &Symbol,
        params: &FetchParams,
        now: OffsetDateTime,
    ) -> Result<Option<Vec<Row>>, SourceError> {
        let url = self.chart_url(symbol, params, now);
        tracing::debug!(symbol = %symbol, %url, "requesting yahoo chart");

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout(params.timeout);

        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.is_timeout() {
                SourceError::timeout(format!("yahoo request for {symbol} timed out: {error}"))
            } else {
                SourceError::unavailable(format!("yahoo transport error for {symbol}: {error}"))
            }
        })?;

        parse_chart_response(symbol, &response, params.interval, params.flags)
    }
}

impl HistorySource for YahooChartSource {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    fn fetch<'a>(
        &'a self,
        params: &'a FetchParams,
    ) -> Pin<Box<dyn Future<Output = Result<Option<RawSeries>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let now = OffsetDateTime::now_utc();
            let symbols = params.tickers.symbols();

            let results = if params.parallel {
                join_all(
                    symbols
                        .iter()
                        .map(|symbol| self.fetch_symbol(symbol, params, now)),
                )
                .await
            } else {
                let mut results = Vec::with_capacity(symbols.len());
                for symbol in symbols {
                    results.push(self.fetch_symbol(symbol, params, now).await);
                }
                results
            };

            let fetched = results.into_iter().collect::<Result<Vec<_>, _>>()?;
            Ok(assemble(symbols, &fields_for(params.flags), params.interval, fetched))
        })
    }
}

/// Epoch bounds for an explicit date range. The end date is exclusive at
/// midnight UTC.
fn range_bounds(
    start: Option<Date>,
    end: Option<Date>,
    interval: Interval,
    now: OffsetDateTime,
) -> (i64, i64) {
    let period2 = end.map_or(now, |date| date.midnight().assume_utc());
    let period1 = match start {
        Some(date) => date.midnight().assume_utc(),
        None if interval == Interval::OneMinute => period2 - ONE_MINUTE_LOOKBACK,
        None => now - OPEN_START_LOOKBACK,
    };

    (period1.unix_timestamp(), period2.unix_timestamp())
}

/// Turn one chart response into rows, or `None` when the symbol has no data.
fn parse_chart_response(
    symbol: &Symbol,
    response: &HttpResponse,
    interval: Interval,
    flags: DownloadFlags,
) -> Result<Option<Vec<Row>>, SourceError> {
    if response.status == 404 {
        tracing::warn!(symbol = %symbol, "yahoo has no chart for symbol");
        return Ok(None);
    }

    if !response.is_success() {
        return Err(SourceError::unavailable(format!(
            "yahoo returned status {} for {symbol}",
            response.status
        )));
    }

    let envelope: ChartEnvelope = serde_json::from_str(&response.body).map_err(|e| {
        SourceError::parse(format!("failed to parse yahoo chart for {symbol}: {e}"))
    })?;

    if let Some(error) = envelope.chart.error {
        if error.code == NOT_FOUND_CODE {
            tracing::warn!(symbol = %symbol, "yahoo reports symbol not found");
            return Ok(None);
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart error for {symbol}: {} ({})",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = envelope.chart.result.unwrap_or_default().into_iter().next() else {
        return Ok(None);
    };

    let rows = build_rows(result, interval, flags)?;
    Ok((!rows.is_empty()).then_some(rows))
}

fn build_rows(
    result: ChartResult,
    interval: Interval,
    flags: DownloadFlags,
) -> Result<Vec<Row>, SourceError> {
    let clock = ExchangeClock::from_meta(&result.meta)?;

    let len = result.timestamp.len();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|series| series.adjclose)
        .unwrap_or_default();

    let mut open = padded(quote.open, len);
    let mut high = padded(quote.high, len);
    let mut low = padded(quote.low, len);
    let mut close = padded(quote.close, len);
    let mut adj_close = padded(adjclose, len);
    let volume = padded(quote.volume, len);

    if flags.repair {
        for column in [&mut open, &mut high, &mut low, &mut close, &mut adj_close] {
            repair_unit_mixups(column);
        }
    }

    let (dividends, splits) = match (flags.actions, result.events) {
        (true, Some(events)) => index_events(events, &clock, interval)?,
        _ => (HashMap::new(), HashMap::new()),
    };

    let fields = fields_for(flags);
    let mut rows = Vec::with_capacity(len);

    for (i, &timestamp) in result.timestamp.iter().enumerate() {
        let (mut o, mut h, mut l, mut c) = (open[i], high[i], low[i], close[i]);
        if !flags.keepna && o.is_none() && h.is_none() && l.is_none() && c.is_none() {
            continue;
        }

        let mut a = adj_close[i];
        if flags.auto_adjust {
            if let (Some(adjusted), Some(raw)) = (a, c) {
                if raw != 0.0 {
                    let ratio = adjusted / raw;
                    o = o.map(|value| value * ratio);
                    h = h.map(|value| value * ratio);
                    l = l.map(|value| value * ratio);
                    c = c.map(|value| value * ratio);
                }
            }
        }

        if flags.rounding {
            for value in [&mut o, &mut h, &mut l, &mut c, &mut a] {
                *value = value.map(round_cents);
            }
        }

        let index = row_index(timestamp, &clock, interval)?;
        let key = index.unix_timestamp();
        let cells = fields
            .iter()
            .map(|field| match field {
                Field::AdjClose => Cell::from_f64(a),
                Field::Close => Cell::from_f64(c),
                Field::Dividends => Cell::Number(dividends.get(&key).copied().unwrap_or(0.0)),
                Field::High => Cell::from_f64(h),
                Field::Low => Cell::from_f64(l),
                Field::Open => Cell::from_f64(o),
                Field::StockSplits => Cell::Number(splits.get(&key).copied().unwrap_or(0.0)),
                Field::Volume => Cell::from_f64(volume[i]),
            })
            .collect();

        rows.push(Row::new(index, cells));
    }

    Ok(rows)
}

/// Dividend amounts and split ratios keyed by the epoch of their row index.
fn index_events(
    events: ChartEvents,
    clock: &ExchangeClock,
    interval: Interval,
) -> Result<(HashMap<i64, f64>, HashMap<i64, f64>), SourceError> {
    let mut dividends = HashMap::new();
    for event in events.dividends.into_values() {
        let key = row_index(event.date, clock, interval)?.unix_timestamp();
        *dividends.entry(key).or_insert(0.0) += event.amount;
    }

    let mut splits = HashMap::new();
    for event in events.splits.into_values() {
        if event.denominator == 0.0 {
            continue;
        }
        let key = row_index(event.date, clock, interval)?.unix_timestamp();
        splits.insert(key, event.numerator / event.denominator);
    }

    Ok((dividends, splits))
}

/// Local clock of the exchange a chart belongs to.
#[derive(Debug, Clone, Copy)]
enum ExchangeClock {
    Zone(Tz),
    Fixed(UtcOffset),
}

impl ExchangeClock {
    fn from_meta(meta: &ChartMeta) -> Result<Self, SourceError> {
        if let Some(zone) = meta
            .exchange_timezone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            return Ok(Self::Zone(zone));
        }

        UtcOffset::from_whole_seconds(meta.gmt_offset)
            .map(Self::Fixed)
            .map_err(|e| {
                SourceError::parse(format!("invalid exchange offset {}: {e}", meta.gmt_offset))
            })
    }

    fn offset_at(self, timestamp: i64) -> Result<UtcOffset, SourceError> {
        match self {
            Self::Fixed(offset) => Ok(offset),
            Self::Zone(zone) => {
                let utc = chrono::DateTime::from_timestamp(timestamp, 0)
                    .ok_or_else(|| SourceError::parse(format!("invalid timestamp {timestamp}")))?;
                let seconds = zone
                    .offset_from_utc_datetime(&utc.naive_utc())
                    .fix()
                    .local_minus_utc();
                UtcOffset::from_whole_seconds(seconds).map_err(|e| {
                    SourceError::parse(format!("invalid offset {seconds} for {zone}: {e}"))
                })
            }
        }
    }
}

fn row_index(
    timestamp: i64,
    clock: &ExchangeClock,
    interval: Interval,
) -> Result<OffsetDateTime, SourceError> {
    let local = OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| SourceError::parse(format!("invalid timestamp {timestamp}: {e}")))?
        .to_offset(clock.offset_at(timestamp)?);

    Ok(if interval.is_intraday() {
        local
    } else {
        local.replace_time(Time::MIDNIGHT)
    })
}

/// Row identity when joining tickers: the instant for intraday bars, the
/// local calendar date otherwise.
fn alignment_key(index: OffsetDateTime, interval: Interval) -> i64 {
    if interval.is_intraday() {
        index.unix_timestamp()
    } else {
        i64::from(index.date().to_julian_day())
    }
}

fn padded(mut values: Vec<Option<f64>>, len: usize) -> Vec<Option<f64>> {
    values.resize(len, None);
    values
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rescale prices quoted in the wrong currency unit (cents vs. units).
fn repair_unit_mixups(values: &mut [Option<f64>]) {
    let mut present = values
        .iter()
        .flatten()
        .copied()
        .filter(|value| value.is_finite() && *value > 0.0)
        .collect::<Vec<_>>();
    if present.len() < 3 {
        return;
    }

    present.sort_by(f64::total_cmp);
    let median = present[present.len() / 2];

    for value in values.iter_mut().flatten() {
        let ratio = *value / median;
        if (80.0..=120.0).contains(&ratio) {
            *value /= 100.0;
        } else if (1.0 / 120.0..=1.0 / 80.0).contains(&ratio) {
            *value *= 100.0;
        }
    }
}

/// Combine per-symbol rows into one table. A single symbol keeps plain field
/// columns; several symbols are aligned on the union of their row keys, and a
/// shared row keeps the index of the first ticker that has it.
fn assemble(
    symbols: &[Symbol],
    fields: &[Field],
    interval: Interval,
    fetched: Vec<Option<Vec<Row>>>,
) -> Option<RawSeries> {
    if let ([symbol], [Some(rows)]) = (symbols, fetched.as_slice()) {
        return Some(RawSeries::Single(SingleSeriesTable {
            symbol: symbol.clone(),
            columns: fields.iter().map(|field| field.label().to_owned()).collect(),
            rows: rows.clone(),
        }));
    }

    if fetched.iter().all(Option::is_none) {
        return None;
    }

    let ticker_count = symbols.len();
    let columns = fields
        .iter()
        .flat_map(|field| {
            symbols
                .iter()
                .map(move |symbol| SeriesColumn::new(field.label(), symbol.clone()))
        })
        .collect::<Vec<_>>();

    let mut aligned: BTreeMap<i64, Row> = BTreeMap::new();
    for (ticker_idx, rows) in fetched.into_iter().enumerate() {
        for row in rows.into_iter().flatten() {
            let entry = aligned
                .entry(alignment_key(row.index, interval))
                .or_insert_with(|| Row::new(row.index, vec![Cell::Missing; columns.len()]));
            for (field_idx, cell) in row.cells.into_iter().enumerate() {
                entry.cells[field_idx * ticker_count + ticker_idx] = cell;
            }
        }
    }

    Some(RawSeries::Multi(MultiSeriesTable {
        columns,
        rows: aligned.into_values().collect(),
    }))
}

// Yahoo Finance chart response structures

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: ChartIndicators,
    #[serde(default)]
    events: Option<ChartEvents>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default, rename = "gmtoffset")]
    gmt_offset: i32,
    #[serde(default, rename = "exchangeTimezoneName")]
    exchange_timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: BTreeMap<String, DividendEvent>,
    #[serde(default)]
    splits: BTreeMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::domain::{format_index_label, Period, TickerSet};
    use time::macros::{date, datetime};

    const AAPL_CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "symbol": "AAPL", "gmtoffset": -18000 },
                "timestamp": [1704205800, 1704292200, 1704378600],
                "events": {
                    "dividends": { "1704292200": { "amount": 0.24, "date": 1704292200 } },
                    "splits": { "1704205800": { "date": 1704205800, "numerator": 4, "denominator": 1 } }
                },
                "indicators": {
                    "quote": [{
                        "open": [187.15, 184.22, null],
                        "high": [188.44, 185.88, null],
                        "low": [183.89, 183.43, null],
                        "close": [185.64, 184.25, null],
                        "volume": [82488700, 58414500, null]
                    }],
                    "adjclose": [{ "adjclose": [184.73, 183.35, null] }]
                }
            }],
            "error": null
        }
    }"#;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    fn params(flags: DownloadFlags) -> FetchParams {
        FetchParams::primary(
            TickerSet::parse("AAPL").expect("valid tickers"),
            FetchWindow::Period(Period::OneMonth),
            Interval::OneDay,
            flags,
        )
    }

    fn raw_flags() -> DownloadFlags {
        DownloadFlags {
            auto_adjust: false,
            ..DownloadFlags::default()
        }
    }

    fn parse(body: &str, flags: DownloadFlags) -> Result<Option<Vec<Row>>, SourceError> {
        parse_chart_response(
            &symbol("AAPL"),
            &HttpResponse::ok_json(body),
            Interval::OneDay,
            flags,
        )
    }

    #[test]
    fn period_window_uses_range_query() {
        let source = YahooChartSource::new(
            Arc::new(ReqwestHttpClient::default()),
            "https://example.test/",
        );
        let url = source.chart_url(
            &symbol("BRK-B"),
            &params(DownloadFlags::default()),
            datetime!(2024-06-01 12:00 UTC),
        );

        assert_eq!(
            url,
            "https://example.test/v8/finance/chart/BRK-B?interval=1d&includePrePost=false&range=1mo"
        );
    }

    #[test]
    fn date_range_uses_exclusive_midnight_end_and_events() {
        let source = YahooChartSource::with_http_client(Arc::new(ReqwestHttpClient::default()));
        let mut request = params(DownloadFlags {
            actions: true,
            prepost: true,
            ..DownloadFlags::default()
        });
        request.window = FetchWindow::Range {
            start: Some(date!(2024 - 01 - 01)),
            end: Some(date!(2024 - 02 - 01)),
        };

        let url = source.chart_url(&symbol("^GSPC"), &request, datetime!(2024-06-01 12:00 UTC));

        assert!(url.starts_with("https://query2.finance.yahoo.com/v8/finance/chart/%5EGSPC?"));
        assert!(url.contains("includePrePost=true"));
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1706745600"));
        assert!(url.ends_with("events=div%2Csplits"));
    }

    #[test]
    fn open_ranges_are_anchored() {
        let now = datetime!(2024-06-01 12:00 UTC);

        let (start, end) = range_bounds(Some(date!(2024 - 05 - 01)), None, Interval::OneDay, now);
        assert_eq!(start, datetime!(2024-05-01 00:00 UTC).unix_timestamp());
        assert_eq!(end, now.unix_timestamp());

        let (start, end) = range_bounds(None, Some(date!(2024 - 05 - 10)), Interval::OneMinute, now);
        assert_eq!(end - start, 7 * 86_400);

        let (start, _) = range_bounds(None, Some(date!(2024 - 05 - 10)), Interval::OneDay, now);
        assert!(start < datetime!(1926-01-01 00:00 UTC).unix_timestamp());
    }

    #[test]
    fn daily_rows_are_pinned_to_exchange_midnight() {
        let rows = parse(AAPL_CHART, raw_flags())
            .expect("chart parses")
            .expect("chart has rows");

        assert_eq!(rows.len(), 2, "all-missing row is dropped without keepna");
        assert_eq!(format_index_label(rows[0].index), "2024-01-02 00:00:00-05:00");
        assert_eq!(format_index_label(rows[1].index), "2024-01-03 00:00:00-05:00");
        assert_eq!(
            rows[0].cells,
            vec![
                Cell::Number(184.73),
                Cell::Number(185.64),
                Cell::Number(188.44),
                Cell::Number(183.89),
                Cell::Number(187.15),
                Cell::Number(82_488_700.0),
            ]
        );
    }

    #[test]
    fn keepna_retains_empty_rows() {
        let flags = DownloadFlags {
            keepna: true,
            ..raw_flags()
        };
        let rows = parse(AAPL_CHART, flags)
            .expect("chart parses")
            .expect("chart has rows");

        assert_eq!(rows.len(), 3);
        assert!(rows[2].cells.iter().all(Cell::is_missing));
    }

    #[test]
    fn auto_adjust_scales_prices_by_adjusted_close() {
        let rows = parse(AAPL_CHART, DownloadFlags::default())
            .expect("chart parses")
            .expect("chart has rows");

        // Close, High, Low, Open, Volume
        assert_eq!(rows[0].cells.len(), 5);
        let close = rows[0].cells[0].as_f64().expect("close present");
        let open = rows[0].cells[3].as_f64().expect("open present");
        assert!((close - 184.73).abs() < 1e-9);
        assert!((open - 187.15 * 184.73 / 185.64).abs() < 1e-9);
        assert_eq!(rows[0].cells[4], Cell::Number(82_488_700.0));
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        let flags = DownloadFlags {
            rounding: true,
            ..DownloadFlags::default()
        };
        let rows = parse(AAPL_CHART, flags)
            .expect("chart parses")
            .expect("chart has rows");

        let open = rows[0].cells[3].as_f64().expect("open present");
        assert_eq!(open, round_cents(187.15 * 184.73 / 185.64));
        assert_eq!((open * 100.0).round() / 100.0, open);
    }

    #[test]
    fn actions_fill_event_columns() {
        let flags = DownloadFlags {
            actions: true,
            ..DownloadFlags::default()
        };
        let rows = parse(AAPL_CHART, flags)
            .expect("chart parses")
            .expect("chart has rows");

        // Close, Dividends, High, Low, Open, Stock Splits, Volume
        assert_eq!(rows[0].cells[1], Cell::Number(0.0));
        assert_eq!(rows[0].cells[5], Cell::Number(4.0));
        assert_eq!(rows[1].cells[1], Cell::Number(0.24));
        assert_eq!(rows[1].cells[5], Cell::Number(0.0));
    }

    #[test]
    fn repair_rescales_hundredfold_outliers() {
        let mut values = vec![Some(10.0), Some(10.2), Some(1_010.0), None, Some(9.9)];
        repair_unit_mixups(&mut values);

        assert_eq!(values, vec![Some(10.0), Some(10.2), Some(10.1), None, Some(9.9)]);
    }

    #[test]
    fn not_found_is_empty_not_failure() {
        let missing = parse_chart_response(
            &symbol("NOPE"),
            &HttpResponse::new(404, ""),
            Interval::OneDay,
            DownloadFlags::default(),
        )
        .expect("404 is not a failure");
        assert!(missing.is_none());

        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(parse(body, DownloadFlags::default())
            .expect("not found is not a failure")
            .is_none());
    }

    #[test]
    fn upstream_failures_are_classified() {
        let error = parse_chart_response(
            &symbol("AAPL"),
            &HttpResponse::new(500, "oops"),
            Interval::OneDay,
            DownloadFlags::default(),
        )
        .expect_err("5xx fails");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);

        let error = parse("<html>", DownloadFlags::default()).expect_err("bad json fails");
        assert_eq!(error.kind(), SourceErrorKind::Parse);

        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input"}}}"#;
        let error = parse(body, DownloadFlags::default()).expect_err("chart error fails");
        assert!(error.message().contains("Bad Request"));
    }

    #[test]
    fn single_symbol_assembles_single_series() {
        let rows = parse(AAPL_CHART, DownloadFlags::default()).expect("chart parses");
        let table = assemble(
            &[symbol("AAPL")],
            &fields_for(DownloadFlags::default()),
            Interval::OneDay,
            vec![rows],
        )
        .expect("table present");

        match table {
            RawSeries::Single(table) => {
                assert_eq!(table.columns, vec!["Close", "High", "Low", "Open", "Volume"]);
                assert_eq!(table.rows.len(), 2);
            }
            RawSeries::Multi(_) => panic!("single symbol must not produce a multi-series table"),
        }
    }
}
