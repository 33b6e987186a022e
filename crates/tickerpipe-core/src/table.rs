//! Tabular upstream result.
//!
//! A download for one ticker yields a [`SingleSeriesTable`] whose columns are
//! plain field names (`Close`, `Volume`). Several tickers yield a
//! [`MultiSeriesTable`] whose columns pair a field with a symbol; its column
//! keys are derived as `<field>_<symbol>` (`Close_AAPL`).

use time::OffsetDateTime;

use crate::domain::Symbol;

/// One cell of the upstream table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Wrap an optional float, mapping `None` and NaN to [`Cell::Missing`].
    pub fn from_f64(value: Option<f64>) -> Self {
        match value {
            Some(number) if !number.is_nan() => Self::Number(number),
            _ => Self::Missing,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(_) | Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Timestamped row; `cells` follow the table's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: OffsetDateTime,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(index: OffsetDateTime, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }
}

/// Column of a multi-series table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesColumn {
    pub field: String,
    pub symbol: Symbol,
}

impl SeriesColumn {
    pub fn new(field: impl Into<String>, symbol: Symbol) -> Self {
        Self {
            field: field.into(),
            symbol,
        }
    }

    pub fn key(&self) -> String {
        format!("{}_{}", self.field, self.symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleSeriesTable {
    pub symbol: Symbol,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiSeriesTable {
    pub columns: Vec<SeriesColumn>,
    pub rows: Vec<Row>,
}

/// Upstream tabular response, tagged by how its columns are keyed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSeries {
    Single(SingleSeriesTable),
    Multi(MultiSeriesTable),
}

impl RawSeries {
    /// Stringified column identifiers in their original order.
    pub fn column_keys(&self) -> Vec<String> {
        match self {
            Self::Single(table) => table.columns.clone(),
            Self::Multi(table) => table.columns.iter().map(SeriesColumn::key).collect(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Single(table) => &table.rows,
            Self::Multi(table) => &table.rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows().len()
    }

    pub fn column_count(&self) -> usize {
        match self {
            Self::Single(table) => table.columns.len(),
            Self::Multi(table) => table.columns.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn multi_series_keys_join_field_and_symbol() {
        let table = RawSeries::Multi(MultiSeriesTable {
            columns: vec![
                SeriesColumn::new("Close", symbol("AAPL")),
                SeriesColumn::new("Close", symbol("MSFT")),
                SeriesColumn::new("Volume", symbol("AAPL")),
            ],
            rows: Vec::new(),
        });

        assert_eq!(
            table.column_keys(),
            vec!["Close_AAPL", "Close_MSFT", "Volume_AAPL"]
        );
        assert!(table.is_empty());
    }

    #[test]
    fn single_series_reports_shape() {
        let table = RawSeries::Single(SingleSeriesTable {
            symbol: symbol("AAPL"),
            columns: vec![String::from("Close"), String::from("Volume")],
            rows: vec![Row::new(
                datetime!(2024-01-02 00:00:00 -5),
                vec![Cell::Number(185.6), Cell::Number(82_488_700.0)],
            )],
        });

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_keys(), vec!["Close", "Volume"]);
    }

    #[test]
    fn nan_becomes_missing() {
        assert!(Cell::from_f64(Some(f64::NAN)).is_missing());
        assert!(Cell::from_f64(None).is_missing());
        assert_eq!(Cell::from_f64(Some(1.5)).as_f64(), Some(1.5));
    }
}
