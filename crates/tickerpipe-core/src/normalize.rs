//! Conversion of an upstream table into JSON-ready records and summary
//! statistics.
//!
//! Conversion is per row and partial: a row that cannot be converted is
//! logged and skipped, and the summary reports how many rows made it through.

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::domain::format_index_label;
use crate::table::{Cell, RawSeries, Row};

/// Why a single row could not be converted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowConversionError {
    #[error("row has {found} cells but the table has {expected} columns")]
    Ragged { expected: usize, found: usize },

    #[error("column '{column}' holds non-finite value {value}")]
    NonFinite { column: String, value: f64 },
}

/// One row of output: `date` first, then every column in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    date: String,
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|idx| self.values.get(idx))
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("date", &self.date)?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Statistics of the first numeric column. Each value is `None` when there is
/// no finite number to report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub last_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub start_date: String,
    pub end_date: String,
    pub total_records: usize,
    pub records_processed: usize,
    pub first_column_stats: ColumnStats,
}

/// Normalized form of an upstream table.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    /// `[rows, columns]` of the upstream table, before any row was skipped.
    pub shape: [usize; 2],
    pub columns: Vec<String>,
    pub data: Vec<Record>,
    pub summary: Option<Summary>,
}

impl NormalizedTable {
    pub fn records_processed(&self) -> usize {
        self.data.len()
    }
}

pub fn normalize(series: &RawSeries) -> NormalizedTable {
    let columns: Arc<[String]> = series.column_keys().into();
    let rows = series.rows();

    let mut data = Vec::with_capacity(rows.len());
    for (position, row) in rows.iter().enumerate() {
        match convert_row(&columns, row) {
            Ok(record) => data.push(record),
            Err(error) => tracing::warn!(
                row = position,
                date = %format_index_label(row.index),
                %error,
                "skipping row that failed conversion"
            ),
        }
    }

    tracing::info!(
        total = rows.len(),
        processed = data.len(),
        "converted upstream rows"
    );

    let summary = summarize(&columns, rows, data.len());

    NormalizedTable {
        shape: [rows.len(), columns.len()],
        columns: columns.to_vec(),
        data,
        summary,
    }
}

fn convert_row(columns: &Arc<[String]>, row: &Row) -> Result<Record, RowConversionError> {
    if row.cells.len() != columns.len() {
        return Err(RowConversionError::Ragged {
            expected: columns.len(),
            found: row.cells.len(),
        });
    }

    let values = columns
        .iter()
        .zip(&row.cells)
        .map(|(column, cell)| convert_cell(column, cell))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Record {
        date: format_index_label(row.index),
        columns: Arc::clone(columns),
        values,
    })
}

fn convert_cell(column: &str, cell: &Cell) -> Result<Value, RowConversionError> {
    match cell {
        Cell::Number(value) => Number::from_f64(*value).map(Value::Number).ok_or_else(|| {
            RowConversionError::NonFinite {
                column: column.to_owned(),
                value: *value,
            }
        }),
        Cell::Text(text) => Ok(Value::String(text.clone())),
        Cell::Missing => Ok(Value::Null),
    }
}

/// Summary over every upstream row, skipped ones included. `None` when the
/// table is empty or no column is numeric.
fn summarize(columns: &[String], rows: &[Row], records_processed: usize) -> Option<Summary> {
    let (first, last) = (rows.first()?, rows.last()?);
    let column_idx = first_numeric_column(columns.len(), rows)?;

    let values = rows
        .iter()
        .filter_map(|row| finite_at(row, column_idx))
        .collect::<Vec<_>>();

    let (min, max, mean) = if values.is_empty() {
        (None, None, None)
    } else {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        (Some(min), Some(max), Some(mean))
    };

    Some(Summary {
        start_date: format_index_label(first.index),
        end_date: format_index_label(last.index),
        total_records: rows.len(),
        records_processed,
        first_column_stats: ColumnStats {
            column: columns[column_idx].clone(),
            min,
            max,
            mean,
            last_value: finite_at(last, column_idx),
        },
    })
}

/// A column is numeric when none of its cells hold text.
fn first_numeric_column(column_count: usize, rows: &[Row]) -> Option<usize> {
    (0..column_count).find(|&idx| {
        rows.iter()
            .all(|row| !matches!(row.cells.get(idx), Some(Cell::Text(_))))
    })
}

fn finite_at(row: &Row, idx: usize) -> Option<f64> {
    row.cells
        .get(idx)
        .and_then(Cell::as_f64)
        .filter(|value| value.is_finite())
}
