//! Column-major in-memory table
//!
//! Columns are typed once at load: a column is numeric when every non-empty
//! cell parses as `f64`, text otherwise. Missing cells in numeric columns are
//! stored as NaN so "missing" and "non-numeric" stay distinguishable.

use crate::error::{DashboardError, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Cell spellings treated as missing in numeric columns
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Text(v) => ColumnData::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self { name: name.into(), data: ColumnData::Numeric(values) }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self { name: name.into(), data: ColumnData::Text(values) }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    pub fn cell(&self, row: usize) -> Cell<'_> {
        match &self.data {
            ColumnData::Numeric(v) => Cell::Number(v[row]),
            ColumnData::Text(v) => Cell::Text(&v[row]),
        }
    }

    /// Type a raw string column the way the loader does
    fn from_raw(name: String, raw: Vec<String>) -> Self {
        let parsed: Option<Vec<f64>> = raw.iter().map(|s| parse_number(s)).collect();
        match parsed {
            Some(values) => Column::numeric(name, values),
            None => Column::text(name, raw),
        }
    }
}

/// Parse one numeric cell: missing markers become NaN, anything else must be a float
fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if MISSING_MARKERS.contains(&s) {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

/// A single borrowed cell value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Number(f64),
    Text(&'a str),
}

impl Cell<'_> {
    pub fn display(&self) -> String {
        match self {
            Cell::Number(v) => format_number(*v),
            Cell::Text(s) => s.to_string(),
        }
    }
}

/// Integral values print without decimals, others with four
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.4}", v)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Build a table from columns that must all have the same length
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.data.len() != rows) {
            return Err(DashboardError::SchemaMismatch(format!(
                "column '{}' has {} rows, expected {}",
                bad.name,
                bad.data.len(),
                rows
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Read a CSV file with a header row
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| DashboardError::unavailable(path, e))?;
        Self::from_csv_reader(file).map_err(|reason| DashboardError::unavailable(path, reason))
    }

    /// Parse CSV from any reader; the error is a human-readable reason
    pub fn from_csv_reader<R: Read>(reader: R) -> std::result::Result<Self, String> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err("table has no columns".to_string());
        }

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record.map_err(|e| e.to_string())?;
            for (i, field) in record.iter().enumerate() {
                raw[i].push(field.to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, values)| Column::from_raw(name, values))
            .collect();
        Self::new(columns).map_err(|e| e.to_string())
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Values of a numeric column; `None` if absent or text
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.column(name).and_then(Column::as_numeric)
    }

    /// Insert a column at `index`; its length must match the table
    pub fn insert_column(&mut self, index: usize, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.data.len() != self.rows {
            return Err(DashboardError::SchemaMismatch(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.data.len(),
                self.rows
            )));
        }
        if self.columns.is_empty() {
            self.rows = column.data.len();
        }
        self.columns.insert(index.min(self.columns.len()), column);
        Ok(())
    }

    /// New table holding only the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column { name: c.name.clone(), data: c.data.select(rows) })
                .collect(),
            rows: rows.len(),
        }
    }
}
