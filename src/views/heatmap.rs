//! Feature means of every cluster side by side

use crate::data::{Table, CLUSTER_COLUMN, CLUSTER_LABEL_COLUMN};
use crate::error::{DashboardError, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    /// Column used to label rows
    pub index_column: String,
    pub row_labels: Vec<String>,
    pub columns: Vec<String>,
    /// Row-major values, NaN where the summary has no value
    pub values: Vec<Vec<f64>>,
    /// Color scale bounds over all finite values
    pub min: f64,
    pub max: f64,
}

/// `cluster`, else `cluster_label`, else the first column
pub fn index_column(table: &Table) -> Option<&str> {
    [CLUSTER_COLUMN, CLUSTER_LABEL_COLUMN]
        .into_iter()
        .find(|name| table.has_column(name))
        .or_else(|| table.columns().first().map(|c| c.name.as_str()))
}

impl Heatmap {
    pub fn from_table(table: &Table) -> Result<Self> {
        let index = index_column(table)
            .ok_or_else(|| DashboardError::SchemaMismatch("summary table has no columns".into()))?;
        let index_col = table
            .column(index)
            .ok_or_else(|| DashboardError::SchemaMismatch(format!("no column '{}'", index)))?;

        let value_columns: Vec<_> = table
            .columns()
            .iter()
            .filter(|c| c.name != index && c.is_numeric())
            .collect();
        if value_columns.is_empty() {
            return Err(DashboardError::SchemaMismatch(
                "summary table has no numeric feature columns".into(),
            ));
        }
        if table.row_count() == 0 {
            return Err(DashboardError::SchemaMismatch("summary table has no rows".into()));
        }

        let values: Vec<Vec<f64>> = (0..table.row_count())
            .map(|row| {
                value_columns
                    .iter()
                    .map(|c| c.as_numeric().map(|v| v[row]).unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();

        let (min, max) = values
            .iter()
            .flatten()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .unwrap_or((0.0, 0.0));

        Ok(Self {
            index_column: index.to_string(),
            row_labels: (0..table.row_count()).map(|r| index_col.cell(r).display()).collect(),
            columns: value_columns.iter().map(|c| c.name.clone()).collect(),
            values,
            min,
            max,
        })
    }

    /// Position of `value` within the color range, 0.5 when the range is flat
    pub fn normalized(&self, value: f64) -> f64 {
        if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

/// Cell annotation text, blank for missing values
pub fn annotation(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:.2}", value)
    }
}
