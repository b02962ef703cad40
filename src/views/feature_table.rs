//! Selected features of the selected cluster's tracks

use crate::data::{DataContext, Feature};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureTable {
    pub cluster: u32,
    pub columns: Vec<String>,
    /// Row-major, at most `max_rows` rows
    pub rows: Vec<Vec<f64>>,
    pub total_rows: usize,
    /// Selected features the track table does not carry as numbers
    pub missing: Vec<String>,
}

impl FeatureTable {
    pub fn build(ctx: &DataContext, cluster: u32, features: &[Feature], max_rows: usize) -> Self {
        let track_rows = ctx.tracks.rows_in_cluster(cluster);

        let mut columns = Vec::new();
        let mut values = Vec::new();
        let mut missing = Vec::new();
        for &feature in features {
            match ctx.tracks.feature(feature) {
                Ok(v) => {
                    columns.push(feature.column().to_string());
                    values.push(v);
                }
                Err(e) => {
                    log::debug!("feature table: {}", e);
                    missing.push(feature.column().to_string());
                }
            }
        }

        let rows = track_rows
            .iter()
            .take(max_rows)
            .map(|&r| values.iter().map(|v| v[r]).collect())
            .collect();

        Self {
            cluster,
            columns,
            rows,
            total_rows: track_rows.len(),
            missing,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.total_rows
    }
}
