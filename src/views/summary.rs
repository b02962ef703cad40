//! Per-cluster metrics and feature means

use super::Panel;
use crate::data::{DataContext, Feature, Table, CLUSTER_COLUMN};
use crate::error::Result;
use serde::Serialize;

/// Mean energy, danceability and tempo of one cluster's tracks
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClusterAverages {
    pub energy: f64,
    pub danceability: f64,
    pub tempo: f64,
}

impl ClusterAverages {
    pub fn energy_display(&self) -> String {
        fixed(self.energy, 2)
    }

    pub fn danceability_display(&self) -> String {
        fixed(self.danceability, 2)
    }

    pub fn tempo_display(&self) -> String {
        fixed(self.tempo, 1)
    }
}

fn fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.*}", decimals, value)
    }
}

/// One feature of the transposed summary row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanRow {
    pub feature: String,
    pub value: String,
}

/// The summary row for a cluster, or the whole table when there is none
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeanTable {
    Found { rows: Vec<MeanRow> },
    NotFound { table: Table },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: u32,
    pub track_count: usize,
    pub averages: Panel<ClusterAverages>,
    pub means: MeanTable,
}

impl ClusterSummary {
    pub fn build(ctx: &DataContext, cluster: u32) -> Self {
        let rows = ctx.tracks.rows_in_cluster(cluster);
        let averages = Panel::from_result("cluster averages", averages(ctx, &rows));

        let summary = &ctx.summary;
        let means = match summary.row_for_cluster(cluster) {
            Some(row) => MeanTable::Found { rows: transpose_row(summary.table(), row) },
            None => {
                log::warn!(
                    "summary table has no row for cluster {}; showing the full table",
                    cluster
                );
                MeanTable::NotFound { table: summary.table().clone() }
            }
        };

        Self {
            cluster,
            track_count: rows.len(),
            averages,
            means,
        }
    }
}

fn averages(ctx: &DataContext, rows: &[usize]) -> Result<ClusterAverages> {
    Ok(ClusterAverages {
        energy: ctx.tracks.mean(Feature::Energy, rows)?,
        danceability: ctx.tracks.mean(Feature::Danceability, rows)?,
        tempo: ctx.tracks.mean(Feature::Tempo, rows)?,
    })
}

/// Every column except the index, one row per column
fn transpose_row(table: &Table, row: usize) -> Vec<MeanRow> {
    table
        .columns()
        .iter()
        .filter(|c| c.name != CLUSTER_COLUMN)
        .map(|c| MeanRow {
            feature: c.name.clone(),
            value: c.cell(row).display(),
        })
        .collect()
}
