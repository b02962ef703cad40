//! Data loading for the track and cluster summary tables
//!
//! Both tables are read once at startup into a [`DataContext`], which is then
//! passed by reference to every view. Nothing re-reads storage after that.
//!
//! # Schema
//!
//! ```text
//! Track table     | cluster | danceability | energy | ... | duration_min | (any extra columns)
//! Summary table   | cluster | danceability | energy | ... (one row per cluster)
//! ```
//!
//! When the summary has no `cluster` column one is synthesized from row order.
//! That assumes the upstream file is sorted by ascending cluster id, which
//! nothing verifies; a reordered file silently mislabels every row.

pub mod table;

pub use table::{format_number, Cell, Column, ColumnData, Table};

use crate::config::DataConfig;
use crate::error::{DashboardError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

/// Name of the cluster identifier column in both tables
pub const CLUSTER_COLUMN: &str = "cluster";

/// Fallback identifier column some summary exports use
pub const CLUSTER_LABEL_COLUMN: &str = "cluster_label";

/// The fixed audio features every track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Danceability,
    Energy,
    Loudness,
    Speechiness,
    Acousticness,
    Instrumentalness,
    Liveness,
    Valence,
    Tempo,
    DurationMin,
}

impl Feature {
    pub const ALL: [Feature; 10] = [
        Feature::Danceability,
        Feature::Energy,
        Feature::Loudness,
        Feature::Speechiness,
        Feature::Acousticness,
        Feature::Instrumentalness,
        Feature::Liveness,
        Feature::Valence,
        Feature::Tempo,
        Feature::DurationMin,
    ];

    /// Initial feature filter selection
    pub const DEFAULT_SELECTED: [Feature; 3] =
        [Feature::Danceability, Feature::Energy, Feature::Tempo];

    pub fn column(&self) -> &'static str {
        match self {
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Loudness => "loudness",
            Feature::Speechiness => "speechiness",
            Feature::Acousticness => "acousticness",
            Feature::Instrumentalness => "instrumentalness",
            Feature::Liveness => "liveness",
            Feature::Valence => "valence",
            Feature::Tempo => "tempo",
            Feature::DurationMin => "duration_min",
        }
    }

    pub fn from_column(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.column() == name.trim())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Per-track cluster assignments plus audio features
#[derive(Debug, Clone)]
pub struct TrackTable {
    table: Table,
    clusters: Vec<u32>,
}

impl TrackTable {
    /// Validate the `cluster` column: present, numeric, non-negative integers
    pub fn from_table(table: Table) -> std::result::Result<Self, String> {
        let column = table
            .column(CLUSTER_COLUMN)
            .ok_or_else(|| format!("track table has no '{}' column", CLUSTER_COLUMN))?;
        let values = column
            .as_numeric()
            .ok_or_else(|| format!("track column '{}' is not numeric", CLUSTER_COLUMN))?;

        if values.is_empty() {
            return Err("track table has no rows".to_string());
        }

        let clusters = values
            .iter()
            .enumerate()
            .map(|(row, &v)| {
                if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
                    Ok(v as u32)
                } else {
                    Err(format!("row {}: cluster id {} is not a non-negative integer", row, v))
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { table, clusters })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Cluster id of every row, in row order
    pub fn clusters(&self) -> &[u32] {
        &self.clusters
    }

    /// Sorted distinct cluster ids
    pub fn cluster_ids(&self) -> Vec<u32> {
        self.clusters.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// Row indices belonging to `cluster`
    pub fn rows_in_cluster(&self, cluster: u32) -> Vec<usize> {
        self.clusters
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    /// Values of a feature column, `SchemaMismatch` if absent or not numeric
    pub fn feature(&self, feature: Feature) -> Result<&[f64]> {
        match self.table.column(feature.column()) {
            Some(column) => column.as_numeric().ok_or_else(|| {
                DashboardError::SchemaMismatch(format!("track column '{}' is not numeric", feature))
            }),
            None => Err(DashboardError::SchemaMismatch(format!(
                "track table has no '{}' column",
                feature
            ))),
        }
    }

    /// Mean of a feature over the given rows, skipping missing values.
    /// NaN when no row has a value.
    pub fn mean(&self, feature: Feature, rows: &[usize]) -> Result<f64> {
        let values = self.feature(feature)?;
        let (sum, n) = rows
            .iter()
            .map(|&r| values[r])
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        Ok(if n == 0 { f64::NAN } else { sum / n as f64 })
    }
}

/// One row of feature means per cluster
#[derive(Debug, Clone)]
pub struct SummaryTable {
    table: Table,
    synthesized_cluster: bool,
}

impl SummaryTable {
    /// Normalize the schema: synthesize `cluster` from row order when missing
    pub fn normalize(mut table: Table) -> Self {
        let synthesized_cluster = !table.has_column(CLUSTER_COLUMN);
        if synthesized_cluster {
            log::warn!(
                "summary table has no '{}' column; assuming rows are ordered by cluster id 0..{}",
                CLUSTER_COLUMN,
                table.row_count()
            );
            let ids = (0..table.row_count()).map(|i| i as f64).collect();
            if let Err(e) = table.insert_column(0, Column::numeric(CLUSTER_COLUMN, ids)) {
                log::error!("cannot synthesize summary cluster column: {}", e);
            }
        }
        Self { table, synthesized_cluster }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Whether the cluster column came from row order rather than the file
    pub fn synthesized_cluster(&self) -> bool {
        self.synthesized_cluster
    }

    /// Row whose `cluster` value equals `cluster`
    pub fn row_for_cluster(&self, cluster: u32) -> Option<usize> {
        let column = self.table.column(CLUSTER_COLUMN)?;
        match &column.data {
            ColumnData::Numeric(values) => values.iter().position(|&v| v == cluster as f64),
            ColumnData::Text(values) => values
                .iter()
                .position(|v| v.trim().parse::<f64>().map(|n| n == cluster as f64).unwrap_or(false)),
        }
    }

    /// Integral cluster ids found in the `cluster` column
    pub fn cluster_ids(&self) -> BTreeSet<u32> {
        let Some(column) = self.table.column(CLUSTER_COLUMN) else {
            return BTreeSet::new();
        };
        (0..self.table.row_count())
            .filter_map(|row| match column.cell(row) {
                Cell::Number(v) if v >= 0.0 && v.fract() == 0.0 => Some(v as u32),
                Cell::Text(s) => s.trim().parse::<u32>().ok(),
                _ => None,
            })
            .collect()
    }
}

/// Read-only data shared by every view for the life of the process
#[derive(Debug, Clone)]
pub struct DataContext {
    pub tracks: TrackTable,
    pub summary: SummaryTable,
    pub track_source: Option<PathBuf>,
    pub summary_source: Option<PathBuf>,
}

impl DataContext {
    /// Load both tables from the configured paths. Any failure is fatal.
    pub fn load(config: &DataConfig) -> Result<Self> {
        let start = Instant::now();

        let track_path = &config.track_table_path;
        let summary_path = &config.summary_table_path;

        let tracks = Table::from_csv_path(track_path)?;
        let tracks = TrackTable::from_table(tracks)
            .map_err(|reason| DashboardError::unavailable(track_path, reason))?;
        let summary = SummaryTable::normalize(Table::from_csv_path(summary_path)?);

        log::info!(
            "Loaded {} tracks ({} columns) and {} cluster summaries in {:.1?}",
            tracks.len(),
            tracks.table().column_count(),
            summary.table().row_count(),
            start.elapsed()
        );

        let ctx = Self {
            tracks,
            summary,
            track_source: Some(track_path.clone()),
            summary_source: Some(summary_path.clone()),
        };
        ctx.check_cluster_ids();
        Ok(ctx)
    }

    /// Build a context from in-memory tables
    pub fn from_tables(tracks: Table, summary: Table) -> Result<Self> {
        let tracks = TrackTable::from_table(tracks).map_err(DashboardError::SchemaMismatch)?;
        let ctx = Self {
            tracks,
            summary: SummaryTable::normalize(summary),
            track_source: None,
            summary_source: None,
        };
        ctx.check_cluster_ids();
        Ok(ctx)
    }

    /// Log when the two tables disagree on which clusters exist
    fn check_cluster_ids(&self) {
        let in_tracks: BTreeSet<u32> = self.tracks.cluster_ids().into_iter().collect();
        let in_summary = self.summary.cluster_ids();
        if in_tracks != in_summary {
            let missing: Vec<_> = in_tracks.difference(&in_summary).collect();
            let extra: Vec<_> = in_summary.difference(&in_tracks).collect();
            log::warn!(
                "cluster ids differ between tables: missing from summary {:?}, only in summary {:?}",
                missing,
                extra
            );
        }
    }
}
