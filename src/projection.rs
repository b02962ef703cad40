//! Standardization and principal-component projection of track features
//!
//! # How the Projection Works
//!
//! 1. Every feature column is z-scored: subtract the column mean, divide by
//!    the population standard deviation (ddof = 0). Constant columns are only
//!    centered.
//! 2. The covariance matrix of the standardized features (10 x 10) is
//!    eigen-decomposed. Its two largest eigenvectors are the directions of
//!    maximal variance, and they are orthogonal.
//! 3. Each track is projected onto those two directions.
//!
//! Eigenvectors are only defined up to sign, so each component is flipped to
//! make its largest-magnitude loading positive. The solver is exact, so equal
//! input always yields bit-identical coordinates.

use crate::data::{Feature, TrackTable};
use crate::error::{DashboardError, Result};
use nalgebra::{DMatrix, SymmetricEigen};
use serde::Serialize;
use std::cmp::Ordering;

/// Number of components the scatter plot needs
pub const PROJECTION_COMPONENTS: usize = 2;

/// Per-column statistics of a fitted standardization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl Scaler {
    /// Fit column means and population standard deviations
    pub fn fit(x: &DMatrix<f64>) -> Self {
        let n = x.nrows() as f64;
        let means: Vec<f64> = x.column_iter().map(|c| c.sum() / n).collect();
        let scales = x
            .column_iter()
            .zip(&means)
            .map(|(c, &m)| {
                let var = c.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / n;
                let std = var.sqrt();
                // Zero variance: center only
                if std > 0.0 {
                    std
                } else {
                    1.0
                }
            })
            .collect();
        Self { means, scales }
    }

    pub fn transform(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        DMatrix::from_fn(x.nrows(), x.ncols(), |r, c| (x[(r, c)] - self.means[c]) / self.scales[c])
    }
}

/// Fit a scaler on `x` and return the standardized matrix with it
pub fn standardize(x: &DMatrix<f64>) -> (DMatrix<f64>, Scaler) {
    let scaler = Scaler::fit(x);
    (scaler.transform(x), scaler)
}

/// Principal components of a (standardized) matrix
#[derive(Debug, Clone)]
pub struct Pca {
    /// One unit-length component per column (features x components)
    pub components: DMatrix<f64>,
    /// Variance captured by each component
    pub explained_variance: Vec<f64>,
    /// Share of total variance captured by each component
    pub explained_variance_ratio: Vec<f64>,
}

impl Pca {
    /// Fit `n_components` principal components of `x`
    pub fn fit(x: &DMatrix<f64>, n_components: usize) -> Result<Self> {
        let (n, d) = x.shape();
        if n < 2 {
            return Err(DashboardError::ProjectionError(format!(
                "need at least 2 tracks to project, got {}",
                n
            )));
        }
        if n_components > d.min(n) {
            return Err(DashboardError::ProjectionError(format!(
                "cannot extract {} components from a {}x{} matrix",
                n_components, n, d
            )));
        }

        // Center again so Pca works on unstandardized input as well
        let means: Vec<f64> = x.column_iter().map(|c| c.sum() / n as f64).collect();
        let centered = DMatrix::from_fn(n, d, |r, c| x[(r, c)] - means[c]);
        let covariance = (centered.transpose() * &centered) / (n as f64 - 1.0);

        let eigen = SymmetricEigen::new(covariance);
        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let total: f64 = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let mut components = DMatrix::zeros(d, n_components);
        let mut explained_variance = Vec::with_capacity(n_components);
        let mut explained_variance_ratio = Vec::with_capacity(n_components);

        for (k, &idx) in order.iter().take(n_components).enumerate() {
            let mut vector = eigen.eigenvectors.column(idx).clone_owned();
            let pivot = vector
                .iter()
                .enumerate()
                .fold(0, |best, (i, v)| if v.abs() > vector[best].abs() { i } else { best });
            if vector[pivot] < 0.0 {
                vector.neg_mut();
            }
            components.set_column(k, &vector);

            let variance = eigen.eigenvalues[idx].max(0.0);
            explained_variance.push(variance);
            explained_variance_ratio.push(if total > 0.0 { variance / total } else { 0.0 });
        }

        Ok(Self {
            components,
            explained_variance,
            explained_variance_ratio,
        })
    }

    /// Project rows of `x` onto the fitted components
    pub fn transform(&self, x: &DMatrix<f64>) -> DMatrix<f64> {
        x * &self.components
    }
}

/// One track placed in the 2D projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub x: f64,
    pub y: f64,
    pub cluster: u32,
}

/// Points for every track plus the variance each axis explains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub points: Vec<ProjectionPoint>,
    pub explained_variance_ratio: [f64; PROJECTION_COMPONENTS],
}

/// Build the n x 10 feature matrix, refusing missing or non-numeric values
pub fn feature_matrix(tracks: &TrackTable) -> Result<DMatrix<f64>> {
    let table = tracks.table();
    let mut columns = Vec::with_capacity(Feature::ALL.len());
    for feature in Feature::ALL {
        let column = table.column(feature.column()).ok_or_else(|| {
            DashboardError::SchemaMismatch(format!("track table has no '{}' column", feature))
        })?;
        let values = column.as_numeric().ok_or_else(|| {
            DashboardError::ProjectionError(format!("feature '{}' has non-numeric values", feature))
        })?;
        if let Some(row) = values.iter().position(|v| !v.is_finite()) {
            return Err(DashboardError::ProjectionError(format!(
                "feature '{}' has a missing or non-finite value at row {}",
                feature, row
            )));
        }
        columns.push(values);
    }

    Ok(DMatrix::from_fn(tracks.len(), columns.len(), |r, c| columns[c][r]))
}

/// Standardize the full feature set and project every track to 2D
pub fn project(tracks: &TrackTable) -> Result<Projection> {
    let x = feature_matrix(tracks)?;
    let (scaled, _) = standardize(&x);
    // Finite input can still overflow the column statistics
    if scaled.iter().any(|v| !v.is_finite()) {
        return Err(DashboardError::ProjectionError(
            "feature values overflow during standardization".into(),
        ));
    }
    let pca = Pca::fit(&scaled, PROJECTION_COMPONENTS)?;
    let coords = pca.transform(&scaled);

    let points = tracks
        .clusters()
        .iter()
        .enumerate()
        .map(|(row, &cluster)| ProjectionPoint {
            x: coords[(row, 0)],
            y: coords[(row, 1)],
            cluster,
        })
        .collect();

    log::debug!(
        "Projected {} tracks, explained variance {:.3} / {:.3}",
        tracks.len(),
        pca.explained_variance_ratio[0],
        pca.explained_variance_ratio[1]
    );

    Ok(Projection {
        points,
        explained_variance_ratio: [pca.explained_variance_ratio[0], pca.explained_variance_ratio[1]],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::fixture_tracks;
    use crate::data::{Column, Table, CLUSTER_COLUMN};

    // ==========================================================================
    // BACKGROUND: Why standardize before PCA?
    // ==========================================================================
    //
    // Tempo is measured in BPM (~60-200) while energy lives in 0..1. Without
    // scaling, the first component would be "tempo" and nothing else. After
    // z-scoring, every feature contributes on equal footing and the
    // components reflect correlation structure instead of units.
    // ==========================================================================

    fn matrix(rows: &[&[f64]]) -> DMatrix<f64> {
        DMatrix::from_fn(rows.len(), rows[0].len(), |r, c| rows[r][c])
    }

    /// Tracks table with `n` rows of varied, correlated features
    fn synthetic_tracks(n: usize) -> TrackTable {
        let mut columns = vec![Column::numeric(
            CLUSTER_COLUMN,
            (0..n).map(|i| (i % 3) as f64).collect(),
        )];
        for (k, feature) in Feature::ALL.iter().enumerate() {
            let values = (0..n)
                .map(|i| {
                    let t = i as f64;
                    (t * (k as f64 + 1.0)).sin() * (k as f64 + 1.0) + t * 0.1 * (k % 3) as f64
                })
                .collect();
            columns.push(Column::numeric(feature.column(), values));
        }
        TrackTable::from_table(Table::new(columns).unwrap()).unwrap()
    }

    #[test]
    fn test_standardized_columns_have_zero_mean_unit_std() {
        let tracks = synthetic_tracks(50);
        let x = feature_matrix(&tracks).unwrap();
        let (scaled, _) = standardize(&x);

        let n = scaled.nrows() as f64;
        for column in scaled.column_iter() {
            let mean = column.sum() / n;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-10, "mean {} should be ~0", mean);
            assert!((var.sqrt() - 1.0).abs() < 1e-10, "std {} should be ~1", var.sqrt());
        }
    }

    #[test]
    fn test_scaler_uses_population_std() {
        let x = matrix(&[&[1.0], &[3.0]]);
        let scaler = Scaler::fit(&x);
        assert_eq!(scaler.means, vec![2.0]);
        // Population std of [1, 3] is 1, sample std would be sqrt(2)
        assert!((scaler.scales[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_centered_only() {
        let x = matrix(&[&[5.0, 1.0], &[5.0, 2.0], &[5.0, 3.0]]);
        let (scaled, scaler) = standardize(&x);
        assert_eq!(scaler.scales[0], 1.0);
        assert!(scaled.column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_first_component_follows_correlated_axis() {
        // Two perfectly correlated features: all variance on the diagonal
        let x = matrix(&[&[1.0, 2.0], &[2.0, 4.0], &[3.0, 6.0], &[4.0, 8.0]]);
        let (scaled, _) = standardize(&x);
        let pca = Pca::fit(&scaled, 2).unwrap();

        let c0 = pca.components.column(0);
        let expected = 1.0 / 2f64.sqrt();
        assert!((c0[0] - expected).abs() < 1e-9);
        assert!((c0[1] - expected).abs() < 1e-9);
        assert!((pca.explained_variance_ratio[0] - 1.0).abs() < 1e-9);
        assert!(pca.explained_variance_ratio[1].abs() < 1e-9);
    }

    #[test]
    fn test_components_are_orthonormal() {
        let tracks = synthetic_tracks(40);
        let (scaled, _) = standardize(&feature_matrix(&tracks).unwrap());
        let pca = Pca::fit(&scaled, 2).unwrap();

        let a = pca.components.column(0);
        let b = pca.components.column(1);
        assert!((a.norm() - 1.0).abs() < 1e-9);
        assert!((b.norm() - 1.0).abs() < 1e-9);
        assert!(a.dot(&b).abs() < 1e-9);
        assert!(pca.explained_variance[0] >= pca.explained_variance[1]);
    }

    #[test]
    fn test_largest_loading_is_positive() {
        let tracks = synthetic_tracks(30);
        let (scaled, _) = standardize(&feature_matrix(&tracks).unwrap());
        let pca = Pca::fit(&scaled, 2).unwrap();
        for column in pca.components.column_iter() {
            let max = column.iter().cloned().fold(f64::MIN, f64::max);
            let min = column.iter().cloned().fold(f64::MAX, f64::min);
            assert!(max >= min.abs());
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let tracks = synthetic_tracks(60);
        let first = project(&tracks).unwrap();
        let second = project(&tracks).unwrap();

        assert_eq!(first.points.len(), 60);
        for (a, b) in first.points.iter().zip(&second.points) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.cluster, b.cluster);
        }
    }

    #[test]
    fn test_projection_keeps_cluster_ids() {
        let tracks = TrackTable::from_table(fixture_tracks()).unwrap();
        let projection = project(&tracks).unwrap();
        let clusters: Vec<u32> = projection.points.iter().map(|p| p.cluster).collect();
        assert_eq!(clusters, vec![0, 0, 1]);
    }

    // ==========================================================================
    // FAILURE MODES
    // ==========================================================================
    //
    // No imputation: a single hole in the feature matrix fails the projection
    // rather than dropping the row.
    // ==========================================================================

    /// Fixture tracks with one feature column swapped out
    fn tracks_with(replacement: Column) -> TrackTable {
        let base = fixture_tracks();
        let columns = base
            .columns()
            .iter()
            .map(|c| if c.name == replacement.name { replacement.clone() } else { c.clone() })
            .collect();
        TrackTable::from_table(Table::new(columns).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_value_is_projection_error() {
        let tracks = tracks_with(Column::numeric("energy", vec![0.5, f64::NAN, 0.2]));
        assert!(matches!(project(&tracks), Err(DashboardError::ProjectionError(_))));
    }

    #[test]
    fn test_overflowing_values_are_projection_error() {
        // Each value is finite, but their sum and spread overflow f64
        let tracks = tracks_with(Column::numeric("tempo", vec![1e308, 1.5e308, -1e308]));
        match project(&tracks) {
            Err(DashboardError::ProjectionError(reason)) => assert!(reason.contains("overflow")),
            other => panic!("expected ProjectionError, got {:?}", other),
        }
    }

    #[test]
    fn test_text_feature_is_projection_error() {
        let tracks = tracks_with(Column::text(
            "energy",
            vec!["high".into(), "low".into(), "mid".into()],
        ));
        assert!(matches!(project(&tracks), Err(DashboardError::ProjectionError(_))));
    }

    #[test]
    fn test_absent_feature_is_schema_mismatch() {
        let table = Table::new(vec![
            Column::numeric(CLUSTER_COLUMN, vec![0.0, 1.0]),
            Column::numeric("energy", vec![0.1, 0.2]),
        ])
        .unwrap();
        let tracks = TrackTable::from_table(table).unwrap();
        assert!(matches!(project(&tracks), Err(DashboardError::SchemaMismatch(_))));
    }

    #[test]
    fn test_single_track_is_projection_error() {
        let tracks = TrackTable::from_table(fixture_tracks().select_rows(&[0])).unwrap();
        assert!(matches!(project(&tracks), Err(DashboardError::ProjectionError(_))));
    }
}
