//! 2D projection of every track, grouped by cluster

use crate::data::DataContext;
use crate::error::Result;
use crate::projection::{self, Projection};
use serde::Serialize;

/// Marker radius in pixels
pub const MARKER_SIZE: f64 = 2.5;

/// Marker opacity
pub const MARKER_ALPHA: f64 = 0.7;

/// Points of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub cluster: u32,
    /// Position of the cluster among the sorted ids, picks its palette color
    pub color_index: usize,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPlot {
    pub series: Vec<ScatterSeries>,
    pub x_label: String,
    pub y_label: String,
    /// `[min_x, max_x, min_y, max_y]` over all points
    pub bounds: [f64; 4],
    pub marker_size: f64,
    pub marker_alpha: f64,
}

impl ScatterPlot {
    /// Recompute the projection from scratch and group points by cluster
    pub fn build(ctx: &DataContext) -> Result<Self> {
        let projection = projection::project(&ctx.tracks)?;
        Ok(Self::from_projection(&projection, &ctx.tracks.cluster_ids()))
    }

    pub fn from_projection(projection: &Projection, clusters: &[u32]) -> Self {
        let mut series: Vec<ScatterSeries> = clusters
            .iter()
            .enumerate()
            .map(|(color_index, &cluster)| ScatterSeries {
                cluster,
                color_index,
                points: Vec::new(),
            })
            .collect();

        let mut bounds = [f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY];
        for p in &projection.points {
            if let Some(s) = series.iter_mut().find(|s| s.cluster == p.cluster) {
                s.points.push([p.x, p.y]);
            }
            bounds[0] = bounds[0].min(p.x);
            bounds[1] = bounds[1].max(p.x);
            bounds[2] = bounds[2].min(p.y);
            bounds[3] = bounds[3].max(p.y);
        }
        if projection.points.is_empty() {
            bounds = [-1.0, 1.0, -1.0, 1.0];
        }

        let [r1, r2] = projection.explained_variance_ratio;
        Self {
            series,
            x_label: format!("Principal Component 1 ({:.1}%)", r1 * 100.0),
            y_label: format!("Principal Component 2 ({:.1}%)", r2 * 100.0),
            bounds,
            marker_size: MARKER_SIZE,
            marker_alpha: MARKER_ALPHA,
        }
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::fixture_context;
    use crate::projection::ProjectionPoint;

    #[test]
    fn test_groups_points_by_cluster() {
        let projection = Projection {
            points: vec![
                ProjectionPoint { x: 1.0, y: 2.0, cluster: 3 },
                ProjectionPoint { x: -1.0, y: 0.5, cluster: 1 },
                ProjectionPoint { x: 0.0, y: -2.0, cluster: 3 },
            ],
            explained_variance_ratio: [0.4, 0.25],
        };
        let plot = ScatterPlot::from_projection(&projection, &[1, 3]);

        assert_eq!(plot.series.len(), 2);
        assert_eq!(plot.series[0].cluster, 1);
        assert_eq!(plot.series[0].color_index, 0);
        assert_eq!(plot.series[1].points, vec![[1.0, 2.0], [0.0, -2.0]]);
        assert_eq!(plot.bounds, [-1.0, 1.0, -2.0, 2.0]);
        assert_eq!(plot.x_label, "Principal Component 1 (40.0%)");
        assert_eq!(plot.y_label, "Principal Component 2 (25.0%)");
        assert_eq!(plot.point_count(), 3);
    }

    #[test]
    fn test_build_uses_every_track() {
        let ctx = fixture_context();
        let plot = ScatterPlot::build(&ctx).unwrap();
        assert_eq!(plot.point_count(), ctx.tracks.len());
        assert_eq!(plot.marker_alpha, MARKER_ALPHA);
    }
}
