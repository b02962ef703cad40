//! The whole dashboard as one render pass

use super::{ClusterSummary, FeatureTable, Heatmap, Panel, ScatterPlot, Selection};
use crate::config::DisplayConfig;
use crate::data::{DataContext, Feature};
use serde::Serialize;

/// A feature checkbox in the sidebar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureOption {
    pub feature: Feature,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub generated: String,
    pub selection: Selection,
    pub clusters: Vec<u32>,
    pub feature_options: Vec<FeatureOption>,
    pub summary: ClusterSummary,
    pub feature_table: FeatureTable,
    pub heatmap: Panel<Heatmap>,
    pub scatter: Panel<ScatterPlot>,
    /// Display names of the input files, when loaded from disk
    pub sources: Vec<String>,
}

impl DashboardPage {
    /// Build every view for `selection`. Never fails: broken views become
    /// [`Panel::Unavailable`].
    pub fn render(ctx: &DataContext, selection: &Selection, display: &DisplayConfig) -> Self {
        let feature_options = Feature::ALL
            .iter()
            .map(|&feature| FeatureOption {
                feature,
                selected: selection.features.contains(&feature),
            })
            .collect();

        let sources = [&ctx.track_source, &ctx.summary_source]
            .into_iter()
            .flatten()
            .map(|p| p.display().to_string())
            .collect();

        Self {
            generated: chrono::Local::now().to_rfc3339(),
            selection: selection.clone(),
            clusters: ctx.tracks.cluster_ids(),
            feature_options,
            summary: ClusterSummary::build(ctx, selection.cluster),
            feature_table: FeatureTable::build(
                ctx,
                selection.cluster,
                &selection.features,
                display.max_table_rows,
            ),
            heatmap: Panel::from_result("heatmap", Heatmap::from_table(ctx.summary.table())),
            scatter: Panel::from_result("projection", ScatterPlot::build(ctx)),
            sources,
        }
    }
}
