//! View models for the dashboard page
//!
//! Every view is a pure function of the [`DataContext`] and the current
//! [`Selection`]. Views never render markup themselves; `report` turns the
//! models into HTML/SVG or JSON.
//!
//! A view that cannot be built yields [`Panel::Unavailable`] with the reason,
//! so the rest of the page still renders.
//!
//! [`DataContext`]: crate::data::DataContext

pub mod feature_table;
pub mod heatmap;
pub mod page;
pub mod scatter;
pub mod summary;

pub use feature_table::FeatureTable;
pub use heatmap::Heatmap;
pub use page::{DashboardPage, FeatureOption};
pub use scatter::{ScatterPlot, ScatterSeries};
pub use summary::{ClusterAverages, ClusterSummary, MeanRow, MeanTable};

use crate::data::Feature;
use crate::error::Result;
use serde::Serialize;

/// Outcome of building one view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    Unavailable { reason: String },
}

impl<T> Panel<T> {
    /// Wrap a view result, logging the failure of `view` if there was one
    pub fn from_result(view: &str, result: Result<T>) -> Self {
        match result {
            Ok(value) => Panel::Ready(value),
            Err(e) => {
                // Fatal errors should have stopped startup before any view ran
                if e.is_fatal() {
                    log::error!("{} view unavailable: {}", view, e);
                } else {
                    log::warn!("{} view unavailable: {}", view, e);
                }
                Panel::Unavailable { reason: e.to_string() }
            }
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            Panel::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Panel::Ready(_))
    }
}

/// User-controlled dashboard state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub cluster: u32,
    /// Always a subset of [`Feature::ALL`], in that order
    pub features: Vec<Feature>,
}

impl Selection {
    /// First cluster and the default feature subset
    pub fn default_for(clusters: &[u32]) -> Self {
        Self {
            cluster: clusters.first().copied().unwrap_or(0),
            features: Feature::DEFAULT_SELECTED.to_vec(),
        }
    }

    /// Restrict a raw query to the enumerated choices
    pub fn resolve(query: &SelectionQuery, clusters: &[u32]) -> Self {
        let mut selection = Self::default_for(clusters);

        if let Some(raw) = query.cluster.as_deref() {
            match raw.trim().parse::<u32>() {
                Ok(id) if clusters.contains(&id) => selection.cluster = id,
                _ => log::debug!("ignoring unknown cluster '{}'", raw),
            }
        }

        if query.filtered {
            selection.features = Feature::ALL
                .iter()
                .copied()
                .filter(|f| query.features.iter().any(|name| name.trim() == f.column()))
                .collect();
        }

        selection
    }
}

/// Selection as it arrives in a query string, before validation.
///
/// `?cluster=2&filter=1&feature=energy&feature=tempo`. HTML forms omit
/// unchecked boxes, so `filter` marks that `feature` values are explicit and
/// an absent `feature` means "none selected" rather than "use defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionQuery {
    pub cluster: Option<String>,
    pub features: Vec<String>,
    pub filtered: bool,
}

impl SelectionQuery {
    pub fn parse(query: &str) -> Self {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_else(|e| {
            log::debug!("unparsable query '{}': {}", query, e);
            Vec::new()
        });

        let mut parsed = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "cluster" => parsed.cluster = Some(value),
                "feature" => {
                    parsed.filtered = true;
                    parsed.features.push(value);
                }
                "filter" => parsed.filtered = true,
                _ => {}
            }
        }
        parsed
    }

    /// Query from already-split values, e.g. command-line flags. `no_features`
    /// requests an empty feature selection.
    pub fn explicit(cluster: Option<u32>, features: Vec<String>, no_features: bool) -> Self {
        Self {
            cluster: cluster.map(|c| c.to_string()),
            filtered: no_features || !features.is_empty(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    // ==========================================================================
    // SELECTION RESOLUTION TESTS
    // ==========================================================================
    //
    // The sidebar only offers enumerated choices, but the query string can
    // carry anything. Resolution clamps it back to valid options.
    // ==========================================================================

    #[test]
    fn test_default_selection() {
        let selection = Selection::default_for(&[2, 5, 9]);
        assert_eq!(selection.cluster, 2);
        assert_eq!(
            selection.features,
            vec![Feature::Danceability, Feature::Energy, Feature::Tempo]
        );
    }

    #[test]
    fn test_resolve_known_cluster_and_features() {
        let query = SelectionQuery::parse("cluster=5&feature=tempo&feature=valence");
        let selection = Selection::resolve(&query, &[2, 5, 9]);
        assert_eq!(selection.cluster, 5);
        // Fixed list order, not query order
        assert_eq!(selection.features, vec![Feature::Valence, Feature::Tempo]);
    }

    #[test]
    fn test_resolve_unknown_cluster_falls_back() {
        for raw in ["cluster=3", "cluster=-1", "cluster=abc"] {
            let selection = Selection::resolve(&SelectionQuery::parse(raw), &[2, 5]);
            assert_eq!(selection.cluster, 2, "query {}", raw);
        }
    }

    #[test]
    fn test_filter_marker_allows_empty_features() {
        let selection = Selection::resolve(&SelectionQuery::parse("cluster=2&filter=1"), &[2]);
        assert!(selection.features.is_empty());
    }

    #[test]
    fn test_no_filter_marker_keeps_defaults() {
        let selection = Selection::resolve(&SelectionQuery::parse("cluster=2"), &[2]);
        assert_eq!(selection.features.len(), 3);
    }

    #[test]
    fn test_unknown_features_are_dropped() {
        let query = SelectionQuery::parse("feature=popularity&feature=energy");
        let selection = Selection::resolve(&query, &[0]);
        assert_eq!(selection.features, vec![Feature::Energy]);
    }

    #[test]
    fn test_form_submission_roundtrip() {
        // What the sidebar form submits: hidden marker, cluster, checked boxes
        let query = SelectionQuery::parse("filter=1&cluster=4&feature=loudness&feature=duration_min");
        let selection = Selection::resolve(&query, &[1, 4]);
        assert_eq!(
            selection,
            Selection { cluster: 4, features: vec![Feature::Loudness, Feature::DurationMin] }
        );
    }

    #[test]
    fn test_explicit_query_for_report() {
        let defaults = SelectionQuery::explicit(Some(1), Vec::new(), false);
        assert_eq!(Selection::resolve(&defaults, &[0, 1]).features.len(), 3);

        let none = SelectionQuery::explicit(None, Vec::new(), true);
        let selection = Selection::resolve(&none, &[0, 1]);
        assert_eq!(selection.cluster, 0);
        assert!(selection.features.is_empty());

        let some = SelectionQuery::explicit(Some(1), vec!["tempo".into()], false);
        assert_eq!(Selection::resolve(&some, &[0, 1]).features, vec![Feature::Tempo]);
    }

    // ==========================================================================
    // PANEL TESTS
    // ==========================================================================

    #[test]
    fn test_panel_from_result() {
        let ok: Panel<u32> = Panel::from_result("test", Ok(3));
        assert_eq!(ok.ready(), Some(&3));

        let failed: Panel<u32> =
            Panel::from_result("test", Err(DashboardError::SchemaMismatch("no energy".into())));
        assert!(!failed.is_ready());
        match failed {
            Panel::Unavailable { reason } => assert!(reason.contains("no energy")),
            Panel::Ready(_) => panic!("expected unavailable"),
        }
    }
}
