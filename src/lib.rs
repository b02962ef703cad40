//! clusterscope - Explore precomputed music track clusters
//!
//! clusterscope reads two tables produced by an upstream clustering run (one
//! row per track with its cluster id and audio features, and one row of
//! feature means per cluster) and serves them as a single-page dashboard.
//!
//! # Overview
//!
//! Nothing here clusters anything. The crate loads, filters and displays:
//!
//! 1. **Cluster summary**: song count and mean energy, danceability and tempo
//!    of the selected cluster, next to its row of the summary table.
//!
//! 2. **Heatmap**: every cluster's feature means in one annotated grid.
//!
//! 3. **Projection**: all tracks standardized and reduced to two principal
//!    components, colored by cluster.
//!
//! # Quick Start
//!
//! ```no_run
//! use clusterscope::{DataConfig, DataContext, DashboardPage, DisplayConfig, Selection};
//!
//! let config = DataConfig {
//!     track_table_path: "clusters.csv".into(),
//!     summary_table_path: "summary.csv".into(),
//! };
//! let ctx = DataContext::load(&config).expect("tables should load");
//!
//! let selection = Selection::default_for(&ctx.tracks.cluster_ids());
//! let page = DashboardPage::render(&ctx, &selection, &DisplayConfig::default());
//!
//! println!("Cluster {} has {} songs", page.summary.cluster, page.summary.track_count);
//! clusterscope::report::generate("dashboard.html", &page).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`data`]: table loading and schema normalization
//! - [`projection`]: standardization and PCA
//! - [`views`]: view models for each dashboard region
//! - [`report`]: HTML/SVG and JSON rendering
//! - [`serve`]: local HTTP server for interactive mode

pub mod config;
pub mod data;
pub mod error;
pub mod projection;
pub mod report;
pub mod serve;
pub mod views;

pub use config::{AppConfig, DataConfig, DisplayConfig, ServerConfig};
pub use data::{DataContext, Feature};
pub use error::DashboardError;
pub use views::{DashboardPage, Selection};

/// Application name for XDG paths
pub const APP_NAME: &str = "clusterscope";
