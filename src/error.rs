//! Error taxonomy for the dashboard
//!
//! Only [`DashboardError::DataUnavailable`] and [`DashboardError::Config`] are
//! fatal. Schema and projection problems are caught by the view that hit them
//! and shown inline, so one broken chart never blanks the page.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// An input table could not be read or parsed
    #[error("data unavailable: {path}: {reason}")]
    DataUnavailable { path: PathBuf, reason: String },

    /// Expected columns are absent from a loaded table
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The feature matrix holds missing or non-numeric values
    #[error("projection failed: {0}")]
    ProjectionError(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error must abort the session
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. } | Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(DashboardError::unavailable("/tmp/x.csv", "missing").is_fatal());
        assert!(DashboardError::Config("bad port".into()).is_fatal());
        assert!(!DashboardError::SchemaMismatch("no energy".into()).is_fatal());
        assert!(!DashboardError::ProjectionError("NaN".into()).is_fatal());
    }

    #[test]
    fn test_display_includes_path() {
        let err = DashboardError::unavailable("/data/tracks.csv", "No such file");
        let msg = err.to_string();
        assert!(msg.contains("/data/tracks.csv"));
        assert!(msg.contains("No such file"));
    }
}
