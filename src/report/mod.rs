//! Rendering of the dashboard page
//!
//! - **HTML**: the full page with sidebar controls and inline SVG charts
//! - **JSON**: the page model, for programmatic consumption
//!
//! # Usage
//!
//! ```ignore
//! use clusterscope::report;
//!
//! // Picks the format from the extension
//! report::generate("dashboard.html", &page)?;  // HTML
//! report::generate("dashboard.json", &page)?;  // JSON
//! ```

pub mod html;
pub mod json;
pub mod palette;
pub mod svg;

use crate::error::Result;
use crate::views::DashboardPage;
use std::path::Path;

/// Write a static snapshot of `page`, format chosen by file extension
pub fn generate<P: AsRef<Path>>(path: P, page: &DashboardPage) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, page)?,
        _ => html::write(&mut file, page, false)?,
    }
    Ok(())
}

/// Escape text for HTML and SVG content and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::data::tests::fixture_context;
    use crate::views::Selection;

    fn sample_page() -> DashboardPage {
        let ctx = fixture_context();
        DashboardPage::render(&ctx, &Selection::default_for(&[0, 1]), &DisplayConfig::default())
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_generate_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let page = sample_page();

        let html_path = dir.path().join("dash.html");
        generate(&html_path, &page).unwrap();
        let html = std::fs::read_to_string(&html_path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));

        let json_path = dir.path().join("dash.JSON");
        generate(&json_path, &page).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["summary"]["track_count"], 2);
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("dash.html");
        let err = generate(&path, &sample_page()).unwrap_err();
        assert!(matches!(err, crate::error::DashboardError::Io(_)));
        assert!(!err.is_fatal());
    }
}
