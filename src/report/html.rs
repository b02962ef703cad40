//! HTML page with sidebar controls and inline SVG charts

use super::{escape_html, svg};
use crate::data::{format_number, Table};
use crate::views::{ClusterSummary, DashboardPage, FeatureTable, Heatmap, MeanTable, Panel, ScatterPlot};
use std::io::{self, Write};

/// Write the full HTML document.
///
/// With `interactive` the sidebar submits back to the server on every change;
/// a static snapshot renders the same controls disabled.
pub fn write<W: Write>(writer: &mut W, page: &DashboardPage, interactive: bool) -> io::Result<()> {
    let sidebar = sidebar(page, interactive);
    let metrics = metrics(&page.summary);
    let means = means(&page.summary);
    let feature_table = feature_table(&page.feature_table);
    let heatmap = heatmap_panel(&page.heatmap);
    let scatter = scatter_panel(&page.scatter);
    let sources = if page.sources.is_empty() {
        String::new()
    } else {
        format!(" | {}", escape_html(&page.sources.join(", ")))
    };

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Music Clustering Dashboard</title>
    <style>
        :root {{
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --warn: #d29922;
            --accent: #58a6ff;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
            display: grid;
            grid-template-columns: 280px 1fr;
            min-height: 100vh;
        }}

        /* Sidebar */
        .sidebar {{
            background: var(--card);
            border-right: 1px solid var(--border);
            padding: 1.5rem;
        }}
        .sidebar h2 {{ font-size: 1rem; margin: 1.25rem 0 0.5rem; }}
        .sidebar h2:first-child {{ margin-top: 0; }}
        .sidebar label {{ display: block; color: var(--dim); font-size: 0.875rem; margin-bottom: 0.25rem; }}
        .sidebar select {{
            width: 100%;
            padding: 0.4rem;
            background: var(--bg);
            color: var(--text);
            border: 1px solid var(--border);
            border-radius: 6px;
        }}
        .feature-option {{ display: flex; align-items: center; gap: 0.5rem; padding: 0.15rem 0; color: var(--text); }}
        .apply {{ margin-top: 1rem; padding: 0.4rem 1rem; }}

        /* Main */
        .main {{ padding: 2rem; max-width: 1400px; }}
        .header {{ margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 1px solid var(--border); }}
        .logo {{
            font-size: 2rem;
            font-weight: 800;
            background: linear-gradient(135deg, var(--accent), #a371f7);
            -webkit-background-clip: text;
            -webkit-text-fill-color: transparent;
        }}
        .subtitle {{ color: var(--dim); }}
        h3 {{ font-size: 1.25rem; margin: 2rem 0 1rem; }}
        .columns {{ display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }}
        .card {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            overflow-x: auto;
        }}
        .card-title {{ font-size: 1rem; font-weight: 600; margin-bottom: 1rem; color: var(--dim); }}

        /* Metrics */
        .metric {{ margin-bottom: 1rem; }}
        .metric-label {{ color: var(--dim); font-size: 0.875rem; }}
        .metric-value {{ font-size: 2rem; font-weight: 700; line-height: 1.1; }}

        /* Tables */
        table {{ width: 100%; border-collapse: collapse; font-size: 0.875rem; }}
        th, td {{ padding: 0.4rem 0.75rem; text-align: left; border-bottom: 1px solid var(--border); }}
        th {{ color: var(--dim); font-weight: 600; text-transform: uppercase; font-size: 0.75rem; letter-spacing: 0.05em; }}
        td.num {{ font-family: 'SF Mono', 'Fira Code', monospace; text-align: right; }}
        .note {{ color: var(--dim); font-size: 0.8rem; margin-top: 0.5rem; }}
        .warning {{
            border: 1px solid var(--warn);
            color: var(--warn);
            border-radius: 8px;
            padding: 0.75rem 1rem;
            margin-bottom: 1rem;
        }}

        /* Charts */
        svg.chart {{ max-width: 100%; height: auto; font-size: 12px; }}
        svg .tick {{ fill: var(--dim); }}
        svg .axis-title {{ fill: var(--text); font-weight: 600; }}
        svg .annotation {{ font-size: 12px; }}
        svg .grid {{ stroke: var(--border); stroke-width: 1; }}
        svg .plot-area {{ fill: none; stroke: var(--border); }}
        svg .cell-missing {{ fill: var(--bg); stroke: var(--border); }}

        .footer {{ margin-top: 3rem; padding-top: 1rem; border-top: 1px solid var(--border); color: var(--dim); font-size: 0.8rem; }}
    </style>
</head>
<body>
    {sidebar}
    <main class="main">
        <div class="header">
            <div class="logo">🎧 Music Clustering Dashboard</div>
            <div class="subtitle">Explore how songs are grouped into clusters using audio features like energy, danceability, tempo, and acousticness.</div>
        </div>

        <h3>📊 Cluster {cluster} Summary</h3>
        <div class="columns">
            <div class="card">{metrics}</div>
            <div class="card">
                <div class="card-title">Feature Means for Cluster</div>
                {means}
            </div>
        </div>

        <h3>🎚️ Selected Features</h3>
        <div class="card">{feature_table}</div>

        <h3>🔥 Feature Comparison Across Clusters</h3>
        <div class="card">
            <div class="card-title">Cluster Feature Heatmap</div>
            {heatmap}
        </div>

        <h3>🎨 PCA Visualization of Clusters</h3>
        <div class="card">
            <div class="card-title">PCA 2D Projection of Songs by Cluster</div>
            {scatter}
        </div>

        <div class="footer">Music Clustering Dashboard | generated {generated}{sources}</div>
    </main>
</body>
</html>
"#,
        sidebar = sidebar,
        cluster = page.summary.cluster,
        metrics = metrics,
        means = means,
        feature_table = feature_table,
        heatmap = heatmap,
        scatter = scatter,
        generated = escape_html(&page.generated),
        sources = sources,
    )?;

    Ok(())
}

fn sidebar(page: &DashboardPage, interactive: bool) -> String {
    let disabled = if interactive { "" } else { " disabled" };
    let submit = if interactive { r#" onchange="this.form.submit()""# } else { "" };

    let options: String = page
        .clusters
        .iter()
        .map(|&id| {
            let selected = if id == page.selection.cluster { " selected" } else { "" };
            format!(r#"<option value="{id}"{selected}>{id}</option>"#, id = id, selected = selected)
        })
        .collect();

    let checkboxes: String = page
        .feature_options
        .iter()
        .map(|opt| {
            let checked = if opt.selected { " checked" } else { "" };
            format!(
                r#"<label class="feature-option"><input type="checkbox" name="feature" value="{name}"{checked}{disabled}{submit}> {name}</label>"#,
                name = opt.feature.column(),
                checked = checked,
                disabled = disabled,
                submit = submit
            )
        })
        .collect();

    let apply = if interactive {
        r#"<noscript><button class="apply" type="submit">Apply</button></noscript>"#
    } else {
        ""
    };

    format!(
        r#"<aside class="sidebar">
        <form method="get" action="/" id="controls">
            <input type="hidden" name="filter" value="1">
            <h2>🔍 Cluster Selection</h2>
            <label for="cluster">Select a Cluster:</label>
            <select id="cluster" name="cluster"{disabled}{submit}>{options}</select>
            <h2>🎚️ Feature Filters</h2>
            <label>Select Features to View:</label>
            {checkboxes}
            {apply}
        </form>
    </aside>"#,
        disabled = disabled,
        submit = submit,
        options = options,
        checkboxes = checkboxes,
        apply = apply
    )
}

fn metric(label: &str, value: &str) -> String {
    format!(
        r#"<div class="metric"><div class="metric-label">{}</div><div class="metric-value">{}</div></div>"#,
        escape_html(label),
        escape_html(value)
    )
}

fn warning(reason: &str) -> String {
    format!(r#"<div class="warning">⚠ {}</div>"#, escape_html(reason))
}

fn metrics(summary: &ClusterSummary) -> String {
    let mut html = metric("Number of Songs", &summary.track_count.to_string());
    match &summary.averages {
        Panel::Ready(avg) => {
            html.push_str(&metric("Average Energy", &avg.energy_display()));
            html.push_str(&metric("Average Danceability", &avg.danceability_display()));
            html.push_str(&metric("Average Tempo (BPM)", &avg.tempo_display()));
        }
        Panel::Unavailable { reason } => html.push_str(&warning(reason)),
    }
    html
}

fn means(summary: &ClusterSummary) -> String {
    match &summary.means {
        MeanTable::Found { rows } => {
            let body: String = rows
                .iter()
                .map(|r| {
                    format!(
                        r#"<tr><td>{}</td><td class="num">{}</td></tr>"#,
                        escape_html(&r.feature),
                        escape_html(&r.value)
                    )
                })
                .collect();
            format!(
                r#"<table><thead><tr><th>feature</th><th>{}</th></tr></thead><tbody>{}</tbody></table>"#,
                summary.cluster, body
            )
        }
        MeanTable::NotFound { table } => format!(
            "{}{}",
            warning(&format!(
                "No summary row for cluster {}; showing all clusters.",
                summary.cluster
            )),
            full_table(table)
        ),
    }
}

/// Every row and column of `table`, untransposed
fn full_table(table: &Table) -> String {
    let head: String = table
        .column_names()
        .iter()
        .map(|n| format!("<th>{}</th>", escape_html(n)))
        .collect();
    let body: String = (0..table.row_count())
        .map(|row| {
            let cells: String = table
                .columns()
                .iter()
                .map(|c| {
                    let class = if c.is_numeric() { r#" class="num""# } else { "" };
                    format!("<td{}>{}</td>", class, escape_html(&c.cell(row).display()))
                })
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    format!("<table><thead><tr>{}</tr></thead><tbody>{}</tbody></table>", head, body)
}

fn feature_table(view: &FeatureTable) -> String {
    let mut html = String::new();
    if !view.missing.is_empty() {
        html.push_str(&warning(&format!(
            "Not in the track table: {}",
            view.missing.join(", ")
        )));
    }

    if view.columns.is_empty() {
        html.push_str(&format!(
            r#"<p class="note">No features selected ({} songs in cluster {}).</p>"#,
            view.total_rows, view.cluster
        ));
        return html;
    }

    let head: String = view
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape_html(c)))
        .collect();
    let body: String = view
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|&v| format!(r#"<td class="num">{}</td>"#, format_number(v)))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    html.push_str(&format!(
        "<table><thead><tr>{}</tr></thead><tbody>{}</tbody></table>",
        head, body
    ));
    if view.is_truncated() {
        html.push_str(&format!(
            r#"<p class="note">Showing {} of {} songs.</p>"#,
            view.rows.len(),
            view.total_rows
        ));
    }
    html
}

fn heatmap_panel(panel: &Panel<Heatmap>) -> String {
    match panel {
        Panel::Ready(map) => svg::heatmap(map),
        Panel::Unavailable { reason } => warning(reason),
    }
}

fn scatter_panel(panel: &Panel<ScatterPlot>) -> String {
    match panel {
        Panel::Ready(plot) => svg::scatter(plot),
        Panel::Unavailable { reason } => warning(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::data::tests::{fixture_context, fixture_summary, fixture_tracks};
    use crate::data::{DataContext, Feature};
    use crate::views::Selection;

    fn render(ctx: &DataContext, selection: &Selection, interactive: bool) -> String {
        let page = DashboardPage::render(ctx, selection, &DisplayConfig::default());
        let mut out = Vec::new();
        write(&mut out, &page, interactive).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_page_contains_all_regions() {
        let ctx = fixture_context();
        let html = render(&ctx, &Selection::default_for(&[0, 1]), true);

        assert!(html.contains("Cluster 0 Summary"));
        assert!(html.contains("Number of Songs"));
        assert!(html.contains(">0.60<"));
        assert!(html.contains("Cluster Feature Heatmap"));
        assert!(html.contains("PCA 2D Projection of Songs by Cluster"));
        assert_eq!(html.matches("<svg").count(), 2);
        assert!(html.contains(r#"<option value="1">1</option>"#));
        assert!(html.contains(r#"<option value="0" selected>0</option>"#));
        assert!(html.contains("this.form.submit()"));
    }

    #[test]
    fn test_checkboxes_reflect_selection() {
        let ctx = fixture_context();
        let selection = Selection { cluster: 1, features: vec![Feature::Valence] };
        let html = render(&ctx, &selection, true);

        assert!(html.contains(r#"value="valence" checked"#));
        assert!(!html.contains(r#"value="energy" checked"#));
        assert!(html.contains(r#"name="filter" value="1""#));
        assert!(html.contains(r#"<form method="get" action="/" id="controls">"#));
    }

    #[test]
    fn test_empty_feature_selection_renders_note() {
        let ctx = fixture_context();
        let selection = Selection { cluster: 0, features: vec![] };
        let html = render(&ctx, &selection, true);
        assert!(html.contains("No features selected (2 songs in cluster 0)"));
    }

    #[test]
    fn test_static_snapshot_disables_controls() {
        let ctx = fixture_context();
        let html = render(&ctx, &Selection::default_for(&[0, 1]), false);
        assert!(html.contains(" disabled"));
        assert!(!html.contains("this.form.submit()"));
    }

    #[test]
    fn test_missing_summary_row_shows_full_table() {
        let ctx =
            DataContext::from_tables(fixture_tracks(), fixture_summary().select_rows(&[0])).unwrap();
        let selection = Selection { cluster: 1, features: vec![Feature::Energy] };
        let html = render(&ctx, &selection, true);

        assert!(html.contains("No summary row for cluster 1"));
        assert!(html.contains("<th>cluster</th><th>energy</th><th>danceability</th><th>tempo</th>"));
    }
}
