//! Inline SVG charts for the heatmap and the projection scatter plot

use super::escape_html;
use super::palette;
use crate::views::heatmap::annotation;
use crate::views::{Heatmap, ScatterPlot};
use std::fmt::Write;

const CELL_WIDTH: f64 = 84.0;
const CELL_HEIGHT: f64 = 40.0;
const HEATMAP_LEFT: f64 = 110.0;
const HEATMAP_TOP: f64 = 110.0;
const COLORBAR_WIDTH: f64 = 16.0;
const COLORBAR_STEPS: usize = 32;

const PLOT_WIDTH: f64 = 760.0;
const PLOT_HEIGHT: f64 = 520.0;
const PLOT_MARGIN: f64 = 60.0;
const LEGEND_WIDTH: f64 = 110.0;
const TICKS: usize = 5;

/// Annotated color grid: one row per cluster, one column per feature
pub fn heatmap(map: &Heatmap) -> String {
    let cols = map.columns.len() as f64;
    let rows = map.row_labels.len() as f64;
    let grid_right = HEATMAP_LEFT + cols * CELL_WIDTH;
    let width = grid_right + COLORBAR_WIDTH + 90.0;
    let height = HEATMAP_TOP + rows * CELL_HEIGHT + 20.0;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart" viewBox="0 0 {w} {h}" width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg" role="img">"#,
        w = width,
        h = height
    );
    let _ = write!(
        svg,
        r#"<text class="axis-title" x="{}" y="{}" text-anchor="middle">{}</text>"#,
        HEATMAP_LEFT / 2.0,
        HEATMAP_TOP - 12.0,
        escape_html(&map.index_column)
    );

    for (c, name) in map.columns.iter().enumerate() {
        let x = HEATMAP_LEFT + (c as f64 + 0.5) * CELL_WIDTH;
        let y = HEATMAP_TOP - 10.0;
        let _ = write!(
            svg,
            r#"<text class="tick" x="{x}" y="{y}" transform="rotate(-35 {x} {y})" text-anchor="start">{}</text>"#,
            escape_html(name),
            x = x,
            y = y
        );
    }

    for (r, label) in map.row_labels.iter().enumerate() {
        let y = HEATMAP_TOP + r as f64 * CELL_HEIGHT;
        let _ = write!(
            svg,
            r#"<text class="tick" x="{}" y="{}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            HEATMAP_LEFT - 8.0,
            y + CELL_HEIGHT / 2.0,
            escape_html(label)
        );

        for (c, &value) in map.values[r].iter().enumerate() {
            let x = HEATMAP_LEFT + c as f64 * CELL_WIDTH;
            if value.is_nan() {
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" class="cell-missing"/>"#,
                    x, y, CELL_WIDTH, CELL_HEIGHT
                );
                continue;
            }
            let rgb = palette::coolwarm(map.normalized(value));
            let _ = write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"><title>{} / {}: {}</title></rect>"#,
                x,
                y,
                CELL_WIDTH,
                CELL_HEIGHT,
                palette::hex(rgb),
                escape_html(label),
                escape_html(&map.columns[c]),
                value
            );
            let _ = write!(
                svg,
                r#"<text class="annotation" x="{}" y="{}" fill="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
                x + CELL_WIDTH / 2.0,
                y + CELL_HEIGHT / 2.0,
                palette::text_on(rgb),
                annotation(value)
            );
        }
    }

    // Colorbar, high values on top
    let bar_x = grid_right + 24.0;
    let bar_height = rows * CELL_HEIGHT;
    let step = bar_height / COLORBAR_STEPS as f64;
    for i in 0..COLORBAR_STEPS {
        let t = 1.0 - (i as f64 + 0.5) / COLORBAR_STEPS as f64;
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            bar_x,
            HEATMAP_TOP + i as f64 * step,
            COLORBAR_WIDTH,
            step + 0.5,
            palette::hex(palette::coolwarm(t))
        );
    }
    for (value, y) in [(map.max, HEATMAP_TOP), (map.min, HEATMAP_TOP + bar_height)] {
        let _ = write!(
            svg,
            r#"<text class="tick" x="{}" y="{}" dominant-baseline="middle">{:.2}</text>"#,
            bar_x + COLORBAR_WIDTH + 6.0,
            y,
            value
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Linear map from data range to pixel range; a flat range maps to the middle
fn scale(value: f64, lo: f64, hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    if hi > lo {
        out_lo + (value - lo) / (hi - lo) * (out_hi - out_lo)
    } else {
        (out_lo + out_hi) / 2.0
    }
}

/// Evenly spaced tick values across `lo..=hi`
fn ticks(lo: f64, hi: f64) -> Vec<f64> {
    if hi > lo {
        (0..TICKS).map(|i| lo + (hi - lo) * i as f64 / (TICKS - 1) as f64).collect()
    } else {
        vec![lo]
    }
}

/// One circle per track, colored by cluster, with a legend
pub fn scatter(plot: &ScatterPlot) -> String {
    let [min_x, max_x, min_y, max_y] = plot.bounds;
    // Pad so edge points are not clipped
    let pad_x = ((max_x - min_x) * 0.04).max(1e-6);
    let pad_y = ((max_y - min_y) * 0.04).max(1e-6);
    let (min_x, max_x, min_y, max_y) = (min_x - pad_x, max_x + pad_x, min_y - pad_y, max_y + pad_y);

    let left = PLOT_MARGIN;
    let right = PLOT_WIDTH - PLOT_MARGIN;
    let top = PLOT_MARGIN / 2.0;
    let bottom = PLOT_HEIGHT - PLOT_MARGIN;
    let px = |x: f64| scale(x, min_x, max_x, left, right);
    let py = |y: f64| scale(y, min_y, max_y, bottom, top);

    let width = PLOT_WIDTH + LEGEND_WIDTH;
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart" viewBox="0 0 {w} {h}" width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg" role="img">"#,
        w = width,
        h = PLOT_HEIGHT
    );
    let _ = write!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" class="plot-area"/>"#,
        left,
        top,
        right - left,
        bottom - top
    );

    for t in ticks(min_x, max_x) {
        let x = px(t);
        let _ = write!(
            svg,
            r#"<line class="grid" x1="{x}" y1="{}" x2="{x}" y2="{}"/><text class="tick" x="{x}" y="{}" text-anchor="middle">{:.1}</text>"#,
            top,
            bottom,
            bottom + 18.0,
            t,
            x = x
        );
    }
    for t in ticks(min_y, max_y) {
        let y = py(t);
        let _ = write!(
            svg,
            r#"<line class="grid" x1="{}" y1="{y}" x2="{}" y2="{y}"/><text class="tick" x="{}" y="{y}" text-anchor="end" dominant-baseline="middle">{:.1}</text>"#,
            left,
            right,
            left - 8.0,
            t,
            y = y
        );
    }

    for series in &plot.series {
        let color = palette::categorical(series.color_index);
        let _ = write!(
            svg,
            r#"<g class="series" data-cluster="{}" fill="{}" fill-opacity="{}">"#,
            series.cluster, color, plot.marker_alpha
        );
        for [x, y] in &series.points {
            let _ = write!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{}"/>"#,
                px(*x),
                py(*y),
                plot.marker_size
            );
        }
        svg.push_str("</g>");
    }

    let _ = write!(
        svg,
        r#"<text class="axis-title" x="{}" y="{}" text-anchor="middle">{}</text>"#,
        (left + right) / 2.0,
        PLOT_HEIGHT - 14.0,
        escape_html(&plot.x_label)
    );
    let _ = write!(
        svg,
        r#"<text class="axis-title" x="16" y="{y}" transform="rotate(-90 16 {y})" text-anchor="middle">{}</text>"#,
        escape_html(&plot.y_label),
        y = (top + bottom) / 2.0
    );

    let legend_x = PLOT_WIDTH - 10.0;
    let _ = write!(
        svg,
        r#"<text class="axis-title" x="{}" y="{}">cluster</text>"#,
        legend_x,
        top + 10.0
    );
    for (i, series) in plot.series.iter().enumerate() {
        let y = top + 30.0 + i as f64 * 20.0;
        let _ = write!(
            svg,
            r#"<circle cx="{}" cy="{}" r="5" fill="{}"/><text class="tick" x="{}" y="{}" dominant-baseline="middle">{}</text>"#,
            legend_x + 6.0,
            y,
            palette::categorical(series.color_index),
            legend_x + 18.0,
            y,
            series.cluster
        );
    }

    svg.push_str("</svg>");
    svg
}
