//! Color scales for the charts

/// Qualitative palette: tab10 followed by its lighter tab20 companions
pub const CATEGORICAL: [&str; 20] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
    "#aec7e8", "#ffbb78", "#98df8a", "#ff9896", "#c5b0d5",
    "#c49c94", "#f7b6d2", "#c7c7c7", "#dbdb8d", "#9edae5",
];

/// Color for the `index`-th category, cycling past the end
pub fn categorical(index: usize) -> &'static str {
    CATEGORICAL[index % CATEGORICAL.len()]
}

/// Anchor points of the diverging coolwarm map (position, rgb)
const COOLWARM: [(f64, [f64; 3]); 5] = [
    (0.00, [59.0, 76.0, 192.0]),
    (0.25, [141.0, 176.0, 254.0]),
    (0.50, [221.0, 221.0, 221.0]),
    (0.75, [244.0, 154.0, 123.0]),
    (1.00, [180.0, 4.0, 38.0]),
];

/// Diverging blue-white-red color at `t` in 0..=1
pub fn coolwarm(t: f64) -> [u8; 3] {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let upper = COOLWARM.iter().position(|(p, _)| *p >= t).unwrap_or(COOLWARM.len() - 1).max(1);
    let (p0, c0) = COOLWARM[upper - 1];
    let (p1, c1) = COOLWARM[upper];
    let f = (t - p0) / (p1 - p0);
    let mut rgb = [0u8; 3];
    for i in 0..3 {
        rgb[i] = (c0[i] + (c1[i] - c0[i]) * f).round() as u8;
    }
    rgb
}

pub fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Dark or light annotation text, whichever reads better on `background`
pub fn text_on(background: [u8; 3]) -> &'static str {
    let [r, g, b] = background.map(|c| c as f64 / 255.0);
    let luminance = 0.2126 * r + 0.7152 * g + 0.0722 * b;
    if luminance > 0.408 {
        "#262626"
    } else {
        "#ffffff"
    }
}
