//! SVG bar charts for analysis output
//!
//! Horizontal bar charts with one or more series, an optional vertical
//! threshold line and optional log scale. Output is a standalone SVG document.

use std::fmt::Write as _;

const WIDTH: f64 = 1000.0;
const LABEL_WIDTH: f64 = 220.0;
const RIGHT_MARGIN: f64 = 90.0;
const TOP_MARGIN: f64 = 60.0;
const BOTTOM_MARGIN: f64 = 70.0;
const ROW_HEIGHT: f64 = 28.0;

/// Default series colors
const PALETTE: [&str; 4] = ["#4a90d9", "#e8833a", "#5cb85c", "#9b59b6"];

/// One labelled row of bars (one value per series)
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub values: Vec<f64>,
    /// Overrides the series color for every value in this row
    pub color: Option<&'static str>,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            values: vec![value],
            color: None,
        }
    }

    pub fn grouped(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
            color: None,
        }
    }

    pub fn with_color(mut self, color: &'static str) -> Self {
        self.color = Some(color);
        self
    }
}

/// Horizontal bar chart
#[derive(Debug, Clone)]
pub struct BarChart {
    title: String,
    x_label: String,
    series: Vec<String>,
    bars: Vec<Bar>,
    threshold: Option<(f64, String)>,
    log_scale: bool,
}

impl BarChart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            series: Vec::new(),
            bars: Vec::new(),
            threshold: None,
            log_scale: false,
        }
    }

    /// Name the series for a legend (grouped charts)
    pub fn with_series(mut self, names: &[&str]) -> Self {
        self.series = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_threshold(mut self, value: f64, label: impl Into<String>) -> Self {
        self.threshold = Some((value, label.into()));
        self
    }

    /// Log scale applies only when every plotted value is positive
    pub fn with_log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    pub fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    fn finite_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars
            .iter()
            .flat_map(|b| b.values.iter().copied())
            .filter(|v| v.is_finite())
    }

    fn uses_log_scale(&self) -> bool {
        self.log_scale && self.finite_values().all(|v| v > 0.0) && self.finite_values().count() > 0
    }

    /// Map a value to a bar length in pixels
    fn scale(&self, value: f64, plot_width: f64) -> f64 {
        if !value.is_finite() || value <= 0.0 {
            return 0.0;
        }
        let max = self
            .finite_values()
            .chain(self.threshold.iter().map(|(t, _)| *t))
            .fold(0.0_f64, f64::max);
        if max <= 0.0 {
            return 0.0;
        }

        if self.uses_log_scale() {
            let min = self.finite_values().fold(f64::INFINITY, f64::min);
            let floor = min.log10().floor() - 1.0;
            let span = max.log10() - floor;
            ((value.log10() - floor) / span * plot_width).max(0.0)
        } else {
            value / max * plot_width
        }
    }

    /// Render the chart as an SVG document
    pub fn to_svg(&self) -> String {
        let series_count = self.bars.iter().map(|b| b.values.len()).max().unwrap_or(1).max(1);
        let row_height = ROW_HEIGHT * series_count as f64;
        let plot_width = WIDTH - LABEL_WIDTH - RIGHT_MARGIN;
        let plot_height = row_height * self.bars.len() as f64;
        let height = TOP_MARGIN + plot_height + BOTTOM_MARGIN;
        let bar_height = (ROW_HEIGHT - 6.0).max(4.0);

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="sans-serif">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="30" font-size="18" font-weight="bold" text-anchor="middle">{}</text>"#,
            WIDTH / 2.0,
            escape_xml(&self.title)
        );

        for (row, bar) in self.bars.iter().enumerate() {
            let row_top = TOP_MARGIN + row as f64 * row_height;
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{:.1}" font-size="12" text-anchor="end" dominant-baseline="middle">{}</text>"#,
                LABEL_WIDTH - 8.0,
                row_top + row_height / 2.0,
                escape_xml(&bar.label)
            );

            for (series, value) in bar.values.iter().enumerate() {
                let y = row_top + series as f64 * ROW_HEIGHT + 3.0;
                let length = self.scale(*value, plot_width);
                let color = bar.color.unwrap_or(PALETTE[series % PALETTE.len()]);
                let _ = writeln!(
                    svg,
                    r#"<rect x="{LABEL_WIDTH}" y="{y:.1}" width="{length:.1}" height="{bar_height:.1}" fill="{color}"/>"#
                );
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" font-size="11" dominant-baseline="middle">{}</text>"#,
                    LABEL_WIDTH + length + 4.0,
                    y + bar_height / 2.0,
                    format_value(*value)
                );
            }
        }

        if let Some((value, label)) = &self.threshold {
            let x = LABEL_WIDTH + self.scale(*value, plot_width);
            let _ = writeln!(
                svg,
                r##"<line x1="{x:.1}" y1="{TOP_MARGIN}" x2="{x:.1}" y2="{:.1}" stroke="#e8833a" stroke-width="2" stroke-dasharray="6,4"/>"##,
                TOP_MARGIN + plot_height
            );
            let _ = writeln!(
                svg,
                r#"<text x="{x:.1}" y="{:.1}" font-size="11" text-anchor="middle">{}</text>"#,
                TOP_MARGIN - 6.0,
                escape_xml(label)
            );
        }

        let axis_y = TOP_MARGIN + plot_height;
        let _ = writeln!(
            svg,
            r##"<line x1="{LABEL_WIDTH}" y1="{axis_y:.1}" x2="{:.1}" y2="{axis_y:.1}" stroke="#333"/>"##,
            LABEL_WIDTH + plot_width
        );
        let scale_note = if self.uses_log_scale() { " (log scale)" } else { "" };
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="13" text-anchor="middle">{}{}</text>"#,
            LABEL_WIDTH + plot_width / 2.0,
            axis_y + 30.0,
            escape_xml(&self.x_label),
            scale_note
        );

        for (i, name) in self.series.iter().enumerate() {
            let x = LABEL_WIDTH + i as f64 * 180.0;
            let y = axis_y + 50.0;
            let _ = writeln!(
                svg,
                r#"<rect x="{x:.1}" y="{:.1}" width="12" height="12" fill="{}"/>"#,
                y - 10.0,
                PALETTE[i % PALETTE.len()]
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{y:.1}" font-size="12">{}</text>"#,
                x + 16.0,
                escape_xml(name)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// Color bands for coefficient-of-variation bars
pub fn cov_color(cov: f64, threshold: f64) -> &'static str {
    if cov < threshold {
        "#5cb85c"
    } else if cov < 50.0_f64.max(threshold) {
        "#f0ad4e"
    } else {
        "#d9534f"
    }
}

/// Escape XML special characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn format_value(value: f64) -> String {
    if !value.is_finite() {
        "n/a".to_string()
    } else if value.abs() >= 100.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.4}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn test_single_series_chart() {
        let mut chart = BarChart::new("Average Runtime", "Runtime (ms)");
        chart.push(Bar::new("CSRGraph", 1.5));
        chart.push(Bar::new("Matrix<Graph>", 3.0));
        let svg = chart.to_svg();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("CSRGraph"));
        assert!(svg.contains("Matrix&lt;Graph&gt;"));
        assert_eq!(svg.matches("<rect").count(), 3); // background + 2 bars
    }

    #[test]
    fn test_linear_scale_longest_bar_fills_plot() {
        let mut chart = BarChart::new("t", "x");
        chart.push(Bar::new("a", 5.0));
        chart.push(Bar::new("b", 10.0));
        assert_eq!(chart.scale(10.0, 500.0), 500.0);
        assert_eq!(chart.scale(5.0, 500.0), 250.0);
        assert_eq!(chart.scale(f64::NAN, 500.0), 0.0);
    }

    #[test]
    fn test_log_scale_falls_back_with_zero() {
        let mut chart = BarChart::new("t", "x").with_log_scale();
        chart.push(Bar::new("a", 0.0));
        chart.push(Bar::new("b", 10.0));
        assert!(!chart.uses_log_scale());

        let mut chart = BarChart::new("t", "x").with_log_scale();
        chart.push(Bar::new("a", 0.1));
        chart.push(Bar::new("b", 1000.0));
        assert!(chart.uses_log_scale());
        assert!(chart.scale(0.1, 500.0) > 0.0);
        assert!((chart.scale(1000.0, 500.0) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_and_legend() {
        let mut chart = BarChart::new("Sparse vs Dense", "ns")
            .with_series(&["Sparse", "Dense"])
            .with_threshold(30.0, "High Variance Threshold");
        chart.push(Bar::grouped("A", vec![10.0, 20.0]));
        let svg = chart.to_svg();
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("High Variance Threshold"));
        assert!(svg.contains(">Sparse<"));
        assert!(svg.contains(">Dense<"));
    }

    #[test]
    fn test_cov_color_bands() {
        assert_eq!(cov_color(10.0, 30.0), "#5cb85c");
        assert_eq!(cov_color(40.0, 30.0), "#f0ad4e");
        assert_eq!(cov_color(75.0, 30.0), "#d9534f");
    }
}
