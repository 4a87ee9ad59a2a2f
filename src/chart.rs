//! SVG bar charts for conversion rates.

use std::fmt::Write as _;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 420.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 56.0;
const MARGIN_BOTTOM: f64 = 56.0;
const TICKS: usize = 5;
const PALETTE: [&str; 4] = ["#4c72b0", "#dd8452", "#55a868", "#c44e52"];

/// One bar: a label and its value in axis units.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Vertical bar chart rendered as a standalone SVG document.
#[derive(Debug, Clone)]
pub struct BarChart {
    title: String,
    x_label: String,
    y_label: String,
    y_max: f64,
    value_labels: bool,
    bars: Vec<Bar>,
}

impl BarChart {
    /// Create a chart with a 0..`y_max` axis.
    pub fn new(title: impl Into<String>, y_max: f64) -> Self {
        Self {
            title: title.into(),
            x_label: "Group".to_string(),
            y_label: String::new(),
            y_max: if y_max > 0.0 { y_max } else { 1.0 },
            value_labels: true,
            bars: Vec::new(),
        }
    }

    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    /// Show each bar's value (two decimals) above it.
    pub fn with_value_labels(mut self, enabled: bool) -> Self {
        self.value_labels = enabled;
        self
    }

    pub fn with_bars(mut self, bars: impl IntoIterator<Item = Bar>) -> Self {
        self.bars.extend(bars);
        self
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Height in pixels of a bar for `value`, clamped to the plot area.
    fn bar_height(&self, value: f64) -> f64 {
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        (value.max(0.0) / self.y_max).min(1.0) * plot_height
    }

    pub fn render_svg(&self) -> String {
        let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_height;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = WIDTH,
            h = HEIGHT
        );
        let _ = writeln!(
            svg,
            r#"<rect width="{}" height="{}" fill="white"/>"#,
            WIDTH, HEIGHT
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="32" text-anchor="middle" font-size="18">{}</text>"#,
            WIDTH / 2.0,
            escape(&self.title)
        );

        // Grid and y ticks
        for i in 0..=TICKS {
            let fraction = i as f64 / TICKS as f64;
            let y = baseline - fraction * plot_height;
            let _ = writeln!(
                svg,
                r##"<line x1="{x1}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#e0e0e0"/>"##,
                x1 = MARGIN_LEFT,
                x2 = MARGIN_LEFT + plot_width,
                y = y
            );
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{:.1}" text-anchor="end" font-size="12">{}</text>"#,
                MARGIN_LEFT - 8.0,
                y + 4.0,
                format_tick(fraction * self.y_max)
            );
        }

        if !self.bars.is_empty() {
            let slot = plot_width / self.bars.len() as f64;
            let bar_width = slot * 0.6;

            for (i, bar) in self.bars.iter().enumerate() {
                let height = self.bar_height(bar.value);
                let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
                let center = x + bar_width / 2.0;
                let color = PALETTE[i % PALETTE.len()];

                let _ = writeln!(
                    svg,
                    r#"<rect class="bar" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{}: {:.2}</title></rect>"#,
                    x,
                    baseline - height,
                    bar_width,
                    height,
                    color,
                    escape(&bar.label),
                    bar.value
                );
                if self.value_labels {
                    let _ = writeln!(
                        svg,
                        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13">{:.2}</text>"#,
                        center,
                        baseline - height - 6.0,
                        bar.value
                    );
                }
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13">{}</text>"#,
                    center,
                    baseline + 20.0,
                    escape(&bar.label)
                );
            }
        }

        // Axes
        let _ = writeln!(
            svg,
            r##"<line x1="{x}" y1="{top}" x2="{x}" y2="{bottom}" stroke="#333"/>"##,
            x = MARGIN_LEFT,
            top = MARGIN_TOP,
            bottom = baseline
        );
        let _ = writeln!(
            svg,
            r##"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="#333"/>"##,
            x1 = MARGIN_LEFT,
            x2 = MARGIN_LEFT + plot_width,
            y = baseline
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="13">{}</text>"#,
            MARGIN_LEFT + plot_width / 2.0,
            HEIGHT - 12.0,
            escape(&self.x_label)
        );
        if !self.y_label.is_empty() {
            let _ = writeln!(
                svg,
                r#"<text x="18" y="{y:.1}" text-anchor="middle" font-size="13" transform="rotate(-90 18 {y:.1})">{label}</text>"#,
                y = MARGIN_TOP + plot_height / 2.0,
                label = escape(&self.y_label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Escape text for XML/HTML content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

    #[test]
    fn test_render_contains_bars_and_labels() {
        let chart = BarChart::new("Conversion Rate by Group", 20.0)
            .with_y_label("Conversion Rate (%)")
            .with_bars([Bar::new("A", 12.03), Bar::new("B", 11.88)]);
        let svg = chart.render_svg();

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="bar""#).count(), 2);
        assert!(svg.contains("12.03"));
        assert!(svg.contains("11.88"));
        assert!(svg.contains("Conversion Rate by Group"));
        assert!(svg.contains("Conversion Rate (%)"));
    }

    #[test]
    fn test_bar_height_is_clamped() {
        let chart = BarChart::new("t", 20.0);
        let full = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

        assert_eq!(chart.bar_height(0.0), 0.0);
        assert!((chart.bar_height(10.0) - full / 2.0).abs() < 1e-9);
        assert!((chart.bar_height(55.0) - full).abs() < 1e-9);
        assert_eq!(chart.bar_height(-3.0), 0.0);
    }

    #[test]
    fn test_value_labels_can_be_hidden() {
        let svg = BarChart::new("t", 100.0)
            .with_value_labels(false)
            .with_bars([Bar::new("A", 42.42)])
            .render_svg();
        // Only the tooltip carries the value
        assert_eq!(svg.matches("42.42").count(), 1);
    }

    #[test]
    fn test_empty_chart_still_renders_axes() {
        let svg = BarChart::new("Nothing selected", 100.0).render_svg();
        assert!(!svg.contains(r#"class="bar""#));
        assert!(svg.contains("Nothing selected"));
        assert!(svg.contains(">100<"));
    }

    #[test]
    fn test_escape_markup_in_labels() {
        let svg = BarChart::new("A & B <test>", 10.0)
            .with_bars([Bar::new("\"q\"", 1.0)])
            .render_svg();
        assert!(svg.contains("A &amp; B &lt;test&gt;"));
        assert!(svg.contains("&quot;q&quot;"));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(20.0), "20");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(0.0), "0");
    }
}
