//! SVG progress curve chart
//!
//! Plots the weekly cumulative series as a polyline over a 0-100 grid, with
//! the live progress marker drawn as a point at the evaluation date.

use chrono::NaiveDate;
use svg::node::element::{Circle, Group, Line, Polyline, Rectangle, Text};
use svg::Document;

use schedboard_core::{DashboardReport, ProgressCurve, ProgressMarker, RenderError, Renderer};

/// SVG curve renderer configuration
#[derive(Clone, Debug)]
pub struct SvgCurveRenderer {
    /// Width of the plot area in pixels
    pub chart_width: u32,
    /// Height of the plot area in pixels
    pub chart_height: u32,
    /// Space reserved for axis labels
    pub margin: u32,
    pub line_color: String,
    pub marker_color: String,
    pub background_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
}

impl Default for SvgCurveRenderer {
    fn default() -> Self {
        Self {
            chart_width: 720,
            chart_height: 320,
            margin: 50,
            line_color: "#3498db".into(),
            marker_color: "#e74c3c".into(),
            background_color: "#ffffff".into(),
            grid_color: "#ecf0f1".into(),
            text_color: "#2c3e50".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

impl SvgCurveRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure plot width
    pub fn chart_width(mut self, width: u32) -> Self {
        self.chart_width = width;
        self
    }

    /// Configure plot height
    pub fn chart_height(mut self, height: u32) -> Self {
        self.chart_height = height;
        self
    }

    fn total_width(&self) -> u32 {
        self.margin * 2 + self.chart_width
    }

    fn total_height(&self) -> u32 {
        self.margin * 2 + self.chart_height
    }

    fn left(&self) -> f64 {
        f64::from(self.margin)
    }

    fn bottom(&self) -> f64 {
        f64::from(self.margin + self.chart_height)
    }

    fn percent_to_y(&self, percent: f64) -> f64 {
        self.bottom() - percent.clamp(0.0, 100.0) / 100.0 * f64::from(self.chart_height)
    }

    /// X position of a date between the first and last bucket
    fn date_to_x(&self, date: NaiveDate, first: NaiveDate, last: NaiveDate) -> f64 {
        let span = (last - first).num_days().max(1) as f64;
        let offset = ((date - first).num_days() as f64).clamp(0.0, span);
        self.left() + offset / span * f64::from(self.chart_width)
    }

    fn label(&self, text: impl Into<String>, x: f64, y: f64, anchor: &str) -> Text {
        Text::new(text.into())
            .set("x", x)
            .set("y", y)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size)
            .set("fill", self.text_color.as_str())
            .set("text-anchor", anchor)
    }

    /// Horizontal grid lines every 25%
    fn render_grid(&self) -> Group {
        let mut group = Group::new().set("class", "grid");
        let right = self.left() + f64::from(self.chart_width);
        for step in 0..=4 {
            let pct = f64::from(step) * 25.0;
            let y = self.percent_to_y(pct);
            group = group.add(
                Line::new()
                    .set("x1", self.left())
                    .set("y1", y)
                    .set("x2", right)
                    .set("y2", y)
                    .set("stroke", self.grid_color.as_str())
                    .set("stroke-width", 1),
            );
            group = group.add(self.label(format!("{pct:.0}%"), self.left() - 6.0, y + 4.0, "end"));
        }
        group
    }

    fn render_series(&self, curve: &ProgressCurve, first: NaiveDate, last: NaiveDate) -> Group {
        let mut group = Group::new().set("class", "series");

        let points: Vec<String> = curve
            .points
            .iter()
            .map(|p| {
                format!(
                    "{:.1},{:.1}",
                    self.date_to_x(p.period_start, first, last),
                    self.percent_to_y(p.cumulative_percent)
                )
            })
            .collect();
        group = group.add(
            Polyline::new()
                .set("points", points.join(" "))
                .set("fill", "none")
                .set("stroke", self.line_color.as_str())
                .set("stroke-width", 2),
        );

        // Period labels on the x axis, first and last always shown
        let stride = (curve.points.len() / 8).max(1);
        for (i, point) in curve.points.iter().enumerate() {
            if i % stride != 0 && i + 1 != curve.points.len() {
                continue;
            }
            let x = self.date_to_x(point.period_start, first, last);
            group = group.add(self.label(
                point.period_start.format("%d/%m").to_string(),
                x,
                self.bottom() + 16.0,
                "middle",
            ));
        }
        group
    }

    fn render_marker(&self, marker: &ProgressMarker, first: NaiveDate, last: NaiveDate) -> Group {
        let x = self.date_to_x(marker.date, first, last);
        let y = self.percent_to_y(marker.percent);
        Group::new()
            .set("class", "marker")
            .add(
                Circle::new()
                    .set("cx", x)
                    .set("cy", y)
                    .set("r", 5)
                    .set("fill", self.marker_color.as_str()),
            )
            .add(self.label(format!("{:.1}%", marker.percent), x + 8.0, y - 8.0, "start"))
    }

    /// Render the curve alone, without report context
    pub fn render_curve(&self, title: &str, curve: &ProgressCurve) -> Result<String, RenderError> {
        let width = self.total_width();
        let height = self.total_height();

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg")
            .add(
                Rectangle::new()
                    .set("width", "100%")
                    .set("height", "100%")
                    .set("fill", self.background_color.as_str()),
            )
            .add(
                self.label(title, f64::from(width) / 2.0, f64::from(self.margin) / 2.0, "middle")
                    .set("font-weight", "bold"),
            )
            .add(self.render_grid());

        match (curve.points.first(), curve.points.last()) {
            (Some(first), Some(last)) => {
                document = document.add(self.render_series(curve, first.period_start, last.period_start));
                if let Some(marker) = &curve.marker {
                    document = document.add(self.render_marker(marker, first.period_start, last.period_start));
                }
            }
            _ => {
                document = document.add(self.label(
                    "No dated tasks",
                    self.left() + f64::from(self.chart_width) / 2.0,
                    self.percent_to_y(50.0),
                    "middle",
                ));
            }
        }

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {e}")))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {e}")))
    }
}

impl Renderer for SvgCurveRenderer {
    type Output = String;

    fn render(&self, report: &DashboardReport) -> Result<String, RenderError> {
        self.render_curve(&report.title, &report.curve)
    }
}
