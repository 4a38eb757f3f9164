//! # schedboard-render
//!
//! Report exporters for schedboard dashboards.
//!
//! This crate provides:
//! - Excel workbook export (curve sheet plus one sheet per view)
//! - PDF priority report (overdue and upcoming sections)
//! - SVG progress curve chart
//! - Plain-text summary for the terminal
//!
//! ## Example
//!
//! ```rust,ignore
//! use schedboard_core::{DashboardReport, Renderer};
//! use schedboard_render::{ExcelExporter, PdfExporter, SvgCurveRenderer, TextSummaryRenderer};
//!
//! let report = DashboardReport::new("Site works", dashboard, curve);
//!
//! let xlsx_bytes = ExcelExporter::new().render(&report)?;
//! std::fs::write("dashboard.xlsx", xlsx_bytes)?;
//!
//! let pdf_bytes = PdfExporter::new().render(&report)?;
//! let svg = SvgCurveRenderer::new().render(&report)?;
//! println!("{}", TextSummaryRenderer.render(&report)?);
//! ```

pub mod chart;
pub mod excel;
pub mod pdf;

pub use chart::SvgCurveRenderer;
pub use excel::ExcelExporter;
pub use pdf::PdfExporter;

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use schedboard_core::{DashboardReport, RenderError, Renderer};

/// Reject a `chrono` strftime string with unknown or malformed specifiers.
///
/// Formatting a date with such a string fails inside `Display`, so exporters
/// check their formats before writing anything.
pub fn check_date_format(format: &str) -> Result<(), RenderError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(RenderError::Format(format!(
            "invalid date format '{format}'"
        )));
    }
    Ok(())
}

/// Plain-text dashboard summary
#[derive(Clone, Copy, Debug, Default)]
pub struct TextSummaryRenderer;

impl Renderer for TextSummaryRenderer {
    type Output = String;

    fn render(&self, report: &DashboardReport) -> Result<String, RenderError> {
        let fmt_err = |e: std::fmt::Error| RenderError::Format(e.to_string());
        let ind = &report.indicators;
        let mut out = String::new();

        writeln!(out, "{}", report.title).map_err(fmt_err)?;
        writeln!(out, "Status date: {}", report.today).map_err(fmt_err)?;
        writeln!(out).map_err(fmt_err)?;

        writeln!(out, "  Tasks:            {}", ind.total_tasks).map_err(fmt_err)?;
        writeln!(
            out,
            "  Completed:        {} ({:.1}%)",
            ind.completed_count,
            ind.completion_ratio() * 100.0
        )
        .map_err(fmt_err)?;
        writeln!(out, "  In progress:      {}", ind.in_progress_count).map_err(fmt_err)?;
        writeln!(out, "  Not started:      {}", ind.not_started_count).map_err(fmt_err)?;
        writeln!(out, "  Overdue:          {}", ind.overdue_count).map_err(fmt_err)?;

        match (ind.project_start, ind.project_finish) {
            (Some(start), Some(finish)) => writeln!(
                out,
                "  Span:             {} days ({} to {})",
                ind.project_span_days, start, finish
            ),
            _ => writeln!(out, "  Span:             -"),
        }
        .map_err(fmt_err)?;
        writeln!(out, "  Remaining:        {}", ind.remaining_string()).map_err(fmt_err)?;
        writeln!(out, "  Overall progress: {:.1}%", ind.overall_progress).map_err(fmt_err)?;
        writeln!(out, "  Total duration:   {} days", ind.total_duration_days).map_err(fmt_err)?;

        if !report.views.is_empty() {
            writeln!(out).map_err(fmt_err)?;
            writeln!(out, "Views:").map_err(fmt_err)?;
            for view in &report.views {
                writeln!(out, "  {:<22} {:>5}", view.name, view.len()).map_err(fmt_err)?;
            }
        }

        writeln!(out).map_err(fmt_err)?;
        if report.curve.is_empty() {
            writeln!(out, "Progress curve: no dated tasks").map_err(fmt_err)?;
        } else {
            writeln!(
                out,
                "Progress curve: {} weeks, final {:.1}%",
                report.curve.points.len(),
                report.curve.final_percent()
            )
            .map_err(fmt_err)?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use schedboard_core::{DashboardIndicators, DerivedView, ProgressCurve, Task, ViewKind};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn date_format_check() {
        assert!(check_date_format("%d/%m/%Y").is_ok());
        assert!(check_date_format("week %V, %Y").is_ok());
        assert!(matches!(check_date_format("%Q"), Err(RenderError::Format(_))));
        assert!(check_date_format("%d/%m/%").is_err());
    }

    #[test]
    fn text_summary_lists_indicators_and_views() {
        let report = DashboardReport {
            title: "Site works".into(),
            today: date(2024, 4, 12),
            indicators: DashboardIndicators {
                total_tasks: 4,
                completed_count: 1,
                overdue_count: 2,
                project_start: Some(date(2024, 4, 1)),
                project_finish: Some(date(2024, 4, 25)),
                project_span_days: 24,
                remaining_days: 13,
                overall_progress: 37.5,
                ..Default::default()
            },
            curve: ProgressCurve::default(),
            views: vec![DerivedView::new(
                ViewKind::Overdue,
                vec![Task::new("a"), Task::new("b")],
            )],
        };

        let text = TextSummaryRenderer.render(&report).unwrap();

        assert!(text.starts_with("Site works\nStatus date: 2024-04-12\n"));
        assert!(text.contains("Completed:        1 (25.0%)"));
        assert!(text.contains("24 days (2024-04-01 to 2024-04-25)"));
        assert!(text.contains("13 days remaining"));
        assert!(text.contains("Overall progress: 37.5%"));
        assert!(text.contains("Overdue                    2"));
        assert!(text.contains("Progress curve: no dated tasks"));
    }

    #[test]
    fn text_summary_for_empty_report() {
        let report = DashboardReport {
            title: "Empty".into(),
            today: date(2024, 4, 12),
            indicators: DashboardIndicators::default(),
            curve: ProgressCurve::default(),
            views: Vec::new(),
        };
        let text = TextSummaryRenderer.render(&report).unwrap();
        assert!(text.contains("Span:             -"));
        assert!(!text.contains("Views:"));
    }
}
