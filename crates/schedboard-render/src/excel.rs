//! Excel dashboard export
//!
//! Generates an XLSX workbook with:
//! - Progress Curve: one row per weekly bucket (always the first sheet)
//! - One sheet per derived view, named after the view
//!
//! ## Example Output Structure
//!
//! ```text
//! Sheet: Progress Curve
//! | Period     | Cumulative % |
//! |------------|--------------|
//! | 2024-04-01 | 12.5         |
//! | 2024-04-08 | 31.0         |
//!
//! Sheet: Overdue
//! | Name       | Start      | End        | Duration | Predecessors | PercentComplete | Status      |
//! |------------|------------|------------|----------|--------------|-----------------|-------------|
//! | Earthworks | 2024-04-04 | 2024-04-24 | 21       | 1            | 60              | In Progress |
//! ```
//!
//! A view with no tasks still gets its sheet, with the header row only.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use schedboard_core::{DashboardReport, DerivedView, ProgressCurve, RenderError, Renderer, Task};
use tracing::info;

use crate::check_date_format;

/// Name of the first sheet
pub const CURVE_SHEET: &str = "Progress Curve";

/// Header row of the curve sheet
pub const CURVE_COLUMNS: [&str; 2] = ["Period", "Cumulative %"];

/// Header row of every view sheet
pub const TASK_COLUMNS: [&str; 7] = [
    "Name",
    "Start",
    "End",
    "Duration",
    "Predecessors",
    "PercentComplete",
    "Status",
];

/// Excel dashboard exporter
#[derive(Clone, Debug)]
pub struct ExcelExporter {
    /// `chrono` format for date cells
    pub date_format: String,
    /// Freeze the header row on every sheet
    pub freeze_header: bool,
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".into(),
            freeze_header: true,
        }
    }
}

struct ExcelFormats {
    header: Format,
    text: Format,
    integer: Format,
    percent: Format,
}

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

impl ExcelExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date format used for date cells
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Generate workbook bytes
    pub fn render_to_bytes(&self, report: &DashboardReport) -> Result<Vec<u8>, RenderError> {
        check_date_format(&self.date_format)?;

        let mut workbook = Workbook::new();
        let formats = Self::create_formats();

        self.add_curve_sheet(&mut workbook, &report.curve, &formats)?;
        for view in &report.views {
            self.add_view_sheet(&mut workbook, view, &formats)?;
        }

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        info!(
            sheets = report.views.len() + 1,
            bytes = buffer.len(),
            "rendered Excel dashboard"
        );
        Ok(buffer)
    }

    fn create_formats() -> ExcelFormats {
        ExcelFormats {
            header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_background_color(0x4472C4)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin),
            text: Format::new().set_border(FormatBorder::Thin),
            integer: Format::new()
                .set_num_format("0")
                .set_border(FormatBorder::Thin),
            percent: Format::new()
                .set_num_format("0.0")
                .set_border(FormatBorder::Thin),
        }
    }

    fn write_header(
        &self,
        sheet: &mut Worksheet,
        headers: &[&str],
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(xlsx_err)?;
        }
        if self.freeze_header {
            sheet.set_freeze_panes(1, 0).map_err(xlsx_err)?;
        }
        Ok(())
    }

    fn add_curve_sheet(
        &self,
        workbook: &mut Workbook,
        curve: &ProgressCurve,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(CURVE_SHEET).map_err(xlsx_err)?;
        self.write_header(sheet, &CURVE_COLUMNS, formats)?;

        sheet.set_column_width(0, 14).ok();
        sheet.set_column_width(1, 14).ok();

        for (i, point) in curve.points.iter().enumerate() {
            let row = (i + 1) as u32;
            let period = point.period_start.format(&self.date_format).to_string();
            sheet
                .write_with_format(row, 0, period, &formats.text)
                .map_err(xlsx_err)?;
            sheet
                .write_with_format(row, 1, point.cumulative_percent, &formats.percent)
                .map_err(xlsx_err)?;
        }
        Ok(())
    }

    fn add_view_sheet(
        &self,
        workbook: &mut Workbook,
        view: &DerivedView,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&view.name).map_err(xlsx_err)?;
        self.write_header(sheet, &TASK_COLUMNS, formats)?;

        sheet.set_column_width(0, 32).ok(); // Name
        sheet.set_column_width(1, 12).ok(); // Start
        sheet.set_column_width(2, 12).ok(); // End
        sheet.set_column_width(3, 10).ok(); // Duration
        sheet.set_column_width(4, 14).ok(); // Predecessors
        sheet.set_column_width(5, 16).ok(); // PercentComplete
        sheet.set_column_width(6, 14).ok(); // Status

        for (i, task) in view.tasks.iter().enumerate() {
            self.write_task_row(sheet, (i + 1) as u32, task, formats)?;
        }
        Ok(())
    }

    fn write_task_row(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        task: &Task,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        sheet
            .write_with_format(row, 0, task.name.as_str(), &formats.text)
            .map_err(xlsx_err)?;

        for (col, date) in [(1u16, task.start), (2, task.end)] {
            if let Some(date) = date {
                sheet
                    .write_with_format(row, col, date.format(&self.date_format).to_string(), &formats.text)
                    .map_err(xlsx_err)?;
            }
        }
        if let Some(days) = task.duration_days {
            sheet
                .write_with_format(row, 3, f64::from(days), &formats.integer)
                .map_err(xlsx_err)?;
        }
        if let Some(pred) = &task.predecessors {
            sheet
                .write_with_format(row, 4, pred.as_str(), &formats.text)
                .map_err(xlsx_err)?;
        }
        if let Some(pct) = task.percent_complete {
            sheet
                .write_with_format(row, 5, pct, &formats.percent)
                .map_err(xlsx_err)?;
        }
        let status = task
            .status_label
            .clone()
            .unwrap_or_else(|| task.derived_status(&[]).to_string());
        sheet
            .write_with_format(row, 6, status, &formats.text)
            .map_err(xlsx_err)?;
        Ok(())
    }
}

impl Renderer for ExcelExporter {
    type Output = Vec<u8>;

    fn render(&self, report: &DashboardReport) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(report)
    }
}
