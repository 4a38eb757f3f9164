//! PDF priority report
//!
//! A plain text listing for stakeholders: the report title, then the overdue
//! section (dated by end), then each upcoming window in ascending order
//! (dated by start). One line per task:
//!
//! ```text
//! Overdue
//! 1. Earthworks - 24/04/2024
//! 2. Drainage - 26/04/2024
//! ```
//!
//! Lines flow top to bottom on A4 pages; a new page starts once the next line
//! would fall below the bottom margin. Text uses the standard Helvetica fonts
//! with WinAnsi encoding, so characters outside that code page print as `?`.

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::info;

use schedboard_core::{DashboardReport, DerivedView, RenderError, Renderer, Task, ViewKind};

use crate::check_date_format;

/// Which date a section prints next to each task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DateField {
    Start,
    End,
}

/// Standard font used for a line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PdfFont {
    Regular,
    Bold,
}

impl PdfFont {
    fn resource_name(self) -> &'static str {
        match self {
            PdfFont::Regular => "F1",
            PdfFont::Bold => "F2",
        }
    }
}

/// One line of report text before placement
#[derive(Clone, Debug, PartialEq)]
pub struct PdfLine {
    pub text: String,
    pub font: PdfFont,
    pub size: i64,
}

/// A line placed at a baseline on a page
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    pub line: PdfLine,
    pub y: i64,
}

/// PDF exporter configuration (points, 1/72 inch)
#[derive(Clone, Debug)]
pub struct PdfExporter {
    pub page_width: i64,
    pub page_height: i64,
    pub margin_left: i64,
    pub margin_top: i64,
    pub margin_bottom: i64,
    pub line_height: i64,
    pub title_size: i64,
    pub heading_size: i64,
    pub body_size: i64,
    /// `chrono` format for the per-task date
    pub date_format: String,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self {
            page_width: 595,
            page_height: 842,
            margin_left: 50,
            margin_top: 50,
            margin_bottom: 40,
            line_height: 15,
            title_size: 16,
            heading_size: 13,
            body_size: 11,
            date_format: "%d/%m/%Y".into(),
        }
    }
}

impl PdfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-task date format
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    fn top_baseline(&self) -> i64 {
        self.page_height - self.margin_top
    }

    /// Lines that fit on one page
    pub fn lines_per_page(&self) -> usize {
        let usable = self.top_baseline() - self.margin_bottom;
        if usable < 0 || self.line_height <= 0 {
            return 1;
        }
        (usable / self.line_height + 1) as usize
    }

    fn format_date(&self, date: Option<NaiveDate>) -> String {
        date.map_or_else(|| "-".to_string(), |d| d.format(&self.date_format).to_string())
    }

    fn task_line(&self, index: usize, task: &Task, field: DateField) -> PdfLine {
        let date = match field {
            DateField::Start => task.start,
            DateField::End => task.end,
        };
        PdfLine {
            text: format!("{}. {} - {}", index, task.name, self.format_date(date)),
            font: PdfFont::Regular,
            size: self.body_size,
        }
    }

    fn section(&self, view: &DerivedView, field: DateField, lines: &mut Vec<PdfLine>) {
        lines.push(PdfLine {
            text: view.name.clone(),
            font: PdfFont::Bold,
            size: self.heading_size,
        });
        lines.extend(
            view.tasks
                .iter()
                .enumerate()
                .map(|(i, task)| self.task_line(i + 1, task, field)),
        );
    }

    /// Report text in print order
    pub fn report_lines(&self, report: &DashboardReport) -> Result<Vec<PdfLine>, RenderError> {
        check_date_format(&self.date_format)?;

        let mut lines = vec![PdfLine {
            text: format!("{} ({})", report.title, report.today.format(&self.date_format)),
            font: PdfFont::Bold,
            size: self.title_size,
        }];

        if let Some(overdue) = report.view(ViewKind::Overdue) {
            self.section(overdue, DateField::End, &mut lines);
        }

        let mut upcoming: Vec<(u32, &DerivedView)> = report
            .views
            .iter()
            .filter_map(|v| match v.kind {
                ViewKind::Upcoming { days } => Some((days, v)),
                _ => None,
            })
            .collect();
        upcoming.sort_by_key(|(days, _)| *days);
        for (_, view) in upcoming {
            self.section(view, DateField::Start, &mut lines);
        }
        Ok(lines)
    }

    /// Assign baselines, breaking pages at the bottom margin
    pub fn paginate(&self, lines: Vec<PdfLine>) -> Vec<Vec<PlacedLine>> {
        let mut pages = Vec::new();
        let mut current = Vec::new();
        let mut y = self.top_baseline();

        for line in lines {
            if y < self.margin_bottom && !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                y = self.top_baseline();
            }
            current.push(PlacedLine { line, y });
            y -= self.line_height;
        }
        if !current.is_empty() || pages.is_empty() {
            pages.push(current);
        }
        pages
    }

    fn page_operations(&self, page: &[PlacedLine]) -> Vec<Operation> {
        let mut operations = Vec::with_capacity(page.len() * 5);
        for placed in page {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![placed.line.font.resource_name().into(), placed.line.size.into()],
            ));
            operations.push(Operation::new(
                "Td",
                vec![self.margin_left.into(), placed.y.into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(to_win_ansi(&placed.line.text))],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        operations
    }

    /// Build the document from already paginated lines
    pub fn render_pages(&self, pages: &[Vec<PlacedLine>]) -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in pages {
            let content = Content {
                operations: self.page_operations(page),
            };
            let encoded = content
                .encode()
                .map_err(|e| RenderError::Format(format!("Failed to encode page: {e}")))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(self.page_width),
                Object::Integer(self.page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| RenderError::Format(format!("Failed to create PDF: {e}")))?;
        Ok(buffer)
    }

    /// Generate PDF bytes
    pub fn render_to_bytes(&self, report: &DashboardReport) -> Result<Vec<u8>, RenderError> {
        let pages = self.paginate(self.report_lines(report)?);
        let bytes = self.render_pages(&pages)?;
        info!(pages = pages.len(), bytes = bytes.len(), "rendered PDF report");
        Ok(bytes)
    }
}

impl Renderer for PdfExporter {
    type Output = Vec<u8>;

    fn render(&self, report: &DashboardReport) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(report)
    }
}

/// Characters WinAnsi places in 0x80-0x9F, where Latin-1 has C1 controls
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// WinAnsi bytes for the standard base fonts; anything unmapped becomes `?`
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            0x00..=0x7F | 0xA0..=0xFF => c as u8,
            _ => WIN_ANSI_HIGH
                .iter()
                .find(|(mapped, _)| *mapped == c)
                .map_or(b'?', |(_, byte)| *byte),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use schedboard_core::{DashboardIndicators, ProgressCurve};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn report(views: Vec<DerivedView>) -> DashboardReport {
        DashboardReport {
            title: "Obra".into(),
            today: date(2024, 4, 12),
            indicators: DashboardIndicators::default(),
            curve: ProgressCurve::default(),
            views,
        }
    }

    fn texts(lines: &[PdfLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn sections_in_fixed_order_with_matching_dates() {
        let task = Task::new("Pintura").dates(date(2024, 4, 15), date(2024, 4, 20));
        let late = Task::new("Escavação").dates(date(2024, 4, 1), date(2024, 4, 10));
        let views = vec![
            DerivedView::new(ViewKind::Upcoming { days: 15 }, vec![task.clone()]),
            DerivedView::new(ViewKind::Overdue, vec![late]),
            DerivedView::new(ViewKind::Upcoming { days: 7 }, vec![task]),
        ];

        let lines = PdfExporter::new().report_lines(&report(views)).unwrap();

        assert_eq!(
            texts(&lines),
            vec![
                "Obra (12/04/2024)",
                "Overdue",
                "1. Escavação - 10/04/2024",
                "Next 7 Days",
                "1. Pintura - 15/04/2024",
                "Next 15 Days",
                "1. Pintura - 15/04/2024",
            ]
        );
    }

    #[test]
    fn missing_date_prints_dash() {
        let views = vec![DerivedView::new(ViewKind::Overdue, vec![Task::new("Open")])];
        let lines = PdfExporter::new().report_lines(&report(views)).unwrap();
        assert_eq!(lines[2].text, "1. Open - -");
    }

    #[test]
    fn empty_sections_keep_heading() {
        let views = vec![DerivedView::new(ViewKind::Overdue, vec![])];
        let lines = PdfExporter::new().report_lines(&report(views)).unwrap();
        assert_eq!(texts(&lines), vec!["Obra (12/04/2024)", "Overdue"]);
    }

    #[test]
    fn pagination_breaks_at_bottom_margin() {
        let exporter = PdfExporter::new();
        let per_page = exporter.lines_per_page();
        assert_eq!(per_page, 51);

        let line = PdfLine {
            text: "x".into(),
            font: PdfFont::Regular,
            size: 11,
        };
        let pages = exporter.paginate(vec![line.clone(); per_page]);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].iter().all(|p| p.y >= exporter.margin_bottom));

        let pages = exporter.paginate(vec![line; per_page + 1]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].len(), 1);
        assert_eq!(pages[1][0].y, 792);
    }

    #[test]
    fn empty_input_still_has_one_page() {
        assert_eq!(PdfExporter::new().paginate(Vec::new()).len(), 1);
    }

    #[test]
    fn non_latin_characters_degrade() {
        assert_eq!(to_win_ansi("Ação"), vec![b'A', 0xE7, 0xE3, b'o']);
        assert_eq!(to_win_ansi("→"), vec![b'?']);
    }

    #[test]
    fn win_ansi_high_block_is_mapped() {
        assert_eq!(
            to_win_ansi("\u{20AC}5 \u{201C}A\u{201D} 1\u{2013}2"),
            vec![0x80, b'5', b' ', 0x93, b'A', 0x94, b' ', b'1', 0x96, b'2']
        );
        // C1 controls have no glyph in WinAnsi
        assert_eq!(to_win_ansi("\u{0085}\u{0096}"), vec![b'?', b'?']);
    }

    #[test]
    fn bad_date_format_is_an_error() {
        let views = vec![DerivedView::new(ViewKind::Overdue, vec![])];
        let exporter = PdfExporter::new().date_format("%Q");

        assert!(matches!(
            exporter.report_lines(&report(views.clone())),
            Err(RenderError::Format(_))
        ));
        assert!(matches!(
            exporter.render(&report(views)),
            Err(RenderError::Format(_))
        ));
    }

    #[test]
    fn renders_pdf_header() {
        let bytes = PdfExporter::new().render_to_bytes(&report(vec![])).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }
}
