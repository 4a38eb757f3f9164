//! # schedboard-core
//!
//! Core domain model and traits for the schedboard schedule-analytics engine.
//!
//! This crate provides:
//! - Domain types: `Task`, `ScheduleTable`, `DerivedView`, `ProgressCurve`
//! - Dashboard output types: `DashboardViews`, `DashboardReport`
//! - The `Renderer` trait implemented by every exporter
//! - Diagnostics and error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use schedboard_core::Task;
//!
//! let task = Task::new("Foundations")
//!     .dates(
//!         NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
//!     )
//!     .duration(10)
//!     .complete(40.0);
//!
//! assert!(task.has_dates());
//! assert!(!task.is_complete(&[]));
//! ```

pub mod diagnostics;
pub mod indicators;

pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticEmitter, Severity};
pub use indicators::DashboardIndicators;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Percent complete value that marks a task as fully done (canonical scale)
pub const PERCENT_DONE: f64 = 100.0;

// ============================================================================
// Task
// ============================================================================

/// One schedule activity, normalized from a spreadsheet row
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// 1-based row in the source sheet (header is row 1)
    pub row: usize,
    /// Activity name
    pub name: String,
    /// Planned start date
    pub start: Option<NaiveDate>,
    /// Planned end date
    pub end: Option<NaiveDate>,
    /// Duration in days, parsed from free text
    pub duration_days: Option<u32>,
    /// Predecessor reference, as written in the sheet
    pub predecessors: Option<String>,
    /// Completion on the canonical 0-100 scale
    pub percent_complete: Option<f64>,
    /// Free-text status label
    pub status_label: Option<String>,
}

impl Task {
    /// Create a new task with the given name and no other data
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            row: 0,
            name: name.into(),
            start: None,
            end: None,
            duration_days: None,
            predecessors: None,
            percent_complete: None,
            status_label: None,
        }
    }

    /// Set the source row
    pub fn row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }

    /// Set the start date
    pub fn start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the end date
    pub fn end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Set both dates
    pub fn dates(self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start(start).end(end)
    }

    /// Set the duration in days
    pub fn duration(mut self, days: u32) -> Self {
        self.duration_days = Some(days);
        self
    }

    /// Set the predecessor reference
    pub fn depends_on(mut self, predecessor: impl Into<String>) -> Self {
        self.predecessors = Some(predecessor.into());
        self
    }

    /// Set the completion percentage (0-100)
    pub fn complete(mut self, pct: f64) -> Self {
        self.percent_complete = Some(pct);
        self
    }

    /// Set the status label
    pub fn status_label(mut self, label: impl Into<String>) -> Self {
        self.status_label = Some(label.into());
        self
    }

    /// True when both start and end dates are known
    pub fn has_dates(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// True when both dates are known and start falls after end
    pub fn has_inverted_dates(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    /// Completion clamped to 0-100; missing values count as 0
    pub fn effective_percent_complete(&self) -> f64 {
        self.percent_complete
            .map(|p| p.clamp(0.0, PERCENT_DONE))
            .unwrap_or(0.0)
    }

    /// Whether the status label matches one of `completed_labels` (case-insensitive)
    pub fn has_completed_label(&self, completed_labels: &[String]) -> bool {
        self.status_label.as_deref().is_some_and(|label| {
            let label = label.trim().to_lowercase();
            completed_labels
                .iter()
                .any(|candidate| candidate.trim().to_lowercase() == label)
        })
    }

    /// Derive the task status.
    ///
    /// Percent complete wins when present. Without it, a status label matching
    /// one of `completed_labels` marks the task complete.
    pub fn derived_status(&self, completed_labels: &[String]) -> TaskStatus {
        match self.percent_complete {
            Some(_) => {
                let pct = self.effective_percent_complete();
                if pct >= PERCENT_DONE {
                    TaskStatus::Complete
                } else if pct > 0.0 {
                    TaskStatus::InProgress
                } else {
                    TaskStatus::NotStarted
                }
            }
            None if self.has_completed_label(completed_labels) => TaskStatus::Complete,
            None => TaskStatus::NotStarted,
        }
    }

    /// Shorthand for `derived_status(..) == TaskStatus::Complete`
    pub fn is_complete(&self, completed_labels: &[String]) -> bool {
        self.derived_status(completed_labels) == TaskStatus::Complete
    }
}

/// Progress status derived from percent complete or the status label
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "Not Started",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Complete => "Complete",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Percent Scale
// ============================================================================

/// Scale used by the percent-complete column of an input sheet.
///
/// Values are always converted to the canonical 0-100 scale at load time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentScale {
    /// Values between 0 and 1
    Fraction,
    /// Values between 0 and 100
    Percent,
    /// Fraction when every value is at most 1.0, otherwise percent.
    ///
    /// A percent sheet holding only 0 and 1 reads as fractions, so a task at
    /// 1% becomes complete. Set the scale explicitly for such sheets.
    #[default]
    Auto,
}

impl PercentScale {
    /// Resolve `Auto` against the observed column values
    pub fn resolve(self, values: &[f64]) -> PercentScale {
        match self {
            PercentScale::Auto => {
                if !values.is_empty() && values.iter().all(|v| *v <= 1.0) {
                    PercentScale::Fraction
                } else {
                    PercentScale::Percent
                }
            }
            resolved => resolved,
        }
    }

    /// Convert a raw value to the canonical 0-100 scale, clamped
    pub fn to_canonical(self, value: f64) -> f64 {
        let scaled = match self {
            PercentScale::Fraction => value * 100.0,
            PercentScale::Percent | PercentScale::Auto => value,
        };
        scaled.clamp(0.0, PERCENT_DONE)
    }
}

// ============================================================================
// Schedule Table
// ============================================================================

/// The normalized task set produced by one load pass
#[derive(Clone, Debug, Default)]
pub struct ScheduleTable {
    /// Valid task records in sheet order
    pub tasks: Vec<Task>,
    /// Non-fatal findings raised while loading
    pub diagnostics: Vec<Diagnostic>,
    /// Number of data rows read from the sheet (excluding the header)
    pub source_rows: usize,
    /// Scale the percent-complete column was read with
    pub percent_scale: PercentScale,
}

impl ScheduleTable {
    /// Number of warnings among the load diagnostics
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

// ============================================================================
// Derived Views
// ============================================================================

/// Identity of a derived view
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewKind {
    /// Every loaded task
    AllTasks,
    /// End date before today and not complete
    Overdue,
    /// No predecessor reference
    WithoutPredecessors,
    /// Duration above a fixed threshold (a stand-in for a real critical path)
    LongDuration { threshold_days: u32 },
    /// Work active within the next N days
    Upcoming { days: u32 },
}

impl ViewKind {
    /// Display name, also used verbatim as the spreadsheet sheet name
    pub fn display_name(&self) -> String {
        match self {
            ViewKind::AllTasks => "All Tasks".into(),
            ViewKind::Overdue => "Overdue".into(),
            ViewKind::WithoutPredecessors => "Without Predecessors".into(),
            ViewKind::LongDuration { .. } => "Long Duration".into(),
            ViewKind::Upcoming { days } => format!("Next {days} Days"),
        }
    }
}

/// A named, read-only subset of the task set
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DerivedView {
    pub kind: ViewKind,
    pub name: String,
    pub tasks: Vec<Task>,
}

impl DerivedView {
    pub fn new(kind: ViewKind, tasks: Vec<Task>) -> Self {
        Self {
            name: kind.display_name(),
            kind,
            tasks,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task names in view order
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }
}

/// All views and indicators computed for one evaluation instant
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardViews {
    pub today: NaiveDate,
    pub views: Vec<DerivedView>,
    pub indicators: DashboardIndicators,
}

impl DashboardViews {
    /// Look up a view by kind
    pub fn view(&self, kind: ViewKind) -> Option<&DerivedView> {
        self.views.iter().find(|v| v.kind == kind)
    }

    pub fn overdue(&self) -> Option<&DerivedView> {
        self.view(ViewKind::Overdue)
    }

    pub fn without_predecessors(&self) -> Option<&DerivedView> {
        self.view(ViewKind::WithoutPredecessors)
    }

    pub fn long_duration(&self) -> Option<&DerivedView> {
        self.views
            .iter()
            .find(|v| matches!(v.kind, ViewKind::LongDuration { .. }))
    }

    pub fn upcoming(&self, days: u32) -> Option<&DerivedView> {
        self.view(ViewKind::Upcoming { days })
    }

    /// Upcoming-window views in ascending window order
    pub fn upcoming_views(&self) -> Vec<&DerivedView> {
        let mut views: Vec<&DerivedView> = self
            .views
            .iter()
            .filter(|v| matches!(v.kind, ViewKind::Upcoming { .. }))
            .collect();
        views.sort_by_key(|v| match v.kind {
            ViewKind::Upcoming { days } => days,
            _ => 0,
        });
        views
    }

    /// Informational diagnostics for every empty view
    pub fn empty_view_diagnostics(&self) -> Vec<Diagnostic> {
        self.views
            .iter()
            .filter(|v| v.is_empty())
            .map(|v| {
                Diagnostic::new(
                    DiagnosticCode::I001EmptyView,
                    format!("view '{}' has no tasks", v.name),
                )
            })
            .collect()
    }
}

// ============================================================================
// Progress Curve
// ============================================================================

/// One weekly bucket of the cumulative progress series
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// First day of the weekly bucket
    pub period_start: NaiveDate,
    /// Cumulative planned progress, 0-100
    pub cumulative_percent: f64,
}

/// Live progress overlay plotted at the evaluation date
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressMarker {
    pub date: NaiveDate,
    pub percent: f64,
}

/// Planned cumulative progress ("S-curve"), ascending by period
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressCurve {
    pub points: Vec<CurvePoint>,
    pub marker: Option<ProgressMarker>,
}

impl ProgressCurve {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last cumulative value, 0 for an empty series
    pub fn final_percent(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.cumulative_percent)
            .unwrap_or(0.0)
    }

    /// Attach the live progress overlay
    pub fn with_marker(mut self, date: NaiveDate, percent: f64) -> Self {
        self.marker = Some(ProgressMarker {
            date,
            percent: percent.clamp(0.0, PERCENT_DONE),
        });
        self
    }
}

// ============================================================================
// Report
// ============================================================================

/// Everything an exporter needs for one dashboard pass
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardReport {
    pub title: String,
    pub today: NaiveDate,
    pub indicators: DashboardIndicators,
    pub curve: ProgressCurve,
    pub views: Vec<DerivedView>,
}

impl DashboardReport {
    /// Build a report carrying every computed view
    pub fn new(title: impl Into<String>, dashboard: DashboardViews, curve: ProgressCurve) -> Self {
        Self {
            title: title.into(),
            today: dashboard.today,
            indicators: dashboard.indicators,
            curve,
            views: dashboard.views,
        }
    }

    /// Keep only the views whose kind is listed, in the listed order
    pub fn select_views(mut self, kinds: &[ViewKind]) -> Self {
        let mut selected = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if let Some(pos) = self.views.iter().position(|v| v.kind == *kind) {
                selected.push(self.views.remove(pos));
            }
        }
        self.views = selected;
        self
    }

    pub fn view(&self, kind: ViewKind) -> Option<&DerivedView> {
        self.views.iter().find(|v| v.kind == kind)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output renderer for a dashboard report
pub trait Renderer {
    type Output;

    fn render(&self, report: &DashboardReport) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
