//! # schedboard-solver
//!
//! Derived schedule views and progress curves.
//!
//! This crate provides:
//! - Overdue, no-predecessor, long-duration and upcoming-window views
//! - Dashboard indicators (counts, span, remaining days, overall progress)
//! - The weekly cumulative progress curve ("S-curve")
//!
//! Everything here is a pure function of the task set and an explicit
//! evaluation date. Nothing reads the clock.
//!
//! The long-duration view is a duration threshold filter. It is not a
//! critical-path computation: no forward/backward pass over the predecessor
//! graph is performed.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use schedboard_core::Task;
//! use schedboard_solver::DashboardCalculator;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 4, d).unwrap();
//! let tasks = vec![Task::new("Survey").dates(day(1), day(10)).duration(10)];
//!
//! let dashboard = DashboardCalculator::new().compute(&tasks, day(12));
//! assert_eq!(dashboard.overdue().unwrap().len(), 1);
//! ```

pub mod curve;

pub use curve::{overall_progress, progress_curve, progress_curve_from_tasks};

use chrono::{Days, NaiveDate};
use schedboard_core::{
    DashboardIndicators, DashboardViews, DerivedView, Task, TaskStatus, ViewKind,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Duration above which a task lands in the long-duration view
pub const DEFAULT_LONG_DURATION_DAYS: u32 = 15;

/// Thresholds and windows for the derived views
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Strict lower bound for the long-duration view, in days
    pub long_duration_threshold: u32,
    /// Upcoming-work windows, in days
    pub upcoming_windows: Vec<u32>,
    /// Status labels that mark a task complete when percent is missing
    pub completed_labels: Vec<String>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            long_duration_threshold: DEFAULT_LONG_DURATION_DAYS,
            upcoming_windows: vec![7, 15],
            completed_labels: vec![
                "Concluído".into(),
                "Completed".into(),
                "Complete".into(),
                "Done".into(),
            ],
        }
    }
}

/// Computes every derived view and indicator for one evaluation date
#[derive(Clone, Debug, Default)]
pub struct DashboardCalculator {
    pub options: ViewOptions,
}

impl DashboardCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ViewOptions) -> Self {
        Self { options }
    }

    /// Override the long-duration threshold
    pub fn long_duration_threshold(mut self, days: u32) -> Self {
        self.options.long_duration_threshold = days;
        self
    }

    /// Override the upcoming windows
    pub fn upcoming_windows(mut self, windows: Vec<u32>) -> Self {
        self.options.upcoming_windows = windows;
        self
    }

    fn is_complete(&self, task: &Task) -> bool {
        task.is_complete(&self.options.completed_labels)
    }

    /// End date before `today` and not complete
    pub fn is_overdue(&self, task: &Task, today: NaiveDate) -> bool {
        task.end.is_some_and(|end| end < today) && !self.is_complete(task)
    }

    /// Duration strictly above the threshold; unknown durations never qualify
    pub fn is_long_duration(&self, task: &Task) -> bool {
        task.duration_days
            .is_some_and(|d| d > self.options.long_duration_threshold)
    }

    /// Starts by `today + days` and has not ended before `today`
    pub fn is_upcoming(&self, task: &Task, today: NaiveDate, days: u32) -> bool {
        let horizon = today
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        matches!(
            (task.start, task.end),
            (Some(start), Some(end)) if start <= horizon && end >= today
        )
    }

    fn filter(&self, tasks: &[Task], keep: impl Fn(&Task) -> bool) -> Vec<Task> {
        tasks.iter().filter(|t| keep(t)).cloned().collect()
    }

    /// Windows sorted ascending, duplicates removed
    fn windows(&self) -> Vec<u32> {
        let mut windows = self.options.upcoming_windows.clone();
        windows.sort_unstable();
        windows.dedup();
        windows
    }

    /// Compute every view and indicator
    pub fn compute(&self, tasks: &[Task], today: NaiveDate) -> DashboardViews {
        let overdue = self.filter(tasks, |t| self.is_overdue(t, today));
        let without_predecessors = self.filter(tasks, |t| t.predecessors.is_none());
        let long_duration = self.filter(tasks, |t| self.is_long_duration(t));

        let indicators = self.indicators(tasks, today, overdue.len());

        let mut views = vec![
            DerivedView::new(ViewKind::AllTasks, tasks.to_vec()),
            DerivedView::new(ViewKind::Overdue, overdue),
            DerivedView::new(ViewKind::WithoutPredecessors, without_predecessors),
            DerivedView::new(
                ViewKind::LongDuration {
                    threshold_days: self.options.long_duration_threshold,
                },
                long_duration,
            ),
        ];
        for days in self.windows() {
            let upcoming = self.filter(tasks, |t| self.is_upcoming(t, today, days));
            views.push(DerivedView::new(ViewKind::Upcoming { days }, upcoming));
        }

        debug!(
            tasks = tasks.len(),
            overdue = indicators.overdue_count,
            %today,
            "computed dashboard views"
        );

        DashboardViews {
            today,
            views,
            indicators,
        }
    }

    /// Scalar indicators; all zero for an empty task set
    pub fn indicators(&self, tasks: &[Task], today: NaiveDate, overdue_count: usize) -> DashboardIndicators {
        let mut completed_count = 0usize;
        let mut in_progress_count = 0usize;
        let mut not_started_count = 0usize;
        for task in tasks {
            match task.derived_status(&self.options.completed_labels) {
                TaskStatus::Complete => completed_count += 1,
                TaskStatus::InProgress => in_progress_count += 1,
                TaskStatus::NotStarted => not_started_count += 1,
            }
        }

        let project_start = tasks.iter().filter_map(|t| t.start).min();
        let project_finish = tasks.iter().filter_map(|t| t.end).max();

        let project_span_days = match (project_start, project_finish) {
            (Some(start), Some(finish)) => (finish - start).num_days(),
            _ => 0,
        };
        let remaining_days = project_finish
            .map(|finish| (finish - today).num_days())
            .unwrap_or(0);

        DashboardIndicators {
            total_tasks: tasks.len(),
            completed_count,
            in_progress_count,
            not_started_count,
            overdue_count,
            project_start,
            project_finish,
            project_span_days,
            remaining_days,
            overall_progress: overall_progress(tasks),
            total_duration_days: tasks
                .iter()
                .filter_map(|t| t.duration_days)
                .map(u64::from)
                .sum(),
        }
    }
}
