//! Dashboard indicators
//!
//! Scalar metrics shown alongside the derived views: task counts by status,
//! project span, days remaining, and overall progress.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use schedboard_core::DashboardIndicators;
//!
//! let indicators = DashboardIndicators {
//!     total_tasks: 12,
//!     completed_count: 3,
//!     project_finish: NaiveDate::from_ymd_opt(2024, 9, 30),
//!     remaining_days: -4,
//!     ..Default::default()
//! };
//!
//! assert_eq!(indicators.remaining_string(), "4 days past finish");
//! assert_eq!(indicators.completion_ratio(), 0.25);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregated indicators for one evaluation instant.
///
/// Every field is zero (or `None`) for an empty task set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardIndicators {
    /// Number of loaded tasks
    pub total_tasks: usize,

    /// Tasks at 100% (or labelled complete)
    pub completed_count: usize,

    /// Tasks with 0 < complete < 100
    pub in_progress_count: usize,

    /// Tasks not yet started
    pub not_started_count: usize,

    /// Tasks past their end date and not complete
    pub overdue_count: usize,

    /// Earliest start date across tasks
    pub project_start: Option<NaiveDate>,

    /// Latest end date across tasks
    pub project_finish: Option<NaiveDate>,

    /// Latest end minus earliest start, in days
    pub project_span_days: i64,

    /// Latest end minus the evaluation date, in days (negative once past)
    pub remaining_days: i64,

    /// Duration-weighted mean percent complete (0-100)
    pub overall_progress: f64,

    /// Sum of all parsed durations, in days
    pub total_duration_days: u64,
}

impl DashboardIndicators {
    /// Share of tasks complete, 0.0 for an empty schedule
    pub fn completion_ratio(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed_count as f64 / self.total_tasks as f64
        }
    }

    /// Human-readable remaining-days string
    pub fn remaining_string(&self) -> String {
        match self.remaining_days {
            0 if self.project_finish.is_none() => "no finish date".to_string(),
            0 => "finishes today".to_string(),
            1 => "1 day remaining".to_string(),
            d if d > 0 => format!("{} days remaining", d),
            -1 => "1 day past finish".to_string(),
            d => format!("{} days past finish", d.abs()),
        }
    }
}
