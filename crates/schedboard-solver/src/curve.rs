//! Weekly cumulative progress curve ("S-curve")
//!
//! Each dated task is worth one unit of work, spread evenly over the weekly
//! buckets its date range touches. Bucket totals are accumulated in date
//! order and rescaled so the series ends at 100.
//!
//! ```text
//! week:        W1    W2    W3    W4
//! task A:     0.5   0.5
//! task B:           1/3   1/3   1/3
//! cumulative: 0.5   1.33  1.67  2.0   → ×50 → 25, 66.7, 83.3, 100
//! ```

use std::iter::successors;

use chrono::{Days, NaiveDate};
use schedboard_core::{CurvePoint, ProgressCurve, Task};
use tracing::debug;

/// Days in one bucket
const WEEK_DAYS: u64 = 7;

fn dated_spans(tasks: &[Task]) -> Vec<(NaiveDate, NaiveDate)> {
    tasks
        .iter()
        .filter_map(|t| match (t.start, t.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        })
        .collect()
}

/// Build the curve with buckets starting at `project_start`.
///
/// Tasks missing either date are left out. The series is empty when no
/// task ends on or after `project_start`.
pub fn progress_curve(tasks: &[Task], project_start: NaiveDate) -> ProgressCurve {
    let spans = dated_spans(tasks);
    let Some(max_end) = spans.iter().map(|(_, end)| *end).max() else {
        return ProgressCurve::default();
    };

    let buckets: Vec<NaiveDate> = successors(Some(project_start), |d| d.checked_add_days(Days::new(WEEK_DAYS)))
        .take_while(|d| *d <= max_end)
        .collect();
    if buckets.is_empty() {
        return ProgressCurve::default();
    }

    let mut weights = vec![0.0_f64; buckets.len()];
    for (start, end) in spans {
        let touched: Vec<usize> = buckets
            .iter()
            .enumerate()
            .filter(|(_, bucket)| {
                let bucket_end = bucket.checked_add_days(Days::new(WEEK_DAYS - 1)).unwrap_or(NaiveDate::MAX);
                **bucket <= end && bucket_end >= start
            })
            .map(|(idx, _)| idx)
            .collect();
        if touched.is_empty() {
            continue;
        }
        let share = 1.0 / touched.len() as f64;
        for idx in touched {
            weights[idx] += share;
        }
    }

    let mut running = 0.0;
    let cumulative: Vec<f64> = weights
        .iter()
        .map(|w| {
            running += w;
            running
        })
        .collect();

    let last = cumulative.last().copied().unwrap_or(0.0);
    let points = buckets
        .into_iter()
        .zip(cumulative)
        .map(|(period_start, value)| CurvePoint {
            period_start,
            cumulative_percent: if last > 0.0 { value / last * 100.0 } else { value },
        })
        .collect::<Vec<_>>();

    debug!(buckets = points.len(), %project_start, "built progress curve");
    ProgressCurve {
        points,
        marker: None,
    }
}

/// Build the curve starting at the earliest dated task
pub fn progress_curve_from_tasks(tasks: &[Task]) -> ProgressCurve {
    match dated_spans(tasks).iter().map(|(start, _)| *start).min() {
        Some(project_start) => progress_curve(tasks, project_start),
        None => ProgressCurve::default(),
    }
}

/// Duration-weighted mean percent complete, 0-100.
///
/// Tasks without a duration weigh as one day; missing percentages count as 0.
pub fn overall_progress(tasks: &[Task]) -> f64 {
    let (weighted, total) = tasks.iter().fold((0.0, 0.0), |(weighted, total), task| {
        let weight = f64::from(task.duration_days.unwrap_or(1).max(1));
        (
            weighted + weight * task.effective_percent_complete(),
            total + weight,
        )
    });
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn values(curve: &ProgressCurve) -> Vec<f64> {
        curve.points.iter().map(|p| p.cumulative_percent).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn weekly_buckets_cover_start_to_latest_end() {
        let start = date(2024, 4, 1);
        let tasks = vec![Task::new("a").dates(start, date(2024, 4, 22))];
        let curve = progress_curve(&tasks, start);
        let periods: Vec<NaiveDate> = curve.points.iter().map(|p| p.period_start).collect();
        assert_eq!(
            periods,
            vec![date(2024, 4, 1), date(2024, 4, 8), date(2024, 4, 15), date(2024, 4, 22)]
        );
    }

    #[test]
    fn equal_distribution_matches_worked_example() {
        let start = date(2024, 4, 1);
        let tasks = vec![
            // Weeks 1-2
            Task::new("a").dates(date(2024, 4, 1), date(2024, 4, 10)),
            // Weeks 2-4
            Task::new("b").dates(date(2024, 4, 12), date(2024, 4, 25)),
        ];
        let curve = progress_curve(&tasks, start);
        assert_close(
            &values(&curve),
            &[25.0, 50.0 + 100.0 / 6.0, 50.0 + 100.0 / 3.0, 100.0],
        );
    }

    #[test]
    fn final_value_is_exactly_100() {
        let tasks: Vec<Task> = (0..7u32)
            .map(|i| Task::new(format!("t{i}")).dates(date(2024, 1, 1 + i), date(2024, 3, 1 + i)))
            .collect();
        let curve = progress_curve_from_tasks(&tasks);
        assert_eq!(curve.final_percent(), 100.0);
        assert!(values(&curve).windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn undated_tasks_are_ignored() {
        let tasks = vec![
            Task::new("dated").dates(date(2024, 4, 1), date(2024, 4, 3)),
            Task::new("open").start(date(2024, 4, 1)),
            Task::new("blank"),
        ];
        let curve = progress_curve_from_tasks(&tasks);
        assert_close(&values(&curve), &[100.0]);
    }

    #[test]
    fn empty_or_out_of_range_is_empty() {
        assert!(progress_curve_from_tasks(&[]).is_empty());

        let tasks = vec![Task::new("old").dates(date(2023, 1, 1), date(2023, 1, 5))];
        assert!(progress_curve(&tasks, date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn overall_progress_weighted_by_duration() {
        let tasks = vec![
            Task::new("a").duration(20).complete(60.0),
            Task::new("b").duration(15).complete(30.0),
            Task::new("c").duration(10),
        ];
        // (20*60 + 15*30) / 45
        assert!((overall_progress(&tasks) - 1650.0 / 45.0).abs() < 1e-9);
        assert_eq!(overall_progress(&[]), 0.0);
    }

    #[test]
    fn overall_progress_without_durations_is_plain_mean() {
        let tasks = vec![Task::new("a").complete(100.0), Task::new("b").complete(0.0)];
        assert_eq!(overall_progress(&tasks), 50.0);
    }
}
