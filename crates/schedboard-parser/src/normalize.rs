//! Row normalization
//!
//! Maps a [`RawTable`] onto task records. The schema check runs before any
//! cell is coerced; after that, bad cells are nulled and counted instead of
//! failing the load.

use std::collections::BTreeMap;

use schedboard_core::{Diagnostic, DiagnosticCode, PercentScale, ScheduleTable, Task};
use tracing::{debug, info, warn};

use crate::cells::{parse_date, parse_duration, parse_percent, parse_predecessors, RawCell};
use crate::sheet::RawTable;
use crate::{LoadError, LoaderConfig};

/// Data rows start on sheet row 2
const FIRST_DATA_ROW: usize = 2;

/// Resolved column positions
struct Columns {
    name: usize,
    start: usize,
    end: usize,
    duration: usize,
    predecessors: Option<usize>,
    percent: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn resolve(table: &RawTable, config: &LoaderConfig) -> Result<Self, LoadError> {
        let mapping = &config.columns;
        let missing: Vec<String> = mapping
            .required()
            .iter()
            .filter(|name| table.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(LoadError::Schema { missing });
        }

        // Presence was checked above
        let index = |name: &str| table.column_index(name).unwrap_or_default();
        Ok(Self {
            name: index(&mapping.name),
            start: index(&mapping.start),
            end: index(&mapping.end),
            duration: index(&mapping.duration),
            predecessors: table.column_index(&mapping.predecessors),
            percent: table.column_index(&mapping.percent_complete),
            status: table.column_index(&mapping.status),
        })
    }

    fn mapped(&self) -> Vec<usize> {
        let mut cols = vec![self.name, self.start, self.end, self.duration];
        cols.extend(self.predecessors);
        cols.extend(self.percent);
        cols.extend(self.status);
        cols
    }
}

/// Rows with unreadable cells, keyed by configured column name
#[derive(Default)]
struct ParseFailures {
    by_column: BTreeMap<String, Vec<usize>>,
}

impl ParseFailures {
    fn record(&mut self, column: &str, row: usize) {
        self.by_column.entry(column.to_string()).or_default().push(row);
    }

    fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.by_column
            .into_iter()
            .map(|(column, rows)| {
                let count = rows.len();
                warn!(column = %column, rows = count, "unparsable cells nulled");
                Diagnostic::new(
                    DiagnosticCode::W001UnparsableCells,
                    format!(
                        "{} row{} with unparsable '{}' values",
                        count,
                        if count == 1 { "" } else { "s" },
                        column
                    ),
                )
                .with_column(column)
                .with_rows(rows)
                .with_hint("the value was left empty; check the column format settings")
            })
            .collect()
    }
}

/// Work out the percent scale from the column contents
fn resolve_scale(table: &RawTable, column: Option<usize>, configured: PercentScale) -> PercentScale {
    let Some(col) = column else {
        return configured.resolve(&[]);
    };
    let parsed: Vec<(f64, bool)> = (0..table.rows.len())
        .filter_map(|row| parse_percent(table.cell(row, col)))
        .collect();

    if configured == PercentScale::Auto && parsed.iter().any(|(_, has_sign)| *has_sign) {
        return PercentScale::Percent;
    }
    let values: Vec<f64> = parsed.into_iter().map(|(v, _)| v).collect();
    let resolved = configured.resolve(&values);
    if configured == PercentScale::Auto && !values.is_empty() {
        info!(scale = ?resolved, values = values.len(), "detected percent-complete scale");
    }
    resolved
}

/// Normalize a raw table into a schedule table
pub fn normalize(table: &RawTable, config: &LoaderConfig) -> Result<ScheduleTable, LoadError> {
    let columns = Columns::resolve(table, config)?;
    let mapping = &config.columns;
    let scale = resolve_scale(table, columns.percent, config.percent_scale);
    let mapped = columns.mapped();

    let mut failures = ParseFailures::default();
    let mut inverted_rows = Vec::new();
    let mut tasks = Vec::with_capacity(table.rows.len());
    let mut source_rows = 0usize;

    for idx in 0..table.rows.len() {
        if mapped.iter().all(|col| table.cell(idx, *col).is_empty()) {
            continue;
        }
        source_rows += 1;
        let row = idx + FIRST_DATA_ROW + table.leading_rows;

        let start_cell = table.cell(idx, columns.start);
        let start = parse_date(start_cell, config.date_formats(), config.weekday_prefix_width);
        if start.is_none() && !start_cell.is_empty() {
            failures.record(&mapping.start, row);
        }

        let end_cell = table.cell(idx, columns.end);
        let end = parse_date(end_cell, config.date_formats(), config.weekday_prefix_width);
        if end.is_none() && !end_cell.is_empty() {
            failures.record(&mapping.end, row);
        }

        let duration_cell = table.cell(idx, columns.duration);
        let duration_days = parse_duration(duration_cell);
        if duration_days.is_none() && !duration_cell.is_empty() {
            failures.record(&mapping.duration, row);
        }

        let predecessors = columns.predecessors.and_then(|col| {
            let cell = table.cell(idx, col);
            if cell.is_invalid() {
                failures.record(&mapping.predecessors, row);
            }
            parse_predecessors(cell)
        });

        let percent_complete = columns.percent.and_then(|col| {
            let cell = table.cell(idx, col);
            let value = parse_percent(cell).map(|(v, _)| scale.to_canonical(v));
            if value.is_none() && !cell.is_empty() {
                failures.record(&mapping.percent_complete, row);
            }
            value
        });

        let task = Task {
            row,
            name: table.cell(idx, columns.name).as_text().unwrap_or_default(),
            start,
            end,
            duration_days,
            predecessors,
            percent_complete,
            status_label: columns
                .status
                .and_then(|col| table.cell(idx, col).as_text()),
        };

        if task.has_inverted_dates() {
            inverted_rows.push(row);
            continue;
        }
        tasks.push(task);
    }

    let mut diagnostics = failures.into_diagnostics();
    if !inverted_rows.is_empty() {
        warn!(rows = inverted_rows.len(), "rows with start after end excluded");
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::W002EndBeforeStart,
                format!(
                    "{} row{} excluded: start date falls after end date",
                    inverted_rows.len(),
                    if inverted_rows.len() == 1 { "" } else { "s" }
                ),
            )
            .with_rows(inverted_rows),
        );
    }

    debug!(
        rows = source_rows,
        tasks = tasks.len(),
        scale = ?scale,
        "normalized schedule"
    );

    Ok(ScheduleTable {
        tasks,
        diagnostics,
        source_rows,
        percent_scale: scale,
    })
}

/// Convenience for tests and callers holding cells directly
pub fn normalize_rows(
    headers: &[&str],
    rows: Vec<Vec<RawCell>>,
    config: &LoaderConfig,
) -> Result<ScheduleTable, LoadError> {
    let table = RawTable {
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows,
        leading_rows: 0,
    };
    normalize(&table, config)
}
