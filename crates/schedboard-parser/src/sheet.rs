//! Raw sheet readers
//!
//! Turns workbook or CSV bytes into a header row plus data rows of
//! [`RawCell`]s. Only the first worksheet of a workbook is read.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::cells::{excel_serial_to_date, RawCell};
use crate::LoadError;

/// Header plus rows, before any field coercion
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
    /// Blank sheet rows above the header row
    pub leading_rows: usize,
}

impl RawTable {
    /// Index of the header matching `name` (trimmed, case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }

    /// Cell at (`row`, `col`), `Empty` when the row is short
    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        const EMPTY: &RawCell = &RawCell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }
}

fn data_to_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::Error(e) => RawCell::Invalid(e.to_string()),
        Data::String(s) => RawCell::text(s),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(RawCell::Date)
            .unwrap_or_else(|| RawCell::Invalid(dt.as_f64().to_string())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(RawCell::Date)
            .unwrap_or_else(|| RawCell::text(s)),
        Data::DurationIso(s) => RawCell::text(s),
    }
}

/// Read the first worksheet of an XLSX/XLS/ODS workbook
pub fn read_workbook(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::EmptyWorkbook)?
        .map_err(|e| LoadError::Workbook(e.to_string()))?;

    // The range starts at the first used cell, not at A1
    let leading_rows = range.start().map_or(0, |(row, _)| row as usize);

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|d| data_to_cell(d).as_text().unwrap_or_default())
            .collect(),
        None => return Err(LoadError::EmptyWorkbook),
    };

    let rows: Vec<Vec<RawCell>> = rows
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();

    debug!(
        columns = headers.len(),
        rows = rows.len(),
        leading_rows,
        "read workbook sheet"
    );
    Ok(RawTable {
        headers,
        rows,
        leading_rows,
    })
}

/// Pick `;` when the header line has more semicolons than commas
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Read delimited text (UTF-8, comma or semicolon separated)
pub fn read_csv(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::EmptyWorkbook);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(RawCell::text).collect());
    }

    debug!(columns = headers.len(), rows = rows.len(), "read delimited sheet");
    Ok(RawTable {
        headers,
        rows,
        leading_rows: 0,
    })
}
