//! Cell values and field coercion
//!
//! Every coercion returns `None` for input it cannot read. Callers decide
//! whether a `None` from a non-empty cell is worth a warning.

use chrono::{Days, NaiveDate};

/// A spreadsheet cell, reduced to the shapes the loader cares about
#[derive(Clone, Debug, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// A value the spreadsheet holds but no coercion can use: formula errors
    /// (`#N/A`, `#REF!`) or date serials outside the calendar
    Invalid(String),
}

impl RawCell {
    /// Build a text cell; blank text becomes `Empty`
    pub fn text(value: impl AsRef<str>) -> Self {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawCell::Empty)
    }

    /// Cell contents as display text, `None` when empty
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Text(s) => Some(s.clone()),
            RawCell::Number(n) => Some(n.to_string()),
            RawCell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            RawCell::Invalid(raw) => Some(raw.clone()),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, RawCell::Invalid(_))
    }
}

/// First run of ASCII digits embedded in `text` (`"10 dias"` → 10)
pub fn first_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

/// Duration in days from any cell shape
pub fn parse_duration(cell: &RawCell) -> Option<u32> {
    match cell {
        RawCell::Empty | RawCell::Date(_) | RawCell::Invalid(_) => None,
        RawCell::Text(s) => first_integer(s),
        RawCell::Number(n) => first_integer(&n.to_string()),
    }
}

/// Strip a fixed-width weekday abbreviation (`"sex 05/04/24"` → `"05/04/24"`).
///
/// Only applies when the text starts with a letter; numeric dates pass
/// through untouched.
pub fn strip_weekday_prefix(text: &str, width: usize) -> &str {
    let text = text.trim();
    if width == 0 || !text.chars().next().is_some_and(char::is_alphabetic) {
        return text;
    }
    match text.char_indices().nth(width) {
        Some((idx, _)) => text[idx..].trim(),
        None => "",
    }
}

/// Convert a spreadsheet serial date (1900 date system) to a calendar date
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Serials beyond 9999-12-31 are not dates
    if !serial.is_finite() || serial < 1.0 || serial >= 2_958_466.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

/// Parse a date cell, trying each format in order after stripping any
/// weekday prefix
pub fn parse_date<'a>(
    cell: &RawCell,
    formats: impl IntoIterator<Item = &'a str>,
    weekday_prefix_width: usize,
) -> Option<NaiveDate> {
    match cell {
        RawCell::Empty | RawCell::Invalid(_) => None,
        RawCell::Date(d) => Some(*d),
        RawCell::Number(n) => excel_serial_to_date(*n),
        RawCell::Text(s) => {
            let text = strip_weekday_prefix(s, weekday_prefix_width);
            if text.is_empty() {
                return None;
            }
            formats
                .into_iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        }
    }
}

/// Parse a percent-complete cell as a raw number on its source scale.
///
/// Accepts `"45%"`, `"0,45"` and plain numbers. The second value reports
/// whether the text carried a `%` sign.
pub fn parse_percent(cell: &RawCell) -> Option<(f64, bool)> {
    match cell {
        RawCell::Empty | RawCell::Date(_) | RawCell::Invalid(_) => None,
        RawCell::Number(n) => Some((*n, false)),
        RawCell::Text(s) => {
            let has_sign = s.contains('%');
            let cleaned = s.replace('%', "").replace(',', ".");
            cleaned
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| (v, has_sign))
        }
    }
}

/// Predecessor reference; numeric cells drop the trailing `.0`
pub fn parse_predecessors(cell: &RawCell) -> Option<String> {
    match cell {
        RawCell::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
        RawCell::Invalid(_) => None,
        other => other.as_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    const FORMATS: [&str; 2] = ["%d/%m/%y", "%Y-%m-%d"];

    #[test]
    fn first_integer_skips_surrounding_text() {
        assert_eq!(first_integer("10 dias"), Some(10));
        assert_eq!(first_integer("approx. 3d"), Some(3));
        assert_eq!(first_integer("12 a 15 dias"), Some(12));
        assert_eq!(first_integer("sem prazo"), None);
        assert_eq!(first_integer(""), None);
    }

    #[test]
    fn duration_from_numeric_cell() {
        assert_eq!(parse_duration(&RawCell::Number(10.0)), Some(10));
        assert_eq!(parse_duration(&RawCell::Number(7.5)), Some(7));
        assert_eq!(parse_duration(&RawCell::text("5 dias")), Some(5));
        assert_eq!(parse_duration(&RawCell::Empty), None);
    }

    #[test]
    fn weekday_prefix_is_stripped() {
        assert_eq!(strip_weekday_prefix("seg 01/04/24", 4), "01/04/24");
        assert_eq!(strip_weekday_prefix("sáb 06/04/24", 4), "06/04/24");
        assert_eq!(strip_weekday_prefix("01/04/24", 4), "01/04/24");
        assert_eq!(strip_weekday_prefix("  seg 01/04/24  ", 4), "01/04/24");
        assert_eq!(strip_weekday_prefix("seg", 4), "");
        assert_eq!(strip_weekday_prefix("seg 01/04/24", 0), "seg 01/04/24");
    }

    #[test]
    fn parse_date_with_prefix_and_fallback() {
        assert_eq!(
            parse_date(&RawCell::text("seg 01/04/24"), FORMATS, 4),
            Some(date(2024, 4, 1))
        );
        assert_eq!(
            parse_date(&RawCell::text("2024-04-01"), FORMATS, 4),
            Some(date(2024, 4, 1))
        );
        assert_eq!(parse_date(&RawCell::text("soon"), FORMATS, 4), None);
        assert_eq!(parse_date(&RawCell::text("31/02/24"), FORMATS, 4), None);
    }

    #[test]
    fn parse_date_from_native_cells() {
        assert_eq!(
            parse_date(&RawCell::Date(date(2024, 4, 1)), FORMATS, 4),
            Some(date(2024, 4, 1))
        );
        // 45383 is 2024-04-01 in the 1900 date system
        assert_eq!(
            parse_date(&RawCell::Number(45383.0), FORMATS, 4),
            Some(date(2024, 4, 1))
        );
        assert_eq!(parse_date(&RawCell::Number(-3.0), FORMATS, 4), None);
    }

    #[test]
    fn percent_variants() {
        assert_eq!(parse_percent(&RawCell::Number(0.5)), Some((0.5, false)));
        assert_eq!(parse_percent(&RawCell::text("45%")), Some((45.0, true)));
        assert_eq!(parse_percent(&RawCell::text("0,25")), Some((0.25, false)));
        assert_eq!(parse_percent(&RawCell::text("n/a")), None);
    }

    #[test]
    fn invalid_cells_never_coerce() {
        let na = RawCell::Invalid("#N/A".into());
        assert!(!na.is_empty());
        assert_eq!(parse_date(&na, FORMATS, 4), None);
        assert_eq!(parse_duration(&na), None);
        assert_eq!(parse_percent(&na), None);
        assert_eq!(parse_predecessors(&na), None);
        assert_eq!(na.as_text().as_deref(), Some("#N/A"));
    }

    #[test]
    fn predecessors_drop_float_suffix() {
        assert_eq!(parse_predecessors(&RawCell::Number(4.0)), Some("4".into()));
        assert_eq!(parse_predecessors(&RawCell::text("2;3")), Some("2;3".into()));
        assert_eq!(parse_predecessors(&RawCell::text("   ")), None);
    }
}
