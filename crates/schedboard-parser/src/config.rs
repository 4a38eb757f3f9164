//! Loader configuration
//!
//! Column names, date formats and the percent scale differ between schedule
//! exports, so all of them are configurable. Every field has a default and
//! the whole struct deserializes from a TOML `[loader]` table.

use schedboard_core::PercentScale;
use serde::{Deserialize, Serialize};

/// Header names for each task field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub name: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub predecessors: String,
    pub percent_complete: String,
    pub status: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            start: "Start".into(),
            end: "End".into(),
            duration: "Duration".into(),
            predecessors: "Predecessors".into(),
            percent_complete: "PercentComplete".into(),
            status: "Status".into(),
        }
    }
}

impl ColumnMapping {
    /// Columns that must be present before any row is parsed
    pub fn required(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.start.as_str(),
            self.end.as_str(),
            self.duration.as_str(),
        ]
    }
}

/// How a schedule sheet is read and normalized
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub columns: ColumnMapping,
    /// Primary `chrono` format for date text
    pub date_format: String,
    /// Formats tried in order when the primary one fails
    pub fallback_date_formats: Vec<String>,
    /// Width in characters of the weekday abbreviation some exports prefix
    /// to dates (`"seg 01/04/24"`); stripped only when the text starts with a
    /// letter
    pub weekday_prefix_width: usize,
    pub percent_scale: PercentScale,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            date_format: "%d/%m/%y".into(),
            fallback_date_formats: vec!["%Y-%m-%d".into(), "%d/%m/%Y".into()],
            weekday_prefix_width: 4,
            percent_scale: PercentScale::Auto,
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the column mapping
    pub fn columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    /// Override the primary date format
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Override the percent scale
    pub fn percent_scale(mut self, scale: PercentScale) -> Self {
        self.percent_scale = scale;
        self
    }

    /// Override the weekday prefix width
    pub fn weekday_prefix_width(mut self, width: usize) -> Self {
        self.weekday_prefix_width = width;
        self
    }

    /// Primary format followed by the fallbacks
    pub fn date_formats(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.date_format.as_str())
            .chain(self.fallback_date_formats.iter().map(String::as_str))
    }
}
