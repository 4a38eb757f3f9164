//! # schedboard-parser
//!
//! Loader and normalizer for task schedules exported as spreadsheets.
//!
//! This crate provides:
//! - Workbook (XLSX/XLS/ODS) and CSV readers
//! - Configurable column mapping, date formats and percent scale
//! - Normalization of free-text durations and prefixed dates into task records
//!
//! ## Example
//!
//! ```rust
//! use schedboard_parser::{load_bytes, LoaderConfig};
//!
//! let csv = "Name,Start,End,Duration\nExcavation,seg 01/04/24,sex 05/04/24,5 dias\n";
//! let table = load_bytes(csv.as_bytes(), &LoaderConfig::default()).unwrap();
//!
//! assert_eq!(table.tasks.len(), 1);
//! assert_eq!(table.tasks[0].duration_days, Some(5));
//! ```

pub mod cells;
pub mod config;
pub mod normalize;
pub mod sheet;

pub use config::{ColumnMapping, LoaderConfig};
pub use normalize::normalize;

use schedboard_core::ScheduleTable;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Loading error. Any of these aborts the current pass.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("the sheet has no header row")]
    EmptyWorkbook,
}

/// Supported input containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Zip-based workbook (XLSX, ODS)
    Workbook,
    /// Legacy compound-document workbook (XLS)
    LegacyWorkbook,
    /// Delimited text
    Csv,
}

/// Detect the container from its leading bytes
pub fn detect_format(bytes: &[u8]) -> FileFormat {
    if bytes.starts_with(b"PK\x03\x04") {
        FileFormat::Workbook
    } else if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        FileFormat::LegacyWorkbook
    } else {
        FileFormat::Csv
    }
}

/// Load and normalize a schedule from in-memory bytes
pub fn load_bytes(bytes: &[u8], config: &LoaderConfig) -> Result<ScheduleTable, LoadError> {
    let format = detect_format(bytes);
    let raw = match format {
        FileFormat::Workbook | FileFormat::LegacyWorkbook => sheet::read_workbook(bytes)?,
        FileFormat::Csv => sheet::read_csv(bytes)?,
    };
    let table = normalize(&raw, config)?;
    info!(
        format = ?format,
        tasks = table.tasks.len(),
        warnings = table.warning_count(),
        "loaded schedule"
    );
    Ok(table)
}

/// Load and normalize a schedule file
pub fn load_file(path: &Path, config: &LoaderConfig) -> Result<ScheduleTable, LoadError> {
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes, config)
}
