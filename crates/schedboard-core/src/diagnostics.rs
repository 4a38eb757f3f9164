//! Diagnostics raised while loading and analysing a schedule
//!
//! Diagnostics are non-fatal findings. Fatal problems (a missing required
//! column, an unreadable workbook) are errors and abort the pass instead.
//!
//! | Code | Severity | Meaning |
//! |------|----------|---------|
//! | E001 | Error    | Required columns missing from the header |
//! | W001 | Warning  | Cells that could not be parsed and were nulled |
//! | W002 | Warning  | Rows whose start date falls after their end date |
//! | I001 | Info     | A derived view has no tasks |

use serde::Serialize;

/// Diagnostic severity, most severe first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable diagnostic codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    E001MissingColumns,
    W001UnparsableCells,
    W002EndBeforeStart,
    I001EmptyView,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::E001MissingColumns => "E001",
            DiagnosticCode::W001UnparsableCells => "W001",
            DiagnosticCode::W002EndBeforeStart => "W002",
            DiagnosticCode::I001EmptyView => "I001",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::E001MissingColumns => Severity::Error,
            DiagnosticCode::W001UnparsableCells | DiagnosticCode::W002EndBeforeStart => {
                Severity::Warning
            }
            DiagnosticCode::I001EmptyView => Severity::Info,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    /// Source column the finding refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Affected source rows (1-based, header is row 1)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<usize>,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic with the code's default severity
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            column: None,
            rows: Vec::new(),
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

/// Sink for diagnostics
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: Diagnostic);

    fn emit_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>)
    where
        Self: Sized,
    {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }
}
