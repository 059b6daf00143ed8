//! Core diagnostic types.

use jsondl_ir::Span;
use std::fmt;

use crate::ErrorCode;

/// Severity level for diagnostics.
///
/// Only `Error` affects the outcome of a binding run or a `test` call.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single reported message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be pushed to a sink, not silently dropped"]
pub struct Diagnostic {
    /// Error code, absent for free-form info and warnings.
    pub code: Option<ErrorCode>,
    pub severity: Severity,
    pub message: String,
    /// Location in the schema source.
    pub span: Option<Span>,
    /// Location in the validated value, e.g. `$.items[2].name`.
    pub path: Option<String>,
    /// Set for errors that aborted the whole run.
    pub fatal: bool,
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: Option<ErrorCode>, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            span: None,
            path: None,
            fatal: false,
            notes: Vec::new(),
        }
    }

    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(Some(code), Severity::Error)
    }

    /// Error diagnostic flagged as fatal.
    #[cold]
    pub fn fatal(code: ErrorCode) -> Self {
        Diagnostic {
            fatal: true,
            ..Self::error(code)
        }
    }

    pub fn warning() -> Self {
        Self::new_with_severity(None, Severity::Warning)
    }

    pub fn info() -> Self {
        Self::new_with_severity(None, Severity::Info)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (at {path})")?;
        }
        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }
        Ok(())
    }
}
