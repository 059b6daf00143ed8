//! Error types for evaluation and for the `Module::test` API.
//!
//! Most evaluation failures are ordinary: they are reported to the sink
//! and surface as [`EvalError::Reported`], which a test turns into `false`.
//! A circular declaration is the only fatal condition; it unwinds the whole
//! `test` call as [`EvalError::Circular`].
//!
//! Factory functions build the diagnostics for recurring failures so that
//! messages stay identical wherever they are raised.

use jsondl_diagnostic::{Diagnostic, ErrorCode, ErrorGuaranteed};
use thiserror::Error;

/// Result of evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluation failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    /// A declaration was re-entered while being evaluated.
    #[error("circular reference detected while evaluating const '{}'", .0.name)]
    Circular(Circular),

    /// Failure already reported to the diagnostic sink.
    #[error("evaluation failed: {0}")]
    Reported(ErrorGuaranteed),
}

impl EvalError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvalError::Circular(_))
    }
}

impl From<ErrorGuaranteed> for EvalError {
    fn from(guarantee: ErrorGuaranteed) -> Self {
        EvalError::Reported(guarantee)
    }
}

/// Progress of a circular condition through the declarations it unwinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CircularState {
    /// Every declaration boundary passed reports the cycle.
    Propagating,
    /// The origin declaration has been reached; nothing more is reported.
    Reported,
}

/// A detected cycle, tagged with the declaration that was re-entered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circular {
    /// Identity of the re-entered declaration's evaluation state.
    pub origin: usize,
    /// Name of the re-entered declaration.
    pub name: String,
    pub state: CircularState,
}

impl Circular {
    pub fn new(origin: usize, name: impl Into<String>) -> Self {
        Circular {
            origin,
            name: name.into(),
            state: CircularState::Propagating,
        }
    }
}

/// Misuse of the `Module::test` API, or a fatal evaluation condition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TestError {
    #[error("module has no default export")]
    NoDefaultExport,

    #[error("module has no export named '{0}'")]
    UnknownExport(String),

    #[error("module has no declaration #{0}")]
    UnknownDeclaration(usize),

    #[error("declaration '{0}' has no fixed environment")]
    NoFixedEnvironment(String),

    #[error("circular reference detected while evaluating const '{name}'")]
    CircularReference { name: String },
}

/// Failure to assemble the builtin table.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuiltinsError {
    #[error("duplicate builtin '{0}'")]
    Duplicate(String),
}

// Diagnostic factories

#[cold]
pub(crate) fn circular_reference(name: &str) -> Diagnostic {
    Diagnostic::fatal(ErrorCode::E2001).with_message(format!(
        "circular reference detected while evaluating const '{name}'"
    ))
}

#[cold]
pub(crate) fn not_a_pattern(what: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002).with_message(format!("{what} can't be used as pattern"))
}

#[cold]
pub(crate) fn item_outside_array() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2002)
        .with_message("array item pattern used outside an array pattern")
}

#[cold]
pub(crate) fn property_not_found(name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2003).with_message(format!("property '{name}' not found"))
}

#[cold]
pub(crate) fn not_callable() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2004).with_message("expression is not callable")
}

#[cold]
pub(crate) fn arity_mismatch(expected: usize, got: usize) -> Diagnostic {
    let plural = if expected == 1 { "" } else { "s" };
    Diagnostic::error(ErrorCode::E2005).with_message(format!(
        "expected {expected} argument{plural}, got {got}"
    ))
}

#[cold]
pub(crate) fn not_exported(name: &str, specifier: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2006)
        .with_message(format!("'{name}' is not exported by '{specifier}'"))
}

#[cold]
pub(crate) fn this_unavailable() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2007)
        .with_message("'this' is only available inside an object or array pattern")
}

#[cold]
pub(crate) fn module_dropped() -> Diagnostic {
    Diagnostic::error(ErrorCode::E2008)
        .with_message("pattern refers to a module that is no longer loaded")
}

#[cold]
pub(crate) fn undefined(name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1007).with_message(format!("'{name}' is not defined"))
}

#[cold]
pub(crate) fn regex_unavailable() -> Diagnostic {
    Diagnostic::error(ErrorCode::E1005)
        .with_message("regular expression failed to compile and can't be matched")
}
