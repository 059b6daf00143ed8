//! Error codes for all diagnostics.
//!
//! Format: E#### where the first digit indicates the phase:
//! - E1xxx: Binder errors
//! - E2xxx: Evaluation errors
//! - E3xxx: Reports from native predicates

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Binder Errors (E1xxx)
    /// Identifier bound twice in the same scope
    E1001,
    /// Export id registered twice
    E1002,
    /// Module without any export
    E1003,
    /// Regular expression flag other than `i`
    E1004,
    /// Regular expression failed to compile
    E1005,
    /// Import specifier could not be resolved
    E1006,
    /// Reference to an identifier that is not in scope
    E1007,

    // Evaluation Errors (E2xxx)
    /// Circular reference between declarations
    E2001,
    /// Value used as a pattern but cannot match anything
    E2002,
    /// Member access on a missing property
    E2003,
    /// Call of a value that is not callable
    E2004,
    /// Wrong number of arguments
    E2005,
    /// Named import of an id the module does not export
    E2006,
    /// `this` evaluated outside an object or array pattern
    E2007,
    /// Pattern evaluated after its module was dropped
    E2008,

    // Native Predicate Reports (E3xxx)
    /// Message reported by a native predicate
    E3001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E3001 => "E3001",
        }
    }

    /// Check if this is a binder error.
    pub fn is_bind_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is an evaluation error.
    pub fn is_eval_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
