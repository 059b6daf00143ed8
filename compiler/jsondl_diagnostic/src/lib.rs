//! Diagnostic system for the jsondl binder and pattern engine.
//!
//! Binding and matching never print anything themselves. Every semantic
//! problem becomes a [`Diagnostic`] pushed into a [`DiagnosticSink`]:
//! - Error codes for searchability
//! - A message (what went wrong)
//! - An optional source span (where in the schema)
//! - An optional data path (where in the validated value)
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was pushed to a sink.
//!
//! ```text
//! let guarantee = sink.error(ErrorCode::E2003, "property 'x' not found");
//! return Err(EvalError::Reported(guarantee));
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
mod sink;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use sink::DiagnosticSink;
