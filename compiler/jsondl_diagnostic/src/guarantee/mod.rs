//! Proof that an error has been reported.

use std::fmt;

/// Zero-sized proof that at least one error diagnostic was emitted.
///
/// Only [`DiagnosticSink`](crate::DiagnosticSink) hands these out, so a
/// function returning `Err(ErrorGuaranteed)` cannot fail silently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Recover a guarantee from an error count, e.g. after merging sinks.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
