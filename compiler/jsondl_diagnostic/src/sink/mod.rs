//! Accumulating diagnostic sink.
//!
//! The sink keeps every message in emission order and a sticky error
//! count. Binder runs and `test` calls inspect the count to decide their
//! outcome; callers decide how to print.

use jsondl_ir::Span;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity};

/// Ordered collection of diagnostics with an error counter.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a diagnostic, returning a guarantee if it is an error.
    pub fn push(&mut self, diag: Diagnostic) -> Option<ErrorGuaranteed> {
        let is_error = diag.is_error();
        self.diagnostics.push(diag);
        if is_error {
            self.error_count += 1;
            Some(ErrorGuaranteed::new())
        } else {
            None
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::info().with_message(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warning().with_message(message));
    }

    pub fn error(&mut self, code: ErrorCode, message: impl Into<String>) -> ErrorGuaranteed {
        self.push_error(Diagnostic::error(code).with_message(message))
    }

    /// Report an error at a schema location.
    pub fn error_at(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> ErrorGuaranteed {
        self.push_error(Diagnostic::error(code).with_message(message).with_span(span))
    }

    pub fn fatal(&mut self, code: ErrorCode, message: impl Into<String>) -> ErrorGuaranteed {
        self.push_error(Diagnostic::fatal(code).with_message(message))
    }

    /// Push `diag` as an error, whatever severity it was built with.
    pub fn push_error(&mut self, mut diag: Diagnostic) -> ErrorGuaranteed {
        diag.severity = Severity::Error;
        self.diagnostics.push(diag);
        self.error_count += 1;
        ErrorGuaranteed::new()
    }

    /// Sticky flag: true once any error has been pushed.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Messages of all diagnostics, in emission order.
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    /// Copy every diagnostic of `self` to the end of `other`.
    pub fn append_to(&self, other: &mut DiagnosticSink) {
        other.diagnostics.extend(self.diagnostics.iter().cloned());
        other.error_count += self.error_count;
    }

    /// Move every diagnostic of `other` to the end of `self`.
    pub fn merge(&mut self, other: DiagnosticSink) {
        self.diagnostics.extend(other.diagnostics);
        self.error_count += other.error_count;
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl<'a> IntoIterator for &'a DiagnosticSink {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
