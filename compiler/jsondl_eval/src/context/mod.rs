//! Per-call execution state.
//!
//! An [`ExecutionContext`] lives for one `Module::test` call. It carries the
//! current environment, the subject of `this`, the data path used to locate
//! diagnostics, the transaction stack and the diagnostic sink.
//!
//! Transactions are opened through [`ExecutionContext::begin`], which returns
//! a [`TransactionGuard`]. The guard derefs to the context; dropping it
//! without calling [`TransactionGuard::commit`] rolls the frame back, so an
//! early return or a propagated error always unwinds it.

mod guard;
mod path;

use std::rc::Rc;

use jsondl_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use jsondl_ir::JsonValue;
use smallvec::SmallVec;

use crate::environment::Env;
use crate::transaction::{Transaction, TransactionalSet};
use crate::{EvalError, EvalResult, Value};

pub use guard::TransactionGuard;
pub use path::PathSegment;

/// State of one evaluation run.
pub struct ExecutionContext<'d> {
    env: Env,
    subject: Option<JsonValue>,
    path: SmallVec<[PathSegment; 8]>,
    /// Never empty: index 0 is the base frame.
    transactions: Vec<Transaction>,
    diagnostics: &'d mut DiagnosticSink,
}

impl<'d> ExecutionContext<'d> {
    pub fn new(env: Env, diagnostics: &'d mut DiagnosticSink) -> Self {
        ExecutionContext {
            env,
            subject: None,
            path: SmallVec::new(),
            transactions: vec![Transaction::default()],
            diagnostics,
        }
    }

    // Environment

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Run `f` in `env`, restoring the previous environment afterwards.
    pub fn with_env<R>(&mut self, env: Env, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.env, env);
        let result = f(self);
        self.env = saved;
        result
    }

    /// Value currently matched by the innermost object or array pattern.
    pub fn subject(&self) -> Option<&JsonValue> {
        self.subject.as_ref()
    }

    /// Run `f` with `subject` as the value of `this`.
    pub fn with_subject<R>(&mut self, subject: JsonValue, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.subject.replace(subject);
        let result = f(self);
        self.subject = saved;
        result
    }

    // Data path

    pub fn push_path(&mut self, segment: PathSegment) {
        self.path.push(segment);
    }

    pub fn pop_path(&mut self) {
        self.path.pop();
    }

    /// Run `f` with `segment` appended to the data path.
    pub fn with_path<R>(&mut self, segment: PathSegment, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    /// Current data path, e.g. `$.items[2].name`.
    pub fn path(&self) -> String {
        path::render(&self.path)
    }

    // Transactions

    /// Open a child frame; it tracks property names iff the parent does.
    pub fn begin(&mut self) -> TransactionGuard<'_, 'd> {
        let track = self.top().match_set.is_some();
        self.push_transaction(track)
    }

    /// Open a child frame that tracks matched property names.
    pub fn begin_with_match_set(&mut self) -> TransactionGuard<'_, 'd> {
        self.push_transaction(true)
    }

    /// Open a child frame with name tracking suspended.
    pub fn begin_without_match_set(&mut self) -> TransactionGuard<'_, 'd> {
        self.push_transaction(false)
    }

    fn push_transaction(&mut self, track_names: bool) -> TransactionGuard<'_, 'd> {
        let child = self.top().child(track_names);
        self.transactions.push(child);
        TransactionGuard::new(self)
    }

    /// Number of open frames above the base frame.
    pub fn depth(&self) -> usize {
        self.transactions.len() - 1
    }

    fn top(&self) -> &Transaction {
        &self.transactions[self.transactions.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Transaction {
        let last = self.transactions.len() - 1;
        &mut self.transactions[last]
    }

    pub(crate) fn commit_transaction(&mut self) {
        let depth = self.depth();
        if depth == 0 {
            return;
        }
        if let Some(child) = self.transactions.pop() {
            self.top_mut().absorb(child, depth);
        }
    }

    pub(crate) fn rollback_transaction(&mut self) {
        let depth = self.depth();
        if depth == 0 {
            return;
        }
        if let Some(frame) = self.transactions.pop() {
            frame.discard(depth);
        }
    }

    /// Record a matched property name in the current frame.
    pub fn record_match(&mut self, name: &str) {
        if let Some(names) = &mut self.top_mut().match_set {
            names.insert(name.to_owned());
        }
    }

    /// Names matched in the current frame, if tracking is active.
    pub fn matched_names(&self) -> Option<impl Iterator<Item = &str>> {
        self.top()
            .match_set
            .as_ref()
            .map(|names| names.iter().map(String::as_str))
    }

    pub fn array_match_limit(&self) -> usize {
        self.top().array_match_limit
    }

    /// Raise the current frame's array match limit to at least `limit`.
    pub fn raise_array_match_limit(&mut self, limit: usize) {
        let top = self.top_mut();
        top.array_match_limit = top.array_match_limit.max(limit);
    }

    // Transactional sets

    /// Insert `value` into `set` within the current frame.
    ///
    /// Returns `false` if the value was already present.
    pub fn set_insert(&mut self, set: &Rc<TransactionalSet>, value: &JsonValue) -> bool {
        let (inserted, opened) = set.insert_at(value, self.depth());
        if opened {
            self.top_mut().modified_sets.push(Rc::clone(set));
        }
        inserted
    }

    // Matching

    /// Test a value against a candidate, e.g. a native's pattern argument.
    pub fn test(&mut self, pattern: &Value, candidate: &JsonValue) -> EvalResult<bool> {
        crate::exec::test_value(self, pattern, candidate)
    }

    // Diagnostics

    pub fn diagnostics(&self) -> &DiagnosticSink {
        self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    /// Push `diag` with the current data path attached.
    pub fn report(&mut self, diag: Diagnostic) {
        let diag = diag.with_path(self.path());
        self.diagnostics.push(diag);
    }

    /// Report `diag` as an error and return it as an evaluation failure.
    #[cold]
    pub fn fail(&mut self, diag: Diagnostic) -> EvalError {
        let diag = diag.with_path(self.path());
        EvalError::Reported(self.diagnostics.push_error(diag))
    }

    pub fn report_info(&mut self, message: impl Into<String>) {
        self.report(Diagnostic::info().with_message(message));
    }

    pub fn report_warning(&mut self, message: impl Into<String>) {
        self.report(Diagnostic::warning().with_message(message));
    }

    /// Report an error from a native predicate.
    pub fn report_error(&mut self, message: impl Into<String>) -> EvalError {
        self.fail(Diagnostic::error(ErrorCode::E3001).with_message(message))
    }
}
