//! A small, allocation-light diagnostic sink.
//!
//! The pass manager (verbose mode, spec §4.E) and the work-distribution
//! scheduler (verbose mode, spec §4.H/§7) both need to print single-line
//! progress to a configurable destination without pulling in a full tracing
//! subscriber. This mirrors the teacher's `runtime::diagnostics` module,
//! which writes straight to `stderr` rather than going through `tracing`.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// Destination for verbose/progress output emitted by passes and the
/// scheduler. Implementations must be cheap to call on a hot path.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, message: &str);
}

/// Writes every message as a line to stderr. The default sink used when no
/// other sink is configured.
#[derive(Debug, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, message: &str) {
        let mut out = std::io::stderr().lock();
        let _ = writeln!(out, "{message}");
    }
}

/// Collects messages in memory instead of printing them; used by tests that
/// want to assert on verbose output without capturing process stderr.
#[derive(Debug, Default)]
pub struct CapturingSink {
    lines: Mutex<Vec<String>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("CapturingSink mutex poisoned").clone()
    }
}

impl DiagnosticSink for CapturingSink {
    fn emit(&self, message: &str) {
        self.lines
            .lock()
            .expect("CapturingSink mutex poisoned")
            .push(message.to_string());
    }
}

/// A single accumulated diagnostic: a message tied to a source span.
///
/// Used by the type checker (spec §4.C) to accumulate errors without
/// aborting analysis, and by the pass manager to report pass failures.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub span: Option<crate::span::SourceSpan>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(span: Option<crate::span::SourceSpan>, message: impl Into<String>) -> Self {
        Diagnostic {
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some(span) => write!(f, "{span}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
