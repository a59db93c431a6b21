//! Error taxonomy for the compiler middle-end (spec.md §7)
//!
//! One enum per component, each a plain tagged union with a hand-written
//! `Display` — the teacher never reaches for `thiserror`/`anyhow` in its
//! compiler or runtime crates, so neither does this one (see
//! `runtime/src/error.rs`'s thread-local `LAST_ERROR` for the analogous
//! pattern on the runtime side).

use anvil_core::SourceSpan;
use std::fmt;

/// The kind of semantic error a [`SemanticDiagnostic`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    TypeMismatch,
    UndefinedVariable,
    UndefinedFunction,
    UndefinedType,
    InvalidAssignment,
    InvalidOperation,
    InvalidFunctionCall,
    UseBeforeInit,
    Redefinition,
}

impl fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SemanticErrorKind::TypeMismatch => "type mismatch",
            SemanticErrorKind::UndefinedVariable => "undefined variable",
            SemanticErrorKind::UndefinedFunction => "undefined function",
            SemanticErrorKind::UndefinedType => "undefined type",
            SemanticErrorKind::InvalidAssignment => "invalid assignment",
            SemanticErrorKind::InvalidOperation => "invalid operation",
            SemanticErrorKind::InvalidFunctionCall => "invalid function call",
            SemanticErrorKind::UseBeforeInit => "use before initialization",
            SemanticErrorKind::Redefinition => "redefinition",
        };
        write!(f, "{label}")
    }
}

/// A single accumulated checker diagnostic: a span, a kind, and a
/// human-readable message (spec.md §7: "each error adds a diagnostic to the
/// checker's list and the checker continues").
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticDiagnostic {
    pub kind: SemanticErrorKind,
    pub span: SourceSpan,
    pub message: String,
}

impl SemanticDiagnostic {
    pub fn new(kind: SemanticErrorKind, span: SourceSpan, message: impl Into<String>) -> Self {
        SemanticDiagnostic {
            kind,
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for SemanticDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.span, self.message, self.kind)
    }
}

impl std::error::Error for SemanticDiagnostic {}

/// Programmer-error conditions in IR construction (spec.md §7): asserted in
/// debug builds, documented preconditions in release, per the spec's
/// "these are programmer errors" framing.
#[derive(Debug, Clone, PartialEq)]
pub enum IrError {
    InvalidCfg(String),
    DanglingValue(String),
    EmptyTerminatorBlock(String),
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrError::InvalidCfg(msg) => write!(f, "invalid CFG: {msg}"),
            IrError::DanglingValue(msg) => write!(f, "dangling value: {msg}"),
            IrError::EmptyTerminatorBlock(msg) => write!(f, "missing terminator: {msg}"),
        }
    }
}

impl std::error::Error for IrError {}

/// Error surfaced by a single pass's `run_on_module`/`run_on_function`
/// (spec.md §4.E, §9: the manager's contract is `Result<bool, PassError>`).
/// A failing pass never halts the manager; see `crate::pass::PassManager`.
#[derive(Debug, Clone, PartialEq)]
pub struct PassError {
    pub pass_name: String,
    pub message: String,
}

impl PassError {
    pub fn new(pass_name: impl Into<String>, message: impl Into<String>) -> Self {
        PassError {
            pass_name: pass_name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass '{}' failed: {}", self.pass_name, self.message)
    }
}

impl std::error::Error for PassError {}
