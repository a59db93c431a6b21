//! Anvil Core: shared primitives for the Anvil compiler middle-end and runtime
//!
//! This crate provides the small set of types both `anvil-compiler` and
//! `anvil-runtime` need but that belong to neither: source spans for
//! diagnostics, and a lightweight diagnostic sink used by the pass manager's
//! and the scheduler's verbose modes.
//!
//! # Modules
//!
//! - `span`: source positions and spans attached to AST/IR nodes.
//! - `diagnostic`: `Diagnostic` records and the `DiagnosticSink` trait.

pub mod diagnostic;
pub mod span;

pub use diagnostic::{CapturingSink, Diagnostic, DiagnosticSink, StderrSink};
pub use span::{Position, SourceSpan};
