//! AST, type checker, SSA-like IR, and optimization pass manager for the
//! Anvil systems language (spec.md §3-§4).
//!
//! Pipeline: a parser (out of scope here) hands this crate an owning
//! [`ast::Program`]; [`checker::TypeChecker`] validates it against
//! [`symtab::SymbolTable`] and [`types::Type`]; a lowering stage (driven
//! through [`ir::IRBuilder`], also out of scope — it is the back-end's job
//! to decide how source constructs become instructions) produces an
//! [`ir::Module`]; [`pass::PassManager`] runs [`passes::ConstantFoldingPass`]
//! and [`passes::DeadCodeEliminationPass`] over it.

pub mod ast;
pub mod checker;
pub mod error;
pub mod ir;
pub mod pass;
pub mod passes;
pub mod symtab;
pub mod types;

pub use checker::TypeChecker;
pub use error::{IrError, PassError, SemanticDiagnostic, SemanticErrorKind};
pub use pass::{OptimizationLevel, Pass, PassManager, PassManagerConfig};
pub use symtab::{Symbol, SymbolKind, SymbolTable};
pub use types::{Type, TypeInterner};
