//! Lexically scoped symbol table (spec.md §4.B)
//!
//! Implemented as a stack of hash maps, one per scope level — the simpler
//! of the two designs spec.md's DESIGN NOTES allows. `lookup` walks the
//! stack innermost-to-outermost; `leave_scope` pops the top map outright, so
//! everything defined at that level is destroyed and outer names are
//! visible again (shadowing, not hiding, while the inner scope was open).

use crate::types::Type;
use anvil_core::SourceSpan;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Constant,
    Function,
    Type,
    Package,
    Import,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    pub scope_level: usize,
    pub is_initialized: bool,
    /// Span of the node that introduced this symbol, kept for diagnostics
    /// (spec.md §4.B's `defining_node`).
    pub defining_span: SourceSpan,
}

/// Returned by [`SymbolTable::define`] when a name already exists at the
/// *current* scope level. Outer-scope names may be shadowed silently; only
/// an exact-level collision is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct RedefinitionError {
    pub name: String,
    pub previous_span: SourceSpan,
    pub new_span: SourceSpan,
}

impl fmt::Display for RedefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is already defined in this scope (previous definition at {}, redefined at {})",
            self.name, self.previous_span, self.new_span
        )
    }
}

impl std::error::Error for RedefinitionError {}

pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    /// A fresh table with a single (global) scope open.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![HashMap::new()],
        }
    }

    /// Current scope depth; the global scope is level 0.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope, destroying every symbol defined at that
    /// exact level. Panics if called with only the global scope open — a
    /// programmer error, not a user-facing one.
    pub fn leave_scope(&mut self) {
        assert!(
            self.scopes.len() > 1,
            "leave_scope called with no scope to leave (global scope is never left)"
        );
        self.scopes.pop();
    }

    /// Define `name` at the current scope level. Fails only when a symbol
    /// with the same name already exists *at this exact level*; a same-named
    /// symbol in an outer scope is shadowed silently.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        kind: SymbolKind,
        ty: Type,
        is_initialized: bool,
        defining_span: SourceSpan,
    ) -> Result<Symbol, RedefinitionError> {
        let name = name.into();
        let level = self.depth();
        let current = self.scopes.last_mut().expect("at least one scope is always open");

        if let Some(existing) = current.get(&name) {
            return Err(RedefinitionError {
                name,
                previous_span: existing.defining_span,
                new_span: defining_span,
            });
        }

        let symbol = Symbol {
            name: name.clone(),
            kind,
            ty,
            scope_level: level,
            is_initialized,
            defining_span,
        };
        current.insert(name, symbol.clone());
        Ok(symbol)
    }

    /// Walk scopes from innermost to outermost looking for `name`.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Mark a previously-defined variable as initialized (used once an
    /// assignment's right-hand side has been checked).
    pub fn mark_initialized(&mut self, name: &str) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(symbol) = scope.get_mut(name) {
                symbol.is_initialized = true;
                return;
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_core::Position;

    fn span(line: u32) -> SourceSpan {
        SourceSpan::point(Position::new(line, 1))
    }

    #[test]
    fn define_then_lookup_succeeds() {
        let mut table = SymbolTable::new();
        table
            .define("x", SymbolKind::Variable, Type::Int, true, span(1))
            .unwrap();
        let sym = table.lookup("x").unwrap();
        assert_eq!(sym.ty, Type::Int);
        assert_eq!(sym.scope_level, 0);
    }

    #[test]
    fn redefinition_at_same_level_is_an_error() {
        let mut table = SymbolTable::new();
        table
            .define("x", SymbolKind::Variable, Type::Int, true, span(1))
            .unwrap();
        let err = table
            .define("x", SymbolKind::Variable, Type::String, true, span(2))
            .unwrap_err();
        assert_eq!(err.name, "x");
    }

    #[test]
    fn shadowing_an_outer_scope_is_allowed() {
        let mut table = SymbolTable::new();
        table
            .define("x", SymbolKind::Variable, Type::Int, true, span(1))
            .unwrap();
        table.enter_scope();
        table
            .define("x", SymbolKind::Variable, Type::String, true, span(2))
            .expect("shadowing an outer-scope name must succeed");
        assert_eq!(table.lookup("x").unwrap().ty, Type::String);
        table.leave_scope();
        assert_eq!(table.lookup("x").unwrap().ty, Type::Int);
    }

    #[test]
    fn leave_scope_destroys_inner_symbols() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table
            .define("inner", SymbolKind::Variable, Type::Bool, true, span(1))
            .unwrap();
        assert!(table.lookup("inner").is_some());
        table.leave_scope();
        assert!(table.lookup("inner").is_none());
    }

    #[test]
    fn lookup_walks_innermost_to_outermost() {
        let mut table = SymbolTable::new();
        table
            .define("a", SymbolKind::Constant, Type::Int, true, span(1))
            .unwrap();
        table.enter_scope();
        table.enter_scope();
        assert_eq!(table.lookup("a").unwrap().scope_level, 0);
    }

    #[test]
    fn lookup_missing_name_returns_none() {
        let table = SymbolTable::new();
        assert!(table.lookup("missing").is_none());
    }

    #[test]
    #[should_panic(expected = "leave_scope called with no scope to leave")]
    fn leaving_the_global_scope_panics() {
        let mut table = SymbolTable::new();
        table.leave_scope();
    }

    #[test]
    fn mark_initialized_updates_existing_symbol() {
        let mut table = SymbolTable::new();
        table
            .define("x", SymbolKind::Variable, Type::Int, false, span(1))
            .unwrap();
        assert!(!table.lookup("x").unwrap().is_initialized);
        table.mark_initialized("x");
        assert!(table.lookup("x").unwrap().is_initialized);
    }
}
