//! Modules: the top-level IR container (spec.md §3, §4.D)

use crate::ir::function::Function;
use crate::types::Type;
use std::fmt;

/// `Module = (name, ordered list of Functions)`. Dropping a module drops
/// every function, block, and value reachable from it — ownership is
/// tree-shaped all the way down, same as the AST it was lowered from.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, name: impl Into<String>) -> &mut Function {
        self.functions.push(Function::new(name, Type::Void));
        self.functions.last_mut().expect("just pushed")
    }

    /// Same as [`Module::add_function`] but with an explicit return type,
    /// for callers that already know it (the IRBuilder, the lowering
    /// pipeline).
    pub fn add_function_with_return(
        &mut self,
        name: impl Into<String>,
        return_type: Type,
    ) -> &mut Function {
        self.functions.push(Function::new(name, return_type));
        self.functions.last_mut().expect("just pushed")
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    pub fn functions_mut(&mut self) -> impl Iterator<Item = &mut Function> {
        self.functions.iter_mut()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for func in &self.functions {
            writeln!(f, "{func}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_function_defaults_to_void_return() {
        let mut module = Module::new("m");
        let func = module.add_function("main");
        assert_eq!(func.return_type, Type::Void);
        assert_eq!(module.function_count(), 1);
    }

    #[test]
    fn function_lookup_by_name() {
        let mut module = Module::new("m");
        module.add_function("helper");
        assert!(module.function("helper").is_some());
        assert!(module.function("missing").is_none());
    }
}
