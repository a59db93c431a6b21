//! Type universe for the Anvil source language (spec.md §3)
//!
//! The checker interns every [`Type`] it produces so two structurally equal
//! types compare equal cheaply and so later passes can key maps on a type's
//! identity. `Custom` types are nominal (compared by name only); every other
//! variant compares structurally.

use std::collections::HashMap;
use std::fmt;

/// A field in a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldInfo {
    pub name: String,
    pub ty: Type,
}

/// The closed type universe (spec.md §3). `Error` is a sentinel absorbed by
/// every compatibility check, so one mistake never cascades into a storm of
/// follow-on diagnostics (spec.md §7).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    Int,
    Float,
    String,
    Array(Box<Type>),
    Struct {
        name: String,
        fields: Vec<FieldInfo>,
    },
    Function {
        params: Vec<Type>,
        returns: Box<Type>,
    },
    /// A user-defined nominal type referenced by name (e.g. an enum or a
    /// type alias that never got structurally resolved). Equality is by
    /// name alone, per spec.md §3.
    Custom(String),
    /// Sentinel absorbed by any expected type; see [`Type::compat`].
    Error,
}

impl Type {
    /// `compat(expected, actual)` from spec.md §4.C: true if `actual` is
    /// `Error`, or if the two types are equal.
    pub fn compat(expected: &Type, actual: &Type) -> bool {
        matches!(actual, Type::Error) || expected == actual
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Array(elem) => write!(f, "[]{elem}"),
            Type::Struct { name, .. } => write!(f, "struct {name}"),
            Type::Function { params, returns } => {
                write!(f, "func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") {returns}")
            }
            Type::Custom(name) => write!(f, "{name}"),
            Type::Error => write!(f, "<error>"),
        }
    }
}

/// Interns [`Type`] values so the checker can share a single allocation for
/// repeated structurally-equal types (e.g. `Int` appears constantly).
///
/// This is a thin convenience over a `HashMap`; interning does not change
/// equality semantics (still derived structurally, nominally for `Custom`),
/// it only avoids re-allocating `Box`/`Vec` payloads for common shapes.
#[derive(Debug, Default)]
pub struct TypeInterner {
    cache: HashMap<Type, Type>,
}

impl TypeInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `ty`, returning the canonical, previously-interned copy if an
    /// equal one already exists.
    pub fn intern(&mut self, ty: Type) -> Type {
        if let Some(existing) = self.cache.get(&ty) {
            return existing.clone();
        }
        self.cache.insert(ty.clone(), ty.clone());
        ty
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_is_compatible_with_anything() {
        assert!(Type::compat(&Type::Int, &Type::Error));
        assert!(Type::compat(&Type::String, &Type::Error));
    }

    #[test]
    fn equal_types_are_compatible() {
        assert!(Type::compat(&Type::Int, &Type::Int));
        assert!(!Type::compat(&Type::Int, &Type::Float));
    }

    #[test]
    fn custom_types_are_nominal() {
        let a = Type::Custom("Widget".to_string());
        let b = Type::Custom("Widget".to_string());
        let c = Type::Custom("Gadget".to_string());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn struct_types_are_structural() {
        let a = Type::Struct {
            name: "Point".to_string(),
            fields: vec![FieldInfo {
                name: "x".to_string(),
                ty: Type::Int,
            }],
        };
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn interner_returns_shared_copy_for_equal_types() {
        let mut interner = TypeInterner::new();
        let a = interner.intern(Type::Int);
        let b = interner.intern(Type::Int);
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn interner_grows_for_distinct_types() {
        let mut interner = TypeInterner::new();
        interner.intern(Type::Int);
        interner.intern(Type::Float);
        interner.intern(Type::Custom("Foo".to_string()));
        assert_eq!(interner.len(), 3);
    }
}
