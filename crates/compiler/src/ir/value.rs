//! SSA-like values (spec.md §3, §4.D)
//!
//! A `Value` is an opaque handle — an index into its owning [`Function`]'s
//! value arena — plus an optional display name. It is `Copy`, cheap to pass
//! around, and carries no lifetime: ownership of the actual slot lives in
//! the function, never in the value itself.
//!
//! [`Function`]: crate::ir::function::Function

use std::fmt;

/// An opaque SSA value handle. Equality and hashing are by id alone, per
/// spec.md §3 ("Equality on Values is by id").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Value(pub(crate) u32);

impl Value {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Metadata about a value slot, kept in the function's arena alongside the
/// bare id: an optional display name and the instruction that defines it
/// (`None` for parameters and locals, which are defined by declaration
/// rather than by an instruction).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueSlot {
    pub name: Option<String>,
}

impl ValueSlot {
    pub fn new(name: Option<String>) -> Self {
        ValueSlot { name }
    }

    pub fn display_name(&self, value: Value) -> String {
        match &self.name {
            Some(name) => format!("%{name}"),
            None => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_compare_by_id() {
        assert_eq!(Value(0), Value(0));
        assert_ne!(Value(0), Value(1));
    }

    #[test]
    fn display_falls_back_to_bare_id() {
        assert_eq!(Value(3).to_string(), "%3");
    }

    #[test]
    fn slot_display_name_prefers_the_name() {
        let slot = ValueSlot::new(Some("sum".to_string()));
        assert_eq!(slot.display_name(Value(7)), "%sum");
        let anon = ValueSlot::new(None);
        assert_eq!(anon.display_name(Value(7)), "%7");
    }
}
