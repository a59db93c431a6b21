//! Instructions and opcodes (spec.md §3, §4.D)

use crate::ir::value::Value;
use anvil_core::SourceSpan;
use std::collections::HashMap;
use std::fmt;

/// The opcode set enumerated in spec.md §3: arithmetic, logical,
/// comparison, memory, control-flow, the concurrency-domain ops the
/// back-end may target, and the three bookkeeping ops `Const`/`Move`/`Nop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    // Logical / bitwise
    Not,
    And,
    Or,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Memory
    Alloc,
    Free,
    Load,
    Store,
    // Control flow
    Jump,
    Branch,
    Return,
    Call,
    TailCall,
    // Concurrency domain ops
    GoroutineSpawn,
    GoroutineYield,
    GoroutineJoin,
    ChannelSend,
    ChannelReceive,
    ChannelClose,
    // Bookkeeping
    Const,
    Move,
    Nop,
}

impl Opcode {
    /// Opcodes the dead-code-eliminator never removes regardless of
    /// liveness (spec.md §4.G).
    pub fn is_side_effectful(self) -> bool {
        matches!(
            self,
            Opcode::Call
                | Opcode::Return
                | Opcode::Store
                | Opcode::Free
                | Opcode::GoroutineSpawn
                | Opcode::GoroutineYield
                | Opcode::GoroutineJoin
                | Opcode::ChannelSend
                | Opcode::ChannelReceive
                | Opcode::ChannelClose
                | Opcode::Jump
                | Opcode::Branch
        )
    }

    /// Terminators may only appear as the last instruction of a block
    /// (spec.md I3).
    pub fn is_terminator(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::Branch | Opcode::Return)
    }

    pub fn is_binary_arithmetic(self) -> bool {
        matches!(self, Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod)
    }

    pub fn is_unary_arithmetic(self) -> bool {
        matches!(self, Opcode::Neg | Opcode::Not)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A literal folded or loaded by a `Const` instruction (spec.md REDESIGN
/// FLAGS: `Const` carries its payload directly, never by casting a Value
/// id, which the source's constant-folding pass does and the spec calls
/// out as a bug to diverge from).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Float(v) => write!(f, "{v}"),
            ConstValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// One instruction, unique within its block. `result` is `None` for
/// effect-only instructions (e.g. `Store`, `Return`).
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub id: u32,
    pub opcode: Opcode,
    pub operands: Vec<Value>,
    pub result: Option<Value>,
    /// Populated only for `Const` instructions; the dedicated literal
    /// payload field called for by the spec's REDESIGN FLAGS.
    pub const_value: Option<ConstValue>,
    pub span: Option<SourceSpan>,
    pub metadata: HashMap<String, String>,
}

impl Instruction {
    pub fn new(id: u32, opcode: Opcode, operands: Vec<Value>, result: Option<Value>) -> Self {
        Instruction {
            id,
            opcode,
            operands,
            result,
            const_value: None,
            span: None,
            metadata: HashMap::new(),
        }
    }

    pub fn constant(id: u32, result: Value, value: ConstValue) -> Self {
        Instruction {
            id,
            opcode: Opcode::Const,
            operands: Vec::new(),
            result: Some(result),
            const_value: Some(value),
            span: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = self.result {
            write!(f, "{result} = ")?;
        }
        write!(f, "{}", self.opcode)?;
        if let Some(value) = self.const_value {
            write!(f, " {value}")?;
        }
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_effectful_opcodes_match_spec_list() {
        assert!(Opcode::Call.is_side_effectful());
        assert!(Opcode::Store.is_side_effectful());
        assert!(!Opcode::Add.is_side_effectful());
        assert!(!Opcode::Const.is_side_effectful());
    }

    #[test]
    fn terminators_are_jump_branch_return_only() {
        assert!(Opcode::Jump.is_terminator());
        assert!(Opcode::Branch.is_terminator());
        assert!(Opcode::Return.is_terminator());
        assert!(!Opcode::Call.is_terminator());
    }

    #[test]
    fn const_instruction_carries_its_payload_directly() {
        let instr = Instruction::constant(0, Value(0), ConstValue::Int(42));
        assert_eq!(instr.const_value, Some(ConstValue::Int(42)));
        assert!(instr.operands.is_empty());
    }

    #[test]
    fn display_renders_result_opcode_and_operands() {
        let instr = Instruction::new(1, Opcode::Add, vec![Value(0), Value(1)], Some(Value(2)));
        assert_eq!(instr.to_string(), "%2 = Add %0 %1");
    }
}
