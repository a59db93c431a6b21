//! Basic blocks and the CFG they form (spec.md §3, §4.D)

use crate::ir::instruction::Instruction;
use std::collections::BTreeSet;
use std::fmt;

/// An opaque handle to a block, an index into the owning function's block
/// arena. Deletion in [`crate::pass`] passes works by removing the index
/// from neighboring sets, never by refcounting (spec.md DESIGN NOTES: "never
/// refcount block edges").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub(crate) u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Entry,
    Normal,
    Loop,
    Branch,
    Exit,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One basic block: an id, an optional name, a kind, its straight-line
/// instruction sequence, and the CFG edges touching it. Predecessors and
/// successors are kept as sets of block ids; `Function::link` is the only
/// way to add an edge, and it always updates both sides together so the
/// two lists stay mutually consistent (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub id: BlockId,
    pub name: Option<String>,
    pub kind: BlockKind,
    pub instructions: Vec<Instruction>,
    pub predecessors: BTreeSet<BlockId>,
    pub successors: BTreeSet<BlockId>,
}

impl BasicBlock {
    pub fn new(id: BlockId, kind: BlockKind, name: Option<String>) -> Self {
        BasicBlock {
            id,
            name,
            kind,
            instructions: Vec::new(),
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
        }
    }

    pub fn add_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// The block's terminator, if its last instruction is one (spec.md I3:
    /// terminators only ever appear in last position, so this is the only
    /// place one can live).
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.opcode.is_terminator())
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.id),
            None => self.id.to_string(),
        }
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: ; kind={}", self.display_name(), self.kind)?;
        for instr in &self.instructions {
            writeln!(f, "  {instr}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::instruction::Opcode;
    use crate::ir::value::Value;

    #[test]
    fn terminator_is_only_recognized_as_last_instruction() {
        let mut block = BasicBlock::new(BlockId(0), BlockKind::Normal, None);
        block.add_instruction(Instruction::new(0, Opcode::Add, vec![], Some(Value(0))));
        assert!(block.terminator().is_none());
        block.add_instruction(Instruction::new(1, Opcode::Return, vec![Value(0)], None));
        assert!(block.terminator().is_some());
    }

    #[test]
    fn display_name_includes_the_optional_name() {
        let named = BasicBlock::new(BlockId(2), BlockKind::Loop, Some("loop_head".to_string()));
        assert_eq!(named.display_name(), "bb2 (loop_head)");
        let anon = BasicBlock::new(BlockId(3), BlockKind::Normal, None);
        assert_eq!(anon.display_name(), "bb3");
    }
}
