//! Functions: the value arena, block arena, and CFG edge operations
//! (spec.md §3, §4.D)

use crate::error::IrError;
use crate::ir::block::{BasicBlock, BlockId, BlockKind};
use crate::ir::value::{Value, ValueSlot};
use crate::types::Type;
use std::fmt;

/// `Function = (name, params, return_type, locals, basic_blocks, entry_block,
/// exit_block)` per spec.md §3. Values are indices into `values`, owned
/// exclusively by the function; blocks are indices into `blocks`.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Value>,
    pub locals: Vec<Value>,
    values: Vec<ValueSlot>,
    /// Indexed by `BlockId`. A `None` slot is a removed block: `BlockId` is
    /// assigned as the creation index and must stay valid as a handle for
    /// the lifetime of the function, so removal tombstones the slot instead
    /// of compacting the vector (compacting would shift every higher-id
    /// block's position out from under its still-live `BlockId`).
    blocks: Vec<Option<BasicBlock>>,
    entry_block: Option<BlockId>,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: Type) -> Self {
        Function {
            name: name.into(),
            return_type,
            params: Vec::new(),
            locals: Vec::new(),
            values: Vec::new(),
            blocks: Vec::new(),
            entry_block: None,
        }
    }

    fn alloc_value(&mut self, name: Option<String>) -> Value {
        let id = Value(self.values.len() as u32);
        self.values.push(ValueSlot::new(name));
        id
    }

    pub fn new_param(&mut self, name: Option<String>) -> Value {
        let value = self.alloc_value(name);
        self.params.push(value);
        value
    }

    pub fn new_local(&mut self, name: Option<String>) -> Value {
        let value = self.alloc_value(name);
        self.locals.push(value);
        value
    }

    pub fn value_name(&self, value: Value) -> String {
        self.values
            .get(value.index())
            .map(|slot| slot.display_name(value))
            .unwrap_or_else(|| value.to_string())
    }

    pub fn add_block(&mut self, kind: BlockKind, name: Option<String>) -> &mut BasicBlock {
        let id = BlockId(self.blocks.len() as u32);
        if kind == BlockKind::Entry {
            self.entry_block = Some(id);
        }
        self.blocks.push(Some(BasicBlock::new(id, kind, name)));
        self.blocks.last_mut().expect("just pushed").as_mut().expect("just pushed")
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.0 as usize)?.as_ref()
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter().filter_map(|b| b.as_ref())
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut BasicBlock> {
        self.blocks.iter_mut().filter_map(|b| b.as_mut())
    }

    pub fn block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.entry_block
    }

    pub fn exit_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks()
            .filter(|b| b.kind == BlockKind::Exit)
            .map(|b| b.id)
    }

    /// Adds a CFG edge `from -> to`, updating both blocks' edge sets
    /// together so predecessors/successors never drift out of sync
    /// (spec.md §3: "predecessors and successors must be mutually
    /// consistent").
    pub fn link(&mut self, from: BlockId, to: BlockId) -> Result<(), IrError> {
        if self.block(from).is_none() || self.block(to).is_none() {
            return Err(IrError::InvalidCfg(format!(
                "cannot link unknown block(s) {from} -> {to}"
            )));
        }
        self.block_mut(from)
            .expect("checked above")
            .successors
            .insert(to);
        self.block_mut(to).expect("checked above").predecessors.insert(from);
        Ok(())
    }

    /// Removes block `id` entirely, unlinking it from every neighbor first
    /// (spec.md §4.G phase 1, step 3). Tombstones the slot rather than
    /// shifting the vector, so every other block's `BlockId` stays a valid
    /// index into `self.blocks`.
    pub fn remove_block(&mut self, id: BlockId) {
        let (preds, succs) = match self.block(id) {
            Some(b) => (b.predecessors.clone(), b.successors.clone()),
            None => return,
        };
        for pred in &preds {
            if let Some(block) = self.block_mut(*pred) {
                block.successors.remove(&id);
            }
        }
        for succ in &succs {
            if let Some(block) = self.block_mut(*succ) {
                block.predecessors.remove(&id);
            }
        }
        if let Some(slot) = self.blocks.get_mut(id.0 as usize) {
            *slot = None;
        }
    }

    /// Checks invariants I1 through I4 (spec.md §3). I5 (at most one
    /// defining instruction per `Value`) holds by construction: every
    /// `Value` is handed out once by `alloc_value` and [`IRBuilder`] never
    /// reuses one as a second instruction's result.
    ///
    /// [`IRBuilder`]: crate::ir::builder::IRBuilder
    pub fn verify(&self) -> Result<(), IrError> {
        let value_count = self.values.len();
        for block in self.blocks() {
            for instr in &block.instructions {
                for &operand in &instr.operands {
                    if operand.index() >= value_count {
                        return Err(IrError::DanglingValue(format!(
                            "instruction {} in block {} references {operand}, which is not defined in function '{}'",
                            instr.id, block.id, self.name
                        )));
                    }
                }
            }
        }

        let entry_count = self.blocks().filter(|b| b.kind == BlockKind::Entry).count();
        if entry_count != 1 {
            return Err(IrError::InvalidCfg(format!(
                "function '{}' must have exactly one Entry block, found {entry_count}",
                self.name
            )));
        }
        let exit_count = self.blocks().filter(|b| b.kind == BlockKind::Exit).count();
        if exit_count == 0 {
            return Err(IrError::InvalidCfg(format!(
                "function '{}' must have at least one Exit block",
                self.name
            )));
        }
        for block in self.blocks() {
            for (i, instr) in block.instructions.iter().enumerate() {
                let is_last = i + 1 == block.instructions.len();
                if instr.opcode.is_terminator() && !is_last {
                    return Err(IrError::InvalidCfg(format!(
                        "terminator {:?} in block {} is not the last instruction",
                        instr.opcode, block.id
                    )));
                }
            }
            if block.kind == BlockKind::Exit {
                let ends_in_return = block
                    .instructions
                    .last()
                    .map(|i| i.opcode == crate::ir::instruction::Opcode::Return)
                    .unwrap_or(false);
                if !ends_in_return {
                    return Err(IrError::EmptyTerminatorBlock(format!(
                        "exit block {} does not end in Return",
                        block.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "func {}(...) -> {} {{", self.name, self.return_type)?;
        for block in self.blocks() {
            write!(f, "{block}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::instruction::{Instruction, Opcode};

    #[test]
    fn linking_two_blocks_updates_both_edge_sets() {
        let mut func = Function::new("f", Type::Void);
        let entry = func.add_block(BlockKind::Entry, None).id;
        let exit = func.add_block(BlockKind::Exit, None).id;
        func.link(entry, exit).unwrap();
        assert!(func.block(entry).unwrap().successors.contains(&exit));
        assert!(func.block(exit).unwrap().predecessors.contains(&entry));
    }

    #[test]
    fn remove_block_unlinks_neighbors() {
        let mut func = Function::new("f", Type::Void);
        let entry = func.add_block(BlockKind::Entry, None).id;
        let mid = func.add_block(BlockKind::Normal, None).id;
        let exit = func.add_block(BlockKind::Exit, None).id;
        func.link(entry, mid).unwrap();
        func.link(mid, exit).unwrap();
        func.remove_block(mid);
        assert_eq!(func.block_count(), 2);
        assert!(!func.block(entry).unwrap().successors.contains(&mid));
        assert!(!func.block(exit).unwrap().predecessors.contains(&mid));
    }

    #[test]
    fn removing_a_block_before_the_exit_leaves_the_exit_id_valid() {
        // spec.md S5: entry, b1, b2, unreach, exit with only unreach
        // removed. exit's BlockId must still resolve after the removal of
        // a lower-id block, not just a higher-id one.
        let mut func = Function::new("f", Type::Void);
        let entry = func.add_block(BlockKind::Entry, None).id;
        let b1 = func.add_block(BlockKind::Normal, None).id;
        let b2 = func.add_block(BlockKind::Normal, None).id;
        let unreach = func.add_block(BlockKind::Normal, None).id;
        let exit = func.add_block(BlockKind::Exit, None).id;
        func.link(entry, b1).unwrap();
        func.link(b1, b2).unwrap();
        func.link(b2, exit).unwrap();

        func.remove_block(unreach);

        assert_eq!(func.block_count(), 4);
        assert_eq!(func.block(exit).unwrap().id, exit);
        assert_eq!(func.block(exit).unwrap().kind, BlockKind::Exit);
        assert!(func.block(unreach).is_none());
        assert!(func.blocks().any(|b| b.id == b2));
    }

    #[test]
    fn verify_rejects_function_with_no_exit_block() {
        let mut func = Function::new("f", Type::Void);
        func.add_block(BlockKind::Entry, None)
            .add_instruction(Instruction::new(0, Opcode::Return, vec![], None));
        assert!(func.verify().is_err());
    }

    #[test]
    fn verify_accepts_well_formed_function() {
        let mut func = Function::new("f", Type::Void);
        func.add_block(BlockKind::Entry, None)
            .add_instruction(Instruction::new(0, Opcode::Jump, vec![], None));
        let exit = func.add_block(BlockKind::Exit, None).id;
        func.block_mut(exit)
            .unwrap()
            .add_instruction(Instruction::new(1, Opcode::Return, vec![], None));
        func.link(func.entry_block().unwrap(), exit).unwrap();
        assert!(func.verify().is_ok());
    }

    #[test]
    fn verify_rejects_an_instruction_referencing_an_undefined_value() {
        let mut func = Function::new("f", Type::Void);
        func.add_block(BlockKind::Entry, None).add_instruction(Instruction::new(
            0,
            Opcode::Jump,
            vec![Value(99)],
            None,
        ));
        let exit = func.add_block(BlockKind::Exit, None).id;
        func.block_mut(exit)
            .unwrap()
            .add_instruction(Instruction::new(1, Opcode::Return, vec![], None));
        func.link(func.entry_block().unwrap(), exit).unwrap();

        assert!(matches!(func.verify(), Err(IrError::DanglingValue(_))));
    }

    #[test]
    fn new_param_and_new_local_are_distinct_arenas_of_one_value_space() {
        let mut func = Function::new("f", Type::Int);
        let p = func.new_param(Some("a".to_string()));
        let l = func.new_local(None);
        assert_ne!(p, l);
        assert_eq!(func.value_name(p), "%a");
    }
}
