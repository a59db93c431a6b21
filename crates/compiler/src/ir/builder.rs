//! IRBuilder: a cursor over "current module/function/block" (spec.md §4.D)
//!
//! Lowering code walks the AST and calls `emit_*` as it goes; the builder
//! tracks where the next instruction lands so callers never have to thread
//! a `(Module, FunctionId, BlockId)` triple by hand.

use crate::error::IrError;
use crate::ir::block::{BlockId, BlockKind};
use crate::ir::instruction::{ConstValue, Instruction, Opcode};
use crate::ir::module::Module;
use crate::ir::value::Value;
use anvil_core::SourceSpan;

pub struct IRBuilder {
    module: Module,
    current_function: Option<usize>,
    current_block: Option<BlockId>,
    next_instruction_id: u32,
}

impl IRBuilder {
    pub fn new(module_name: impl Into<String>) -> Self {
        IRBuilder {
            module: Module::new(module_name),
            current_function: None,
            current_block: None,
            next_instruction_id: 0,
        }
    }

    /// Starts a new function and positions the cursor at it, with no
    /// current block yet.
    pub fn start_function(&mut self, name: impl Into<String>, return_type: crate::types::Type) {
        self.module.add_function_with_return(name, return_type);
        self.current_function = Some(self.module.function_count() - 1);
        self.current_block = None;
        self.next_instruction_id = 0;
    }

    fn current_function_mut(&mut self) -> &mut crate::ir::function::Function {
        let index = self.current_function.expect("no function is currently being built");
        self.module
            .functions_mut()
            .nth(index)
            .expect("current_function index always refers to a live function")
    }

    /// Opens a new block in the current function and moves the cursor to
    /// it, returning its id.
    pub fn start_block(&mut self, kind: BlockKind, name: Option<String>) -> BlockId {
        let id = self.current_function_mut().add_block(kind, name).id;
        self.current_block = Some(id);
        id
    }

    pub fn switch_to_block(&mut self, id: BlockId) {
        self.current_block = Some(id);
    }

    pub fn current_block(&self) -> Option<BlockId> {
        self.current_block
    }

    pub fn link(&mut self, from: BlockId, to: BlockId) -> Result<(), IrError> {
        self.current_function_mut().link(from, to)
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_instruction_id;
        self.next_instruction_id += 1;
        id
    }

    fn emit(&mut self, instruction: Instruction) {
        let block_id = self.current_block.expect("no block is currently open");
        self.current_function_mut()
            .block_mut(block_id)
            .expect("current_block always refers to a live block")
            .add_instruction(instruction);
    }

    pub fn new_param(&mut self, name: Option<String>) -> Value {
        self.current_function_mut().new_param(name)
    }

    pub fn new_local(&mut self, name: Option<String>) -> Value {
        self.current_function_mut().new_local(name)
    }

    /// Allocates a fresh result value and emits `opcode operands... ->
    /// result` into the current block.
    pub fn emit_value(
        &mut self,
        opcode: Opcode,
        operands: Vec<Value>,
        span: Option<SourceSpan>,
    ) -> Value {
        let result = self.current_function_mut().new_local(None);
        let id = self.next_id();
        let mut instr = Instruction::new(id, opcode, operands, Some(result));
        if let Some(span) = span {
            instr = instr.with_span(span);
        }
        self.emit(instr);
        result
    }

    pub fn emit_const(&mut self, value: ConstValue, span: Option<SourceSpan>) -> Value {
        let result = self.current_function_mut().new_local(None);
        let id = self.next_id();
        let mut instr = Instruction::constant(id, result, value);
        if let Some(span) = span {
            instr = instr.with_span(span);
        }
        self.emit(instr);
        result
    }

    /// Emits an effect-only instruction with no result (e.g. `Return`,
    /// `Store`, `Jump`).
    pub fn emit_effect(&mut self, opcode: Opcode, operands: Vec<Value>, span: Option<SourceSpan>) {
        let id = self.next_id();
        let mut instr = Instruction::new(id, opcode, operands, None);
        if let Some(span) = span {
            instr = instr.with_span(span);
        }
        self.emit(instr);
    }

    pub fn finish(self) -> Module {
        self.module
    }

    pub fn module(&self) -> &Module {
        &self.module
    }
}
