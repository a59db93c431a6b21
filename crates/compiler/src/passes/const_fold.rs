//! Constant-folding pass (spec.md §4.F)
//!
//! Function-level, fixed-point. Walks each block linearly threading a
//! `value -> constant` map; every fold replaces the instruction in place
//! with a `Const` of the same result id, so nothing downstream ever has to
//! know a fold happened.

use crate::error::PassError;
use crate::ir::{ConstValue, Function, Instruction, Opcode, Value};
use crate::pass::Pass;
use std::collections::HashMap;

pub struct ConstantFoldingPass {
    max_iterations: u32,
    folded_expressions: u64,
    removed_instructions: u64,
    iterations: u64,
}

impl ConstantFoldingPass {
    pub fn new(max_iterations: u32) -> Self {
        ConstantFoldingPass {
            max_iterations,
            folded_expressions: 0,
            removed_instructions: 0,
            iterations: 0,
        }
    }

    fn fold_binary(op: Opcode, lhs: ConstValue, rhs: ConstValue) -> Option<ConstValue> {
        use ConstValue::*;
        match (op, lhs, rhs) {
            (Opcode::Add, Int(a), Int(b)) => Some(Int(a.wrapping_add(b))),
            (Opcode::Sub, Int(a), Int(b)) => Some(Int(a.wrapping_sub(b))),
            (Opcode::Mul, Int(a), Int(b)) => Some(Int(a.wrapping_mul(b))),
            (Opcode::Div, Int(a), Int(b)) => (b != 0).then(|| Int(a.wrapping_div(b))),
            (Opcode::Mod, Int(a), Int(b)) => (b != 0).then(|| Int(a.wrapping_rem(b))),
            (Opcode::Add, Float(a), Float(b)) => Some(Float(a + b)),
            (Opcode::Sub, Float(a), Float(b)) => Some(Float(a - b)),
            (Opcode::Mul, Float(a), Float(b)) => Some(Float(a * b)),
            (Opcode::Div, Float(a), Float(b)) => (b != 0.0).then(|| Float(a / b)),
            (Opcode::Mod, Float(a), Float(b)) => (b != 0.0).then(|| Float(a % b)),
            _ => None,
        }
    }

    fn fold_unary(op: Opcode, operand: ConstValue) -> Option<ConstValue> {
        use ConstValue::*;
        match (op, operand) {
            (Opcode::Neg, Int(a)) => Some(Int(a.wrapping_neg())),
            (Opcode::Neg, Float(a)) => Some(Float(-a)),
            (Opcode::Not, Bool(a)) => Some(Bool(!a)),
            (Opcode::Not, Int(a)) => Some(Int(!a)),
            _ => None,
        }
    }

    /// One linear pass over every block of `function`. Returns whether any
    /// instruction was folded.
    fn fold_once(&mut self, function: &mut Function) -> bool {
        let mut constants: HashMap<Value, ConstValue> = HashMap::new();
        let mut changed = false;

        for block in function.blocks_mut() {
            for instr in block.instructions.iter_mut() {
                if instr.opcode == Opcode::Const {
                    if let (Some(result), Some(value)) = (instr.result, instr.const_value) {
                        constants.insert(result, value);
                    }
                    continue;
                }

                let folded = if instr.opcode.is_binary_arithmetic() && instr.operands.len() == 2 {
                    let lhs = constants.get(&instr.operands[0]).copied();
                    let rhs = constants.get(&instr.operands[1]).copied();
                    match (lhs, rhs) {
                        (Some(lhs), Some(rhs)) => Self::fold_binary(instr.opcode, lhs, rhs),
                        _ => None,
                    }
                } else if instr.opcode.is_unary_arithmetic() && instr.operands.len() == 1 {
                    constants
                        .get(&instr.operands[0])
                        .copied()
                        .and_then(|operand| Self::fold_unary(instr.opcode, operand))
                } else {
                    None
                };

                if let Some(value) = folded {
                    let result = instr.result.expect("arithmetic opcodes always produce a result");
                    *instr = Instruction::constant(instr.id, result, value);
                    constants.insert(result, value);
                    self.folded_expressions += 1;
                    changed = true;
                }
            }
        }

        changed
    }
}

impl Pass for ConstantFoldingPass {
    fn name(&self) -> &str {
        "constant-folding"
    }

    fn run_on_function(&mut self, function: &mut Function) -> Result<bool, PassError> {
        let mut changed_global = false;
        let mut iter = 0;

        loop {
            if iter >= self.max_iterations {
                break;
            }
            let changed = self.fold_once(function);
            iter += 1;
            self.iterations += 1;
            if changed {
                changed_global = true;
            } else {
                break;
            }
        }

        Ok(changed_global)
    }

    fn take_counters(&mut self) -> HashMap<String, u64> {
        let mut counters = HashMap::new();
        counters.insert("folded_expressions".to_string(), self.folded_expressions);
        counters.insert("removed_instructions".to_string(), self.removed_instructions);
        counters.insert("iterations".to_string(), self.iterations);
        self.folded_expressions = 0;
        self.removed_instructions = 0;
        self.iterations = 0;
        counters
    }
}
