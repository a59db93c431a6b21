//! Dead-code-elimination pass (spec.md §4.G)
//!
//! Two phases, control-flow then data-flow: unreachable blocks are dropped
//! first (so phase two never has to consider instructions that can't run),
//! then liveness is propagated backward from every side-effectful sink.

use crate::error::PassError;
use crate::ir::{BlockId, Function, Value};
use crate::pass::Pass;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Default)]
pub struct DeadCodeEliminationPass {
    removed_instructions: u64,
    removed_blocks: u64,
    eliminated_values: u64,
}

impl DeadCodeEliminationPass {
    pub fn new() -> Self {
        Self::default()
    }

    fn reachable_blocks(function: &Function) -> HashSet<BlockId> {
        let mut reachable = HashSet::new();
        let Some(entry) = function.entry_block() else {
            return reachable;
        };
        let mut queue = VecDeque::new();
        queue.push_back(entry);
        reachable.insert(entry);
        while let Some(id) = queue.pop_front() {
            let Some(block) = function.block(id) else { continue };
            for succ in &block.successors {
                if reachable.insert(*succ) {
                    queue.push_back(*succ);
                }
            }
        }
        reachable
    }
}

impl Pass for DeadCodeEliminationPass {
    fn name(&self) -> &str {
        "dead-code-elimination"
    }

    fn run_on_function(&mut self, function: &mut Function) -> Result<bool, PassError> {
        if function.entry_block().is_none() {
            return Ok(false);
        }

        // Phase 1: reachable blocks.
        let reachable = Self::reachable_blocks(function);
        let unreachable: Vec<BlockId> = function
            .blocks()
            .map(|b| b.id)
            .filter(|id| !reachable.contains(id))
            .collect();
        let removed_blocks = unreachable.len() as u64;
        for id in unreachable {
            function.remove_block(id);
        }

        // Phase 2: live values.
        let mut live: HashSet<Value> = function.params.iter().copied().collect();
        for block in function.blocks() {
            for instr in &block.instructions {
                if instr.opcode.is_side_effectful() {
                    live.extend(instr.operands.iter().copied());
                }
            }
        }

        // Worklist propagation: a live result pulls its operands in too.
        let result_operands: HashMap<Value, Vec<Value>> = function
            .blocks()
            .flat_map(|b| b.instructions.iter())
            .filter_map(|instr| instr.result.map(|r| (r, instr.operands.clone())))
            .collect();

        let mut changed = true;
        while changed {
            changed = false;
            let newly_live: Vec<Value> = live
                .iter()
                .filter_map(|v| result_operands.get(v))
                .flatten()
                .copied()
                .collect();
            for value in newly_live {
                if live.insert(value) {
                    changed = true;
                }
            }
        }

        let mut removed_instructions = 0u64;
        let mut eliminated_values = 0u64;
        for block in function.blocks_mut() {
            let before = block.instructions.len();
            block.instructions.retain(|instr| {
                let keep = instr.opcode.is_side_effectful()
                    || instr.result.map(|r| live.contains(&r)).unwrap_or(false);
                if !keep {
                    if instr.result.is_some() {
                        eliminated_values += 1;
                    }
                }
                keep
            });
            removed_instructions += (before - block.instructions.len()) as u64;
        }

        self.removed_instructions += removed_instructions;
        self.removed_blocks += removed_blocks;
        self.eliminated_values += eliminated_values;

        Ok(removed_instructions > 0 || removed_blocks > 0)
    }

    fn take_counters(&mut self) -> HashMap<String, u64> {
        let mut counters = HashMap::new();
        counters.insert("removed_instructions".to_string(), self.removed_instructions);
        counters.insert("removed_blocks".to_string(), self.removed_blocks);
        counters.insert("eliminated_values".to_string(), self.eliminated_values);
        self.removed_instructions = 0;
        self.removed_blocks = 0;
        self.eliminated_values = 0;
        counters
    }
}
