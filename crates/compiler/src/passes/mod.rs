//! Built-in optimization passes (spec.md §4.F, §4.G)

pub mod const_fold;
pub mod dce;

pub use const_fold::ConstantFoldingPass;
pub use dce::DeadCodeEliminationPass;
