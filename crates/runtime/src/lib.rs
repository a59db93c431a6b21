//! Parallel runtime: a fixed-size thread pool driving a `parallel for`
//! primitive, the work-distribution disciplines behind it, and a portable
//! SIMD layer for vectorizable loop bodies (spec.md §4.H, §4.I, §4.J).
//!
//! This crate has no dependency on `anvil-compiler` — a host embedding the
//! compiled output links against this runtime directly, the same way the
//! conceptual C-ABI shim (spec.md §6) would.

pub mod error;
pub mod global;
pub mod pool;
pub mod simd;
pub mod work;

pub use error::{set_last_error, take_last_error, RuntimeError, VectorError};
pub use global::{cleanup_default_pool, default_num_threads, parallel_for_default};
pub use pool::{PoolConfig, ThreadPool};
pub use simd::{
    alloc_aligned, free_aligned, AlignedBuffer, DataType, InstructionSet, ScalarValue,
    VectorBuffer, VectorEngine, VectorMask, VectorOp, VectorizationConfig,
};
pub use work::{optimal_chunk, ScheduleKind, WorkDistribution, WorkStats};
