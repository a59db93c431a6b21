//! Portable SIMD layer: capability detection, typed buffers, and the
//! scalar-fallback kernels (spec.md §4.J)

pub mod buffer;
pub mod capability;
pub mod kernel;

pub use buffer::{DataType, VectorBuffer, VectorMask};
pub use capability::{alloc_aligned, free_aligned, AlignedBuffer, InstructionSet};
pub use kernel::{ScalarValue, VectorEngine, VectorOp, VectorizationConfig};
