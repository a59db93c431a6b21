//! Element-wise SIMD kernels with a scalar fallback for every (op, type)
//! pair (spec.md §4.J)
//!
//! `VectorEngine` does not itself touch `std::arch` intrinsics — the
//! detected [`InstructionSet`] only drives alignment and the warning
//! emitted when a caller asks for more than the CPU has. The loops below
//! are the "scalar fallback [that] must exist for every (op, type) pair";
//! a production back-end would specialize hot paths per detected set
//! behind the same `execute` entry point.

use crate::error::VectorError;
use crate::simd::buffer::{DataType, VectorBuffer, VectorMask};
use crate::simd::capability::InstructionSet;
use anvil_core::DiagnosticSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorOp {
    Add,
    Sub,
    Mul,
    Div,
    Fma,
    Abs,
    Sqrt,
    And,
    Or,
    Xor,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Min,
    Max,
    Load,
    Store,
    Gather,
    Scatter,
    Blend,
    Shuffle,
    Set1,
}

/// A single scalar literal, used by `Set1` and as the fill source for
/// `Gather`/`Scatter` bounds violations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

pub struct VectorEngine {
    active_set: InstructionSet,
    sink: std::sync::Arc<dyn DiagnosticSink>,
}

/// Builder-style vectorization configuration, mirroring
/// `compiler::pass::PassManagerConfig`'s `with_*`/`Default` shape.
#[derive(Debug, Clone, Copy)]
pub struct VectorizationConfig {
    /// The instruction set a caller would like to use; [`VectorEngine::from_config`]
    /// clamps it down to whatever the host CPU actually supports.
    pub requested_set: InstructionSet,
}

impl Default for VectorizationConfig {
    fn default() -> Self {
        VectorizationConfig { requested_set: InstructionSet::detect() }
    }
}

impl VectorizationConfig {
    pub fn with_requested_set(mut self, set: InstructionSet) -> Self {
        self.requested_set = set;
        self
    }
}

/// Generates one match arm per integer `VectorBuffer` variant for a binary
/// arithmetic/bitwise/min-max kernel. Saturates `Add`/`Sub`/`Mul` on
/// overflow; `Div`/`Mod`-by-zero writes 0 and logs instead of panicking.
macro_rules! int_binary_arm {
    ($variant:ident, $a:expr, $b:expr, $out:expr, $mask:expr, $op:expr, $sink:expr) => {
        if let (VectorBuffer::$variant(av), VectorBuffer::$variant(bv), VectorBuffer::$variant(ov)) =
            ($a, $b, $out)
        {
            for i in 0..av.len() {
                if $mask.map(|m: &VectorMask| !m.is_set(i)).unwrap_or(false) {
                    continue;
                }
                ov[i] = match $op {
                    VectorOp::Add => av[i].saturating_add(bv[i]),
                    VectorOp::Sub => av[i].saturating_sub(bv[i]),
                    VectorOp::Mul => av[i].saturating_mul(bv[i]),
                    VectorOp::And => av[i] & bv[i],
                    VectorOp::Or => av[i] | bv[i],
                    VectorOp::Xor => av[i] ^ bv[i],
                    VectorOp::Min => av[i].min(bv[i]),
                    VectorOp::Max => av[i].max(bv[i]),
                    VectorOp::Div => {
                        if bv[i] == 0 {
                            $sink.emit("vectorization: integer division by zero, writing 0");
                            0
                        } else {
                            av[i] / bv[i]
                        }
                    }
                    other => {
                        return Err(VectorError::UnsupportedOp(format!(
                            "{other:?} is not a binary integer kernel"
                        )))
                    }
                };
            }
            return Ok(());
        }
    };
}

macro_rules! int_compare_arm {
    ($variant:ident, $a:expr, $b:expr, $out:expr, $mask:expr, $op:expr) => {
        if let (VectorBuffer::$variant(av), VectorBuffer::$variant(bv), VectorBuffer::U8(ov)) =
            ($a, $b, $out)
        {
            for i in 0..av.len() {
                if $mask.map(|m: &VectorMask| !m.is_set(i)).unwrap_or(false) {
                    continue;
                }
                let result = match $op {
                    VectorOp::Eq => av[i] == bv[i],
                    VectorOp::Ne => av[i] != bv[i],
                    VectorOp::Lt => av[i] < bv[i],
                    VectorOp::Le => av[i] <= bv[i],
                    VectorOp::Gt => av[i] > bv[i],
                    VectorOp::Ge => av[i] >= bv[i],
                    other => {
                        return Err(VectorError::UnsupportedOp(format!(
                            "{other:?} is not a comparison kernel"
                        )))
                    }
                };
                ov[i] = result as u8;
            }
            return Ok(());
        }
    };
}

macro_rules! float_binary_arm {
    ($variant:ident, $a:expr, $b:expr, $out:expr, $mask:expr, $op:expr, $sink:expr) => {
        if let (VectorBuffer::$variant(av), VectorBuffer::$variant(bv), VectorBuffer::$variant(ov)) =
            ($a, $b, $out)
        {
            for i in 0..av.len() {
                if $mask.map(|m: &VectorMask| !m.is_set(i)).unwrap_or(false) {
                    continue;
                }
                ov[i] = match $op {
                    VectorOp::Add => av[i] + bv[i],
                    VectorOp::Sub => av[i] - bv[i],
                    VectorOp::Mul => av[i] * bv[i],
                    VectorOp::Min => av[i].min(bv[i]),
                    VectorOp::Max => av[i].max(bv[i]),
                    VectorOp::Div => {
                        if (bv[i] as f64).abs() < 1e-10 {
                            $sink.emit("vectorization: float division by near-zero, writing 0");
                            0.0
                        } else {
                            av[i] / bv[i]
                        }
                    }
                    other => {
                        return Err(VectorError::UnsupportedOp(format!(
                            "{other:?} is not a binary float kernel"
                        )))
                    }
                };
            }
            return Ok(());
        }
    };
}

macro_rules! float_compare_arm {
    ($variant:ident, $a:expr, $b:expr, $out:expr, $mask:expr, $op:expr) => {
        if let (VectorBuffer::$variant(av), VectorBuffer::$variant(bv), VectorBuffer::U8(ov)) =
            ($a, $b, $out)
        {
            for i in 0..av.len() {
                if $mask.map(|m: &VectorMask| !m.is_set(i)).unwrap_or(false) {
                    continue;
                }
                let result = match $op {
                    VectorOp::Eq => av[i] == bv[i],
                    VectorOp::Ne => av[i] != bv[i],
                    VectorOp::Lt => av[i] < bv[i],
                    VectorOp::Le => av[i] <= bv[i],
                    VectorOp::Gt => av[i] > bv[i],
                    VectorOp::Ge => av[i] >= bv[i],
                    other => {
                        return Err(VectorError::UnsupportedOp(format!(
                            "{other:?} is not a comparison kernel"
                        )))
                    }
                };
                ov[i] = result as u8;
            }
            return Ok(());
        }
    };
}

impl VectorEngine {
    /// `initialize(requested)`: clamps `requested` down to the detected
    /// ceiling, logging a warning if clamping occurred.
    pub fn initialize(requested: InstructionSet, sink: std::sync::Arc<dyn DiagnosticSink>) -> Self {
        let (active_set, clamped) = InstructionSet::clamp_to_detected(requested);
        if clamped {
            sink.emit(&format!(
                "vectorization: requested {requested} not available, using {active_set}"
            ));
        }
        VectorEngine { active_set, sink }
    }

    /// Builds an engine from a [`VectorizationConfig`], following the same
    /// `CompilerConfig`-driven construction shape as
    /// `compiler::pass::PassManagerConfig`.
    pub fn from_config(config: VectorizationConfig, sink: std::sync::Arc<dyn DiagnosticSink>) -> Self {
        Self::initialize(config.requested_set, sink)
    }

    pub fn active_set(&self) -> InstructionSet {
        self.active_set
    }

    fn validate_binary(
        op: VectorOp,
        a: &VectorBuffer,
        b: &VectorBuffer,
        out: &VectorBuffer,
    ) -> Result<(), VectorError> {
        a.same_shape(b)?;
        if a.is_empty() {
            return Err(VectorError::InvalidSize(format!("{op:?} called on empty buffers")));
        }
        let expected_out_len = a.len();
        if out.len() != expected_out_len {
            return Err(VectorError::InvalidSize(format!(
                "output length {} does not match input length {}",
                out.len(),
                expected_out_len
            )));
        }
        Ok(())
    }

    /// Dispatches a binary element-wise op. Comparisons must target a
    /// `VectorBuffer::U8` output (0/1 per lane); everything else keeps the
    /// input type.
    pub fn execute_binary(
        &self,
        op: VectorOp,
        a: &VectorBuffer,
        b: &VectorBuffer,
        out: &mut VectorBuffer,
        mask: Option<&VectorMask>,
    ) -> Result<(), VectorError> {
        Self::validate_binary(op, a, b, out)?;
        let is_compare = matches!(
            op,
            VectorOp::Eq | VectorOp::Ne | VectorOp::Lt | VectorOp::Le | VectorOp::Gt | VectorOp::Ge
        );

        if is_compare {
            int_compare_arm!(I8, a, b, out, mask, op);
            int_compare_arm!(I16, a, b, out, mask, op);
            int_compare_arm!(I32, a, b, out, mask, op);
            int_compare_arm!(I64, a, b, out, mask, op);
            int_compare_arm!(U8, a, b, out, mask, op);
            int_compare_arm!(U16, a, b, out, mask, op);
            int_compare_arm!(U32, a, b, out, mask, op);
            int_compare_arm!(U64, a, b, out, mask, op);
            float_compare_arm!(F32, a, b, out, mask, op);
            float_compare_arm!(F64, a, b, out, mask, op);
            return Err(VectorError::InvalidBuffer(
                "comparison output must be a U8 mask buffer".to_string(),
            ));
        }

        int_binary_arm!(I8, a, b, out, mask, op, self.sink);
        int_binary_arm!(I16, a, b, out, mask, op, self.sink);
        int_binary_arm!(I32, a, b, out, mask, op, self.sink);
        int_binary_arm!(I64, a, b, out, mask, op, self.sink);
        int_binary_arm!(U8, a, b, out, mask, op, self.sink);
        int_binary_arm!(U16, a, b, out, mask, op, self.sink);
        int_binary_arm!(U32, a, b, out, mask, op, self.sink);
        int_binary_arm!(U64, a, b, out, mask, op, self.sink);
        float_binary_arm!(F32, a, b, out, mask, op, self.sink);
        float_binary_arm!(F64, a, b, out, mask, op, self.sink);

        Err(VectorError::InvalidBuffer(
            "operand/output buffer type mismatch".to_string(),
        ))
    }

    /// `Fma`: `a * b + c`, float only (the integer opcodes have no fused
    /// multiply-add in the scalar fallback).
    pub fn execute_fma(
        &self,
        a: &VectorBuffer,
        b: &VectorBuffer,
        c: &VectorBuffer,
        out: &mut VectorBuffer,
        mask: Option<&VectorMask>,
    ) -> Result<(), VectorError> {
        a.same_shape(b)?;
        a.same_shape(c)?;
        match (a, b, c, out) {
            (VectorBuffer::F32(av), VectorBuffer::F32(bv), VectorBuffer::F32(cv), VectorBuffer::F32(ov)) => {
                for i in 0..av.len() {
                    if mask.map(|m| !m.is_set(i)).unwrap_or(false) {
                        continue;
                    }
                    ov[i] = av[i].mul_add(bv[i], cv[i]);
                }
                Ok(())
            }
            (VectorBuffer::F64(av), VectorBuffer::F64(bv), VectorBuffer::F64(cv), VectorBuffer::F64(ov)) => {
                for i in 0..av.len() {
                    if mask.map(|m| !m.is_set(i)).unwrap_or(false) {
                        continue;
                    }
                    ov[i] = av[i].mul_add(bv[i], cv[i]);
                }
                Ok(())
            }
            _ => Err(VectorError::UnsupportedOp("Fma requires matching float buffers".to_string())),
        }
    }

    /// `Abs`/`Sqrt`/`Not`: the three unary kernels.
    pub fn execute_unary(
        &self,
        op: VectorOp,
        a: &VectorBuffer,
        out: &mut VectorBuffer,
        mask: Option<&VectorMask>,
    ) -> Result<(), VectorError> {
        a.same_shape(out)?;
        macro_rules! unary_int {
            ($variant:ident) => {
                if let (VectorBuffer::$variant(av), VectorBuffer::$variant(ov)) = (a, &mut *out) {
                    for i in 0..av.len() {
                        if mask.map(|m| !m.is_set(i)).unwrap_or(false) {
                            continue;
                        }
                        ov[i] = match op {
                            VectorOp::Not => !av[i],
                            VectorOp::Abs => av[i],
                            other => {
                                return Err(VectorError::UnsupportedOp(format!(
                                    "{other:?} unsupported for integer lanes"
                                )))
                            }
                        };
                    }
                    return Ok(());
                }
            };
        }
        unary_int!(U8);
        unary_int!(U16);
        unary_int!(U32);
        unary_int!(U64);

        macro_rules! unary_signed {
            ($variant:ident) => {
                if let (VectorBuffer::$variant(av), VectorBuffer::$variant(ov)) = (a, &mut *out) {
                    for i in 0..av.len() {
                        if mask.map(|m| !m.is_set(i)).unwrap_or(false) {
                            continue;
                        }
                        ov[i] = match op {
                            VectorOp::Not => !av[i],
                            VectorOp::Abs => av[i].saturating_abs(),
                            other => {
                                return Err(VectorError::UnsupportedOp(format!(
                                    "{other:?} unsupported for integer lanes"
                                )))
                            }
                        };
                    }
                    return Ok(());
                }
            };
        }
        unary_signed!(I8);
        unary_signed!(I16);
        unary_signed!(I32);
        unary_signed!(I64);

        macro_rules! unary_float {
            ($variant:ident) => {
                if let (VectorBuffer::$variant(av), VectorBuffer::$variant(ov)) = (a, &mut *out) {
                    for i in 0..av.len() {
                        if mask.map(|m| !m.is_set(i)).unwrap_or(false) {
                            continue;
                        }
                        ov[i] = match op {
                            VectorOp::Abs => av[i].abs(),
                            VectorOp::Sqrt => av[i].sqrt(),
                            other => {
                                return Err(VectorError::UnsupportedOp(format!(
                                    "{other:?} unsupported for float lanes"
                                )))
                            }
                        };
                    }
                    return Ok(());
                }
            };
        }
        unary_float!(F32);
        unary_float!(F64);

        Err(VectorError::InvalidBuffer("operand/output buffer type mismatch".to_string()))
    }

    /// `Set1`: fills every (unmasked) lane of `out` with `value`.
    pub fn execute_set1(&self, value: ScalarValue, out: &mut VectorBuffer, mask: Option<&VectorMask>) -> Result<(), VectorError> {
        macro_rules! fill {
            ($buf_variant:ident, $scalar_variant:ident) => {
                if let (VectorBuffer::$buf_variant(ov), ScalarValue::$scalar_variant(v)) = (&mut *out, value) {
                    for i in 0..ov.len() {
                        if mask.map(|m| !m.is_set(i)).unwrap_or(false) {
                            continue;
                        }
                        ov[i] = v;
                    }
                    return Ok(());
                }
            };
        }
        fill!(I8, I8);
        fill!(I16, I16);
        fill!(I32, I32);
        fill!(I64, I64);
        fill!(U8, U8);
        fill!(U16, U16);
        fill!(U32, U32);
        fill!(U64, U64);
        fill!(F32, F32);
        fill!(F64, F64);
        Err(VectorError::InvalidBuffer("scalar type does not match buffer type".to_string()))
    }

    /// `Gather`: `out[i] = src[indices[i]]`. An out-of-range index is
    /// skipped with a warning rather than treated as fatal (spec.md §7).
    pub fn execute_gather(
        &self,
        src: &VectorBuffer,
        indices: &[usize],
        out: &mut VectorBuffer,
        mask: Option<&VectorMask>,
    ) -> Result<(), VectorError> {
        src.same_shape(out).or_else(|_| {
            if src.data_type() == out.data_type() && out.len() == indices.len() {
                Ok(())
            } else {
                Err(VectorError::InvalidSize("gather output must have one lane per index".to_string()))
            }
        })?;

        macro_rules! gather_arm {
            ($variant:ident) => {
                if let (VectorBuffer::$variant(sv), VectorBuffer::$variant(ov)) = (src, &mut *out) {
                    for (i, &index) in indices.iter().enumerate() {
                        if mask.map(|m| !m.is_set(i)).unwrap_or(false) {
                            continue;
                        }
                        match sv.get(index) {
                            Some(value) => ov[i] = *value,
                            None => self.sink.emit(&format!(
                                "vectorization: gather index {index} out of range, lane {i} skipped"
                            )),
                        }
                    }
                    return Ok(());
                }
            };
        }
        gather_arm!(I8);
        gather_arm!(I16);
        gather_arm!(I32);
        gather_arm!(I64);
        gather_arm!(U8);
        gather_arm!(U16);
        gather_arm!(U32);
        gather_arm!(U64);
        gather_arm!(F32);
        gather_arm!(F64);
        Err(VectorError::InvalidBuffer("operand/output buffer type mismatch".to_string()))
    }

    /// `Scatter`: `dest[indices[i]] = src[i]`.
    pub fn execute_scatter(
        &self,
        src: &VectorBuffer,
        indices: &[usize],
        dest: &mut VectorBuffer,
        mask: Option<&VectorMask>,
    ) -> Result<(), VectorError> {
        if src.len() != indices.len() {
            return Err(VectorError::InvalidSize(
                "scatter source must have one lane per index".to_string(),
            ));
        }
        macro_rules! scatter_arm {
            ($variant:ident) => {
                if let (VectorBuffer::$variant(sv), VectorBuffer::$variant(dv)) = (src, &mut *dest) {
                    for (i, &index) in indices.iter().enumerate() {
                        if mask.map(|m| !m.is_set(i)).unwrap_or(false) {
                            continue;
                        }
                        match dv.get_mut(index) {
                            Some(slot) => *slot = sv[i],
                            None => self.sink.emit(&format!(
                                "vectorization: scatter index {index} out of range, lane {i} skipped"
                            )),
                        }
                    }
                    return Ok(());
                }
            };
        }
        scatter_arm!(I8);
        scatter_arm!(I16);
        scatter_arm!(I32);
        scatter_arm!(I64);
        scatter_arm!(U8);
        scatter_arm!(U16);
        scatter_arm!(U32);
        scatter_arm!(U64);
        scatter_arm!(F32);
        scatter_arm!(F64);
        Err(VectorError::InvalidBuffer("operand/output buffer type mismatch".to_string()))
    }

    /// `Shuffle`: `out[i] = a[indices[i]]`, a pure permutation (no mask).
    pub fn execute_shuffle(&self, a: &VectorBuffer, indices: &[usize], out: &mut VectorBuffer) -> Result<(), VectorError> {
        self.execute_gather(a, indices, out, None)
    }

    /// `Blend`: picks `a[i]` where the mask is set, `b[i]` otherwise.
    pub fn execute_blend(
        &self,
        a: &VectorBuffer,
        b: &VectorBuffer,
        out: &mut VectorBuffer,
        mask: &VectorMask,
    ) -> Result<(), VectorError> {
        a.same_shape(b)?;
        a.same_shape(out)?;
        macro_rules! blend_arm {
            ($variant:ident) => {
                if let (VectorBuffer::$variant(av), VectorBuffer::$variant(bv), VectorBuffer::$variant(ov)) =
                    (a, b, &mut *out)
                {
                    for i in 0..av.len() {
                        ov[i] = if mask.is_set(i) { av[i] } else { bv[i] };
                    }
                    return Ok(());
                }
            };
        }
        blend_arm!(I8);
        blend_arm!(I16);
        blend_arm!(I32);
        blend_arm!(I64);
        blend_arm!(U8);
        blend_arm!(U16);
        blend_arm!(U32);
        blend_arm!(U64);
        blend_arm!(F32);
        blend_arm!(F64);
        Err(VectorError::InvalidBuffer("operand/output buffer type mismatch".to_string()))
    }

    pub fn data_type_alignment(&self, dtype: DataType) -> usize {
        let natural = match dtype {
            DataType::Int8 | DataType::UInt8 => 1,
            DataType::Int16 | DataType::UInt16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::UInt64 | DataType::Float64 => 8,
        };
        natural.max(self.active_set.alignment().min(natural.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_core::CapturingSink;
    use std::sync::Arc;

    fn engine() -> VectorEngine {
        VectorEngine::initialize(InstructionSet::Scalar, Arc::new(CapturingSink::new()))
    }

    #[test]
    fn from_config_clamps_a_requested_set_to_the_detected_ceiling() {
        let config = VectorizationConfig::default().with_requested_set(InstructionSet::Avx512);
        let sink = Arc::new(CapturingSink::new());
        let e = VectorEngine::from_config(config, Arc::clone(&sink) as Arc<dyn DiagnosticSink>);
        assert!(e.active_set() <= InstructionSet::detect());
    }

    #[test]
    fn integer_add_saturates_on_overflow() {
        let e = engine();
        let a = VectorBuffer::I8(vec![120, 10]);
        let b = VectorBuffer::I8(vec![20, 5]);
        let mut out = VectorBuffer::zeros(DataType::Int8, 2);
        e.execute_binary(VectorOp::Add, &a, &b, &mut out, None).unwrap();
        assert_eq!(out, VectorBuffer::I8(vec![127, 15]));
    }

    #[test]
    fn integer_division_by_zero_writes_zero_and_warns() {
        let sink = Arc::new(CapturingSink::new());
        let e = VectorEngine::initialize(InstructionSet::Scalar, Arc::clone(&sink) as Arc<dyn DiagnosticSink>);
        let a = VectorBuffer::I32(vec![10, 20]);
        let b = VectorBuffer::I32(vec![2, 0]);
        let mut out = VectorBuffer::zeros(DataType::Int32, 2);
        e.execute_binary(VectorOp::Div, &a, &b, &mut out, None).unwrap();
        assert_eq!(out, VectorBuffer::I32(vec![5, 0]));
        assert!(!sink.lines().is_empty());
    }

    #[test]
    fn float_division_by_near_zero_writes_zero() {
        let e = engine();
        let a = VectorBuffer::F64(vec![1.0]);
        let b = VectorBuffer::F64(vec![1e-12]);
        let mut out = VectorBuffer::zeros(DataType::Float64, 1);
        e.execute_binary(VectorOp::Div, &a, &b, &mut out, None).unwrap();
        assert_eq!(out, VectorBuffer::F64(vec![0.0]));
    }

    #[test]
    fn comparison_writes_a_u8_mask_buffer() {
        let e = engine();
        let a = VectorBuffer::I32(vec![1, 2, 3]);
        let b = VectorBuffer::I32(vec![1, 1, 4]);
        let mut out = VectorBuffer::zeros(DataType::UInt8, 3);
        e.execute_binary(VectorOp::Lt, &a, &b, &mut out, None).unwrap();
        assert_eq!(out, VectorBuffer::U8(vec![0, 0, 1]));
    }

    #[test]
    fn mask_skips_unset_lanes() {
        let e = engine();
        let a = VectorBuffer::I32(vec![1, 1, 1]);
        let b = VectorBuffer::I32(vec![1, 1, 1]);
        let mut out = VectorBuffer::I32(vec![9, 9, 9]);
        let mut mask = VectorMask::new(3);
        mask.set_mask(&[1], &CapturingSink::new());
        e.execute_binary(VectorOp::Add, &a, &b, &mut out, Some(&mask)).unwrap();
        assert_eq!(out, VectorBuffer::I32(vec![9, 2, 9]));
    }

    #[test]
    fn gather_collects_selected_lanes() {
        let e = engine();
        let src = VectorBuffer::F32(vec![10.0, 20.0, 30.0]);
        let mut out = VectorBuffer::zeros(DataType::Float32, 2);
        e.execute_gather(&src, &[2, 0], &mut out, None).unwrap();
        assert_eq!(out, VectorBuffer::F32(vec![30.0, 10.0]));
    }

    #[test]
    fn gather_skips_out_of_range_index_with_a_warning() {
        let sink = Arc::new(CapturingSink::new());
        let e = VectorEngine::initialize(InstructionSet::Scalar, Arc::clone(&sink) as Arc<dyn DiagnosticSink>);
        let src = VectorBuffer::I32(vec![1, 2]);
        let mut out = VectorBuffer::I32(vec![99]);
        e.execute_gather(&src, &[9], &mut out, None).unwrap();
        assert_eq!(out, VectorBuffer::I32(vec![99]));
        assert!(!sink.lines().is_empty());
    }

    #[test]
    fn blend_selects_by_mask() {
        let e = engine();
        let a = VectorBuffer::I32(vec![1, 1, 1]);
        let b = VectorBuffer::I32(vec![2, 2, 2]);
        let mut out = VectorBuffer::zeros(DataType::Int32, 3);
        let mut mask = VectorMask::new(3);
        mask.set_mask(&[0, 2], &CapturingSink::new());
        e.execute_blend(&a, &b, &mut out, &mask).unwrap();
        assert_eq!(out, VectorBuffer::I32(vec![1, 2, 1]));
    }

    #[test]
    fn set1_fills_every_lane() {
        let e = engine();
        let mut out = VectorBuffer::zeros(DataType::Float64, 3);
        e.execute_set1(ScalarValue::F64(4.5), &mut out, None).unwrap();
        assert_eq!(out, VectorBuffer::F64(vec![4.5, 4.5, 4.5]));
    }

    #[test]
    fn fma_computes_a_times_b_plus_c() {
        let e = engine();
        let a = VectorBuffer::F32(vec![2.0]);
        let b = VectorBuffer::F32(vec![3.0]);
        let c = VectorBuffer::F32(vec![1.0]);
        let mut out = VectorBuffer::zeros(DataType::Float32, 1);
        e.execute_fma(&a, &b, &c, &mut out, None).unwrap();
        assert_eq!(out, VectorBuffer::F32(vec![7.0]));
    }
}
