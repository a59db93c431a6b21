//! Runtime error taxonomy (spec.md §7) plus a thread-local "last error" slot
//!
//! Mirrors the teacher's `runtime/src/error.rs`: plain enums with hand-written
//! `Display`, and a `thread_local!` cell that callers on the conceptual
//! C-ABI shim (spec.md §6) can poll after a call returns a bare failure
//! signal instead of a `Result`.

use std::cell::RefCell;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    PoolInitFailed(String),
    InvalidRange(String),
    Overflow(String),
    JoinFailed(String),
    BarrierTimedOut,
    TaskPanicked(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::PoolInitFailed(msg) => write!(f, "thread pool init failed: {msg}"),
            RuntimeError::InvalidRange(msg) => write!(f, "invalid range: {msg}"),
            RuntimeError::Overflow(msg) => write!(f, "overflow: {msg}"),
            RuntimeError::JoinFailed(msg) => write!(f, "worker join failed: {msg}"),
            RuntimeError::BarrierTimedOut => write!(f, "barrier wait timed out"),
            RuntimeError::TaskPanicked(msg) => write!(f, "task panicked: {msg}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

#[derive(Debug, Clone, PartialEq)]
pub enum VectorError {
    InvalidBuffer(String),
    InvalidSize(String),
    UnsupportedOp(String),
    AllocationFailed(String),
    /// Skipped with a warning rather than treated as fatal, per spec.md §7.
    InvalidMaskIndex(String),
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorError::InvalidBuffer(msg) => write!(f, "invalid buffer: {msg}"),
            VectorError::InvalidSize(msg) => write!(f, "invalid size: {msg}"),
            VectorError::UnsupportedOp(msg) => write!(f, "unsupported operation: {msg}"),
            VectorError::AllocationFailed(msg) => write!(f, "allocation failed: {msg}"),
            VectorError::InvalidMaskIndex(msg) => write!(f, "invalid mask index: {msg}"),
        }
    }
}

impl std::error::Error for VectorError {}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Records `message` as this thread's last error, for the conceptual C-ABI
/// shim (spec.md §6) where a bare status code is returned instead of a
/// `Result`.
pub fn set_last_error(message: impl Into<String>) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message.into()));
}

pub fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_error_round_trips_on_this_thread() {
        assert!(take_last_error().is_none());
        set_last_error("boom");
        assert_eq!(take_last_error().as_deref(), Some("boom"));
        assert!(take_last_error().is_none());
    }

    #[test]
    fn display_messages_name_the_failure() {
        assert_eq!(RuntimeError::BarrierTimedOut.to_string(), "barrier wait timed out");
        assert!(VectorError::InvalidSize("zero length".to_string())
            .to_string()
            .contains("zero length"));
    }
}
