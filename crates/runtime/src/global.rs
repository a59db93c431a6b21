//! The process-wide default thread pool (spec.md §9 "Global runtime state")
//!
//! Lazily initialized on first use under a mutex-guarded slot, mirroring the
//! teacher's `scheduler.rs` singleton. `cleanup_default_pool` is the
//! explicit graceful-shutdown hook; if the process exits without calling
//! it, the worker threads are simply reclaimed by the OS. Unlike a plain
//! `std::sync::Once`, the slot can be torn down and lazily respawned more
//! than once per process, so `cleanup_default_pool` followed by further use
//! is well-defined.

use crate::error::RuntimeError;
use crate::pool::ThreadPool;
use std::sync::{Mutex, OnceLock};

static POOL: OnceLock<Mutex<Option<ThreadPool>>> = OnceLock::new();

fn slot() -> &'static Mutex<Option<ThreadPool>> {
    POOL.get_or_init(|| Mutex::new(None))
}

/// Returns a reference to the default pool, lazily spawning it sized to
/// the number of online CPUs on first call. `std::sync::Once` can't be
/// reset, so the lazy-init check lives under the same mutex `cleanup`
/// clears: a call after `cleanup_default_pool` spawns a fresh pool rather
/// than finding the slot permanently torn down.
fn with_default_pool<R>(f: impl FnOnce(&ThreadPool) -> R) -> Result<R, RuntimeError> {
    let mut guard = slot().lock().expect("default pool mutex poisoned");
    if guard.is_none() {
        *guard = Some(ThreadPool::init(0)?);
    }
    Ok(f(guard.as_ref().expect("just initialized above")))
}

pub fn default_num_threads() -> Result<usize, RuntimeError> {
    with_default_pool(ThreadPool::num_threads)
}

pub fn parallel_for_default<F>(
    start: i64,
    end: i64,
    step: i64,
    schedule: crate::work::ScheduleKind,
    chunk: i64,
    body: F,
) -> Result<(), RuntimeError>
where
    F: Fn(i64) + Send + Sync + 'static,
{
    with_default_pool(|pool| pool.parallel_for(start, end, step, schedule, chunk, body))?
}

/// Explicit graceful shutdown: joins every worker thread and clears the
/// global slot so a later call re-initializes a fresh pool.
pub fn cleanup_default_pool() {
    if let Some(pool) = slot().lock().expect("default pool mutex poisoned").take() {
        pool.cleanup();
    }
}
