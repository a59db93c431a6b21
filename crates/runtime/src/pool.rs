//! Fixed-size worker thread pool and the `parallel_for` entry point
//! (spec.md §4.I)
//!
//! Workers block on a mutex + condition variable pair with a 1-second
//! timeout so shutdown stays responsive even with no task to wake them.
//! `parallel_for` dispatches a [`crate::work::WorkDistribution`] across the
//! pool and blocks the calling thread until every worker has drained it or
//! reported a panic.

use crate::error::RuntimeError;
use crate::work::{ScheduleKind, WorkDistribution, WorkStats};
use anvil_core::{DiagnosticSink, StderrSink};
use std::any::Any;
use std::cell::Cell;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

type Task = Box<dyn FnOnce() + Send>;

const WORKER_POLL_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_BARRIER_TIMEOUT: Duration = Duration::from_secs(60);

/// Builder-style pool configuration, mirroring `compiler::pass::PassManagerConfig`'s
/// `with_*`/`Default` shape.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// `0` defers to the number of online CPUs (spec.md §4.I).
    pub num_threads: usize,
    pub barrier_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            num_threads: 0,
            barrier_timeout: DEFAULT_BARRIER_TIMEOUT,
        }
    }
}

impl PoolConfig {
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_barrier_timeout(mut self, timeout: Duration) -> Self {
        self.barrier_timeout = timeout;
        self
    }
}

thread_local! {
    static THREAD_ID: Cell<Option<usize>> = const { Cell::new(None) };
}

struct Shared {
    queue: Mutex<VecDeque<Task>>,
    queue_cond: Condvar,
    shutdown: AtomicBool,
    working_count: AtomicUsize,
    idle_cond: Condvar,
    idle_mutex: Mutex<()>,
}

pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    num_threads: usize,
    sink: Arc<dyn DiagnosticSink>,
    barrier: Arc<BarrierState>,
    default_barrier_timeout: Duration,
}

struct BarrierState {
    mutex: Mutex<BarrierInner>,
    cond: Condvar,
}

struct BarrierInner {
    generation: u64,
    waiting: usize,
}

impl ThreadPool {
    /// Spawns `num_threads` workers. `num_threads == 0` falls back to the
    /// number of online CPUs (spec.md §4.I: "default size = number of
    /// online CPUs").
    pub fn init(num_threads: usize) -> Result<Self, RuntimeError> {
        Self::init_with_sink(num_threads, Arc::new(StderrSink::default()))
    }

    pub fn init_with_sink(
        num_threads: usize,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, RuntimeError> {
        Self::init_with_config(
            PoolConfig::default().with_num_threads(num_threads),
            sink,
        )
    }

    /// Spawns a pool from a [`PoolConfig`], following the teacher's
    /// `CompilerConfig`-driven construction pattern.
    pub fn init_with_config(
        config: PoolConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, RuntimeError> {
        let num_threads =
            if config.num_threads == 0 { num_cpus::get() } else { config.num_threads };

        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            queue_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            working_count: AtomicUsize::new(0),
            idle_cond: Condvar::new(),
            idle_mutex: Mutex::new(()),
        });

        let mut workers = Vec::with_capacity(num_threads);
        for id in 0..num_threads {
            let shared = Arc::clone(&shared);
            let handle = std::thread::Builder::new()
                .name(format!("anvil-worker-{id}"))
                .spawn(move || worker_loop(id, shared))
                .map_err(|e| RuntimeError::PoolInitFailed(e.to_string()))?;
            workers.push(handle);
        }

        Ok(ThreadPool {
            shared,
            workers,
            num_threads,
            sink,
            barrier: Arc::new(BarrierState {
                mutex: Mutex::new(BarrierInner { generation: 0, waiting: 0 }),
                cond: Condvar::new(),
            }),
            default_barrier_timeout: config.barrier_timeout,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn thread_num() -> usize {
        THREAD_ID.with(|id| id.get().unwrap_or(0))
    }

    /// Runs `body(index)` for every iteration index in `[start, end)`
    /// stepping by `step`, distributed across the pool according to
    /// `schedule`. Blocks until every dispatched chunk has completed or
    /// failed.
    pub fn parallel_for<F>(
        &self,
        start: i64,
        end: i64,
        step: i64,
        schedule: ScheduleKind,
        chunk: i64,
        body: F,
    ) -> Result<(), RuntimeError>
    where
        F: Fn(i64) + Send + Sync + 'static,
    {
        self.parallel_for_with_stats(start, end, step, schedule, chunk, body).map(|_| ())
    }

    /// Identical to [`ThreadPool::parallel_for`] but also returns the
    /// distribution's steal/imbalance counters, for callers that want to
    /// observe scheduler behavior (spec.md §8 S8).
    pub fn parallel_for_with_stats<F>(
        &self,
        start: i64,
        end: i64,
        step: i64,
        schedule: ScheduleKind,
        chunk: i64,
        body: F,
    ) -> Result<WorkStats, RuntimeError>
    where
        F: Fn(i64) + Send + Sync + 'static,
    {
        let distribution = Arc::new(WorkDistribution::new(
            start,
            end,
            step,
            self.num_threads,
            schedule,
            chunk,
        )?);
        if distribution.total() == 0 {
            return Ok(distribution.stats());
        }

        let body = Arc::new(body);
        let remaining = Arc::new(AtomicUsize::new(self.num_threads));
        let done_mutex = Arc::new(Mutex::new(()));
        let done_cond = Arc::new(Condvar::new());
        let failures: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        for worker_id in 0..self.num_threads {
            let distribution = Arc::clone(&distribution);
            let body = Arc::clone(&body);
            let remaining = Arc::clone(&remaining);
            let done_mutex = Arc::clone(&done_mutex);
            let done_cond = Arc::clone(&done_cond);
            let failures = Arc::clone(&failures);

            self.submit(move || {
                THREAD_ID.with(|id| id.set(Some(worker_id)));
                while let Some(index) = distribution.next(worker_id) {
                    let actual = start + index as i64 * step;
                    let outcome = catch_unwind(AssertUnwindSafe(|| body(actual)));
                    if let Err(payload) = outcome {
                        failures.lock().expect("failures mutex poisoned").push(panic_message(&payload));
                    }
                    distribution.on_item_consumed(worker_id);
                }
                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let _guard = done_mutex.lock().expect("done mutex poisoned");
                    done_cond.notify_all();
                }
            });
        }

        let guard = done_mutex.lock().expect("done mutex poisoned");
        let _unused = done_cond
            .wait_while(guard, |_| remaining.load(Ordering::Acquire) > 0)
            .expect("done mutex poisoned while waiting");

        let failures = Arc::try_unwrap(failures)
            .map(|m| m.into_inner().expect("failures mutex poisoned"))
            .unwrap_or_default();
        if failures.is_empty() {
            Ok(distribution.stats())
        } else {
            Err(RuntimeError::TaskPanicked(failures.join("; ")))
        }
    }

    fn submit<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.working_count.fetch_add(1, Ordering::AcqRel);
        let mut queue = self.shared.queue.lock().expect("task queue poisoned");
        queue.push_back(Box::new(task));
        self.shared.queue_cond.notify_one();
    }

    /// A global N-wait barrier. Every participant calls `barrier()`; the
    /// last to arrive releases the rest. If `timeout` elapses before all
    /// `participants` arrive, the barrier is forcibly reset and a warning
    /// is emitted so no thread waits forever on a missing participant.
    pub fn barrier(&self, participants: usize) {
        self.barrier_with_timeout(participants, self.default_barrier_timeout)
    }

    pub fn barrier_with_timeout(&self, participants: usize, timeout: Duration) {
        let mut inner = self.barrier.mutex.lock().expect("barrier mutex poisoned");
        let my_generation = inner.generation;
        inner.waiting += 1;

        if inner.waiting >= participants {
            inner.waiting = 0;
            inner.generation += 1;
            self.barrier.cond.notify_all();
            return;
        }

        let deadline = Instant::now() + timeout;
        loop {
            if inner.generation != my_generation {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                self.sink.emit("parallel_barrier: timed out waiting for participants, resetting");
                inner.waiting = 0;
                inner.generation += 1;
                self.barrier.cond.notify_all();
                return;
            }
            let (guard, _timeout_result) = self
                .barrier
                .cond
                .wait_timeout(inner, deadline - now)
                .expect("barrier mutex poisoned while waiting");
            inner = guard;
        }
    }

    /// Signals shutdown, wakes every worker, and joins them. Best-effort:
    /// a worker that never observes the shutdown flag (e.g. wedged on a
    /// user task) is still joined, just later, since there is no
    /// cooperative cancellation in v1 (spec.md §5).
    pub fn cleanup(mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.queue_cond.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        self.shared.queue.lock().expect("task queue poisoned").clear();
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked with a non-string payload".to_string()
    }
}

fn worker_loop(_id: usize, shared: Arc<Shared>) {
    loop {
        let mut queue = shared.queue.lock().expect("task queue poisoned");
        loop {
            if shared.shutdown.load(Ordering::Acquire) {
                return;
            }
            if let Some(task) = queue.pop_front() {
                drop(queue);
                task();
                shared.working_count.fetch_sub(1, Ordering::AcqRel);
                let _notify = shared.idle_mutex.lock().expect("idle mutex poisoned");
                shared.idle_cond.notify_all();
                break;
            }
            let (guard, _timeout_result) = shared
                .queue_cond
                .wait_timeout(queue, WORKER_POLL_TIMEOUT)
                .expect("task queue poisoned while waiting");
            queue = guard;
            if shared.shutdown.load(Ordering::Acquire) {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicI64;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn parallel_for_visits_every_index_exactly_once() {
        let pool = ThreadPool::init(4).unwrap();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        pool.parallel_for(0, 200, 1, ScheduleKind::Dynamic, -1, move |i| {
            seen_clone.lock().unwrap().push(i);
        })
        .unwrap();
        let mut values = seen.lock().unwrap().clone();
        values.sort_unstable();
        assert_eq!(values, (0..200).collect::<Vec<_>>());
        pool.cleanup();
    }

    #[test]
    fn parallel_for_on_empty_range_is_a_no_op() {
        let pool = ThreadPool::init(2).unwrap();
        let sum = Arc::new(AtomicI64::new(0));
        let sum_clone = Arc::clone(&sum);
        pool.parallel_for(5, 5, 1, ScheduleKind::Static, -1, move |i| {
            sum_clone.fetch_add(i, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(sum.load(Ordering::Relaxed), 0);
        pool.cleanup();
    }

    #[test]
    fn a_panicking_task_is_reported_without_crashing_the_pool() {
        let pool = ThreadPool::init(2).unwrap();
        let result = pool.parallel_for(0, 4, 1, ScheduleKind::Static, -1, |i| {
            if i == 2 {
                panic!("boom");
            }
        });
        assert!(result.is_err());
        pool.cleanup();
    }

    #[test]
    fn parallel_for_with_stats_reports_steals_under_static_imbalance() {
        let pool = ThreadPool::init(2).unwrap();
        let stats = pool
            .parallel_for_with_stats(0, 100, 1, ScheduleKind::Static, -1, |_| {})
            .unwrap();
        assert!(stats.steals_attempted >= 1);
        pool.cleanup();
    }

    #[test]
    fn init_with_config_honors_custom_barrier_timeout() {
        let config = PoolConfig::default()
            .with_num_threads(2)
            .with_barrier_timeout(Duration::from_millis(50));
        let pool = ThreadPool::init_with_config(config, Arc::new(StderrSink::default())).unwrap();
        assert_eq!(pool.num_threads(), 2);
        pool.cleanup();
    }

    #[test]
    fn barrier_releases_once_every_participant_arrives() {
        let pool = Arc::new(ThreadPool::init(3).unwrap());
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || pool.barrier(3))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
