//! Work-distribution state machine for `parallel for` (spec.md §4.H)
//!
//! One [`WorkDistribution`] is constructed per active parallel loop. Each
//! worker thread owns a [`ThreadWorkState`] behind its own `Mutex`; a shared
//! cursor (behind a second `Mutex`) hands out chunks for the Dynamic and
//! Guided disciplines. Lock ordering when stealing: the thief's mutex is
//! always acquired before the victim's (spec.md §5).

use crate::error::RuntimeError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    Static,
    Dynamic,
    Guided,
    Auto,
}

/// Per-thread cursor into its currently assigned contiguous range of
/// iteration indices, `[start_index, end_index)`.
#[derive(Debug, Clone, Copy, Default)]
struct ThreadWorkState {
    start_index: u64,
    end_index: u64,
}

impl ThreadWorkState {
    fn remaining(&self) -> u64 {
        self.end_index.saturating_sub(self.start_index)
    }

    fn take_one(&mut self) -> Option<u64> {
        if self.start_index < self.end_index {
            let index = self.start_index;
            self.start_index += 1;
            Some(index)
        } else {
            None
        }
    }
}

/// Shared cursor consumed by the Dynamic and Guided disciplines.
struct SharedCursor {
    next_index: u64,
    total: u64,
}

/// `optimal_chunk` heuristic used when the caller passes `chunk_size <= 0`
/// (spec.md §4.H).
pub fn optimal_chunk(total: u64, num_threads: usize) -> u64 {
    let num_threads = num_threads.max(1) as u64;
    let divisions = if total < 4 * num_threads {
        1
    } else if total < 100 {
        num_threads * 8
    } else if total < 1000 {
        num_threads * 6
    } else if total < 10_000 {
        num_threads * 4
    } else {
        num_threads * 2
    };
    (total / divisions.max(1)).max(1)
}

/// Read-only counters snapshotted off a [`WorkDistribution`] after a
/// `parallel_for` completes, grounded in the teacher's
/// `TOTAL_SPAWNED`/`TOTAL_COMPLETED`/`PEAK_STRANDS` atomic-counter
/// diagnostics in `scheduler.rs` (spec.md §8 S8: "steal counter > 0").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkStats {
    pub steals_attempted: u64,
    pub steals_succeeded: u64,
    pub imbalance_remediations: u64,
}

impl WorkStats {
    /// JSON snapshot for runtime introspection, mirroring
    /// `compiler::pass::PassManager::stats_snapshot`'s hand-assembled
    /// `serde_json::json!` shape rather than a derived `Serialize` impl.
    pub fn to_json(self) -> serde_json::Value {
        serde_json::json!({
            "steals_attempted": self.steals_attempted,
            "steals_succeeded": self.steals_succeeded,
            "imbalance_remediations": self.imbalance_remediations,
        })
    }
}

pub struct WorkDistribution {
    schedule: ScheduleKind,
    num_threads: usize,
    total: u64,
    /// Dynamic's request size. Interior-mutable because `detect_imbalance`
    /// halves it in place when an imbalance is detected (spec.md §4.H:
    /// "Dynamic with chunk > 1 -> halve initial chunk (floor 1)") — every
    /// thread shares the same `WorkDistribution`, so this can't just be a
    /// plain field.
    initial_chunk: AtomicU64,
    min_chunk: u64,
    threads: Vec<Mutex<ThreadWorkState>>,
    cursor: Mutex<SharedCursor>,
    items_since_rebalance: AtomicU64,
    steals_attempted: AtomicU64,
    steals_succeeded: AtomicU64,
    imbalance_remediations: AtomicU64,
}

impl WorkDistribution {
    /// Validates `step > 0`, computes `total` with overflow-checked
    /// arithmetic, and assigns each schedule's initial chunks.
    pub fn new(
        start: i64,
        end: i64,
        step: i64,
        num_threads: usize,
        schedule: ScheduleKind,
        chunk_size: i64,
    ) -> Result<Self, RuntimeError> {
        if step <= 0 {
            return Err(RuntimeError::InvalidRange(format!(
                "step must be > 0, found {step}"
            )));
        }
        // spec.md §4.H: "An empty range (start >= end) is a successful
        // no-op", so `end <= start` is zero iterations, never an error.
        let total = if end <= start {
            0
        } else {
            let span = end
                .checked_sub(start)
                .ok_or_else(|| RuntimeError::Overflow("end - start overflowed".to_string()))?;
            (span as u64).div_ceil(step as u64)
        };

        let num_threads = num_threads.max(1);
        let initial_chunk = if chunk_size > 0 {
            chunk_size as u64
        } else {
            optimal_chunk(total, num_threads)
        };
        let min_chunk = 1;

        let mut threads: Vec<Mutex<ThreadWorkState>> =
            (0..num_threads).map(|_| Mutex::new(ThreadWorkState::default())).collect();

        let mut next_index = 0u64;
        match schedule {
            ScheduleKind::Static => {
                let per_thread = total.div_ceil(num_threads as u64);
                for state in threads.iter_mut() {
                    let start_index = next_index.min(total);
                    let end_index = (next_index + per_thread).min(total);
                    *state.get_mut().expect("uncontended at construction") =
                        ThreadWorkState { start_index, end_index };
                    next_index = end_index;
                }
                next_index = total;
            }
            ScheduleKind::Dynamic | ScheduleKind::Guided | ScheduleKind::Auto => {
                // Threads start empty; chunks are handed out from the
                // shared cursor on first `next()`.
            }
        }

        Ok(WorkDistribution {
            schedule,
            num_threads,
            total,
            initial_chunk: AtomicU64::new(initial_chunk),
            min_chunk,
            threads,
            cursor: Mutex::new(SharedCursor {
                next_index,
                total,
            }),
            items_since_rebalance: AtomicU64::new(0),
            steals_attempted: AtomicU64::new(0),
            steals_succeeded: AtomicU64::new(0),
            imbalance_remediations: AtomicU64::new(0),
        })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Snapshot of steal and imbalance-remediation counters, read with
    /// `Relaxed` ordering since they are diagnostics, not synchronization
    /// (spec.md §8 S8).
    pub fn stats(&self) -> WorkStats {
        WorkStats {
            steals_attempted: self.steals_attempted.load(Ordering::Relaxed),
            steals_succeeded: self.steals_succeeded.load(Ordering::Relaxed),
            imbalance_remediations: self.imbalance_remediations.load(Ordering::Relaxed),
        }
    }

    fn guided_chunk(&self, remaining: u64) -> u64 {
        let r = if self.total == 0 { 0.0 } else { remaining as f64 / self.total as f64 };
        if remaining < 4 * self.num_threads as u64 {
            return 1;
        }
        let divisor: u64 = if r > 0.75 {
            2
        } else if r > 0.5 {
            3
        } else if r > 0.25 {
            4
        } else {
            8
        };
        (remaining / (self.num_threads as u64 * divisor)).max(self.min_chunk)
    }

    /// Pulls a new chunk for `thread_id` from the shared cursor, sizing it
    /// per the active discipline. Returns `false` if the cursor is
    /// exhausted.
    fn pull_chunk(&self, thread_id: usize) -> bool {
        let mut cursor = self.cursor.lock().expect("work distribution cursor poisoned");
        let remaining = cursor.total.saturating_sub(cursor.next_index);
        if remaining == 0 {
            return false;
        }
        let chunk = match self.schedule {
            ScheduleKind::Dynamic => self.initial_chunk.load(Ordering::Relaxed).min(remaining),
            ScheduleKind::Guided | ScheduleKind::Auto => self.guided_chunk(remaining).min(remaining),
            ScheduleKind::Static => remaining.min(1),
        };
        let start_index = cursor.next_index;
        cursor.next_index += chunk;
        drop(cursor);

        let mut state = self.threads[thread_id]
            .lock()
            .expect("per-thread work state poisoned");
        state.start_index = start_index;
        state.end_index = start_index + chunk;
        true
    }

    /// Core iterator: the next iteration index for `thread_id`, or `None`
    /// once this thread has no more work to do (after attempting a steal
    /// when the discipline allows it).
    pub fn next(&self, thread_id: usize) -> Option<u64> {
        {
            let mut state = self.threads[thread_id]
                .lock()
                .expect("per-thread work state poisoned");
            if let Some(index) = state.take_one() {
                return Some(index);
            }
        }

        if self.pull_chunk(thread_id) {
            let mut state = self.threads[thread_id]
                .lock()
                .expect("per-thread work state poisoned");
            if let Some(index) = state.take_one() {
                return Some(index);
            }
        }

        if matches!(self.schedule, ScheduleKind::Auto | ScheduleKind::Static) {
            if self.steal(thread_id) {
                let mut state = self.threads[thread_id]
                    .lock()
                    .expect("per-thread work state poisoned");
                return state.take_one();
            }
        }

        None
    }

    /// Scans other threads under a try-lock and takes a fraction of the
    /// richest victim's remaining range. Falls back to a linear
    /// first-available scan if that richest victim's lock can't be taken.
    pub fn steal(&self, thief_id: usize) -> bool {
        self.steals_attempted.fetch_add(1, Ordering::Relaxed);

        let mut richest: Option<(usize, u64)> = None;
        for (id, thread) in self.threads.iter().enumerate() {
            if id == thief_id {
                continue;
            }
            if let Ok(state) = thread.try_lock() {
                let remaining = state.remaining();
                if remaining > 0 && richest.map(|(_, best)| remaining > best).unwrap_or(true) {
                    richest = Some((id, remaining));
                }
            }
        }

        let Some((victim_id, remaining)) = richest else {
            return false;
        };

        let steal_count = if remaining >= 100 {
            (remaining * 3) / 4
        } else if remaining >= 10 {
            remaining / 2
        } else {
            1
        }
        .max(1);

        // Lock ordering: thief before victim.
        let (thief_id, victim_id) = (thief_id, victim_id);
        let mut thief = self.threads[thief_id].lock().expect("thief lock poisoned");
        let victim_lock = self.threads[victim_id].try_lock();
        let mut victim = match victim_lock {
            Ok(guard) => guard,
            Err(_) => {
                return self.steal_linear_fallback(thief_id, &mut thief);
            }
        };

        if victim.remaining() == 0 {
            return false;
        }
        let take = steal_count.min(victim.remaining());
        victim.end_index -= take;
        let stolen_start = victim.end_index;
        thief.start_index = stolen_start;
        thief.end_index = stolen_start + take;
        self.steals_succeeded.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn steal_linear_fallback(&self, thief_id: usize, thief: &mut ThreadWorkState) -> bool {
        for (id, thread) in self.threads.iter().enumerate() {
            if id == thief_id {
                continue;
            }
            if let Ok(mut victim) = thread.try_lock() {
                let remaining = victim.remaining();
                if remaining == 0 {
                    continue;
                }
                let take = remaining.min(1);
                victim.end_index -= take;
                let stolen_start = victim.end_index;
                thief.start_index = stolen_start;
                thief.end_index = stolen_start + take;
                self.steals_succeeded.fetch_add(1, Ordering::Relaxed);
                return true;
            }
        }
        false
    }

    /// Counts idle vs. busy threads and, if imbalanced, nudges the
    /// schedule's parameters or signals the caller to steal (spec.md
    /// §4.H). Returns whether it triggered remediation.
    pub fn detect_imbalance(&self, caller_id: usize) -> bool {
        let mut idle = 0usize;
        let mut richest: u64 = 0;
        for thread in &self.threads {
            if let Ok(state) = thread.try_lock() {
                let remaining = state.remaining();
                if remaining == 0 {
                    idle += 1;
                }
                richest = richest.max(remaining);
            }
        }

        let caller_idle = self.threads[caller_id]
            .try_lock()
            .map(|s| s.remaining() == 0)
            .unwrap_or(false);

        let imbalance = idle > 0 && richest > 0;

        let triggered = match self.schedule {
            ScheduleKind::Static => imbalance,
            ScheduleKind::Dynamic => {
                imbalance
                    && self
                        .initial_chunk
                        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |prev| {
                            (prev > 1).then(|| (prev / 2).max(1))
                        })
                        .is_ok()
            }
            ScheduleKind::Guided | ScheduleKind::Auto => false,
        };

        if triggered {
            self.imbalance_remediations.fetch_add(1, Ordering::Relaxed);
        }

        if caller_idle {
            let stole = self.steal(caller_id);
            if stole && !triggered {
                self.imbalance_remediations.fetch_add(1, Ordering::Relaxed);
            }
            return stole || triggered;
        }

        triggered
    }

    pub fn on_item_consumed(&self, thread_id: usize) {
        let count = self.items_since_rebalance.fetch_add(1, Ordering::Relaxed) + 1;
        if matches!(self.schedule, ScheduleKind::Auto) && count % 16 == 0 {
            self.detect_imbalance(thread_id);
        }
    }
}
