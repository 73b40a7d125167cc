//! One-shot timer seam and a deterministic virtual clock.
//!
//! # Design
//! - Timers are fire-and-forget: there is no handle and no cancellation.
//! - [`ManualScheduler`] is driven by the host, which advances time explicitly
//!   and runs whatever became due.

use std::time::Duration;

use crate::core::events::PageTask;

/// Schedules a [`PageTask`] to run once after a delay.
pub trait Scheduler {
    /// Queue `task` to run after `delay`.
    fn schedule(&mut self, delay: Duration, task: PageTask);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    due: Duration,
    seq: u64,
    task: PageTask,
}

/// Host-driven scheduler backed by a monotonic virtual clock.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl ManualScheduler {
    /// Scheduler whose clock starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of tasks still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Pop the earliest task due at or before `deadline`, moving the clock to its due time.
    ///
    /// Ties are broken by scheduling order. Call repeatedly so tasks scheduled by
    /// a task that just ran are picked up within the same advance.
    pub fn next_due(&mut self, deadline: Duration) -> Option<PageTask> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due <= deadline)
            .min_by_key(|(_, pending)| (pending.due, pending.seq))
            .map(|(index, _)| index)?;
        let pending = self.pending.swap_remove(index);
        self.now = self.now.max(pending.due);
        Some(pending.task)
    }

    /// Move the clock forward to `deadline` once no more tasks are due.
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration, task: PageTask) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.pending.push(Pending {
            due: self.now.saturating_add(delay),
            seq,
            task,
        });
    }
}
