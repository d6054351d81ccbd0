//! A single-threaded task queue over a simulated clock.
//!
//! The host feeds wall-clock time into the engine; deferred work (frame recompute, size
//! batch flush, scrolling-flag reset, edge retries) is keyed so that at most one instance of
//! each task is pending.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Task {
    /// Range/buffer recompute for the latest scroll offset.
    Frame,
    /// Apply the pending size observations.
    FlushSizes,
    /// Clear the scrolling flag.
    ScrollSettle,
    /// Re-check a scroll-to-top/bottom loop.
    EdgeRetry,
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    task: Task,
    due_ms: u64,
    seq: u64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Scheduler {
    now_ms: u64,
    seq: u64,
    queue: Vec<Scheduled>,
}

impl Scheduler {
    pub(crate) fn now(&self) -> u64 {
        self.now_ms
    }

    /// Moves the clock forward; time never goes backward.
    pub(crate) fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub(crate) fn is_pending(&self, task: Task) -> bool {
        self.queue.iter().any(|s| s.task == task)
    }

    /// Schedules `task` unless it is already pending; the earlier due time wins.
    pub(crate) fn throttle(&mut self, task: Task, delay_ms: u64) {
        if self.is_pending(task) {
            return;
        }
        self.push(task, delay_ms);
    }

    /// Schedules `task`, pushing back any pending instance.
    pub(crate) fn debounce(&mut self, task: Task, delay_ms: u64) {
        self.cancel(task);
        self.push(task, delay_ms);
    }

    pub(crate) fn cancel(&mut self, task: Task) {
        self.queue.retain(|s| s.task != task);
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
    }

    pub(crate) fn next_due(&self) -> Option<u64> {
        self.queue.iter().map(|s| s.due_ms).min()
    }

    /// Removes and returns the earliest task due at or before `until_ms`, advancing the clock
    /// to its due time.
    pub(crate) fn pop_due(&mut self, until_ms: u64) -> Option<Task> {
        let (pos, due_ms) = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= until_ms)
            .min_by_key(|(_, s)| (s.due_ms, s.seq))
            .map(|(i, s)| (i, s.due_ms))?;
        let scheduled = self.queue.swap_remove(pos);
        self.set_now(due_ms);
        Some(scheduled.task)
    }

    fn push(&mut self, task: Task, delay_ms: u64) {
        self.seq = self.seq.wrapping_add(1);
        self.queue.push(Scheduled {
            task,
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq: self.seq,
        });
    }
}
