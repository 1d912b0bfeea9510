#![forbid(unsafe_code)]

//! Host-driven deferred work.
//!
//! The page has exactly two kinds of delayed work (skill-bar width restore and
//! feedback-message removal). Both run on a [`TaskQueue`] whose clock only moves
//! when the host says so, which keeps every delayed transition reproducible in
//! tests.
//!
//! The host is expected to:
//! 1. schedule through the controller,
//! 2. ask for [`TaskQueue::next_deadline`] and arm a single wake-up timer,
//! 3. on wake-up, call [`TaskQueue::set_time`] and apply whatever became due.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock to `now`. Requests to go backwards are ignored.
    pub fn set(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Cancellation handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskHandle(u64);

impl TaskHandle {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Scheduled<T> {
    handle: TaskHandle,
    due: Duration,
    task: T,
}

/// Fixed-delay task queue ordered by deadline, FIFO among equal deadlines.
#[derive(Debug, Clone)]
pub struct TaskQueue<T> {
    clock: DeterministicClock,
    next_id: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock: DeterministicClock::new(),
            next_id: 0,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock.now()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run `task` once `delay` has elapsed on the queue clock.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let due = self.clock.now().saturating_add(delay);
        // Handles grow monotonically, so (due, handle) keeps equal deadlines FIFO.
        let idx = self
            .pending
            .partition_point(|s| (s.due, s.handle) <= (due, handle));
        self.pending.insert(idx, Scheduled { handle, due, task });
        tracing::trace!(handle = handle.0, due_ms = due.as_millis() as u64, "task scheduled");
        handle
    }

    /// Cancel a pending task. Returns the task if it had not run yet.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<T> {
        let idx = self.pending.iter().position(|s| s.handle == handle)?;
        tracing::trace!(handle = handle.0, "task cancelled");
        Some(self.pending.remove(idx).task)
    }

    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.iter().any(|s| s.handle == handle)
    }

    /// Earliest pending deadline on the queue clock.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.first().map(|s| s.due)
    }

    /// Advance by `dt` and return every task that became due, in order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.clock.advance(dt);
        self.drain_due()
    }

    /// Move to absolute time `now` and return every task that became due.
    pub fn set_time(&mut self, now: Duration) -> Vec<T> {
        self.clock.set(now);
        self.drain_due()
    }

    fn drain_due(&mut self) -> Vec<T> {
        let now = self.clock.now();
        let due = self.pending.partition_point(|s| s.due <= now);
        self.pending.drain(..due).map(|s| s.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deterministic_clock_is_monotonic() {
        let mut c = DeterministicClock::new();
        assert_eq!(c.now(), Duration::ZERO);

        c.advance(Duration::from_millis(10));
        c.set(Duration::from_millis(4));
        assert_eq!(c.now(), Duration::from_millis(10));

        // Saturation: don't panic or wrap.
        c.set(Duration::MAX);
        c.advance(Duration::from_secs(1));
        assert_eq!(c.now(), Duration::MAX);
    }

    #[test]
    fn tasks_fire_in_deadline_order() {
        let mut q = TaskQueue::new();
        q.schedule(Duration::from_millis(5000), "remove");
        q.schedule(Duration::from_millis(100), "restore");
        assert_eq!(q.next_deadline(), Some(Duration::from_millis(100)));

        assert!(q.advance(Duration::from_millis(99)).is_empty());
        assert_eq!(q.advance(Duration::from_millis(1)), vec!["restore"]);
        assert_eq!(q.set_time(Duration::from_secs(10)), vec!["remove"]);
        assert!(q.is_empty());
        assert_eq!(q.next_deadline(), None);
    }

    #[test]
    fn equal_deadlines_are_fifo() {
        let mut q = TaskQueue::new();
        for i in 0..4 {
            q.schedule(Duration::from_millis(100), i);
        }
        assert_eq!(q.advance(Duration::from_millis(100)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut q = TaskQueue::new();
        let h = q.schedule(Duration::from_millis(100), 'x');
        assert!(q.is_pending(h));
        assert_eq!(q.cancel(h), Some('x'));
        assert_eq!(q.cancel(h), None);
        assert!(q.advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut q = TaskQueue::new();
        q.set_time(Duration::from_millis(1000));
        q.schedule(Duration::from_millis(100), ());
        assert_eq!(q.next_deadline(), Some(Duration::from_millis(1100)));
    }
}
