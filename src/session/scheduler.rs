//! Debounced commit scheduling.
//!
//! Edits are queued per cell and sent together once no new edit has arrived
//! for one quiescence window. There is a single shared deadline: every
//! `schedule` call pushes it back. The scheduler never sleeps itself; the
//! caller polls it, usually after waiting until [`CommitScheduler::deadline`].

use sheetsync_core::{CellKey, CellValue};
use std::time::{Duration, Instant};

/// A cell write waiting to be persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingChange {
    pub sheet: usize,
    pub row: usize,
    pub col: usize,
    /// Mirror value before the first optimistic write of this window.
    pub original: CellValue,
    pub value: CellValue,
}

impl PendingChange {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.row, self.col)
    }
}

#[derive(Debug)]
pub struct CommitScheduler {
    window: Duration,
    queue: Vec<PendingChange>,
    deadline: Option<Instant>,
}

impl CommitScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            queue: Vec::new(),
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Queue `change`, replacing any pending change for the same cell, and
    /// restart the shared deadline.
    pub fn schedule(&mut self, change: PendingChange, now: Instant) {
        match self
            .queue
            .iter_mut()
            .find(|p| p.sheet == change.sheet && p.key() == change.key())
        {
            Some(pending) => pending.value = change.value,
            None => self.queue.push(change),
        }
        self.deadline = Some(now + self.window);
    }

    /// Next time `poll` will fire, if anything is queued.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending(&self) -> &[PendingChange] {
        &self.queue
    }

    /// Drain the queue if the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Vec<PendingChange> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Drain the queue now, in insertion order.
    pub fn flush(&mut self) -> Vec<PendingChange> {
        self.deadline = None;
        std::mem::take(&mut self.queue)
    }

    /// Drop the queue without sending; returns what was dropped.
    pub fn abandon(&mut self) -> Vec<PendingChange> {
        let dropped = self.flush();
        if !dropped.is_empty() {
            log::debug!("abandoned {} pending change(s)", dropped.len());
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(row: usize, col: usize, value: f64) -> PendingChange {
        PendingChange {
            sheet: 0,
            row,
            col,
            original: CellValue::Empty,
            value: CellValue::Number(value),
        }
    }

    #[test]
    fn test_rapid_schedules_coalesce_to_last_value() {
        let window = Duration::from_millis(400);
        let mut s = CommitScheduler::new(window);
        let t0 = Instant::now();
        for i in 0..10 {
            s.schedule(change(0, 0, i as f64), t0 + Duration::from_millis(i * 50));
        }
        // Deadline was pushed back by the last schedule.
        assert!(s.poll(t0 + Duration::from_millis(500)).is_empty());

        let fired = s.poll(t0 + Duration::from_millis(850));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].value, CellValue::Number(9.0));
        assert!(!s.is_pending());
        assert_eq!(s.deadline(), None);
    }

    #[test]
    fn test_keeps_first_original_and_order() {
        let mut s = CommitScheduler::new(Duration::from_millis(300));
        let now = Instant::now();
        let mut first = change(1, 1, 1.0);
        first.original = CellValue::text("before");
        s.schedule(first, now);
        s.schedule(change(0, 0, 2.0), now);
        s.schedule(change(1, 1, 3.0), now);

        let fired = s.flush();
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].key(), CellKey::new(1, 1));
        assert_eq!(fired[0].original, CellValue::text("before"));
        assert_eq!(fired[0].value, CellValue::Number(3.0));
        assert_eq!(fired[1].key(), CellKey::new(0, 0));
    }

    #[test]
    fn test_poll_before_deadline_keeps_queue() {
        let mut s = CommitScheduler::new(Duration::from_millis(300));
        let now = Instant::now();
        s.schedule(change(0, 0, 1.0), now);
        assert!(s.poll(now).is_empty());
        assert!(s.is_pending());
        assert_eq!(s.deadline(), Some(now + Duration::from_millis(300)));
    }

    #[test]
    fn test_abandon_clears_without_deadline() {
        let mut s = CommitScheduler::new(Duration::from_millis(300));
        let now = Instant::now();
        s.schedule(change(0, 0, 1.0), now);
        assert_eq!(s.abandon().len(), 1);
        assert!(s.poll(now + Duration::from_secs(1)).is_empty());
    }
}
