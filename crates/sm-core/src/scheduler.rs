//! Cooperative event scheduler on a virtual millisecond clock
//!
//! Animation steps and completion signals are queued as timed events and
//! handed back one at a time. The caller fully handles each event before
//! asking for the next, so handlers never interleave.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Scheduled<E> {
    due_ms: f64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    // Reversed: BinaryHeap is a max-heap, earliest due (then lowest seq) first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Timed event queue
///
/// Events due at the same instant pop in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<E> {
    now_ms: f64,
    next_seq: u64,
    queue: BinaryHeap<Scheduled<E>>,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current virtual time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Queue `event` to fire `delay_ms` from now (negative delays fire now)
    pub fn schedule_in(&mut self, delay_ms: f64, event: E) {
        let due_ms = self.now_ms + delay_ms.max(0.0);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { due_ms, seq, event });
    }

    /// Due time of the earliest queued event
    pub fn next_due_ms(&self) -> Option<f64> {
        self.queue.peek().map(|s| s.due_ms)
    }

    /// Pop the earliest event if it is due at or before `until_ms`
    ///
    /// The clock moves to the event's due time.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<(f64, E)> {
        if self.next_due_ms()? > until_ms {
            return None;
        }
        self.pop_next()
    }

    /// Pop the earliest event regardless of its due time
    pub fn pop_next(&mut self) -> Option<(f64, E)> {
        let scheduled = self.queue.pop()?;
        self.now_ms = self.now_ms.max(scheduled.due_ms);
        Some((scheduled.due_ms, scheduled.event))
    }

    /// Move the clock forward without firing anything
    ///
    /// Non-finite targets are ignored.
    pub fn advance_to(&mut self, t_ms: f64) {
        if t_ms.is_finite() {
            self.now_ms = self.now_ms.max(t_ms);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every pending event; the clock is kept
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_pop_in_time_order() {
        let mut sched = Scheduler::new();
        sched.schedule_in(30.0, "c");
        sched.schedule_in(10.0, "a");
        sched.schedule_in(20.0, "b");

        let order: Vec<_> = std::iter::from_fn(|| sched.pop_next()).map(|(_, e)| e).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(sched.now_ms(), 30.0);
    }

    #[test]
    fn test_equal_due_times_are_fifo() {
        let mut sched = Scheduler::new();
        for i in 0..10 {
            sched.schedule_in(5.0, i);
        }
        let order: Vec<_> = std::iter::from_fn(|| sched.pop_next()).map(|(_, e)| e).collect();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_pop_due_respects_window() {
        let mut sched = Scheduler::new();
        sched.schedule_in(10.0, 1);
        sched.schedule_in(50.0, 2);

        assert_eq!(sched.pop_due(20.0), Some((10.0, 1)));
        assert_eq!(sched.pop_due(20.0), None);
        assert_eq!(sched.now_ms(), 10.0);
        assert_eq!(sched.len(), 1);

        sched.advance_to(20.0);
        assert_eq!(sched.now_ms(), 20.0);
        assert_eq!(sched.pop_due(50.0), Some((50.0, 2)));
        assert!(sched.is_empty());
    }

    #[test]
    fn test_schedule_is_relative_to_clock() {
        let mut sched = Scheduler::new();
        sched.advance_to(100.0);
        sched.schedule_in(5.0, ());
        sched.schedule_in(-3.0, ());
        assert_eq!(sched.next_due_ms(), Some(100.0));
        sched.pop_next();
        assert_eq!(sched.next_due_ms(), Some(105.0));
    }

    #[test]
    fn test_non_finite_advance_ignored() {
        let mut sched: Scheduler<()> = Scheduler::new();
        sched.advance_to(25.0);
        sched.advance_to(f64::INFINITY);
        sched.advance_to(f64::NAN);
        assert_eq!(sched.now_ms(), 25.0);
    }

    #[test]
    fn test_clear_keeps_clock() {
        let mut sched = Scheduler::new();
        sched.schedule_in(10.0, 0);
        sched.pop_next();
        sched.schedule_in(10.0, 1);
        sched.clear();
        assert!(sched.is_empty());
        assert_eq!(sched.now_ms(), 10.0);
    }
}
