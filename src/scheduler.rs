// Copyright (c) 2026 rezky_nightky

//! Deferred effects, polled once per tick against the simulation clock.
//!
//! Every scheduled entry gets a fresh, monotonically increasing [`TaskId`] and
//! can be cancelled with it, so re-triggering an effect never leaves a stale
//! timer behind.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Timer<E> {
    id: TaskId,
    due: Duration,
    effect: E,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            timers: Vec::new(),
        }
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, effect: E) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: now + delay,
            effect,
        });
        id
    }

    /// Drops a pending entry. Returns its effect, or `None` if it already
    /// fired or was never scheduled here.
    pub fn cancel(&mut self, id: TaskId) -> Option<E> {
        let i = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.swap_remove(i).effect)
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Removes and returns every effect due at `now`, oldest deadline first,
    /// ties broken by scheduling order.
    pub fn poll(&mut self, now: Duration) -> Vec<E> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].due <= now {
                due.push(self.timers.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|t| (t.due, t.id));
        due.into_iter().map(|t| t.effect).collect()
    }

    /// Removes everything without running it. Ids are never reused.
    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_only_when_due() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), ms(200), "restore");
        assert!(s.poll(ms(199)).is_empty());
        assert_eq!(s.poll(ms(200)), vec!["restore"]);
        assert!(s.poll(ms(10_000)).is_empty());
    }

    #[test]
    fn ids_are_monotonic_and_cancel_by_id() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(0), ms(50), 'a');
        let b = s.schedule(ms(0), ms(50), 'b');
        assert!(b > a);
        assert_eq!(s.cancel(a), Some('a'));
        assert_eq!(s.cancel(a), None);
        assert!(!s.is_pending(a));
        assert!(s.is_pending(b));
        assert_eq!(s.poll(ms(60)), vec!['b']);
    }

    #[test]
    fn due_effects_come_back_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(0), ms(30), 3);
        s.schedule(ms(0), ms(10), 1);
        s.schedule(ms(0), ms(20), 2);
        s.schedule(ms(0), ms(10), 4);
        assert_eq!(s.poll(ms(100)), vec![1, 4, 2, 3]);
        assert!(s.is_empty());
    }

    #[test]
    fn clear_does_not_recycle_ids() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(0), ms(1), ());
        s.clear();
        assert_eq!(s.len(), 0);
        let b = s.schedule(ms(0), ms(1), ());
        assert!(b > a);
    }
}
