use std::collections::BTreeMap;

use crate::foundation::core::Millis;

/// Handle of one deferred callback in a [`TimerQueue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Deferred work keyed by due time, drained in `(due, insertion)` order.
///
/// Cancelling a timer that already fired (or never existed) is a no-op.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next: u64,
    queue: BTreeMap<(Millis, u64), T>,
    due_of: BTreeMap<u64, Millis>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next: 0,
            queue: BTreeMap::new(),
            due_of: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer `payload` until `due`.
    pub fn schedule(&mut self, due: Millis, payload: T) -> TimerId {
        let seq = self.next;
        self.next += 1;
        self.queue.insert((due, seq), payload);
        self.due_of.insert(seq, due);
        TimerId(seq)
    }

    /// Cancel a pending timer. Returns whether anything was removed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let Some(due) = self.due_of.remove(&id.0) else {
            return false;
        };
        self.queue.remove(&(due, id.0)).is_some()
    }

    /// Cancel every pending timer whose payload matches `pred`.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let doomed: Vec<(Millis, u64)> = self
            .queue
            .iter()
            .filter(|(_, p)| pred(p))
            .map(|(k, _)| *k)
            .collect();
        for key in &doomed {
            self.queue.remove(key);
            self.due_of.remove(&key.1);
        }
        doomed.len()
    }

    /// Cancel everything. Returns how many timers were pending.
    pub fn clear(&mut self) -> usize {
        let n = self.queue.len();
        self.queue.clear();
        self.due_of.clear();
        n
    }

    /// Remove and return every timer due at or before `now`.
    pub fn drain_due(&mut self, now: Millis) -> Vec<(Millis, T)> {
        let later = self.queue.split_off(&(now, u64::MAX));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_iter()
            .map(|((at, seq), payload)| {
                self.due_of.remove(&seq);
                (at, payload)
            })
            .collect()
    }

    /// Earliest pending due time.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/timer.rs"]
mod tests;
