//! Tracked timers.
//!
//! Every countdown, pause and poll the engine waits on is a handle in a
//! [`TimerQueue`]. Clearing the queue is the only teardown the engine needs:
//! a timer that is no longer in the queue can never fire.

use campus_types::Timestamp;
use std::collections::{BTreeMap, HashMap};

/// Handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Deadline-ordered set of pending timers carrying a payload `K`.
///
/// Timers sharing a deadline fire in the order they were scheduled.
#[derive(Debug)]
pub struct TimerQueue<K> {
    next_id: u64,
    pending: BTreeMap<(Timestamp, TimerId), K>,
    deadlines: HashMap<TimerId, Timestamp>,
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Schedule `payload` to fire at `at`.
    pub fn schedule(&mut self, at: Timestamp, payload: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((at, id), payload);
        self.deadlines.insert(id, at);
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(at) => self.pending.remove(&(at, id)).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.deadlines.clear();
        dropped
    }

    /// Remove and return the earliest timer whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(Timestamp, TimerId, K)> {
        let (&(at, id), _) = self.pending.iter().next()?;
        if at > now {
            return None;
        }
        self.deadlines.remove(&id);
        self.pending.remove(&(at, id)).map(|payload| (at, id, payload))
    }

    /// Deadline of the next timer to fire.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.pending.keys().next().map(|(at, _)| *at)
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
