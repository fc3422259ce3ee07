//! Cancellable timers driven by the host's event loop
//!
//! Nothing here sleeps or spawns. The host asks for [`TimerQueue::next_deadline`],
//! wakes up at (or after) that instant and drains due entries with
//! [`TimerQueue::pop_due`].

use std::time::Instant;

use super::events::{SyntheticEvent, TouchId};

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    deadline: Instant,
    task: T,
}

/// Work the registry defers onto its queue
#[derive(Debug, Clone, PartialEq)]
pub enum TimerTask {
    /// Promote a held touch to a secondary click
    LongPress(TouchId),
    /// Report a touch held still in secondary-click state
    Ping(TouchId),
    /// A synthetic step waiting out its settle delay
    Deferred(SyntheticEvent),
}

/// Deadline-ordered queue of pending tasks
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `task` to become due at `deadline`
    pub fn schedule(&mut self, deadline: Instant, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, deadline, task });
        id
    }

    /// Cancel a pending timer, returning its task if it had not fired yet
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index).task)
    }

    /// Remove and return the earliest task due at `now`
    ///
    /// Tasks with equal deadlines come out in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.id.0))
            .map(|(i, _)| i)?;
        let entry = self.entries.remove(index);
        Some((entry.id, entry.task))
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
