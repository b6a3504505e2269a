//! Cooperative task scheduler driven by the tick loop.
//!
//! Long-running sequences (staggered spawns, damage over time, orientation
//! delays) are modelled as scheduled continuations: a task waits a number of
//! seconds, comes due, and the engine runs one step of it. A step that wants
//! to continue reschedules itself with the same [`CancelToken`], so a single
//! `cancel()` stops the whole sequence.

use std::cell::Cell;
use std::rc::Rc;

use beachhead_core::constants::TIME_EPSILON;

/// Shared cancellation flag for a task and all of its continuations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A task whose wait has elapsed.
#[derive(Debug)]
pub struct Due<T> {
    pub token: CancelToken,
    pub payload: T,
}

#[derive(Debug)]
struct Entry<T> {
    remaining_secs: f64,
    token: CancelToken,
    payload: T,
}

/// Pending tasks in scheduling order.
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to come due after `delay_secs`, under a fresh token.
    pub fn schedule(&mut self, delay_secs: f64, payload: T) -> CancelToken {
        let token = CancelToken::new();
        self.schedule_with(delay_secs, token.clone(), payload);
        token
    }

    /// Schedule a continuation under an existing token.
    pub fn schedule_with(&mut self, delay_secs: f64, token: CancelToken, payload: T) {
        self.entries.push(Entry {
            remaining_secs: delay_secs.max(0.0),
            token,
            payload,
        });
    }

    /// Count every pending task down by `dt` and collect those whose wait
    /// has elapsed.
    ///
    /// A task scheduled with zero delay comes due on the next call; one
    /// scheduled with delay `d` comes due on the call that completes `d`
    /// seconds of countdown. Cancelled tasks are dropped without being
    /// returned.
    pub fn advance(&mut self, dt: f64) -> Vec<Due<T>> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());

        for mut entry in self.entries.drain(..) {
            if entry.token.is_cancelled() {
                continue;
            }
            entry.remaining_secs -= dt;
            if entry.remaining_secs <= TIME_EPSILON {
                due.push(Due {
                    token: entry.token,
                    payload: entry.payload,
                });
            } else {
                pending.push(entry);
            }
        }

        self.entries = pending;
        due
    }

    /// Number of pending, uncancelled tasks.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.token.is_cancelled())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            entry.token.cancel();
        }
    }
}
