//! # Deferred Actions
//!
//! Animation delays and transient feedback are one-shot deferred actions.
//! The event loop asks for `next_deadline()` to size its poll timeout, then
//! drains whatever is `due()` through `Action::Tick`.
//!
//! There is no cancellation. A superseded timer still fires; handlers that
//! care (quiz feedback) carry a serial and ignore stale firings.

use std::time::{Duration, Instant};

/// Work to run once a deadline passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Swap pages at the end of the exit animation.
    FinishTransition,
    /// Start fading the feedback notice of a quiz group.
    FadeFeedback { group: String, serial: u64 },
    /// Remove the feedback notice of a quiz group.
    DismissFeedback { group: String, serial: u64 },
    /// Put the check control back to its neutral label.
    ResetCheckStatus,
    /// Drop the matched/mismatched indicator from a zone.
    ClearZone { zone: String, matched: bool },
}

#[derive(Debug)]
struct Scheduled {
    at: Instant,
    seq: u64,
    task: Deferred,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue: Vec<Scheduled>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `now + delay` has passed.
    pub fn schedule(&mut self, now: Instant, delay: Duration, task: Deferred) {
        self.seq += 1;
        self.queue.push(Scheduled {
            at: now + delay,
            seq: self.seq,
            task,
        });
    }

    /// Remove and return every task whose deadline is at or before `now`,
    /// ordered by deadline (ties in scheduling order), with the deadline.
    pub fn due(&mut self, now: Instant) -> Vec<(Instant, Deferred)> {
        let (mut ready, pending): (Vec<Scheduled>, Vec<Scheduled>) =
            self.queue.drain(..).partition(|s| s.at <= now);
        self.queue = pending;
        ready.sort_by_key(|s| (s.at, s.seq));
        ready.into_iter().map(|s| (s.at, s.task)).collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.iter().map(|s| s.at).min()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
