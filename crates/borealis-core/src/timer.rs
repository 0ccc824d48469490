//! Timer system for Borealis.
//!
//! Timers are keyed by a duration and carry a callback whose return value
//! decides whether the timer repeats. One-shot behavior is a callback that
//! returns [`ControlFlow::Break`] after its first invocation.
//!
//! The manager itself never invokes callbacks while borrowed: the main
//! context takes a callback out, runs it unlocked, then hands it back with
//! [`TimerManager::finish`]. A callback may therefore add or remove timers,
//! including its own.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// What a timer callback wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    /// Keep the timer and fire again after its interval.
    Continue,
    /// Remove the timer.
    Break,
}

impl From<bool> for ControlFlow {
    fn from(repeat: bool) -> Self {
        if repeat { Self::Continue } else { Self::Break }
    }
}

/// A boxed timer callback.
pub(crate) type TimerCallback = Box<dyn FnMut() -> ControlFlow + Send + 'static>;

/// Internal timer data.
struct TimerData {
    /// When this timer should next fire.
    next_fire: Instant,
    /// The repeat interval.
    interval: Duration,
    /// `None` while the callback is running.
    callback: Option<TimerCallback>,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages all timers of one main context.
pub struct TimerManager {
    /// All live timers.
    timers: SlotMap<TimerId, TimerData>,
    /// Pending fires. Entries whose time no longer matches the timer's
    /// `next_fire` are stale and skipped.
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    /// Add a timer firing every `interval` until its callback breaks.
    pub(crate) fn add(&mut self, interval: Duration, callback: TimerCallback) -> TimerId {
        let next_fire = Instant::now() + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
            callback: Some(callback),
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        tracing::trace!(target: "borealis_core::timer", ?id, ?interval, "timer added");
        id
    }

    /// Remove a timer.
    ///
    /// Returns `true` if the timer was live. Removing a timer twice, or one
    /// that already broke, returns `false` and has no other effect.
    pub fn remove(&mut self, id: TimerId) -> bool {
        let removed = self.timers.remove(id).is_some();
        if removed {
            tracing::trace!(target: "borealis_core::timer", ?id, "timer removed");
        }
        removed
    }

    /// Check if a timer is live.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Number of live timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Time until the earliest live timer is due.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        self.prune_stale();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(Instant::now()))
    }

    /// Pop every timer due at `now`, in fire-time order.
    pub(crate) fn take_expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.peek() {
            if entry.fire_time > now {
                break;
            }
            let Some(entry) = self.queue.pop() else {
                break;
            };
            let live = self
                .timers
                .get(entry.id)
                .is_some_and(|t| t.next_fire == entry.fire_time);
            if live && !due.contains(&entry.id) {
                due.push(entry.id);
            }
        }
        due
    }

    /// Take a timer's callback out for invocation.
    ///
    /// Returns `None` if the timer is gone or its callback is already running.
    pub(crate) fn take_callback(&mut self, id: TimerId) -> Option<TimerCallback> {
        self.timers.get_mut(id)?.callback.take()
    }

    /// Return a callback after invocation and apply its verdict.
    ///
    /// If the timer was removed while its callback ran, the callback is
    /// dropped regardless of the verdict.
    pub(crate) fn finish(&mut self, id: TimerId, callback: TimerCallback, flow: ControlFlow) {
        if !self.timers.contains_key(id) {
            return;
        }
        match flow {
            ControlFlow::Break => {
                self.timers.remove(id);
                tracing::trace!(target: "borealis_core::timer", ?id, "timer finished");
            }
            ControlFlow::Continue => {
                if let Some(timer) = self.timers.get_mut(id) {
                    timer.callback = Some(callback);
                    timer.next_fire = Instant::now() + timer.interval;
                    self.queue.push(TimerQueueEntry {
                        id,
                        fire_time: timer.next_fire,
                    });
                }
            }
        }
    }

    fn prune_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            let live = self
                .timers
                .get(entry.id)
                .is_some_and(|t| t.next_fire == entry.fire_time);
            if live {
                break;
            }
            self.queue.pop();
        }
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}
