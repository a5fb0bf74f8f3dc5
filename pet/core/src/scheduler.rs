//! Scheduling Primitives
//!
//! Everything the cooperative loop needs to know about time, with no
//! sleeping of its own:
//!
//! - [`Clock`]: where "now" comes from. [`TokioClock`] follows tokio's clock
//!   (and therefore its paused test clock); [`ManualClock`] only moves when a
//!   test advances it.
//! - [`TimerQueue`]: one-shot deadlines (return-to-idle, poop retry) that can
//!   be cancelled by id.
//! - [`Cadence`]: the single recurring decay timer, kept on absolute
//!   fire times so a late poll never shifts the schedule.
//!
//! # Drift
//!
//! ```text
//!   interval = 15s, start = 0
//!   fires at:   15   30   45   60 ...
//!   polled at:  15   31   52   60
//!   next set:   30   45   60   75      (previous + interval, never now + interval)
//! ```
//!
//! A poll that arrives more than one interval late fires once and skips the
//! missed slots: skipped ticks are lost, not queued.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;

// =============================================================================
// Clocks
// =============================================================================

/// Source of the current instant
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Tokio's clock (honours `tokio::time::pause` in tests)
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-cranked clock for deterministic tests
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Clock frozen at the current instant
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// =============================================================================
// One-shot Timers
// =============================================================================

/// Handle for cancelling a scheduled timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<K> {
    id: TimerId,
    deadline: Instant,
    kind: K,
}

/// One-shot deadlines, fired earliest first
#[derive(Debug)]
pub struct TimerQueue<K> {
    entries: Vec<Entry<K>>,
    next_id: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K> TimerQueue<K> {
    /// Empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `deadline`
    pub fn schedule(&mut self, deadline: Instant, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, deadline, kind });
        id
    }

    /// Cancel a timer; `false` if it already fired or never existed
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Remove and return the earliest timer whose deadline is not after `now`
    ///
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerId, K)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.id.0))
            .map(|(i, _)| i)?;
        let entry = self.entries.remove(idx);
        Some((entry.id, entry.kind))
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Recurring Cadence
// =============================================================================

/// Fixed-interval recurring timer on absolute fire times
#[derive(Clone, Debug)]
pub struct Cadence {
    interval: Duration,
    next_fire: Instant,
}

impl Cadence {
    /// First fire one interval after `start`
    ///
    /// A zero interval is raised to one millisecond.
    #[must_use]
    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        Self {
            interval,
            next_fire: start + interval,
        }
    }

    /// Absolute time of the next firing
    pub fn next_fire(&self) -> Instant {
        self.next_fire
    }

    /// Interval between firings
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fire if due, advancing past `now` on the original grid
    ///
    /// Returns `true` at most once per call, however many slots were missed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_fire {
            return false;
        }
        let behind = now - self.next_fire;
        let missed = behind.as_nanos() / self.interval.as_nanos();
        if missed > 0 {
            tracing::debug!(missed = missed as u64, "Decay slots skipped");
        }
        let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
        self.next_fire += self.interval * steps;
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
