//! Simulation clock, per-object cadences and scheduled one-shot timers
//!
//! Two cadences exist: the fixed-rate simulation tick and the render pass.
//! Objects opt into either through their [`Cadence`]. Delayed work
//! (cooldowns, effect lifetimes, mana regen) is a [`Timer`] record carrying
//! a due time on the simulated clock; the world drains due timers at the
//! start of every tick, so nothing ever blocks or spawns a thread.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, ObjectId};

/// Simulated time, advanced a fixed amount per tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clock {
    /// Milliseconds per tick
    pub tick_ms: f64,
    /// Simulated milliseconds since start
    pub now_ms: f64,
    /// Ticks run so far
    pub ticks: u64,
}

impl Clock {
    pub fn new(tick_rate_hz: f64) -> Self {
        let tick_ms = 1000.0 / tick_rate_hz;
        let tick_ms = if tick_ms.is_finite() && tick_ms > 0.0 {
            tick_ms
        } else {
            1000.0 / crate::consts::TICK_RATE_HZ
        };
        Self {
            tick_ms,
            now_ms: 0.0,
            ticks: 0,
        }
    }

    pub fn advance(&mut self) {
        self.ticks += 1;
        self.now_ms += self.tick_ms;
    }
}

/// Which cadences an object takes part in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    /// Runs on every simulation tick
    pub update: bool,
    /// Runs on every render pass
    pub animation: bool,
}

impl Cadence {
    pub const BOTH: Cadence = Cadence { update: true, animation: true };
    pub const RENDER_ONLY: Cadence = Cadence { update: false, animation: true };

    pub fn for_kind(kind: &EntityKind) -> Self {
        match kind {
            EntityKind::Item(_) | EntityKind::Tile { .. } => Cadence::RENDER_ONLY,
            _ => Cadence::BOTH,
        }
    }
}

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Release a character's cast latch
    ClearCooldown,
    /// Restore mana and re-arm
    RegenMana,
    /// Delete the target (effect lifetimes)
    Expire,
}

/// A pending one-shot callback
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timer {
    pub due_ms: f64,
    /// Insertion order, breaks ties between equal due times
    pub seq: u64,
    pub target: ObjectId,
    pub action: TimerAction,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_ms
            .total_cmp(&other.due_ms)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Min-heap of timers ordered by due time, then insertion
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, target: ObjectId, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Timer {
            due_ms,
            seq,
            target,
            action,
        }));
    }

    /// Pop the earliest timer if it is due at `now_ms`
    pub fn pop_due(&mut self, now_ms: f64) -> Option<Timer> {
        match self.heap.peek() {
            Some(Reverse(t)) if t.due_ms <= now_ms => self.heap.pop().map(|Reverse(t)| t),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Whether anything is pending for `target` with `action`
    pub fn has_pending(&self, target: ObjectId, action: TimerAction) -> bool {
        self.heap
            .iter()
            .any(|Reverse(t)| t.target == target && t.action == action)
    }
}

/// Best-effort wall-clock interval.
///
/// Fires at most once per poll and re-arms from the moment it fired, so a
/// stalled host drops ticks rather than bursting to catch up.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
    next: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next: None }
    }

    pub fn from_hz(hz: f64) -> Self {
        let fallback = Duration::from_secs_f64(1.0 / crate::consts::TICK_RATE_HZ);
        let interval = if hz > 0.0 {
            Duration::try_from_secs_f64(1.0 / hz).unwrap_or(fallback)
        } else {
            fallback
        };
        Self::new(interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now < next => false,
            _ => {
                self.next = Some(now + self.interval);
                true
            }
        }
    }

    /// Time left until the next firing (zero when already due)
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next
            .map(|next| next.saturating_duration_since(now))
            .unwrap_or_default()
    }
}
