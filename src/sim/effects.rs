//! Cosmetic particle bursts and the rate-limited trigger that paces them
//!
//! Movement dust, cast sparkle, impact blasts and chest glow all go through
//! the same two pieces: a [`RateLimitedTrigger`] deciding *whether* to fire
//! and an [`EffectSpec`] describing *what* to spawn.

use serde::{Deserialize, Serialize};

/// "If not cooling down, act and start a cooldown"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitedTrigger {
    pub cooldown_ms: f64,
    /// Simulated time at which the trigger may fire again
    pub ready_at_ms: f64,
}

impl RateLimitedTrigger {
    pub fn new(cooldown_ms: f64) -> Self {
        Self {
            cooldown_ms,
            ready_at_ms: 0.0,
        }
    }

    pub fn is_cooling(&self, now_ms: f64) -> bool {
        now_ms < self.ready_at_ms
    }

    /// Run `action` if not cooling down and `predicate` holds, then re-arm.
    ///
    /// The predicate is not evaluated while cooling down.
    pub fn try_fire(
        &mut self,
        now_ms: f64,
        predicate: impl FnOnce() -> bool,
        action: impl FnOnce(),
    ) -> bool {
        if self.is_cooling(now_ms) || !predicate() {
            return false;
        }
        action();
        self.ready_at_ms = now_ms + self.cooldown_ms;
        true
    }
}

/// Payload for one cosmetic burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSpec {
    pub tag: &'static str,
    pub color: &'static str,
    /// Square particle side (units)
    pub size: f32,
    pub count: u32,
    /// Max position offset from the origin on each axis
    pub jitter: f32,
    /// Max initial drift speed (units/tick)
    pub drift: f32,
    pub duration_ms: f64,
    /// Minimum gap between bursts from one source
    pub cooldown_ms: f64,
}

pub const MOVEMENT_DUST: EffectSpec = EffectSpec {
    tag: "dust",
    color: "#c8b89a",
    size: 2.0,
    count: 1,
    jitter: 3.0,
    drift: 0.1,
    duration_ms: 400.0,
    cooldown_ms: 120.0,
};

pub const CAST_SPARKLE: EffectSpec = EffectSpec {
    tag: "sparkle",
    color: "#9ad7ff",
    size: 1.0,
    count: 3,
    jitter: 4.0,
    drift: 0.3,
    duration_ms: 300.0,
    cooldown_ms: 100.0,
};

pub const IMPACT_BLAST: EffectSpec = EffectSpec {
    tag: "blast",
    color: "#ff9a3c",
    size: 3.0,
    count: 5,
    jitter: 2.0,
    drift: 0.6,
    duration_ms: 250.0,
    cooldown_ms: 0.0,
};

pub const CHEST_GLOW: EffectSpec = EffectSpec {
    tag: "glow",
    color: "#ffe27a",
    size: 1.0,
    count: 1,
    jitter: 6.0,
    drift: 0.05,
    duration_ms: 900.0,
    cooldown_ms: 700.0,
};

impl EffectSpec {
    pub fn trigger(&self) -> RateLimitedTrigger {
        RateLimitedTrigger::new(self.cooldown_ms)
    }

    pub fn render_tag(&self) -> String {
        format!("effect-{} {}", self.tag, self.color)
    }
}
