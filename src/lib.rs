//! Spellroom - a headless top-down room simulation
//!
//! Core modules:
//! - `sim`: Simulation core (scheduler, registry, physics, entity behaviours, rooms)
//! - `presentation`: Boundary traits for render sinks and input sources
//! - `settings`: Data-driven tuning and configuration

pub mod presentation;
pub mod settings;
pub mod sim;

pub use presentation::{InputState, PresentationAdapter, RenderState};
pub use settings::{EffectDensity, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate (ticks per second)
    pub const TICK_RATE_HZ: f64 = 60.0;
    /// Screen pixels per simulation unit
    pub const PIXEL_SIZE: f32 = 4.0;

    /// Per-tick velocity decay multiplier, strictly inside (0, 1)
    pub const VELOCITY_DECAY: f32 = 0.93;

    /// Broad-phase radius: closest point on an obstacle must be this near the mover's center
    pub const PROXIMITY_RADIUS: f32 = 8.0;
    /// Penetrations at or beyond this depth are left unresolved for the tick
    pub const SHALLOW_PENETRATION: f32 = 3.0;

    /// Room grid cell size (simulation units)
    pub const TILE_SIZE: f32 = 16.0;

    /// Acceleration ramp added every character tick (capped at the speed stat)
    pub const ACCELERATION_STEP: f32 = 0.01;

    /// Default sizes (width, height) in simulation units
    pub const CHARACTER_SIZE: (f32, f32) = (14.0, 14.0);
    pub const PROJECTILE_SIZE: (f32, f32) = (6.0, 6.0);
    pub const FROG_SIZE: (f32, f32) = (12.0, 10.0);
    pub const CHEST_SIZE: (f32, f32) = (14.0, 12.0);
    pub const ITEM_SIZE: (f32, f32) = (8.0, 8.0);

    /// Shadow sits just under its owner's feet
    pub const SHADOW_OFFSET: (f32, f32) = (0.0, 4.0);
}

/// Heading from `from` to `to`, in degrees in (-180, 180]
#[inline]
pub fn angle_degrees(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x).to_degrees()
}

/// Convert a screen-space point (pixels) into simulation units
#[inline]
pub fn screen_to_sim(point: Vec2, pixel_size: f32) -> Vec2 {
    if pixel_size > 0.0 { point / pixel_size } else { point }
}

/// Convert a simulation-space point into screen pixels
#[inline]
pub fn sim_to_screen(point: Vec2, pixel_size: f32) -> Vec2 {
    point * pixel_size
}
