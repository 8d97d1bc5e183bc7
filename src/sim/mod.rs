//! Simulation module
//!
//! All gameplay logic lives here. The core is headless and deterministic
//! for a given seed and input script:
//! - Simulated clock advanced by a fixed amount per tick
//! - Seeded RNG only
//! - Stable iteration order (registry snapshots are sorted by object id)
//! - No rendering or platform dependencies

pub mod effects;
pub mod entity;
pub mod items;
pub mod physics;
pub mod registry;
pub mod room;
pub mod scheduler;
pub mod tick;
pub mod world;

pub use effects::{EffectSpec, RateLimitedTrigger};
pub use entity::{
    Character, Chest, ChestStage, EntityKind, Facing, Frog, FrogPhase, Keybinds, ObjectId,
    Projectile, ProjectileState, SimObject, StatKind, Stats,
};
pub use items::{Item, StatModifier};
pub use physics::{Aabb, damp_velocity, edge_penetration, overlaps, passes_proximity_gate};
pub use registry::{Registry, Snapshot};
pub use room::{Room, TileTable};
pub use scheduler::{Cadence, Clock, Pacer, TimerAction, TimerQueue};
pub use tick::{CastOutcome, tick};
pub use world::{SimEvent, World};
