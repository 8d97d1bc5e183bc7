//! Simulation objects and their per-kind state
//!
//! Every live thing in a room is a [`SimObject`]: shared spatial state plus
//! an [`EntityKind`] carrying what is specific to characters, projectiles,
//! frogs, chests and so on. References between objects are [`ObjectId`]s
//! looked up through the registry, never owning links.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::RateLimitedTrigger;
use super::items::Item;
use super::physics::Aabb;
use super::scheduler::Cadence;

/// Registry handle. Ids are never reused, so a stale id simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Named numeric attributes. Missing fields deserialize to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub hp: f32,
    pub max_hp: f32,
    pub mana: f32,
    pub max_mana: f32,
    /// Mana spent per successful cast
    pub mana_usage: f32,
    /// Mana restored per regen interval
    pub mana_regen: f32,
    /// Movement speed cap (units/tick) or jump speed for frogs
    pub speed: f32,
    /// Cast cooldown in milliseconds
    pub fire_rate: f32,
    pub damage: f32,
    /// Projectile travel per tick
    pub projectile_speed: f32,
    /// Frog rest/jump cycle length in milliseconds
    pub jump_delay: f32,
}

/// Stat keys for item modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Hp,
    MaxHp,
    Mana,
    MaxMana,
    ManaUsage,
    ManaRegen,
    Speed,
    FireRate,
    Damage,
    ProjectileSpeed,
    JumpDelay,
}

impl Stats {
    pub fn get(&self, kind: StatKind) -> f32 {
        match kind {
            StatKind::Hp => self.hp,
            StatKind::MaxHp => self.max_hp,
            StatKind::Mana => self.mana,
            StatKind::MaxMana => self.max_mana,
            StatKind::ManaUsage => self.mana_usage,
            StatKind::ManaRegen => self.mana_regen,
            StatKind::Speed => self.speed,
            StatKind::FireRate => self.fire_rate,
            StatKind::Damage => self.damage,
            StatKind::ProjectileSpeed => self.projectile_speed,
            StatKind::JumpDelay => self.jump_delay,
        }
    }

    fn slot(&mut self, kind: StatKind) -> &mut f32 {
        match kind {
            StatKind::Hp => &mut self.hp,
            StatKind::MaxHp => &mut self.max_hp,
            StatKind::Mana => &mut self.mana,
            StatKind::MaxMana => &mut self.max_mana,
            StatKind::ManaUsage => &mut self.mana_usage,
            StatKind::ManaRegen => &mut self.mana_regen,
            StatKind::Speed => &mut self.speed,
            StatKind::FireRate => &mut self.fire_rate,
            StatKind::Damage => &mut self.damage,
            StatKind::ProjectileSpeed => &mut self.projectile_speed,
            StatKind::JumpDelay => &mut self.jump_delay,
        }
    }

    /// Add `delta` to one stat. Pools stay within `0..=max` once a max is set.
    pub fn apply(&mut self, kind: StatKind, delta: f32) {
        *self.slot(kind) += delta;
        if self.max_hp > 0.0 {
            self.hp = self.hp.min(self.max_hp);
        }
        if self.max_mana > 0.0 {
            self.mana = self.mana.min(self.max_mana);
        }
        self.mana = self.mana.max(0.0);
    }

    /// Hit points as a fraction of max (1.0 when max is unset)
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Action -> input code mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keybinds {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub cast: String,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            up: "w".into(),
            down: "s".into(),
            left: "a".into(),
            right: "d".into(),
            cast: "mouse0".into(),
        }
    }
}

/// Which way the character sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// Right while the aim angle is strictly inside (-90, 90) degrees
    pub fn from_aim(degrees: f32) -> Self {
        if degrees < 90.0 && degrees > -90.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Right => "right",
            Facing::Left => "left",
        }
    }
}

/// Player-controlled spellcaster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub keybinds: Keybinds,
    /// Input codes held as of this tick
    pub keypresses: BTreeSet<String>,
    /// Cast latch; cleared by a scheduled timer `fire_rate` ms after casting
    pub cooldown: bool,
    pub facing: Facing,
    /// Aim reticle, owned: dies with the character
    pub pointer: ObjectId,
    /// Cosmetic shadow, owned: dies with the character
    pub shadow: ObjectId,
    pub inventory: Vec<Item>,
    pub dust: RateLimitedTrigger,
    pub sparkle: RateLimitedTrigger,
}

impl Character {
    pub fn holds(&self, keys: &[&str]) -> bool {
        keys.iter().all(|k| self.keypresses.contains(*k))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Flying,
    /// Terminal: the projectile has struck something and is gone
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Caster, never struck by its own projectile
    pub owner: ObjectId,
    /// Unit heading fixed at spawn
    pub direction: Vec2,
    pub damage: f32,
    pub speed: f32,
    pub state: ProjectileState,
    /// Simulated time (ms) after which the projectile is removed
    pub expires_at_ms: f64,
}

impl Projectile {
    pub fn is_active(&self) -> bool {
        self.state == ProjectileState::Flying
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrogPhase {
    /// Grounded (or braking); jumps when the timer runs out
    Resting,
    /// Airborne first half of the jump cycle
    Jumping,
}

/// Hopping enemy that chases a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frog {
    pub phase: FrogPhase,
    /// Remaining ms in the current phase
    pub jump_timer: f32,
    /// Length of the current jump cycle (ms)
    pub jump_duration: f32,
    pub target: Option<ObjectId>,
    pub shadow: ObjectId,
}

/// Presentation hint derived from remaining hit points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChestStage {
    Intact,
    Cracked,
    Broken,
}

impl ChestStage {
    pub fn from_fraction(fraction: f32) -> Self {
        if fraction > 0.66 {
            ChestStage::Intact
        } else if fraction > 0.33 {
            ChestStage::Cracked
        } else {
            ChestStage::Broken
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChestStage::Intact => "intact",
            ChestStage::Cracked => "cracked",
            ChestStage::Broken => "broken",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chest {
    /// One-shot: flips true exactly once
    pub opened: bool,
    /// What drops when the chest breaks open
    pub loot: Item,
    pub glow: RateLimitedTrigger,
}

/// Tagged kind plus kind-specific state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Character(Character),
    Pointer { owner: ObjectId },
    Shadow { owner: ObjectId, offset: Vec2 },
    Projectile(Projectile),
    Frog(Frog),
    Chest(Chest),
    Item(Item),
    /// `code` after variant substitution, `family` is the authored code
    Tile { code: u16, family: u16 },
    Effect { expires_at_ms: f64 },
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Character(_) => "character",
            EntityKind::Pointer { .. } => "pointer",
            EntityKind::Shadow { .. } => "shadow",
            EntityKind::Projectile(_) => "projectile",
            EntityKind::Frog(_) => "frog",
            EntityKind::Chest(_) => "chest",
            EntityKind::Item(_) => "item",
            EntityKind::Tile { .. } => "tile",
            EntityKind::Effect { .. } => "effect",
        }
    }

    /// Objects that should die together with this one
    pub fn owned_children(&self) -> Vec<ObjectId> {
        match self {
            EntityKind::Character(c) => vec![c.pointer, c.shadow],
            EntityKind::Frog(f) => vec![f.shadow],
            _ => Vec::new(),
        }
    }
}

/// A live simulation object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimObject {
    pub id: ObjectId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Degrees, presentation only
    pub rotation: f32,
    /// Takes part in static/dynamic collision
    pub has_collision: bool,
    /// May lose hit points to projectile impacts
    pub is_default_destructable: bool,
    /// Opaque to the core; handed to the presentation adapter
    pub render_tag: String,
    pub stats: Stats,
    /// Movement ramp, 0..=speed
    pub acceleration: f32,
    pub is_moving: bool,
    pub cadence: Cadence,
    pub kind: EntityKind,
}

impl SimObject {
    /// Bare object; the registry assigns the real id on insert
    pub fn new(kind: EntityKind, pos: Vec2, size: Vec2) -> Self {
        let cadence = Cadence::for_kind(&kind);
        Self {
            id: ObjectId(0),
            pos,
            vel: Vec2::ZERO,
            size,
            rotation: 0.0,
            has_collision: false,
            is_default_destructable: false,
            render_tag: kind.name().to_string(),
            stats: Stats::default(),
            acceleration: 0.0,
            is_moving: false,
            cadence,
            kind,
        }
    }

    pub fn with_collision(mut self, has_collision: bool) -> Self {
        self.has_collision = has_collision;
        self
    }

    pub fn with_destructable(mut self, destructable: bool) -> Self {
        self.is_default_destructable = destructable;
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_render_tag(mut self, tag: impl Into<String>) -> Self {
        self.render_tag = tag.into();
        self
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_collidable(&self) -> bool {
        self.has_collision
    }

    pub fn is_damageable(&self) -> bool {
        self.is_default_destructable
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self.kind, EntityKind::Projectile(_))
    }

    /// Static geometry other objects are pushed out of
    pub fn is_obstacle(&self) -> bool {
        self.has_collision && matches!(self.kind, EntityKind::Tile { .. } | EntityKind::Chest(_))
    }

    pub fn as_character(&self) -> Option<&Character> {
        match &self.kind {
            EntityKind::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match &mut self.kind {
            EntityKind::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_projectile(&self) -> Option<&Projectile> {
        match &self.kind {
            EntityKind::Projectile(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_frog(&self) -> Option<&Frog> {
        match &self.kind {
            EntityKind::Frog(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_chest(&self) -> Option<&Chest> {
        match &self.kind {
            EntityKind::Chest(c) => Some(c),
            _ => None,
        }
    }
}
