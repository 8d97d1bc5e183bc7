//! The simulation context
//!
//! A [`World`] bundles everything a behaviour may touch: the registry, the
//! simulated clock, pending timers, the seeded RNG, the current input and
//! the event log. Behaviours receive it explicitly; nothing is global.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effects::{CAST_SPARKLE, CHEST_GLOW, EffectSpec, MOVEMENT_DUST};
use super::entity::{
    Character, Chest, EntityKind, Frog, FrogPhase, Keybinds, ObjectId, Projectile,
    ProjectileState, SimObject, Stats,
};
use super::items::Item;
use super::physics::Aabb;
use super::registry::{Registry, Snapshot};
use super::scheduler::{Clock, TimerAction, TimerQueue};
use crate::consts::*;
use crate::presentation::{InputState, PresentationAdapter, RenderState};
use crate::settings::Settings;

/// Something observable that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Spawned { id: ObjectId, kind: &'static str },
    Deleted { id: ObjectId, kind: &'static str },
    Cast { caster: ObjectId, projectile: ObjectId },
    CastRejected { caster: ObjectId, mana: f32 },
    Damaged { target: ObjectId, source: ObjectId, amount: f32, hp: f32 },
    ProjectileExpired { id: ObjectId },
    ChestOpened { chest: ObjectId, item: ObjectId },
    ItemPickedUp { by: ObjectId, name: String },
}

pub struct World {
    pub settings: Settings,
    pub registry: Registry,
    pub clock: Clock,
    pub timers: TimerQueue,
    pub rng: Pcg32,
    pub input: InputState,
    /// Room extent; projectiles leaving it are removed
    pub bounds: Option<Aabb>,
    /// Events from the current tick only
    events: Vec<SimEvent>,
    /// Ids handed to the adapter in a render pass and not yet removed
    presented: BTreeSet<ObjectId>,
    /// Presented ids deleted since the last render pass
    removed: Vec<ObjectId>,
    live_effects: usize,
}

impl World {
    pub fn new(settings: Settings) -> Self {
        Self {
            clock: Clock::new(settings.tick_rate_hz),
            rng: Pcg32::seed_from_u64(settings.seed),
            registry: Registry::new(),
            timers: TimerQueue::new(),
            input: InputState::default(),
            bounds: None,
            events: Vec::new(),
            presented: BTreeSet::new(),
            removed: Vec::new(),
            live_effects: 0,
            settings,
        }
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms
    }

    pub fn get(&self, id: ObjectId) -> Option<&SimObject> {
        self.registry.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SimObject> {
        self.registry.get_mut(id)
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.registry.contains(id)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.registry.snapshot()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn live_effects(&self) -> usize {
        self.live_effects
    }

    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// Cursor in simulation units
    pub fn cursor(&self) -> Vec2 {
        self.input.cursor_sim(self.settings.pixel_size)
    }

    pub fn record(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Visuals waiting to be dropped on the next render pass
    pub fn pending_removals(&self) -> usize {
        self.removed.len()
    }

    /// Run `action` against `target` once `delay_ms` of simulated time has passed
    pub fn schedule(&mut self, delay_ms: f64, target: ObjectId, action: TimerAction) {
        let due = self.now_ms() + delay_ms.max(0.0);
        self.timers.schedule(due, target, action);
    }

    /// Insert into the registry; the object starts receiving cadences next pass
    pub fn spawn(&mut self, obj: SimObject) -> ObjectId {
        let kind = obj.kind.name();
        let is_effect = matches!(obj.kind, EntityKind::Effect { .. });
        let id = self.registry.add(obj);
        if is_effect {
            self.live_effects += 1;
        } else {
            log::debug!("spawn {} {}", kind, id);
        }
        self.events.push(SimEvent::Spawned { id, kind });
        id
    }

    /// Remove from the registry along with anything it owns.
    ///
    /// Returns false if the object was already gone.
    pub fn delete(&mut self, id: ObjectId) -> bool {
        let Some(obj) = self.registry.remove(id) else {
            return false;
        };
        let kind = obj.kind.name();
        if matches!(obj.kind, EntityKind::Effect { .. }) {
            self.live_effects = self.live_effects.saturating_sub(1);
        } else {
            log::debug!("delete {} {}", kind, id);
        }
        self.events.push(SimEvent::Deleted { id, kind });
        if self.presented.remove(&id) {
            self.removed.push(id);
        }
        for child in obj.kind.owned_children() {
            self.delete(child);
        }
        true
    }

    /// Character plus its pointer and shadow; starts mana regen
    pub fn spawn_character(&mut self, pos: Vec2, keybinds: Keybinds) -> ObjectId {
        let stats = self.settings.character;
        self.spawn_character_with(pos, keybinds, stats)
    }

    pub fn spawn_character_with(&mut self, pos: Vec2, keybinds: Keybinds, stats: Stats) -> ObjectId {
        let size = Vec2::from(CHARACTER_SIZE);
        let character = Character {
            keybinds,
            keypresses: Default::default(),
            cooldown: false,
            facing: Default::default(),
            pointer: ObjectId(0),
            shadow: ObjectId(0),
            inventory: Vec::new(),
            dust: MOVEMENT_DUST.trigger(),
            sparkle: CAST_SPARKLE.trigger(),
        };
        let id = self.spawn(
            SimObject::new(EntityKind::Character(character), pos, size)
                .with_collision(true)
                .with_destructable(true)
                .with_stats(stats)
                .with_render_tag("character-default"),
        );

        let pointer = self.spawn(
            SimObject::new(EntityKind::Pointer { owner: id }, pos, size)
                .with_render_tag("character-pointer"),
        );
        let shadow = self.spawn_shadow(id, pos, size);
        if let Some(c) = self.get_mut(id).and_then(SimObject::as_character_mut) {
            c.pointer = pointer;
            c.shadow = shadow;
        }

        let interval = self.settings.mana_regen_interval_ms;
        self.schedule(interval, id, TimerAction::RegenMana);
        id
    }

    fn spawn_shadow(&mut self, owner: ObjectId, pos: Vec2, size: Vec2) -> ObjectId {
        let offset = Vec2::from(SHADOW_OFFSET);
        self.spawn(
            SimObject::new(EntityKind::Shadow { owner, offset }, pos + offset, size)
                .with_render_tag("shadow"),
        )
    }

    /// Frog chasing `target`
    pub fn spawn_frog(&mut self, pos: Vec2, target: Option<ObjectId>) -> ObjectId {
        let stats = self.settings.frog;
        self.spawn_frog_with(pos, target, stats)
    }

    pub fn spawn_frog_with(&mut self, pos: Vec2, target: Option<ObjectId>, stats: Stats) -> ObjectId {
        let size = Vec2::from(FROG_SIZE);
        let frog = Frog {
            phase: FrogPhase::Resting,
            jump_timer: stats.jump_delay,
            jump_duration: stats.jump_delay,
            target,
            shadow: ObjectId(0),
        };
        let id = self.spawn(
            SimObject::new(EntityKind::Frog(frog), pos, size)
                .with_collision(true)
                .with_destructable(true)
                .with_stats(stats)
                .with_render_tag("frog"),
        );
        let shadow = self.spawn_shadow(id, pos, size);
        if let Some(SimObject {
            kind: EntityKind::Frog(f),
            ..
        }) = self.get_mut(id)
        {
            f.shadow = shadow;
        }
        id
    }

    /// Destructible container holding `loot`
    pub fn spawn_chest(&mut self, pos: Vec2, loot: Item) -> ObjectId {
        let stats = self.settings.chest;
        let chest = Chest {
            opened: false,
            loot,
            glow: CHEST_GLOW.trigger(),
        };
        self.spawn(
            SimObject::new(EntityKind::Chest(chest), pos, Vec2::from(CHEST_SIZE))
                .with_collision(true)
                .with_destructable(true)
                .with_stats(stats)
                .with_render_tag("chest"),
        )
    }

    pub fn spawn_item(&mut self, pos: Vec2, item: Item) -> ObjectId {
        let tag = item.sprite.clone();
        self.spawn(SimObject::new(EntityKind::Item(item), pos, Vec2::from(ITEM_SIZE)).with_render_tag(tag))
    }

    /// Projectile from `origin` toward `aim`, heading fixed from here on
    pub fn spawn_projectile(
        &mut self,
        owner: ObjectId,
        origin: Vec2,
        aim: Vec2,
        damage: f32,
        speed: f32,
    ) -> ObjectId {
        let direction = (aim - origin).try_normalize().unwrap_or(Vec2::X);
        let projectile = Projectile {
            owner,
            direction,
            damage,
            speed,
            state: ProjectileState::Flying,
            expires_at_ms: self.now_ms() + self.settings.projectile_ttl_ms,
        };
        let mut obj = SimObject::new(
            EntityKind::Projectile(projectile),
            origin,
            Vec2::from(PROJECTILE_SIZE),
        )
        .with_render_tag("fireball");
        obj.rotation = direction.y.atan2(direction.x).to_degrees();
        self.spawn(obj)
    }

    /// Spawn up to `spec.count` particles around `origin`, honouring the effect cap.
    ///
    /// Returns how many were spawned.
    pub fn spawn_effect_burst(&mut self, origin: Vec2, spec: &EffectSpec) -> usize {
        let cap = self.settings.max_effects();
        let mut spawned = 0;
        for _ in 0..spec.count {
            if self.live_effects >= cap {
                break;
            }
            let jitter = if spec.jitter > 0.0 {
                Vec2::new(
                    self.rng.random_range(-spec.jitter..=spec.jitter),
                    self.rng.random_range(-spec.jitter..=spec.jitter),
                )
            } else {
                Vec2::ZERO
            };
            let drift = if spec.drift > 0.0 {
                Vec2::new(
                    self.rng.random_range(-spec.drift..=spec.drift),
                    self.rng.random_range(-spec.drift..=spec.drift),
                )
            } else {
                Vec2::ZERO
            };
            let expires_at_ms = self.now_ms() + spec.duration_ms;
            let mut obj = SimObject::new(
                EntityKind::Effect { expires_at_ms },
                origin + jitter,
                Vec2::splat(spec.size),
            )
            .with_render_tag(spec.render_tag());
            obj.vel = drift;
            let id = self.spawn(obj);
            self.schedule(spec.duration_ms, id, TimerAction::Expire);
            spawned += 1;
        }
        spawned
    }

    /// Advance one simulation tick
    pub fn step(&mut self) {
        super::tick::tick(self);
    }

    /// Render pass: flush removals, then draw every object on the animation cadence
    pub fn render(&mut self, adapter: &mut dyn PresentationAdapter) {
        for id in self.removed.drain(..) {
            adapter.remove(id);
        }

        let pixel_size = self.settings.pixel_size;
        for id in &self.registry.snapshot() {
            let Some(obj) = self.registry.get(id) else {
                continue;
            };
            if !obj.cadence.animation {
                continue;
            }
            self.presented.insert(id);
            adapter.draw(&RenderState {
                id,
                translate: crate::sim_to_screen(obj.pos, pixel_size),
                rotation: obj.rotation,
                render_tag: obj.render_tag.clone(),
                hint: render_hint(obj),
            });
        }
    }
}

fn render_hint(obj: &SimObject) -> Option<&'static str> {
    match &obj.kind {
        EntityKind::Character(c) => Some(c.facing.as_str()),
        EntityKind::Chest(_) => {
            Some(super::entity::ChestStage::from_fraction(obj.stats.hp_fraction()).as_str())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingAdapter;

    #[test]
    fn test_character_owns_pointer_and_shadow() {
        let mut world = World::new(Settings::default());
        let id = world.spawn_character(Vec2::new(32.0, 32.0), Keybinds::default());
        let c = world.get(id).and_then(SimObject::as_character).cloned().unwrap();
        assert!(world.is_live(c.pointer));
        assert!(world.is_live(c.shadow));

        assert!(world.delete(id));
        assert!(!world.is_live(c.pointer));
        assert!(!world.is_live(c.shadow));
        assert!(!world.delete(id));
    }

    #[test]
    fn test_projectile_direction_is_unit() {
        let mut world = World::new(Settings::default());
        let id = world.spawn_projectile(ObjectId(99), Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0), 1.0, 1.0);
        let p = world.get(id).and_then(SimObject::as_projectile).unwrap();
        assert!((p.direction.length() - 1.0).abs() < 1e-5);
        assert!((p.direction.x - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_effect_cap() {
        let settings = Settings {
            density: crate::settings::EffectDensity::Low,
            ..Settings::default()
        };
        let mut world = World::new(settings);
        let mut total = 0;
        for _ in 0..100 {
            total += world.spawn_effect_burst(Vec2::ZERO, &super::super::effects::IMPACT_BLAST);
        }
        assert_eq!(total, 32);
        assert_eq!(world.live_effects(), 32);
    }

    #[test]
    fn test_render_flushes_removals_and_skips_dead() {
        let mut world = World::new(Settings::default());
        let keep = world.spawn_item(Vec2::new(4.0, 4.0), super::super::items::catalog()[0].clone());
        let gone = world.spawn_item(Vec2::ZERO, super::super::items::catalog()[1].clone());
        let never_drawn = world.spawn_item(Vec2::ZERO, super::super::items::catalog()[2].clone());
        world.delete(never_drawn);

        let mut adapter = RecordingAdapter::new();
        world.render(&mut adapter);
        assert!(adapter.removed.is_empty());
        assert!(adapter.last_state(never_drawn).is_none());

        world.delete(gone);
        adapter.drawn.clear();
        world.render(&mut adapter);
        assert_eq!(adapter.removed, vec![gone]);
        assert!(adapter.last_state(gone).is_none());
        let drawn = adapter.last_state(keep).unwrap();
        assert_eq!(drawn.translate, Vec2::new(16.0, 16.0));
        assert_eq!(world.pending_removals(), 0);
    }
}
