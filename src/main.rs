//! Spellroom - headless driver
//!
//! Builds a small room, plays a scripted input sequence against it in real
//! time and logs what the presentation layer would have drawn.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use glam::Vec2;

use spellroom::sim::{Keybinds, ObjectId, Pacer, Room, SimEvent, TileTable, World, items};
use spellroom::{PresentationAdapter, RenderState, Settings};

/// Length of the scripted session
const SCRIPT_TICKS: u64 = 120;
/// Headless render rate; a real adapter would follow the display
const RENDER_HZ: f64 = 30.0;

/// Adapter that keeps the latest state per object and logs removals
#[derive(Default)]
struct LoggingAdapter {
    visible: BTreeMap<ObjectId, RenderState>,
    frames: u64,
    draws: u64,
}

impl PresentationAdapter for LoggingAdapter {
    fn draw(&mut self, state: &RenderState) {
        log::trace!(
            "draw {} {} at ({:.1}, {:.1}) rot {:.0}",
            state.id,
            state.render_tag,
            state.translate.x,
            state.translate.y,
            state.rotation
        );
        self.draws += 1;
        self.visible.insert(state.id, state.clone());
    }

    fn remove(&mut self, id: ObjectId) {
        if let Some(state) = self.visible.remove(&id) {
            log::trace!("remove {} {}", id, state.render_tag);
        }
    }
}

/// Scripted input for one tick: walk right, strafe down while casting, then idle
fn script_input(world: &mut World, tick: u64, aim_at: Vec2) {
    let pixel_size = world.settings.pixel_size;
    let input = &mut world.input;
    input.held.clear();
    match tick {
        0..40 => input.press("d"),
        40..80 => {
            input.press("s");
            input.press("d");
            input.press("mouse0");
        }
        _ => {}
    }
    input.move_cursor(aim_at * pixel_size);
}

fn build_world(settings: Settings) -> (World, ObjectId) {
    let mut world = World::new(settings);

    let mut room = Room::walled(20, 12, TileTable::dungeon());
    let chance = world.settings.variant_chance_percent;
    room.generate(&mut world.rng, chance);
    room.spawn_tiles(&mut world);

    let hero = world.spawn_character(Vec2::new(40.0, 40.0), Keybinds::default());
    world.spawn_frog(Vec2::new(200.0, 120.0), Some(hero));
    world.spawn_frog(Vec2::new(240.0, 60.0), Some(hero));
    if let Some(loot) = items::catalog().into_iter().next() {
        world.spawn_chest(Vec2::new(120.0, 48.0), loot);
    }
    (world, hero)
}

fn main() {
    env_logger::init();
    log::info!("Spellroom (headless) starting...");

    let settings = Settings::load();
    log::info!(
        "seed {} | {} Hz | effects {} ({})",
        settings.seed,
        settings.tick_rate_hz,
        settings.effects,
        settings.density.as_str()
    );

    let mut sim_pacer = Pacer::from_hz(settings.tick_rate_hz);
    let mut render_pacer = Pacer::from_hz(RENDER_HZ);
    let (mut world, hero) = build_world(settings);
    let mut adapter = LoggingAdapter::default();

    let mut casts = 0;
    let mut hits = 0;
    let mut ticks = 0;
    while ticks < SCRIPT_TICKS {
        let now = Instant::now();
        if sim_pacer.ready(now) {
            // Aim at the first live frog, or straight ahead when none is left
            let aim_at = world
                .registry
                .iter()
                .filter(|o| o.as_frog().is_some())
                .map(|o| o.center())
                .next()
                .unwrap_or(Vec2::new(320.0, 40.0));
            script_input(&mut world, ticks, aim_at);
            world.step();
            ticks += 1;

            for event in world.drain_events() {
                match event {
                    SimEvent::Cast { .. } => casts += 1,
                    SimEvent::Damaged { target, hp, .. } => {
                        hits += 1;
                        log::info!("{} hit, hp now {}", target, hp);
                    }
                    SimEvent::ChestOpened { chest, item } => {
                        log::info!("chest {} opened -> {}", chest, item)
                    }
                    SimEvent::ItemPickedUp { by, name } => log::info!("{} picked up {}", by, name),
                    _ => {}
                }
            }
        }
        if render_pacer.ready(now) {
            world.render(&mut adapter);
            adapter.frames += 1;
        }

        let wait = sim_pacer
            .remaining(Instant::now())
            .min(render_pacer.remaining(Instant::now()));
        std::thread::sleep(wait.max(Duration::from_millis(1)));
    }

    let (mana, pos) = world
        .get(hero)
        .map(|o| (o.stats.mana, o.pos))
        .unwrap_or((0.0, Vec2::ZERO));
    log::info!(
        "done: {} ticks ({:.0} ms simulated), {} objects live, {} frames / {} draws",
        world.clock.ticks,
        world.now_ms(),
        world.len(),
        adapter.frames,
        adapter.draws
    );
    log::info!(
        "hero at ({:.1}, {:.1}) with {} mana; {} casts, {} hits",
        pos.x,
        pos.y,
        mana,
        casts,
        hits
    );
}
