//! End-to-end behaviour through the public API: spawn, drive input, tick.

use glam::Vec2;
use proptest::prelude::*;

use spellroom::Settings;
use spellroom::presentation::RecordingAdapter;
use spellroom::sim::tick::{CastOutcome, cast};
use spellroom::sim::{
    Aabb, EntityKind, Keybinds, ObjectId, Room, SimEvent, SimObject, Stats, TileTable, World,
    items, overlaps,
};

fn quiet() -> Settings {
    Settings {
        effects: false,
        ..Settings::default()
    }
}

fn projectiles(world: &World) -> Vec<ObjectId> {
    world
        .registry
        .iter()
        .filter(|o| o.is_projectile())
        .map(|o| o.id)
        .collect()
}

#[test]
fn second_cast_is_rejected_when_mana_runs_out() {
    let mut world = World::new(quiet());
    let stats = Stats {
        mana: 10.0,
        mana_usage: 10.0,
        ..world.settings.character
    };
    let hero = world.spawn_character_with(Vec2::new(48.0, 48.0), Keybinds::default(), stats);
    world.input.move_cursor(Vec2::new(400.0, 192.0));

    assert!(matches!(cast(&mut world, hero), CastOutcome::Cast(_)));
    assert_eq!(world.get(hero).unwrap().stats.mana, 0.0);

    // Lift the cooldown so only mana decides
    world
        .get_mut(hero)
        .and_then(SimObject::as_character_mut)
        .unwrap()
        .cooldown = false;
    assert_eq!(cast(&mut world, hero), CastOutcome::Rejected);
    assert_eq!(world.get(hero).unwrap().stats.mana, 0.0);
    assert_eq!(projectiles(&world).len(), 1);
    assert!(
        world
            .events()
            .iter()
            .any(|e| matches!(e, SimEvent::CastRejected { caster, .. } if *caster == hero))
    );
}

#[test]
fn projectile_flies_straight_toward_cursor() {
    let mut world = World::new(quiet());
    let hero = world.spawn_character(Vec2::new(48.0, 48.0), Keybinds::default());
    // (100, 48) in simulation units at 4 px per unit
    world.input.move_cursor(Vec2::new(400.0, 192.0));
    let CastOutcome::Cast(id) = cast(&mut world, hero) else {
        panic!("cast should succeed");
    };

    let p = world.get(id).and_then(SimObject::as_projectile).unwrap();
    assert_eq!(p.direction, Vec2::new(1.0, 0.0));

    // Moving the cursor afterwards must not bend the flight
    world.input.move_cursor(Vec2::new(0.0, 0.0));
    let mut last_x = world.get(id).unwrap().pos.x;
    for _ in 0..20 {
        world.step();
        let obj = world.get(id).unwrap();
        assert!(obj.pos.x > last_x);
        assert_eq!(obj.pos.y, 48.0);
        last_x = obj.pos.x;
    }
}

#[test]
fn edge_touching_boxes_do_not_overlap() {
    let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(16.0, 16.0));
    let b = Aabb::new(Vec2::new(16.0, 0.0), Vec2::new(16.0, 16.0));
    let c = Aabb::new(Vec2::new(15.0, 0.0), Vec2::new(16.0, 16.0));
    assert!(!overlaps(&a, &b));
    assert!(overlaps(&a, &c));
}

#[test]
fn dead_frog_is_removed_within_one_tick() {
    let mut world = World::new(quiet());
    let hero = world.spawn_character(Vec2::new(20.0, 20.0), Keybinds::default());
    let frog = world.spawn_frog(Vec2::new(100.0, 100.0), Some(hero));
    let shadow = world.get(frog).and_then(SimObject::as_frog).unwrap().shadow;
    world.get_mut(frog).unwrap().stats.hp = 0.0;

    let deletions = |world: &World| {
        world
            .events()
            .iter()
            .filter(|e| matches!(e, SimEvent::Deleted { id, .. } if *id == frog))
            .count()
    };

    world.step();
    assert!(!world.is_live(frog));
    assert!(!world.is_live(shadow));
    let mut total = deletions(&world);
    assert_eq!(total, 1);
    for _ in 0..10 {
        world.step();
        total += deletions(&world);
    }
    assert_eq!(total, 1);
}

#[test]
fn chest_opens_once_and_drops_its_loot() {
    let mut world = World::new(quiet());
    let hero = world.spawn_character(Vec2::new(16.0, 40.0), Keybinds::default());
    let loot = items::catalog()[2].clone();
    let chest = world.spawn_chest(Vec2::new(60.0, 40.0), loot.clone());
    world.get_mut(chest).unwrap().stats.hp = 10.0;
    world.input.move_cursor(Vec2::new(400.0, 180.0));

    // The first hit breaks it; later shots fly over the dropped item
    let mut opened: Vec<ObjectId> = Vec::new();
    for _ in 0..3 {
        cast(&mut world, hero);
        for _ in 0..60 {
            world.step();
            opened.extend(world.events().iter().filter_map(|e| match e {
                SimEvent::ChestOpened { chest: c, item } if *c == chest => Some(*item),
                _ => None,
            }));
        }
    }

    assert_eq!(opened.len(), 1);
    assert!(!world.is_live(chest));
    match &world.get(opened[0]).unwrap().kind {
        EntityKind::Item(item) => assert_eq!(item, &loot),
        other => panic!("expected item, got {}", other.name()),
    }
}

#[test]
fn room_walls_keep_the_hero_inside() {
    let mut world = World::new(quiet());
    let mut room = Room::walled(8, 6, TileTable::dungeon());
    room.generate(&mut world.rng, 20);
    room.spawn_tiles(&mut world);
    let hero = world.spawn_character(Vec2::new(24.0, 40.0), Keybinds::default());

    world.input.press("a");
    for _ in 0..180 {
        world.step();
    }
    let x = world.get(hero).unwrap().pos.x;
    // Left wall occupies 0..16
    assert!(x > 16.0 - 3.0, "x = {x}");
}

#[test]
fn render_pass_reports_removals_and_hints() {
    let mut world = World::new(quiet());
    let hero = world.spawn_character(Vec2::new(20.0, 20.0), Keybinds::default());
    let frog = world.spawn_frog(Vec2::new(80.0, 20.0), Some(hero));
    world.input.move_cursor(Vec2::new(0.0, 80.0));
    world.step();

    let mut adapter = RecordingAdapter::new();
    world.render(&mut adapter);
    assert_eq!(adapter.last_state(hero).unwrap().hint, Some("left"));
    assert_eq!(adapter.last_state(hero).unwrap().translate, Vec2::new(80.0, 80.0));

    world.delete(frog);
    world.render(&mut adapter);
    assert!(adapter.removed.contains(&frog));
}

#[test]
fn long_headless_run_keeps_buffers_bounded() {
    let mut world = World::new(Settings::default());
    let stats = Stats {
        mana: 0.0,
        mana_regen: 0.0,
        ..world.settings.character
    };
    world.spawn_character_with(Vec2::new(40.0, 40.0), Keybinds::default(), stats);
    world.input.press("s");
    world.input.press("mouse0");

    let mut most = 0;
    for _ in 0..6000 {
        world.step();
        most = most.max(world.events().len());
    }
    // One tick's worth at most: a rejected cast plus a few dust spawns and expiries
    assert!(most < 32, "events per tick peaked at {most}");
    assert_eq!(world.pending_removals(), 0);
}

#[test]
fn same_seed_same_outcome() {
    fn run(seed: u64) -> Vec<Vec2> {
        let mut world = World::new(Settings { seed, ..Settings::default() });
        let hero = world.spawn_character(Vec2::new(20.0, 20.0), Keybinds::default());
        let frogs: Vec<ObjectId> = (0..3)
            .map(|i| world.spawn_frog(Vec2::new(120.0, 30.0 + 30.0 * i as f32), Some(hero)))
            .collect();
        world.input.press("mouse0");
        world.input.move_cursor(Vec2::new(480.0, 200.0));
        for _ in 0..300 {
            world.step();
        }
        frogs
            .iter()
            .filter_map(|&f| world.get(f).map(|o| o.pos))
            .collect()
    }
    assert_eq!(run(7), run(7));
}

proptest! {
    #[test]
    fn mana_never_negative(
        start in 0.0f32..40.0,
        usage in 0.0f32..25.0,
        presses in proptest::collection::vec(any::<bool>(), 1..120),
    ) {
        let mut world = World::new(quiet());
        let stats = Stats {
            mana: start,
            mana_usage: usage,
            fire_rate: 0.0,
            ..world.settings.character
        };
        let hero = world.spawn_character_with(Vec2::new(40.0, 40.0), Keybinds::default(), stats);
        world.input.move_cursor(Vec2::new(800.0, 160.0));
        for held in presses {
            if held {
                world.input.press("mouse0");
            } else {
                world.input.release("mouse0");
            }
            world.step();
            prop_assert!(world.get(hero).unwrap().stats.mana >= 0.0);
        }
    }

    #[test]
    fn projectile_damages_each_target_at_most_once(
        gap in 20.0f32..80.0,
        hp in 5.0f32..100.0,
    ) {
        let mut world = World::new(quiet());
        let hero = world.spawn_character(Vec2::new(0.0, 40.0), Keybinds::default());
        let frog = world.spawn_frog_with(
            Vec2::new(14.0 + gap, 40.0),
            None,
            Stats { hp, max_hp: hp, jump_delay: 900.0, ..Stats::default() },
        );
        world.input.move_cursor(Vec2::new(800.0, 180.0));
        let CastOutcome::Cast(projectile) = cast(&mut world, hero) else {
            panic!("cast should succeed");
        };
        let mut hits = 0;
        for _ in 0..150 {
            world.step();
            hits += world
                .events()
                .iter()
                .filter(|e| matches!(
                    e,
                    SimEvent::Damaged { source, target, .. } if *source == projectile && *target == frog
                ))
                .count();
        }
        prop_assert_eq!(hits, 1);
        prop_assert!(!world.is_live(projectile));
    }
}
