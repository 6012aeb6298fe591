use glam::Vec2;
use lane_defence_core::{
    tick_duration, ArchetypeId, ArenaConfig, Command, EmplacementId, EmplacementKind, Event, Gold,
    MobId, MobSpawnSpec, PathId, PathSpec,
};
use lane_defence_world::{self as world, query, World};

const TOWER_POINT: Vec2 = Vec2::new(96.0, 288.0);

fn arena() -> ArenaConfig {
    ArenaConfig {
        paths: vec![PathSpec {
            points: vec![Vec2::new(96.0, 400.0), Vec2::new(1_100.0, 400.0)],
        }],
        ..ArenaConfig::default()
    }
}

fn crawler(health: f32) -> MobSpawnSpec {
    MobSpawnSpec {
        path: PathId::new(0),
        archetype: ArchetypeId::new(0),
        speed: 0.001,
        health,
        reward: Gold::new(50),
    }
}

fn tick(world: &mut World, events: &mut Vec<Event>) {
    let now = query::clock(world) + tick_duration();
    world::apply(world, Command::Tick { now }, events);
    world::apply(world, Command::Advance, events);
}

#[test]
fn sniper_destroys_mob_on_third_hit_and_rewards_once() {
    let mut world = World::new(&arena()).expect("valid arena");
    let mut events = Vec::new();

    tick(&mut world, &mut events);
    world::apply(
        &mut world,
        Command::PlaceEmplacement {
            kind: EmplacementKind::Sniper,
            point: TOWER_POINT,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnMob {
            spec: crawler(100.0),
        },
        &mut events,
    );
    assert_eq!(query::gold(&world), Gold::new(400));

    for _ in 0..1_200 {
        tick(&mut world, &mut events);
        world::apply(
            &mut world,
            Command::FireProjectile {
                emplacement: EmplacementId::new(0),
                target: MobId::new(0),
            },
            &mut events,
        );
        world::apply(&mut world, Command::ResolveCollisions, &mut events);
    }

    let remaining: Vec<f32> = events
        .iter()
        .filter_map(|event| match event {
            Event::MobDamaged { remaining, .. } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(remaining, vec![60.0, 20.0, -20.0]);

    let destroyed = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyDestroyed { .. }))
        .count();
    assert_eq!(destroyed, 1);
    assert_eq!(query::gold(&world), Gold::new(450));
    assert_eq!(query::live_mob_count(&world), 0);
}

#[test]
fn projectile_damages_only_the_first_overlapping_mob() {
    let mut world = World::new(&arena()).expect("valid arena");
    let mut events = Vec::new();

    tick(&mut world, &mut events);
    world::apply(
        &mut world,
        Command::PlaceEmplacement {
            kind: EmplacementKind::Basic,
            point: TOWER_POINT,
        },
        &mut events,
    );
    for _ in 0..2 {
        world::apply(
            &mut world,
            Command::SpawnMob {
                spec: crawler(100.0),
            },
            &mut events,
        );
    }
    for _ in 0..61 {
        tick(&mut world, &mut events);
    }
    world::apply(
        &mut world,
        Command::FireProjectile {
            emplacement: EmplacementId::new(0),
            target: MobId::new(1),
        },
        &mut events,
    );
    assert_eq!(query::projectile_view(&world).len(), 1);

    for _ in 0..40 {
        tick(&mut world, &mut events);
        world::apply(&mut world, Command::ResolveCollisions, &mut events);
    }

    let hits: Vec<MobId> = events
        .iter()
        .filter_map(|event| match event {
            Event::MobDamaged { mob, .. } => Some(*mob),
            _ => None,
        })
        .collect();
    assert_eq!(hits, vec![MobId::new(0)]);

    let mobs = query::mob_view(&world);
    assert_eq!(mobs.get(MobId::new(0)).map(|mob| mob.health), Some(80.0));
    assert_eq!(mobs.get(MobId::new(1)).map(|mob| mob.health), Some(100.0));
    assert!(query::projectile_view(&world).is_empty());
}

#[test]
fn projectile_that_misses_expires_at_its_destination() {
    let mut world = World::new(&arena()).expect("valid arena");
    let mut events = Vec::new();

    tick(&mut world, &mut events);
    world::apply(
        &mut world,
        Command::PlaceEmplacement {
            kind: EmplacementKind::Basic,
            point: TOWER_POINT,
        },
        &mut events,
    );
    for _ in 0..61 {
        tick(&mut world, &mut events);
    }
    world::apply(
        &mut world,
        Command::SpawnMob {
            spec: MobSpawnSpec {
                speed: 4.0,
                ..crawler(100.0)
            },
        },
        &mut events,
    );
    tick(&mut world, &mut events);
    events.clear();

    world::apply(
        &mut world,
        Command::FireProjectile {
            emplacement: EmplacementId::new(0),
            target: MobId::new(0),
        },
        &mut events,
    );
    assert!(matches!(events.as_slice(), [Event::ShotFired { .. }]));

    for _ in 0..40 {
        tick(&mut world, &mut events);
        world::apply(&mut world, Command::ResolveCollisions, &mut events);
    }

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::MobDamaged { .. })));
    let expired = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileExpired { .. }))
        .count();
    assert_eq!(expired, 1);
    assert!(query::projectile_view(&world).is_empty());
    assert_eq!(
        query::mob_view(&world).get(MobId::new(0)).map(|mob| mob.health),
        Some(100.0)
    );
}
