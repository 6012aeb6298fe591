use glam::Vec2;
use lane_defence_core::{
    ArchetypeId, AuthoredWave, ConfigError, EmplacementKind, Event, Gold, MobId, Outcome, PathId,
    PathSpec, PlacementError, Scenario, SpawnGroup, WaveConfig,
};
use lane_defence_system_builder::BuilderRequest;
use lane_defence_system_session::Session;
use lane_defence_world::query;

const TOWER_POINT: Vec2 = Vec2::new(96.0, 288.0);

fn scenario(path: Vec<Vec2>, groups: Vec<SpawnGroup>) -> Scenario {
    let mut scenario = Scenario {
        seed: 17,
        path: Some(PathId::new(0)),
        waves: WaveConfig {
            authored: vec![AuthoredWave { groups }],
            procedural_waves: 0,
            ..WaveConfig::default()
        },
        ..Scenario::default()
    };
    scenario.arena.paths = vec![PathSpec { points: path }];
    scenario
}

fn group(count: u32, speed: f32, health: f32) -> SpawnGroup {
    SpawnGroup {
        archetype: ArchetypeId::new(0),
        count,
        speed,
        health,
        reward: Gold::new(50),
    }
}

fn count(events: &[Event], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

#[test]
fn basic_tower_hits_mob_at_distance_one_hundred() {
    let mut session = Session::new(&scenario(
        vec![Vec2::new(96.0, 388.0), Vec2::new(1_100.0, 388.0)],
        vec![group(1, 0.01, 100.0)],
    ))
    .expect("valid scenario");
    session.submit(BuilderRequest::Place {
        kind: EmplacementKind::Basic,
        point: TOWER_POINT,
    });

    let mut events = Vec::new();
    let mut damage = None;
    for _ in 0..400 {
        let _ = session.step(&mut events);
        damage = events.iter().find_map(|event| match event {
            Event::MobDamaged {
                amount, remaining, ..
            } => Some((*amount, *remaining)),
            _ => None,
        });
        if damage.is_some() {
            break;
        }
    }

    assert_eq!(damage, Some((20.0, 80.0)));
    let mob = query::mob_view(session.world())
        .get(MobId::new(0))
        .copied()
        .expect("mob survives the first hit");
    assert_eq!(mob.health, 80.0);
}

#[test]
fn sniper_prefers_the_healthier_mob() {
    let mut session = Session::new(&scenario(
        vec![Vec2::new(96.0, 388.0), Vec2::new(1_100.0, 388.0)],
        vec![group(1, 0.01, 50.0), group(1, 0.01, 120.0)],
    ))
    .expect("valid scenario");
    session.submit(BuilderRequest::Place {
        kind: EmplacementKind::Sniper,
        point: TOWER_POINT,
    });

    let mut events = Vec::new();
    let target = (0..600).find_map(|_| {
        let _ = session.step(&mut events);
        events.iter().find_map(|event| match event {
            Event::ShotFired { target, .. } => Some(*target),
            _ => None,
        })
    });

    assert_eq!(target, Some(MobId::new(1)));
}

#[test]
fn placement_on_occupied_cell_changes_nothing() {
    let mut session = Session::new(&scenario(
        vec![Vec2::new(96.0, 388.0), Vec2::new(1_100.0, 388.0)],
        vec![group(1, 0.01, 100.0)],
    ))
    .expect("valid scenario");
    let mut events = Vec::new();

    session.submit(BuilderRequest::Place {
        kind: EmplacementKind::Basic,
        point: TOWER_POINT,
    });
    let _ = session.step(&mut events);
    let gold = query::gold(session.world());
    let before = query::emplacement_view(session.world()).into_vec();

    events.clear();
    session.submit(BuilderRequest::Place {
        kind: EmplacementKind::Sniper,
        point: TOWER_POINT + Vec2::new(20.0, 20.0),
    });
    let _ = session.step(&mut events);

    assert_eq!(
        count(&events, |event| matches!(
            event,
            Event::PlacementRejected {
                reason: PlacementError::Occupied,
                ..
            }
        )),
        1
    );
    assert_eq!(query::gold(session.world()), gold);
    let after = query::emplacement_view(session.world()).into_vec();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, before[0].id);
    assert_eq!(after[0].kind, EmplacementKind::Basic);
}

#[test]
fn economy_tower_pays_once_per_interval_without_projectiles() {
    let mut session = Session::new(&scenario(
        vec![Vec2::new(96.0, 388.0), Vec2::new(1_100.0, 388.0)],
        vec![group(1, 0.01, 100.0)],
    ))
    .expect("valid scenario");
    session.submit(BuilderRequest::Place {
        kind: EmplacementKind::Economy,
        point: TOWER_POINT,
    });
    let mut events = Vec::new();

    assert_eq!(session.run(600, &mut events), 600);
    assert_eq!(query::gold(session.world()), Gold::new(400));
    assert_eq!(
        count(&events, |event| matches!(event, Event::MoneyGenerated { .. })),
        0
    );

    let _ = session.run(600, &mut events);
    assert_eq!(query::gold(session.world()), Gold::new(450));
    assert_eq!(
        count(&events, |event| matches!(event, Event::MoneyGenerated { .. })),
        1
    );
    assert_eq!(
        count(&events, |event| matches!(event, Event::ShotFired { .. })),
        0
    );
    assert!(query::projectile_view(session.world()).is_empty());
}

#[test]
fn breach_ends_the_run_as_lost() {
    let mut session = Session::new(&scenario(
        vec![Vec2::new(96.0, 388.0), Vec2::new(200.0, 388.0)],
        vec![group(3, 2.0, 1_000.0)],
    ))
    .expect("valid scenario");
    let mut events = Vec::new();

    let ticks = session.run(10_000, &mut events);

    assert!(ticks < 10_000);
    assert_eq!(session.outcome(), Outcome::Lost);
    assert_eq!(count(&events, |event| matches!(event, Event::GameOver)), 1);
    assert!(!session.step(&mut events), "finished sessions do not tick");
}

#[test]
fn clearing_every_wave_wins() {
    let mut session = Session::new(&scenario(
        vec![Vec2::new(96.0, 388.0), Vec2::new(1_100.0, 388.0)],
        vec![group(2, 0.2, 20.0)],
    ))
    .expect("valid scenario");
    session.submit(BuilderRequest::Place {
        kind: EmplacementKind::Basic,
        point: TOWER_POINT,
    });
    let mut events = Vec::new();

    let _ = session.run(5_000, &mut events);

    assert_eq!(session.outcome(), Outcome::Won);
    assert!(session.waves().all_waves_complete());
    assert_eq!(
        count(&events, |event| matches!(event, Event::EnemyDestroyed { .. })),
        2
    );
    assert_eq!(count(&events, |event| matches!(event, Event::GameWon)), 1);
    assert_eq!(query::gold(session.world()), Gold::new(500));
}

#[test]
fn paused_session_stays_frozen() {
    let mut session = Session::new(&Scenario::default()).expect("valid scenario");
    let mut events = Vec::new();
    let _ = session.run(10, &mut events);
    let elapsed = session.elapsed();

    session.set_paused(true);
    session.submit(BuilderRequest::Place {
        kind: EmplacementKind::Basic,
        point: TOWER_POINT,
    });
    assert_eq!(session.run(100, &mut events), 0);
    assert_eq!(session.elapsed(), elapsed);
    assert!(query::emplacement_view(session.world()).is_empty());

    session.set_paused(false);
    assert!(session.step(&mut events));
    assert_eq!(query::emplacement_view(session.world()).len(), 1);
}

fn replay_fingerprint(seed: u64) -> (u64, usize) {
    use std::hash::{Hash, Hasher};

    let scenario = Scenario {
        seed,
        ..Scenario::default()
    };
    let mut session = Session::new(&scenario).expect("valid scenario");
    for point in [
        TOWER_POINT,
        Vec2::new(352.0, 288.0),
        Vec2::new(608.0, 416.0),
    ] {
        session.submit(BuilderRequest::Place {
            kind: EmplacementKind::Basic,
            point,
        });
    }
    session.submit(BuilderRequest::Place {
        kind: EmplacementKind::Sniper,
        point: Vec2::new(800.0, 480.0),
    });

    let mut events = Vec::new();
    let _ = session.run(3_000, &mut events);

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for event in &events {
        format!("{event:?}").hash(&mut hasher);
    }
    (hasher.finish(), events.len())
}

#[test]
fn identical_seeds_replay_identically() {
    assert_eq!(replay_fingerprint(42), replay_fingerprint(42));
}

#[test]
fn invalid_procedural_settings_are_rejected_at_startup() {
    let mut scenario = Scenario::default();
    scenario.waves.level_scaling = -1.0;
    assert_eq!(
        Session::new(&scenario).err(),
        Some(ConfigError::InvalidLevelScaling(-1.0))
    );

    let mut scenario = Scenario::default();
    scenario.waves.base_count_per_level = 1e30;
    assert!(matches!(
        Session::new(&scenario).err(),
        Some(ConfigError::WaveTooLarge { .. })
    ));
}

#[test]
fn generated_mobs_spawn_alive_with_positive_stats() {
    let mut scenario = Scenario {
        seed: 5,
        ..Scenario::default()
    };
    scenario.waves.authored.clear();
    scenario.waves.procedural_waves = 2;
    scenario.waves.deviation = 0.99;
    let mut session = Session::new(&scenario).expect("valid scenario");
    let mut events = Vec::new();

    let _ = session.run(5, &mut events);

    let mobs = query::mob_view(session.world());
    assert!(!mobs.is_empty());
    for mob in mobs.iter() {
        assert!(mob.health > 0.0);
        assert!(mob.speed > 0.0);
    }
}
