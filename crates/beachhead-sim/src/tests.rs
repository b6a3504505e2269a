//! Tests for the match engine, pool, spawner, placement, hazards, and outcomes.

use std::collections::BTreeMap;

use glam::Vec3;
use hecs::World;
use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use beachhead_core::commands::{Contact, PlayerCommand};
use beachhead_core::components::{Enemy, Navigation, Obstacle, Preview};
use beachhead_core::config::*;
use beachhead_core::enums::*;
use beachhead_core::events::{MatchEvent, NavigationOrder};
use beachhead_core::state::MatchSnapshot;
use beachhead_core::types::{EntityId, SurfaceHit, Transform};

use crate::bus::{EventBus, Subscriber, Subscription, Topic};
use crate::engine::SimulationEngine;
use crate::ids::{entity_id, resolve};
use crate::orchestrator::{MatchOrchestrator, WaveResolution};
use crate::pool::ObjectPool;
use crate::scenario;
use crate::scheduler::Scheduler;
use crate::systems::enemy::{self, DamageOutcome, EnemyPrefab};
use crate::systems::obstacle_registry::ObstacleRegistry;
use crate::systems::placement::PlacementController;
use crate::systems::wave_spawner::{build_roster, WaveSpawner};
use crate::systems::wave_timer::WaveTimer;

const WALL: usize = 0;
const SPIKES: usize = 1;

fn tiny() -> EnemyTemplate {
    EnemyTemplate {
        category: EnemyCategory::Tiny,
        health: 10.0,
        speed: 4.0,
        damage: 5.0,
    }
}

/// Two waves: 3 Tiny, then 2 Tiny + 1 Medium. One tower with 20 health.
fn test_config() -> MatchConfig {
    MatchConfig {
        seed: 7,
        waves: vec![
            WaveDescriptor {
                enemies: vec![(EnemyCategory::Tiny, 3)],
            },
            WaveDescriptor {
                enemies: vec![(EnemyCategory::Tiny, 2), (EnemyCategory::Medium, 1)],
            },
        ],
        wave_durations_secs: vec![10.0, 20.0],
        spawn_cadence_secs: 0.5,
        spawn_position: Vec3::new(0.0, 0.0, 40.0),
        destinations: vec![Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)],
        enemy_templates: vec![
            tiny(),
            EnemyTemplate {
                category: EnemyCategory::Medium,
                health: 30.0,
                speed: 3.0,
                damage: 10.0,
            },
        ],
        obstacle_templates: vec![
            ObstacleTemplate {
                name: "Wall".into(),
                description: String::new(),
                kind: ObstacleKind::Wall,
                health: 12.0,
                damage: 0.0,
                strike_interval_secs: 1.0,
                initial_max_count: 1,
            },
            ObstacleTemplate {
                name: "Spikes".into(),
                description: String::new(),
                kind: ObstacleKind::Spikes,
                health: 20.0,
                damage: 4.0,
                strike_interval_secs: 1.0,
                initial_max_count: 1,
            },
        ],
        quota_schedule: BTreeMap::from([(1, vec![2, 1]), (2, vec![1, 3])]),
        towers: vec![TowerConfig {
            position: Vec3::ZERO,
            health: 20.0,
        }],
        placement_layer: 6,
    }
}

fn new_engine(config: MatchConfig) -> SimulationEngine {
    SimulationEngine::new(config).unwrap()
}

fn valid_hit() -> Option<SurfaceHit> {
    Some(SurfaceHit {
        point: Vec3::new(3.0, 2.0, 4.0),
        layer: 6,
    })
}

fn spawned_enemies(snapshot: &MatchSnapshot) -> Vec<EntityId> {
    snapshot
        .events
        .iter()
        .filter_map(|e| match e {
            MatchEvent::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect()
}

fn count_events(snapshot: &MatchSnapshot, pred: impl Fn(&MatchEvent) -> bool) -> usize {
    snapshot.events.iter().filter(|e| pred(e)).count()
}

/// Place an obstacle through the command pipeline and return its id.
fn place(engine: &mut SimulationEngine, template: usize) -> EntityId {
    engine.queue_commands([
        PlayerCommand::SelectObstacle { index: template },
        PlayerCommand::PointerMoved { hit: valid_hit() },
        PlayerCommand::ConfirmPlacement,
    ]);
    let snapshot = engine.tick();
    snapshot
        .events
        .iter()
        .find_map(|e| match e {
            MatchEvent::ObstaclePlaced { obstacle, .. } => Some(*obstacle),
            _ => None,
        })
        .expect("obstacle should be placed")
}

/// Send a wave and return the id of the first enemy released.
fn start_wave(engine: &mut SimulationEngine) -> EntityId {
    engine.queue_command(PlayerCommand::SendWave);
    let snapshot = engine.tick();
    spawned_enemies(&snapshot)[0]
}

fn enemy_health(engine: &SimulationEngine, id: EntityId) -> f32 {
    let entity = resolve(engine.world(), id).unwrap();
    let health = engine.world().get::<&Enemy>(entity).unwrap().health;
    health
}

fn obstacle_health(engine: &SimulationEngine, id: EntityId) -> Option<f32> {
    let entity = resolve(engine.world(), id)?;
    let health = engine.world().get::<&Obstacle>(entity).ok()?.health;
    Some(health)
}

fn run(engine: &mut SimulationEngine, ticks: usize) -> MatchSnapshot {
    let mut last = MatchSnapshot::default();
    for _ in 0..ticks {
        last = engine.tick();
    }
    last
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = new_engine(scenario::beach_assault());
    let mut engine_b = new_engine(scenario::beach_assault());

    for _ in 0..1200 {
        for engine in [&mut engine_a, &mut engine_b] {
            if engine.phase() == MatchPhase::PreWave {
                engine.queue_command(PlayerCommand::SendWave);
            }
        }
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_engine_rejects_invalid_config() {
    let mut config = test_config();
    config.towers.clear();
    assert!(SimulationEngine::new(config).is_err());
}

#[test]
fn test_bundled_scenarios_are_valid() {
    assert!(scenario::beach_assault().validate().is_ok());
    assert!(scenario::drill().validate().is_ok());
    assert!(scenario::by_name("drill").is_some());
    assert!(scenario::by_name("nope").is_none());
    assert_eq!(
        scenario::beach_assault().quota_limits(3),
        Some(&[2, 1, 10][..])
    );
}

// ---- Wave lifecycle ----

#[test]
fn test_initial_state() {
    let mut engine = new_engine(test_config());
    let snapshot = engine.tick();
    assert_eq!(snapshot.phase, MatchPhase::PreWave);
    assert_eq!(snapshot.wave_number, 0);
    assert_eq!(snapshot.waves_total, 2);
    assert_eq!(snapshot.towers_remaining, 1);
    assert_eq!(snapshot.timer.state, TimerState::Stopped);
    assert_eq!(snapshot.timer.remaining_secs, 10.0);
    assert_eq!(snapshot.quotas[WALL].max_count, 1);
    // Prewarm holds the peak per category, all dormant.
    assert_eq!(engine.pool().instances(EnemyCategory::Tiny), 3);
    assert_eq!(engine.pool().available(engine.world(), EnemyCategory::Tiny), 3);
    assert_eq!(engine.pool().instances(EnemyCategory::Medium), 1);
    assert_eq!(engine.pool().instances(EnemyCategory::Tank), 0);
}

#[test]
fn test_wave_end_to_end() {
    let mut engine = new_engine(test_config());
    engine.queue_command(PlayerCommand::SendWave);

    let mut release_times = Vec::new();
    let mut wave_end = None;
    for _ in 0..320 {
        let before = engine.time().elapsed_secs;
        let snapshot = engine.tick();
        if snapshot.time.tick == 1 {
            assert_eq!(snapshot.wave_number, 1);
            assert_eq!(snapshot.phase, MatchPhase::WaveActive);
            assert_eq!(snapshot.quotas[WALL].max_count, 2);
            assert_eq!(snapshot.quotas[SPIKES].max_count, 1);
        }
        for _ in spawned_enemies(&snapshot) {
            release_times.push(before);
        }
        if count_events(&snapshot, |e| matches!(e, MatchEvent::WaveEnded { .. })) > 0 {
            wave_end = Some(snapshot.clone());
        }
    }

    assert_eq!(release_times.len(), 3);
    for (actual, expected) in release_times.iter().zip([0.0, 0.5, 1.0]) {
        assert!((actual - expected).abs() < 1e-9, "release at {actual}, expected {expected}");
    }

    let end = wave_end.expect("wave should end");
    assert!((end.time.elapsed_secs - 10.0).abs() < 1e-9);
    assert_eq!(end.phase, MatchPhase::PreWave);
    assert_eq!(end.wave_number, 1);
    assert_eq!(end.active_enemies, 0);
    assert_eq!(end.timer.remaining_secs, 20.0);
    assert_eq!(end.timer.state, TimerState::Stopped);
    assert!(end.quotas.iter().all(|q| q.current_count == 0 && q.can_place));

    let halts = end
        .navigation
        .iter()
        .filter(|o| matches!(o, NavigationOrder::Halt { .. }))
        .count();
    assert_eq!(halts, 3);
    assert_eq!(engine.orchestrator().recalled().len(), 3);
    assert_eq!(engine.pool().available(engine.world(), EnemyCategory::Tiny), 3);
}

#[test]
fn test_send_wave_ignored_while_wave_active() {
    let mut engine = new_engine(test_config());
    engine.queue_commands([PlayerCommand::SendWave, PlayerCommand::SendWave]);
    let snapshot = engine.tick();
    assert_eq!(snapshot.wave_number, 1);
    assert_eq!(
        count_events(&snapshot, |e| matches!(e, MatchEvent::WaveStarted { .. })),
        1
    );

    engine.send_wave();
    assert_eq!(engine.orchestrator().wave_index(), 1);
}

#[test]
fn test_surviving_every_wave_wins() {
    let mut engine = new_engine(test_config());
    let mut starts = 0;
    let mut last = MatchSnapshot::default();
    for _ in 0..2000 {
        if engine.phase() == MatchPhase::PreWave {
            engine.queue_command(PlayerCommand::SendWave);
        }
        last = engine.tick();
        starts += count_events(&last, |e| matches!(e, MatchEvent::WaveStarted { .. }));
        if last.phase.is_terminal() {
            break;
        }
    }

    assert_eq!(last.phase, MatchPhase::Won);
    assert_eq!(starts, 2);
    assert_eq!(last.wave_number, 2);
    let ended = last
        .events
        .iter()
        .position(|e| matches!(e, MatchEvent::WaveEnded { .. }))
        .unwrap();
    let won = last.events.iter().position(|e| *e == MatchEvent::Won).unwrap();
    assert!(ended < won);

    // Terminal: no more waves, placements, or time.
    let tick = engine.time().tick;
    engine.queue_commands([
        PlayerCommand::SendWave,
        PlayerCommand::SelectObstacle { index: WALL },
    ]);
    let after = engine.tick();
    assert_eq!(after.phase, MatchPhase::Won);
    assert_eq!(after.placement.state, PlacementState::Idle);
    assert_eq!(engine.time().tick, tick);
}

#[test]
fn test_second_wave_releases_configured_multiset() {
    let mut engine = new_engine(test_config());
    let mut categories = Vec::new();
    for _ in 0..2000 {
        if engine.phase() == MatchPhase::PreWave {
            engine.queue_command(PlayerCommand::SendWave);
        }
        let snapshot = engine.tick();
        if snapshot.wave_number == 2 {
            for event in &snapshot.events {
                if let MatchEvent::EnemySpawned { category, .. } = event {
                    categories.push(*category);
                }
            }
        }
        if snapshot.phase.is_terminal() {
            break;
        }
    }
    categories.sort();
    assert_eq!(
        categories,
        vec![EnemyCategory::Tiny, EnemyCategory::Tiny, EnemyCategory::Medium]
    );
}

#[test]
fn test_wave_ended_twice_equals_once() {
    let mut engine_a = new_engine(test_config());
    let mut engine_b = new_engine(test_config());
    for engine in [&mut engine_a, &mut engine_b] {
        engine.queue_command(PlayerCommand::SendWave);
        run(engine, 40);
    }

    engine_a.notify_wave_ended();
    engine_b.notify_wave_ended();
    engine_b.notify_wave_ended();

    assert_eq!(
        engine_a.orchestrator().recalled(),
        engine_b.orchestrator().recalled()
    );
    let snapshot_a = engine_a.tick();
    let snapshot_b = engine_b.tick();
    assert_eq!(
        count_events(&snapshot_b, |e| matches!(e, MatchEvent::WaveEnded { .. })),
        1
    );
    assert_eq!(
        serde_json::to_string(&snapshot_a).unwrap(),
        serde_json::to_string(&snapshot_b).unwrap()
    );
}

#[test]
fn test_wave_ended_between_waves_is_ignored() {
    let mut engine = new_engine(test_config());
    let wall = place(&mut engine, WALL);

    engine.notify_wave_ended();
    let snapshot = engine.tick();

    assert_eq!(snapshot.phase, MatchPhase::PreWave);
    assert_eq!(snapshot.wave_number, 0);
    assert_eq!(
        count_events(&snapshot, |e| matches!(e, MatchEvent::WaveEnded { .. })),
        0
    );
    assert_eq!(obstacle_health(&engine, wall), Some(12.0));
    assert_eq!(engine.registry().tracked().len(), 1);
    assert_eq!(snapshot.quotas[WALL].current_count, 1);
    assert!(!snapshot.quotas[WALL].can_place);
}

#[test]
fn test_orientation_delay_then_single_order() {
    let config = test_config();
    let mut engine = new_engine(config.clone());
    let first = start_wave(&mut engine);

    let mut orders = Vec::new();
    for i in 1..=60 {
        let snapshot = engine.tick();
        for order in &snapshot.navigation {
            if let NavigationOrder::MoveTo {
                entity,
                destination,
                speed,
                acceleration,
            } = order
            {
                if *entity == first {
                    assert!(config.destinations.contains(destination));
                    assert!((acceleration - speed * 0.8).abs() < 1e-6);
                    orders.push(i);
                }
            }
        }
    }
    assert_eq!(orders, vec![30]);
}

// ---- Towers and loss ----

#[test]
fn test_dead_tower_loses_and_saturates() {
    let mut config = test_config();
    config.towers.push(TowerConfig {
        position: Vec3::X,
        health: 20.0,
    });
    let mut engine = new_engine(config);

    engine.dead_tower();
    assert_eq!(engine.orchestrator().towers_remaining(), 1);
    assert_eq!(engine.phase(), MatchPhase::PreWave);

    engine.dead_tower();
    assert_eq!(engine.phase(), MatchPhase::Lost);
    engine.dead_tower();
    assert_eq!(engine.orchestrator().towers_remaining(), 0);

    let snapshot = engine.tick();
    assert_eq!(count_events(&snapshot, |e| *e == MatchEvent::Lost), 1);
}

#[test]
fn test_tower_breaches_destroy_tower_and_lose() {
    let mut engine = new_engine(test_config());
    let enemy = start_wave(&mut engine);
    let tower = entity_id(engine.towers()[0]);

    for _ in 0..3 {
        engine.queue_contact(Contact::TowerBreached { tower, enemy });
    }
    let snapshot = engine.tick();
    assert_eq!(snapshot.phase, MatchPhase::WaveActive);
    assert_eq!(snapshot.towers_remaining, 1);

    engine.queue_contact(Contact::TowerBreached { tower, enemy });
    engine.queue_contact(Contact::TowerBreached { tower, enemy });
    let snapshot = engine.tick();
    assert_eq!(snapshot.phase, MatchPhase::Lost);
    assert_eq!(snapshot.towers_remaining, 0);
    assert_eq!(
        snapshot.events,
        vec![
            MatchEvent::TowerDestroyed {
                tower,
                remaining: 0
            },
            MatchEvent::Lost
        ]
    );
    assert_eq!(snapshot.timer.state, TimerState::Stopped);

    let tick = engine.time().tick;
    engine.queue_command(PlayerCommand::SendWave);
    run(&mut engine, 10);
    assert_eq!(engine.time().tick, tick);
    assert_eq!(engine.phase(), MatchPhase::Lost);
}

#[test]
fn test_breach_by_unknown_entity_is_ignored() {
    let mut engine = new_engine(test_config());
    start_wave(&mut engine);
    let tower = entity_id(engine.towers()[0]);
    engine.queue_contact(Contact::TowerBreached {
        tower,
        enemy: EntityId(u64::MAX),
    });
    let snapshot = engine.tick();
    assert_eq!(snapshot.towers_remaining, 1);
}

// ---- Obstacles ----

#[test]
fn test_spike_trap_strikes_each_interval_until_kill() {
    let mut engine = new_engine(test_config());
    let trap = place(&mut engine, SPIKES);
    let enemy = start_wave(&mut engine);

    engine.queue_contact(Contact::ObstacleEntered {
        obstacle: trap,
        enemy,
    });
    engine.tick();
    assert_eq!(enemy_health(&engine, enemy), 6.0);

    run(&mut engine, 29);
    assert_eq!(enemy_health(&engine, enemy), 6.0);
    engine.tick();
    assert_eq!(enemy_health(&engine, enemy), 2.0);

    run(&mut engine, 29);
    let snapshot = engine.tick();
    assert_eq!(enemy_health(&engine, enemy), 0.0);
    assert_eq!(
        count_events(&snapshot, |e| matches!(
            e,
            MatchEvent::EnemyKilled { enemy: id, .. } if *id == enemy
        )),
        1
    );
    assert!(snapshot
        .navigation
        .contains(&NavigationOrder::Halt { entity: enemy }));
    let entity = resolve(engine.world(), enemy).unwrap();
    assert!(!engine.orchestrator().active_enemies().contains(&entity));
    assert_eq!(engine.hazards().active_contacts(), 0);
}

#[test]
fn test_spike_trap_stops_on_exit() {
    let mut engine = new_engine(test_config());
    let trap = place(&mut engine, SPIKES);
    let enemy = start_wave(&mut engine);

    engine.queue_contact(Contact::ObstacleEntered {
        obstacle: trap,
        enemy,
    });
    engine.tick();
    engine.queue_contact(Contact::ObstacleExited {
        obstacle: trap,
        enemy,
    });
    run(&mut engine, 90);
    assert_eq!(enemy_health(&engine, enemy), 6.0);
    assert_eq!(engine.hazards().active_contacts(), 0);
}

#[test]
fn test_wall_takes_contact_damage_until_broken() {
    let mut engine = new_engine(test_config());
    let wall = place(&mut engine, WALL);
    let enemy = start_wave(&mut engine);

    engine.queue_contact(Contact::ObstacleEntered {
        obstacle: wall,
        enemy,
    });
    engine.tick();
    assert_eq!(obstacle_health(&engine, wall), Some(7.0));
    run(&mut engine, 29);
    assert_eq!(obstacle_health(&engine, wall), Some(7.0));
    engine.tick();
    assert_eq!(obstacle_health(&engine, wall), Some(2.0));

    run(&mut engine, 29);
    let snapshot = engine.tick();
    assert_eq!(obstacle_health(&engine, wall), None);
    assert!(snapshot
        .events
        .contains(&MatchEvent::ObstacleDestroyed { obstacle: wall }));
    // The enemy pushing it is unharmed.
    assert_eq!(enemy_health(&engine, enemy), 10.0);
}

#[test]
fn test_wall_survives_when_enemy_leaves() {
    let mut engine = new_engine(test_config());
    let wall = place(&mut engine, WALL);
    let enemy = start_wave(&mut engine);

    engine.queue_contact(Contact::ObstacleEntered {
        obstacle: wall,
        enemy,
    });
    engine.tick();
    engine.queue_contact(Contact::ObstacleExited {
        obstacle: wall,
        enemy,
    });
    run(&mut engine, 90);
    assert_eq!(obstacle_health(&engine, wall), Some(7.0));
}

#[test]
fn test_wave_end_clears_obstacles_and_quotas() {
    let mut engine = new_engine(test_config());
    let wall = place(&mut engine, WALL);
    assert_eq!(engine.registry().tracked().len(), 1);

    start_wave(&mut engine);
    let snapshot = run(&mut engine, 300);
    assert_eq!(snapshot.phase, MatchPhase::PreWave);
    assert!(engine.registry().is_empty());
    assert_eq!(obstacle_health(&engine, wall), None);
    assert_eq!(snapshot.quotas[WALL].current_count, 0);
    assert!(snapshot.quotas[WALL].can_place);
}

#[test]
fn test_contact_with_preview_is_ignored() {
    let mut engine = new_engine(test_config());
    let enemy = start_wave(&mut engine);
    engine.queue_commands([
        PlayerCommand::SelectObstacle { index: SPIKES },
        PlayerCommand::PointerMoved { hit: valid_hit() },
    ]);
    engine.tick();
    let preview = entity_id(engine.placement().preview().unwrap());
    engine.queue_contact(Contact::ObstacleEntered {
        obstacle: preview,
        enemy,
    });
    engine.tick();
    assert_eq!(engine.hazards().active_contacts(), 0);
}

// ---- Placement ----

#[test]
fn test_select_out_of_range_is_noop() {
    let config = test_config();
    let mut world = World::new();
    let mut placement = PlacementController::new(&config.obstacle_templates, 6);
    assert!(!placement.select(&mut world, 9));
    assert_eq!(placement.state(), PlacementState::Idle);
    assert_eq!(world.len(), 0);
}

#[test]
fn test_preview_hides_off_layer_and_recovers() {
    let config = test_config();
    let mut world = World::new();
    let mut placement = PlacementController::new(&config.obstacle_templates, 6);
    placement.select(&mut world, WALL);

    placement.set_cursor(
        &mut world,
        Some(SurfaceHit {
            point: Vec3::ONE,
            layer: 3,
        }),
    );
    assert!(!placement.preview_visible());
    placement.set_cursor(&mut world, None);
    assert!(!placement.preview_visible());
    assert_eq!(placement.state(), PlacementState::PreviewActive);

    placement.set_cursor(&mut world, valid_hit());
    assert!(placement.preview_visible());
    let preview = placement.preview().unwrap();
    assert!(world.get::<&Preview>(preview).unwrap().visible);
    let position = world.get::<&Transform>(preview).unwrap().position;
    assert_eq!(position, Vec3::new(3.0, 0.0, 4.0));
}

#[test]
fn test_rotation_cycles_two_steps() {
    let config = test_config();
    let mut world = World::new();
    let mut placement = PlacementController::new(&config.obstacle_templates, 6);
    placement.select(&mut world, WALL);
    assert_eq!(placement.rotation_degrees(), 0.0);
    placement.rotate(&mut world);
    assert_eq!(placement.rotation_degrees(), 90.0);
    placement.rotate(&mut world);
    assert_eq!(placement.rotation_degrees(), 0.0);
}

#[test]
fn test_confirm_places_obstacle_and_resets_session() {
    let config = test_config();
    let mut world = World::new();
    let mut registry = ObstacleRegistry::new();
    let mut placement = PlacementController::new(&config.obstacle_templates, 6);

    placement.select(&mut world, WALL);
    placement.set_cursor(&mut world, valid_hit());
    placement.rotate(&mut world);
    let preview = placement.preview().unwrap();

    let obstacle = placement
        .confirm(&mut world, &config.obstacle_templates, &mut registry)
        .unwrap();

    let transform = *world.get::<&Transform>(obstacle).unwrap();
    assert_eq!(transform.position, Vec3::new(3.0, 0.0, 4.0));
    assert_eq!(transform.yaw_degrees(), 90.0);
    assert_eq!(world.get::<&Obstacle>(obstacle).unwrap().health, 12.0);
    assert!(!world.contains(preview));
    assert_eq!(placement.state(), PlacementState::Idle);
    assert_eq!(placement.rotation_degrees(), 0.0);
    assert_eq!(registry.tracked(), &[obstacle]);

    let quota = placement.quota(WALL).unwrap();
    assert_eq!(quota.current_count, 1);
    assert!(!quota.can_place);

    // Quota spent: the preview stays hidden and confirm does nothing.
    placement.select(&mut world, WALL);
    placement.set_cursor(&mut world, valid_hit());
    assert!(!placement.preview_visible());
    assert!(placement
        .confirm(&mut world, &config.obstacle_templates, &mut registry)
        .is_none());
}

#[test]
fn test_confirm_without_visible_preview_is_noop() {
    let config = test_config();
    let mut world = World::new();
    let mut registry = ObstacleRegistry::new();
    let mut placement = PlacementController::new(&config.obstacle_templates, 6);
    assert!(placement
        .confirm(&mut world, &config.obstacle_templates, &mut registry)
        .is_none());
    placement.select(&mut world, SPIKES);
    assert!(placement
        .confirm(&mut world, &config.obstacle_templates, &mut registry)
        .is_none());
    assert!(registry.is_empty());
}

#[test]
fn test_limits_never_drop_below_placed_count() {
    let config = test_config();
    let mut world = World::new();
    let mut registry = ObstacleRegistry::new();
    let mut placement = PlacementController::new(&config.obstacle_templates, 6);
    placement.apply_limits(&[3, 3]);
    for _ in 0..2 {
        placement.select(&mut world, WALL);
        placement.set_cursor(&mut world, valid_hit());
        placement
            .confirm(&mut world, &config.obstacle_templates, &mut registry)
            .unwrap();
    }
    placement.apply_limits(&[1, 1]);
    let quota = placement.quota(WALL).unwrap();
    assert_eq!(quota.max_count, 2);
    assert!(!quota.can_place);

    placement.reset_quotas();
    assert!(placement.quota(WALL).unwrap().can_place);
}

#[test]
fn test_wave_start_cancels_preview() {
    let mut engine = new_engine(test_config());
    engine.queue_command(PlayerCommand::SelectObstacle { index: WALL });
    engine.tick();
    let preview = engine.placement().preview().unwrap();

    engine.queue_command(PlayerCommand::SendWave);
    let snapshot = engine.tick();
    assert_eq!(snapshot.placement.state, PlacementState::Idle);
    assert!(!engine.world().contains(preview));
}

#[derive(Debug, Clone)]
enum QuotaOp {
    Place,
    Reset,
    Limit(u32),
}

fn quota_op() -> impl Strategy<Value = QuotaOp> {
    prop_oneof![
        Just(QuotaOp::Place),
        Just(QuotaOp::Reset),
        (0u32..5).prop_map(QuotaOp::Limit),
    ]
}

proptest! {
    #[test]
    fn prop_quota_count_never_exceeds_max(ops in prop::collection::vec(quota_op(), 1..40)) {
        let config = test_config();
        let templates = &config.obstacle_templates;
        let mut world = World::new();
        let mut registry = ObstacleRegistry::new();
        let mut placement = PlacementController::new(templates, 6);

        for op in ops {
            match op {
                QuotaOp::Place => {
                    placement.select(&mut world, WALL);
                    placement.set_cursor(&mut world, valid_hit());
                    placement.confirm(&mut world, templates, &mut registry);
                }
                QuotaOp::Reset => placement.reset_quotas(),
                QuotaOp::Limit(max) => placement.apply_limits(&[max, max]),
            }
            for quota in placement.quotas() {
                prop_assert!(quota.current_count <= quota.max_count);
                prop_assert_eq!(quota.can_place, quota.current_count < quota.max_count);
            }
        }
    }
}

// ---- Enemies and pooling ----

fn tiny_prefab() -> EnemyPrefab {
    EnemyPrefab {
        template: tiny(),
        destinations: vec![Vec3::X, Vec3::Z],
    }
}

#[test]
fn test_pool_reuses_after_sequential_cycles() {
    let mut world = World::new();
    let mut pool = ObjectPool::new();
    let prefab = tiny_prefab();
    pool.prewarm(&mut world, Some(&prefab), 3);
    assert_eq!(pool.available(&world, EnemyCategory::Tiny), 3);

    for _ in 0..3 {
        let e = pool
            .acquire(&mut world, Some(&prefab), Transform::default())
            .unwrap();
        assert!(enemy::die(&mut world, e));
    }
    let e = pool
        .acquire(&mut world, Some(&prefab), Transform::at(Vec3::Y))
        .unwrap();
    assert_eq!(pool.instances(EnemyCategory::Tiny), 3);
    assert!(pool.inventory(EnemyCategory::Tiny).contains(&e));
    assert_eq!(world.get::<&Transform>(e).unwrap().position, Vec3::Y);
}

#[test]
fn test_pool_allocates_when_exhausted() {
    let mut world = World::new();
    let mut pool = ObjectPool::new();
    let prefab = tiny_prefab();
    pool.prewarm(&mut world, Some(&prefab), 3);

    let acquired: Vec<_> = (0..4)
        .map(|_| {
            pool.acquire(&mut world, Some(&prefab), Transform::default())
                .unwrap()
        })
        .collect();
    assert_eq!(pool.instances(EnemyCategory::Tiny), 4);
    assert_eq!(pool.available(&world, EnemyCategory::Tiny), 0);
    assert!(acquired.iter().all(|&e| enemy::is_alive(&world, e)));
}

#[test]
fn test_pool_without_prefab_is_noop() {
    let mut world = World::new();
    let mut pool: ObjectPool<EnemyCategory> = ObjectPool::new();
    pool.prewarm(&mut world, None::<&EnemyPrefab>, 5);
    assert!(pool
        .acquire(&mut world, None::<&EnemyPrefab>, Transform::default())
        .is_none());
    assert_eq!(world.len(), 0);
}

#[test]
fn test_reactivation_restores_enemy() {
    let mut world = World::new();
    let mut pool = ObjectPool::new();
    let prefab = tiny_prefab();
    let e = pool
        .acquire(&mut world, Some(&prefab), Transform::default())
        .unwrap();
    assert_eq!(enemy::receive_damage(&mut world, e, 3.0), DamageOutcome::Wounded { remaining: 7.0 });
    assert!(enemy::recall(&mut world, e));
    assert!(!enemy::recall(&mut world, e));

    let again = pool
        .acquire(&mut world, Some(&prefab), Transform::default())
        .unwrap();
    assert_eq!(again, e);
    let state = world.get::<&Enemy>(e).unwrap();
    assert_eq!(state.health, 10.0);
    assert_eq!(state.status, EnemyStatus::Alive);
    assert!(world.get::<&Navigation>(e).unwrap().target.is_none());
}

#[test]
fn test_stale_orientation_is_dropped_after_recycle() {
    let mut world = World::new();
    let mut pool = ObjectPool::new();
    let prefab = tiny_prefab();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let e = pool
        .acquire(&mut world, Some(&prefab), Transform::default())
        .unwrap();
    let stale = enemy::activation_of(&world, e).unwrap();
    assert!(enemy::die(&mut world, e));
    assert!(enemy::choose_destination(&mut world, e, stale, &mut rng).is_none());

    pool.acquire(&mut world, Some(&prefab), Transform::default())
        .unwrap();
    let current = enemy::activation_of(&world, e).unwrap();
    assert_ne!(current, stale);
    assert!(enemy::choose_destination(&mut world, e, stale, &mut rng).is_none());
    assert!(enemy::choose_destination(&mut world, e, current, &mut rng).is_some());
    // One destination per activation.
    assert!(enemy::choose_destination(&mut world, e, current, &mut rng).is_none());
}

proptest! {
    #[test]
    fn prop_damage_kills_exactly_once(damages in prop::collection::vec(0.0f32..20.0, 1..30)) {
        let mut world = World::new();
        let mut pool = ObjectPool::new();
        let prefab = EnemyPrefab {
            template: EnemyTemplate { health: 50.0, ..tiny() },
            destinations: vec![Vec3::ZERO],
        };
        let e = pool
            .acquire(&mut world, Some(&prefab), Transform::default())
            .unwrap();

        let mut expected = 50.0f32;
        let mut alive = true;
        let mut kills = 0;
        for d in damages {
            let outcome = enemy::receive_damage(&mut world, e, d);
            if alive {
                expected -= d;
                if expected <= 0.0 {
                    expected = 0.0;
                    alive = false;
                    kills += 1;
                    prop_assert_eq!(outcome, DamageOutcome::Killed);
                } else {
                    prop_assert_eq!(outcome, DamageOutcome::Wounded { remaining: expected });
                }
            } else {
                prop_assert_eq!(outcome, DamageOutcome::Ignored);
            }
        }

        let health = world.get::<&Enemy>(e).unwrap().health;
        prop_assert_eq!(health, expected);
        prop_assert!(kills <= 1);
        prop_assert_eq!(enemy::is_alive(&world, e), alive);
    }
}

// ---- Spawner ----

#[test]
fn test_roster_matches_wave_counts() {
    let wave = WaveDescriptor {
        enemies: vec![
            (EnemyCategory::Tank, 1),
            (EnemyCategory::Tiny, 2),
            (EnemyCategory::Tank, 1),
        ],
    };
    let mut roster = build_roster(&wave);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    roster.shuffle(&mut rng);
    roster.sort();
    assert_eq!(
        roster,
        vec![
            EnemyCategory::Tiny,
            EnemyCategory::Tiny,
            EnemyCategory::Tank,
            EnemyCategory::Tank
        ]
    );
}

#[test]
fn test_shuffle_positions_are_uniform() {
    let wave = WaveDescriptor {
        enemies: vec![
            (EnemyCategory::Tiny, 1),
            (EnemyCategory::Medium, 1),
            (EnemyCategory::Tank, 1),
        ],
    };
    let trials = 3000;
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut counts = [[0u32; 3]; 3];
    for _ in 0..trials {
        let mut roster = build_roster(&wave);
        roster.shuffle(&mut rng);
        for (position, category) in roster.iter().enumerate() {
            let c = EnemyCategory::ALL.iter().position(|x| x == category).unwrap();
            counts[position][c] += 1;
        }
    }
    // Expected 1000 each; sd ~ 26.
    for row in counts {
        for n in row {
            assert!((850..=1150).contains(&n), "skewed shuffle: {counts:?}");
        }
    }
}

#[test]
fn test_new_wave_cancels_running_release() {
    let config = test_config();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut scheduler = Scheduler::new();
    let mut spawner = WaveSpawner::new();

    assert!(spawner.begin(&config, 0, &mut rng, &mut scheduler));
    let first = spawner.sequence().unwrap().clone();
    assert!(spawner.begin(&config, 1, &mut rng, &mut scheduler));

    assert!(first.is_cancelled());
    assert_eq!(spawner.remaining(), 3);
    assert_eq!(scheduler.len(), 1);
}

#[test]
fn test_unknown_wave_spawns_nothing() {
    let config = test_config();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut scheduler = Scheduler::new();
    let mut spawner = WaveSpawner::new();
    assert!(!spawner.begin(&config, 7, &mut rng, &mut scheduler));
    assert!(!spawner.is_releasing());
    assert!(scheduler.is_empty());
}

// ---- Timer ----

#[test]
fn test_timer_fires_once() {
    let mut timer = WaveTimer::new(0.1);
    assert!(!timer.tick(0.05), "stopped timer must not count down");
    timer.start();
    assert!(!timer.tick(0.05));
    assert!(timer.tick(0.05));
    assert_eq!(timer.state(), TimerState::Stopped);
    assert!(!timer.tick(0.05));
    assert!(timer.has_fired());
}

#[test]
fn test_timer_reset_clears_latch_without_starting() {
    let mut timer = WaveTimer::new(0.1);
    timer.start();
    timer.tick(0.2);
    timer.reset(2.5);
    assert!(!timer.has_fired());
    assert_eq!(timer.state(), TimerState::Stopped);
    assert_eq!(timer.display_secs(), 3);
    timer.start();
    timer.stop();
    assert!(!timer.tick(5.0));
    assert_eq!(timer.remaining_secs(), 2.5);
}

// ---- Orchestrator and bus ----

#[test]
fn test_orchestrator_tracks_enemies_without_duplicates() {
    let mut world = World::new();
    let a = world.spawn(());
    let b = world.spawn(());
    let mut orchestrator = MatchOrchestrator::new(1, 1);
    orchestrator.add_enemy(a);
    orchestrator.add_enemy(a);
    orchestrator.add_enemy(b);
    assert_eq!(orchestrator.active_enemies(), &[a, b]);
    assert!(orchestrator.remove_enemy(a));
    assert!(!orchestrator.remove_enemy(a));

    assert_eq!(orchestrator.begin_resolution(), None);
    assert_eq!(orchestrator.begin_wave(), Some(0));
    assert_eq!(orchestrator.commit_wave(), 1);
    assert_eq!(orchestrator.begin_resolution(), Some(vec![b]));
    assert_eq!(orchestrator.finish_resolution(), WaveResolution::Won);
    assert!(!orchestrator.tower_destroyed());
}

#[test]
fn test_bus_delivery_order_and_unsubscribe() {
    let mut bus = EventBus::new();
    bus.subscribe(Topic::WaveEnded, Subscriber::Orchestrator);
    bus.subscribe(Topic::WaveEnded, Subscriber::Placement);
    bus.subscribe(Topic::WaveEnded, Subscriber::Orchestrator);
    assert_eq!(
        bus.subscribers(Topic::WaveEnded),
        vec![Subscriber::Orchestrator, Subscriber::Placement]
    );
    assert!(bus.unsubscribe(Subscription {
        topic: Topic::WaveEnded,
        subscriber: Subscriber::Orchestrator,
    }));
    assert_eq!(bus.subscribers(Topic::WaveEnded), vec![Subscriber::Placement]);
    assert!(bus.subscribers(Topic::Won).is_empty());
}

#[test]
fn test_unsubscribed_presentation_hears_nothing() {
    let mut engine = new_engine(test_config());
    engine.bus_mut().unsubscribe(Subscription {
        topic: Topic::WaveStarted,
        subscriber: Subscriber::Presentation,
    });
    engine.queue_command(PlayerCommand::SendWave);
    let snapshot = engine.tick();
    assert_eq!(snapshot.wave_number, 1);
    assert_eq!(
        count_events(&snapshot, |e| matches!(e, MatchEvent::WaveStarted { .. })),
        0
    );
    assert_eq!(spawned_enemies(&snapshot).len(), 1);
}

#[test]
fn test_teardown_releases_everything() {
    let mut engine = new_engine(test_config());
    engine.queue_command(PlayerCommand::SendWave);
    engine.tick();
    engine.teardown();
    for topic in Topic::ALL {
        assert!(engine.bus().subscribers(topic).is_empty());
    }
    assert_eq!(engine.scheduled(), 0);
    assert!(!engine.spawner().is_releasing());
}
