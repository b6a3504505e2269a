//! Simulation engine for a Beachhead match.
//!
//! `SimulationEngine` owns the hecs ECS world and every collaborator of a
//! match (pool, timer, spawner, placement, registry, hazards, orchestrator),
//! processes player commands and spatial contacts, runs all systems, and
//! produces `MatchSnapshot`s. Completely headless, enabling deterministic
//! testing.

use std::collections::{HashMap, VecDeque};

use hecs::{Entity, World};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use beachhead_core::commands::{Contact, PlayerCommand};
use beachhead_core::config::MatchConfig;
use beachhead_core::constants::{ENEMY_ORIENTATION_SECS, WALL_CONTACT_INTERVAL_SECS};
use beachhead_core::enums::{EnemyCategory, MatchPhase};
use beachhead_core::error::ConfigResult;
use beachhead_core::events::{MatchEvent, NavigationOrder};
use beachhead_core::state::MatchSnapshot;
use beachhead_core::types::{SimTime, Transform};

use crate::bus::{EventBus, Subscriber, Topic};
use crate::ids::{entity_id, resolve};
use crate::orchestrator::{MatchOrchestrator, WaveResolution};
use crate::pool::ObjectPool;
use crate::scheduler::{CancelToken, Scheduler};
use crate::systems;
use crate::systems::enemy::EnemyPrefab;
use crate::systems::hazards::{Hazards, SpikeStep, WallStep};
use crate::systems::obstacle_registry::ObstacleRegistry;
use crate::systems::placement::PlacementController;
use crate::systems::towers::BreachOutcome;
use crate::systems::wave_spawner::WaveSpawner;
use crate::systems::wave_timer::WaveTimer;
use crate::tasks::Task;
use crate::world_setup;

/// The simulation engine. Owns the ECS world and all match state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    config: MatchConfig,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    contact_queue: VecDeque<Contact>,

    bus: EventBus,
    scheduler: Scheduler<Task>,
    pool: ObjectPool<EnemyCategory>,
    prefabs: HashMap<EnemyCategory, EnemyPrefab>,
    orchestrator: MatchOrchestrator,
    timer: WaveTimer,
    spawner: WaveSpawner,
    placement: PlacementController,
    registry: ObstacleRegistry,
    hazards: Hazards,
    towers: Vec<Entity>,

    /// Outbound events for this tick's snapshot.
    events: Vec<MatchEvent>,
    /// Outbound navigation orders for this tick's snapshot.
    navigation: Vec<NavigationOrder>,
}

impl SimulationEngine {
    /// Validate `config` and set up a match in PreWave, with towers spawned
    /// and the enemy pool prewarmed.
    pub fn new(config: MatchConfig) -> ConfigResult<Self> {
        config.validate()?;

        let mut world = World::new();
        let towers = world_setup::spawn_towers(&mut world, &config);
        let prefabs = world_setup::build_enemy_prefabs(&config);
        let mut pool = ObjectPool::new();
        world_setup::prewarm_enemies(&mut world, &mut pool, &prefabs, &config);

        let first_duration = config.duration_for(0).unwrap_or_default();
        let orchestrator = MatchOrchestrator::new(config.wave_count(), towers.len() as u32);
        let placement = PlacementController::new(&config.obstacle_templates, config.placement_layer);

        let mut engine = Self {
            world,
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            contact_queue: VecDeque::new(),
            bus: EventBus::new(),
            scheduler: Scheduler::new(),
            pool,
            prefabs,
            orchestrator,
            timer: WaveTimer::new(first_duration),
            spawner: WaveSpawner::new(),
            placement,
            registry: ObstacleRegistry::new(),
            hazards: Hazards::new(),
            towers,
            events: Vec::new(),
            navigation: Vec::new(),
            config,
        };
        engine.wire_bus();
        Ok(engine)
    }

    /// Subscribe every collaborator. Presentation goes first on each topic
    /// so the announced event precedes its consequences in the outbox.
    fn wire_bus(&mut self) {
        for topic in Topic::ALL {
            self.bus.subscribe(topic, Subscriber::Presentation);
        }
        self.bus.subscribe(Topic::WaveStarted, Subscriber::Spawner);
        self.bus.subscribe(Topic::WaveStarted, Subscriber::Placement);

        self.bus.subscribe(Topic::WaveEnded, Subscriber::Orchestrator);
        self.bus.subscribe(Topic::WaveEnded, Subscriber::ObstacleRegistry);
        self.bus.subscribe(Topic::WaveEnded, Subscriber::Placement);
        self.bus.subscribe(Topic::WaveEnded, Subscriber::Spawner);

        self.bus.subscribe(Topic::Won, Subscriber::Spawner);
        self.bus.subscribe(Topic::Won, Subscriber::Placement);

        self.bus.subscribe(Topic::Lost, Subscriber::Orchestrator);
        self.bus.subscribe(Topic::Lost, Subscriber::Spawner);
        self.bus.subscribe(Topic::Lost, Subscriber::Placement);
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Queue a spatial contact for processing at the next tick boundary.
    pub fn queue_contact(&mut self, contact: Contact) {
        self.contact_queue.push_back(contact);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> MatchSnapshot {
        self.process_commands();
        self.process_contacts();

        if !self.orchestrator.is_terminal() {
            self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        let navigation = std::mem::take(&mut self.navigation);
        systems::snapshot::build_snapshot(
            &self.time,
            &self.config,
            &self.orchestrator,
            &self.timer,
            &self.placement,
            events,
            navigation,
        )
    }

    // --- Match operations ---

    /// Send the next wave. Ignored unless the match is in PreWave.
    pub fn send_wave(&mut self) {
        let Some(wave_index) = self.orchestrator.begin_wave() else {
            debug!("send_wave ignored in {:?}", self.orchestrator.phase());
            return;
        };
        info!("wave {} of {} sent", wave_index + 1, self.orchestrator.waves_total());

        self.dispatch(MatchEvent::WaveStarted { wave_index });
        let wave_number = self.orchestrator.commit_wave();
        if let Some(limits) = self.config.quota_limits(wave_number) {
            self.placement.apply_limits(limits);
        }
        self.timer.start();
    }

    /// A tower fell. Losing the last one loses the match.
    pub fn dead_tower(&mut self) {
        if self.orchestrator.tower_destroyed() {
            info!("all towers destroyed at tick {}", self.time.tick);
            self.dispatch(MatchEvent::Lost);
        }
    }

    /// Apply damage to an enemy from outside the contact pipeline.
    pub fn damage_enemy(&mut self, enemy: Entity, amount: f32) {
        if systems::enemy::receive_damage(&mut self.world, enemy, amount)
            == systems::enemy::DamageOutcome::Killed
        {
            self.enemy_killed(enemy);
        }
    }

    /// Publish wave-ended as if the countdown had elapsed.
    pub fn notify_wave_ended(&mut self) {
        let wave_number = self.orchestrator.wave_index();
        self.dispatch(MatchEvent::WaveEnded { wave_number });
    }

    /// Unsubscribe every collaborator and cancel all pending work.
    pub fn teardown(&mut self) {
        for subscriber in [
            Subscriber::Orchestrator,
            Subscriber::Spawner,
            Subscriber::Placement,
            Subscriber::ObstacleRegistry,
            Subscriber::Presentation,
        ] {
            self.bus.unsubscribe_all(subscriber);
        }
        self.spawner.cancel();
        self.hazards.cancel_all();
        self.scheduler.clear();
        self.placement.cancel(&mut self.world);
    }

    // --- Accessors ---

    pub fn phase(&self) -> MatchPhase {
        self.orchestrator.phase()
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn orchestrator(&self) -> &MatchOrchestrator {
        &self.orchestrator
    }

    pub fn timer(&self) -> &WaveTimer {
        &self.timer
    }

    pub fn spawner(&self) -> &WaveSpawner {
        &self.spawner
    }

    pub fn placement(&self) -> &PlacementController {
        &self.placement
    }

    pub fn registry(&self) -> &ObstacleRegistry {
        &self.registry
    }

    pub fn hazards(&self) -> &Hazards {
        &self.hazards
    }

    pub fn pool(&self) -> &ObjectPool<EnemyCategory> {
        &self.pool
    }

    pub fn towers(&self) -> &[Entity] {
        &self.towers
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Pending scheduled tasks.
    pub fn scheduled(&self) -> usize {
        self.scheduler.len()
    }

    // --- Event dispatch ---

    /// Deliver `event` to its topic's subscribers in subscription order.
    /// Events without a topic go straight to the outbox.
    fn dispatch(&mut self, event: MatchEvent) {
        let Some(topic) = Topic::of(&event) else {
            self.events.push(event);
            return;
        };
        if self.orchestrator.is_terminal() && topic == Topic::WaveStarted {
            debug!("{topic:?} ignored after match end");
            return;
        }
        // A wave can only end once, and only while it is running.
        if topic == Topic::WaveEnded && self.orchestrator.phase() != MatchPhase::WaveActive {
            debug!("{topic:?} ignored in {:?}", self.orchestrator.phase());
            return;
        }
        for subscriber in self.bus.subscribers(topic) {
            self.deliver(subscriber, &event);
        }
    }

    fn deliver(&mut self, subscriber: Subscriber, event: &MatchEvent) {
        match (subscriber, event) {
            (Subscriber::Presentation, _) => self.events.push(event.clone()),

            (Subscriber::Spawner, MatchEvent::WaveStarted { wave_index }) => {
                self.spawner
                    .begin(&self.config, *wave_index, &mut self.rng, &mut self.scheduler);
            }
            (Subscriber::Spawner, _) => self.spawner.cancel(),

            (Subscriber::Placement, MatchEvent::WaveEnded { .. }) => {
                self.placement.reset_quotas();
            }
            (Subscriber::Placement, _) => self.placement.cancel(&mut self.world),

            (Subscriber::ObstacleRegistry, MatchEvent::WaveEnded { .. }) => {
                self.hazards.cancel_all();
                let cleared = self.registry.clear_all(&mut self.world);
                debug!("cleared {cleared} obstacles");
            }

            (Subscriber::Orchestrator, MatchEvent::WaveEnded { .. }) => self.resolve_wave(),
            (Subscriber::Orchestrator, MatchEvent::Lost) => {
                self.timer.stop();
                self.hazards.cancel_all();
            }

            (subscriber, event) => debug!("{subscriber:?} has no handler for {event:?}"),
        }
    }

    /// Wave countdown elapsed: recall the field and decide what comes next.
    fn resolve_wave(&mut self) {
        let Some(recalled) = self.orchestrator.begin_resolution() else {
            debug!("wave end ignored in {:?}", self.orchestrator.phase());
            return;
        };
        for enemy in recalled {
            self.hazards.release_enemy(enemy);
            if systems::enemy::recall(&mut self.world, enemy) {
                self.navigation.push(NavigationOrder::Halt {
                    entity: entity_id(enemy),
                });
            }
        }

        match self.orchestrator.finish_resolution() {
            WaveResolution::Won => {
                info!("all {} waves survived", self.orchestrator.waves_total());
                self.dispatch(MatchEvent::Won);
            }
            WaveResolution::Continue { next_wave_index } => {
                info!("wave {} survived", self.orchestrator.wave_index());
                if let Some(secs) = self.config.duration_for(next_wave_index) {
                    self.timer.reset(secs);
                }
            }
        }
    }

    // --- Input processing ---

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        if self.orchestrator.is_terminal() {
            debug!("{command:?} ignored after match end");
            return;
        }
        match command {
            PlayerCommand::SendWave => self.send_wave(),
            PlayerCommand::SelectObstacle { index } => {
                self.placement.select(&mut self.world, index);
            }
            PlayerCommand::PointerMoved { hit } => {
                self.placement.set_cursor(&mut self.world, hit);
            }
            PlayerCommand::RotatePreview => self.placement.rotate(&mut self.world),
            PlayerCommand::ConfirmPlacement => {
                let template = self.placement.selected();
                let placed = self.placement.confirm(
                    &mut self.world,
                    &self.config.obstacle_templates,
                    &mut self.registry,
                );
                if let (Some(obstacle), Some(template)) = (placed, template) {
                    self.events.push(MatchEvent::ObstaclePlaced {
                        obstacle: entity_id(obstacle),
                        template,
                    });
                }
            }
            PlayerCommand::CancelPlacement => self.placement.cancel(&mut self.world),
        }
    }

    /// Process all queued contacts.
    fn process_contacts(&mut self) {
        while let Some(contact) = self.contact_queue.pop_front() {
            if self.orchestrator.is_terminal() {
                debug!("{contact:?} ignored after match end");
                continue;
            }
            self.handle_contact(contact);
        }
    }

    fn handle_contact(&mut self, contact: Contact) {
        match contact {
            Contact::TowerBreached { tower, enemy } => {
                let (Some(tower), Some(enemy)) =
                    (resolve(&self.world, tower), resolve(&self.world, enemy))
                else {
                    debug!("{contact:?} names a missing entity");
                    return;
                };
                if systems::towers::breach(&mut self.world, tower, enemy)
                    == BreachOutcome::Destroyed
                {
                    self.events.push(MatchEvent::TowerDestroyed {
                        tower: entity_id(tower),
                        remaining: self.orchestrator.towers_remaining().saturating_sub(1),
                    });
                    self.dead_tower();
                }
            }
            Contact::ObstacleEntered { obstacle, enemy } => {
                let (Some(obstacle), Some(enemy)) =
                    (resolve(&self.world, obstacle), resolve(&self.world, enemy))
                else {
                    debug!("{contact:?} names a missing entity");
                    return;
                };
                self.hazards
                    .engage(&self.world, &mut self.scheduler, obstacle, enemy);
            }
            Contact::ObstacleExited { obstacle, enemy } => {
                // Either side may already be gone; the pair is all we need.
                if let (Some(obstacle), Some(enemy)) =
                    (Entity::from_bits(obstacle.0), Entity::from_bits(enemy.0))
                {
                    self.hazards.disengage(obstacle, enemy);
                }
            }
        }
    }

    // --- Systems ---

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let dt = self.time.dt();

        // 1. Wave countdown
        if self.timer.tick(dt) {
            self.notify_wave_ended();
        }
        if self.orchestrator.is_terminal() {
            return;
        }
        // 2. Scheduled continuations (spawns, orientation, hazards)
        self.run_scheduled(dt);
        if self.orchestrator.is_terminal() {
            return;
        }
        // 3. Placement preview
        self.placement.update_preview(&mut self.world);
    }

    fn run_scheduled(&mut self, dt: f64) {
        for due in self.scheduler.advance(dt) {
            if due.token.is_cancelled() {
                continue;
            }
            match due.payload {
                Task::ReleaseNext => self.release_next(due.token),
                Task::Orient { enemy, activation } => {
                    if let Some(order) = systems::enemy::choose_destination(
                        &mut self.world,
                        enemy,
                        activation,
                        &mut self.rng,
                    ) {
                        self.navigation.push(order);
                    }
                }
                Task::WallContact { wall, enemy } => {
                    match systems::hazards::wall_contact_step(&mut self.world, wall, enemy) {
                        WallStep::Pressed { .. } => {
                            self.scheduler.schedule_with(
                                WALL_CONTACT_INTERVAL_SECS,
                                due.token,
                                due.payload,
                            );
                        }
                        WallStep::Broken => {
                            self.hazards.release_obstacle(wall);
                            self.events.push(MatchEvent::ObstacleDestroyed {
                                obstacle: entity_id(wall),
                            });
                        }
                        WallStep::Finished => {
                            self.hazards.disengage(wall, enemy);
                        }
                    }
                }
                Task::SpikeStrike { trap, enemy } => {
                    match systems::hazards::spike_strike_step(&mut self.world, trap, enemy) {
                        SpikeStep::Struck { interval_secs } => {
                            self.scheduler
                                .schedule_with(interval_secs, due.token, due.payload);
                        }
                        SpikeStep::Killed => self.enemy_killed(enemy),
                        SpikeStep::Finished => {
                            self.hazards.disengage(trap, enemy);
                        }
                    }
                }
            }
        }
    }

    /// Release the next roster entry and schedule the one after it.
    fn release_next(&mut self, token: CancelToken) {
        let Some(category) = self.spawner.next_release() else {
            self.spawner.finish();
            return;
        };

        let transform = Transform::at(self.config.spawn_position);
        match self
            .pool
            .acquire(&mut self.world, self.prefabs.get(&category), transform)
        {
            Some(enemy) => self.activate_enemy(enemy, category),
            None => debug!("no {category:?} template, release skipped"),
        }

        if self.spawner.remaining() > 0 {
            self.scheduler
                .schedule_with(self.config.spawn_cadence_secs, token, Task::ReleaseNext);
        } else {
            self.spawner.finish();
        }
    }

    fn activate_enemy(&mut self, enemy: Entity, category: EnemyCategory) {
        self.orchestrator.add_enemy(enemy);
        let activation = systems::enemy::activation_of(&self.world, enemy).unwrap_or_default();
        self.scheduler
            .schedule(ENEMY_ORIENTATION_SECS, Task::Orient { enemy, activation });
        self.events.push(MatchEvent::EnemySpawned {
            enemy: entity_id(enemy),
            category,
        });
    }

    fn enemy_killed(&mut self, enemy: Entity) {
        self.orchestrator.remove_enemy(enemy);
        self.hazards.release_enemy(enemy);
        self.navigation.push(NavigationOrder::Halt {
            entity: entity_id(enemy),
        });
        if let Some(category) = systems::enemy::category_of(&self.world, enemy) {
            self.events.push(MatchEvent::EnemyKilled {
                enemy: entity_id(enemy),
                category,
            });
        }
    }
}
