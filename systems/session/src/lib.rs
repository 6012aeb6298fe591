#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-tick orchestrator that drives the world and its systems.
//!
//! A [`Session`] owns the world and every pure system. Each call to
//! [`Session::step`] runs one tick through the phases
//! requests → clock → spawn → advance → target/fire → resolve → completion,
//! applying the commands each phase emits before the next one reads the world.
//! Player requests queued with [`Session::submit`] are only applied at the tick
//! boundary, so no phase ever observes a half-applied purchase.

use std::time::Duration;

use lane_defence_core::{
    tick_duration, Command, ConfigError, EmplacementTarget, Event, Outcome, PathId, Scenario,
};
use lane_defence_system_builder::{Builder, BuilderRequest};
use lane_defence_system_combat::Combat;
use lane_defence_system_targeting::Targeting;
use lane_defence_system_waves::Waves;
use lane_defence_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

const PATH_STREAM_LABEL: &str = "path-selection";
const WAVE_STREAM_LABEL: &str = "wave-generation";

/// Complete simulation run built from a [`Scenario`].
#[derive(Debug)]
pub struct Session {
    world: World,
    waves: Waves,
    targeting: Targeting,
    combat: Combat,
    builder: Builder,
    path: PathId,
    paused: bool,
    pending: Vec<BuilderRequest>,
    last_events: Vec<Event>,
    commands: Vec<Command>,
    targets: Vec<EmplacementTarget>,
}

impl Session {
    /// Validates the scenario and prepares a session at time zero.
    ///
    /// Without an explicit path, one is drawn from the scenario seed.
    pub fn new(scenario: &Scenario) -> Result<Self, ConfigError> {
        scenario.validate()?;
        let world = World::new(&scenario.arena)?;
        let path = scenario
            .path
            .unwrap_or_else(|| choose_path(scenario.seed, scenario.arena.paths.len()));
        let waves = Waves::new(
            &scenario.waves,
            path,
            derive_labeled_seed(scenario.seed, WAVE_STREAM_LABEL),
        );
        info!(
            seed = scenario.seed,
            path = path.get(),
            waves = waves.total_waves(),
            "session created"
        );

        Ok(Self {
            world,
            waves,
            targeting: Targeting::new(),
            combat: Combat::new(),
            builder: Builder::new(),
            path,
            paused: false,
            pending: Vec::new(),
            last_events: Vec::new(),
            commands: Vec::new(),
            targets: Vec::new(),
        })
    }

    /// Queues a player request for the next tick boundary.
    pub fn submit(&mut self, request: BuilderRequest) {
        self.pending.push(request);
    }

    /// Freezes or resumes the simulation. Queued requests wait while paused.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Reports whether the session is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether the run reached a terminal outcome.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        query::outcome(&self.world) != Outcome::InProgress
    }

    /// Terminal state of the run.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        query::outcome(&self.world)
    }

    /// Read-only access to the world for rendering and inspection.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the wave scheduler.
    #[must_use]
    pub fn waves(&self) -> &Waves {
        &self.waves
    }

    /// Path every mob of this run follows.
    #[must_use]
    pub fn path(&self) -> PathId {
        self.path
    }

    /// Events broadcast during the most recent tick.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.last_events
    }

    /// Advances the simulation by one tick, appending broadcast events to `out_events`.
    ///
    /// Returns `false` without doing anything when paused or finished.
    pub fn step(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.paused || self.is_finished() {
            return false;
        }
        let first_event = out_events.len();

        self.commands.clear();
        let requests = std::mem::take(&mut self.pending);
        self.builder
            .handle(&self.last_events, &requests, &mut self.commands);
        self.flush(out_events);

        let now = query::clock(&self.world) + tick_duration();
        world::apply(&mut self.world, Command::Tick { now }, out_events);

        self.waves.handle_spawns(now, &mut self.commands);
        self.flush(out_events);

        world::apply(&mut self.world, Command::Advance, out_events);
        if !self.is_finished() {
            self.fire(now, out_events);
            world::apply(&mut self.world, Command::ResolveCollisions, out_events);

            let live_mobs = query::live_mob_count(&self.world);
            self.waves
                .handle_completion(now, live_mobs, &mut self.commands);
            self.flush(out_events);
        }

        if self.is_finished() {
            info!(
                outcome = ?self.outcome(),
                tick = query::tick_index(&self.world),
                "run finished"
            );
        }
        self.last_events.clear();
        self.last_events
            .extend_from_slice(&out_events[first_event..]);
        true
    }

    /// Steps until the run finishes or `max_ticks` ticks elapse, returning the
    /// number of ticks simulated.
    pub fn run(&mut self, max_ticks: u64, out_events: &mut Vec<Event>) -> u64 {
        let mut ticks = 0;
        while ticks < max_ticks && self.step(out_events) {
            ticks += 1;
        }
        ticks
    }

    /// Simulated time elapsed since the session started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        query::clock(&self.world)
    }

    fn fire(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        let emplacements = query::emplacement_view(&self.world);
        if emplacements.is_empty() {
            return;
        }
        let mobs = query::mob_view(&self.world);
        self.targeting
            .handle(&emplacements, &mobs, &mut self.targets);
        self.combat
            .handle(now, &emplacements, &self.targets, &mut self.commands);
        self.flush(out_events);
    }

    fn flush(&mut self, out_events: &mut Vec<Event>) {
        if self.commands.is_empty() {
            return;
        }
        debug!(commands = self.commands.len(), "applying commands");
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, out_events);
        }
    }
}

fn choose_path(seed: u64, path_count: usize) -> PathId {
    if path_count <= 1 {
        return PathId::new(0);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(derive_labeled_seed(seed, PATH_STREAM_LABEL));
    let index = rng.gen_range(0..path_count);
    PathId::new(u32::try_from(index).unwrap_or(0))
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
