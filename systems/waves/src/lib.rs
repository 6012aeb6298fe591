#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that paces mob spawns and announces wave completion.
//!
//! The scheduler never touches the world directly. Each tick it receives the
//! simulation clock and, during the completion phase, the number of live mobs,
//! and answers with `SpawnMob`, `AnnounceWaveCleared` and `AnnounceVictory`
//! commands. Waves past the authored prefix are generated from a seeded
//! [`ChaCha8Rng`], so two schedulers built from the same seed emit identical
//! command streams.

use std::time::Duration;

use lane_defence_core::{
    ArchetypeId, AuthoredWave, Command, Gold, MobSpawnSpec, PathId, WaveConfig, WaveId,
    MAX_WAVE_MOBS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Lifecycle of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// No wave has started yet.
    Idle,
    /// The given wave is spawning or waiting for its mobs to die.
    Spawning(WaveId),
    /// Every wave was spawned and cleared. Terminal.
    AllComplete,
}

/// Wave scheduler state machine.
#[derive(Debug)]
pub struct Waves {
    config: WaveConfig,
    path: PathId,
    rng: ChaCha8Rng,
    phase: SchedulerPhase,
    current_wave: usize,
    queue: Vec<MobSpawnSpec>,
    spawned: usize,
    last_spawn: Duration,
}

impl Waves {
    /// Creates a scheduler that spawns every mob on `path`.
    #[must_use]
    pub fn new(config: &WaveConfig, path: PathId, seed: u64) -> Self {
        Self {
            config: config.clone(),
            path,
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: SchedulerPhase::Idle,
            current_wave: 0,
            queue: Vec::new(),
            spawned: 0,
            last_spawn: Duration::ZERO,
        }
    }

    /// Emits the next spawn of the current wave once the spawn delay elapsed.
    ///
    /// The first call starts wave zero and spawns its first mob immediately.
    pub fn handle_spawns(&mut self, now: Duration, out: &mut Vec<Command>) {
        match self.phase {
            SchedulerPhase::Idle => self.begin_wave(0, now, out),
            SchedulerPhase::Spawning(_) => {
                if self.spawned < self.queue.len()
                    && now.saturating_sub(self.last_spawn) > self.config.spawn_delay()
                {
                    self.spawn_next(now, out);
                }
            }
            SchedulerPhase::AllComplete => {}
        }
    }

    /// Applies the wave completion rule.
    ///
    /// Once the current wave has spawned every mob and none is left alive, the
    /// wave is announced as cleared and either the next wave starts or, after
    /// the last one, victory is announced.
    pub fn handle_completion(&mut self, now: Duration, live_mobs: usize, out: &mut Vec<Command>) {
        let SchedulerPhase::Spawning(wave) = self.phase else {
            return;
        };
        if self.spawned < self.queue.len() || live_mobs > 0 {
            return;
        }

        info!(wave = wave.get(), "wave cleared");
        out.push(Command::AnnounceWaveCleared { wave });

        let next = self.current_wave.saturating_add(1);
        if next < self.total_waves() {
            let _ = self.start_next_wave(now, out);
        } else {
            info!("all waves complete");
            self.phase = SchedulerPhase::AllComplete;
            out.push(Command::AnnounceVictory);
        }
    }

    /// Moves on to the following wave and spawns its first mob right away.
    ///
    /// Refused, returning `false`, while the current wave still has mobs to spawn
    /// or when no wave remains.
    pub fn start_next_wave(&mut self, now: Duration, out: &mut Vec<Command>) -> bool {
        if self.phase == SchedulerPhase::AllComplete || self.spawned < self.queue.len() {
            return false;
        }
        let next = match self.phase {
            SchedulerPhase::Idle => 0,
            _ => self.current_wave.saturating_add(1),
        };
        if next >= self.total_waves() {
            return false;
        }
        self.begin_wave(next, now, out);
        true
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Index of the wave currently spawning or awaiting clearance.
    #[must_use]
    pub fn current_wave(&self) -> WaveId {
        WaveId::new(u32::try_from(self.current_wave).unwrap_or(u32::MAX))
    }

    /// Number of mobs of the current wave spawned so far.
    #[must_use]
    pub fn spawned_in_wave(&self) -> usize {
        self.spawned
    }

    /// Number of mobs the current wave spawns in total.
    #[must_use]
    pub fn wave_len(&self) -> usize {
        self.queue.len()
    }

    /// Total number of waves, authored and generated.
    #[must_use]
    pub fn total_waves(&self) -> usize {
        self.config.total_waves()
    }

    /// Waves that have not been cleared yet, the current one included.
    #[must_use]
    pub fn waves_remaining(&self) -> usize {
        match self.phase {
            SchedulerPhase::Idle => self.total_waves(),
            SchedulerPhase::Spawning(_) => self.total_waves().saturating_sub(self.current_wave),
            SchedulerPhase::AllComplete => 0,
        }
    }

    /// Whether every wave has been spawned and cleared. Never reverts once set.
    #[must_use]
    pub fn all_waves_complete(&self) -> bool {
        self.phase == SchedulerPhase::AllComplete
    }

    fn begin_wave(&mut self, index: usize, now: Duration, out: &mut Vec<Command>) {
        self.current_wave = index;
        self.queue = self.build_wave(index);
        self.spawned = 0;
        self.phase = SchedulerPhase::Spawning(self.current_wave());
        info!(wave = index, mobs = self.queue.len(), "wave started");
        if !self.queue.is_empty() {
            self.spawn_next(now, out);
        }
    }

    fn spawn_next(&mut self, now: Duration, out: &mut Vec<Command>) {
        let Some(spec) = self.queue.get(self.spawned).copied() else {
            return;
        };
        self.spawned += 1;
        self.last_spawn = now;
        debug!(
            wave = self.current_wave,
            spawned = self.spawned,
            of = self.queue.len(),
            "spawning mob"
        );
        out.push(Command::SpawnMob { spec });
    }

    fn build_wave(&mut self, index: usize) -> Vec<MobSpawnSpec> {
        match self.config.authored.get(index) {
            Some(authored) => expand_authored(authored, self.path),
            None => self.generate_wave(index),
        }
    }

    /// Draws a procedural wave. Counts and statistics deviate uniformly by up
    /// to `deviation` and grow with the wave level.
    fn generate_wave(&mut self, index: usize) -> Vec<MobSpawnSpec> {
        let catalog_len = self.config.catalog.len();
        if catalog_len == 0 {
            return Vec::new();
        }
        let level = index.saturating_add(1) as f32;
        let deviation = self.config.deviation;
        let base_count = level * self.config.base_count_per_level;
        let spread = self.rng.gen_range(-deviation..=deviation);
        let count = (base_count * (1.0 + spread))
            .round()
            .clamp(1.0, MAX_WAVE_MOBS as f32) as usize;

        let mut specs = Vec::with_capacity(count);
        for _ in 0..count {
            let slot = self.rng.gen_range(0..catalog_len);
            let archetype = &self.config.catalog[slot];
            let scaling = level * self.config.level_scaling;
            let mut perturb = |base: f32| {
                let spread = self.rng.gen_range(-deviation..=deviation);
                base * (1.0 + spread) + base * scaling
            };
            let speed = perturb(archetype.speed);
            let health = perturb(archetype.health);
            let reward = perturb(archetype.reward.get() as f32);
            specs.push(MobSpawnSpec {
                path: self.path,
                archetype: ArchetypeId::new(u32::try_from(slot).unwrap_or(u32::MAX)),
                speed,
                health,
                reward: Gold::from_rounded(reward),
            });
        }
        specs
    }
}

fn expand_authored(wave: &AuthoredWave, path: PathId) -> Vec<MobSpawnSpec> {
    wave.groups
        .iter()
        .flat_map(|group| {
            let spec = MobSpawnSpec {
                path,
                archetype: group.archetype,
                speed: group.speed,
                health: group.health,
                reward: group.reward,
            };
            (0..group.count).map(move |_| spec)
        })
        .collect()
}
