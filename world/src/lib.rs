#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.

mod economy;
mod emplacements;
mod grid;
mod mobs;
mod projectiles;

use std::time::Duration;

use glam::Vec2;
use lane_defence_core::{
    ArenaConfig, CellCoord, Command, ConfigError, EmplacementId, EmplacementKind,
    EmplacementStats, Event, FireMode, Gold, MobId, MobSpawnSpec, Outcome, PlacementError,
    ProjectileId, SaleError, UpgradeError,
};
use tracing::{debug, info, warn};

use crate::{
    economy::Treasury,
    grid::PlacementGrid,
    mobs::{DamageOutcome, Mob, MobStep},
    projectiles::Projectile,
};

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    arena: ArenaConfig,
    grid: PlacementGrid,
    treasury: Treasury,
    mobs: Vec<Mob>,
    projectiles: Vec<Projectile>,
    next_mob_id: MobId,
    next_projectile_id: ProjectileId,
    clock: Duration,
    tick_index: u64,
    outcome: Outcome,
}

impl World {
    /// Creates a world from validated arena configuration.
    pub fn new(arena: &ArenaConfig) -> Result<Self, ConfigError> {
        arena.validate()?;
        Ok(Self {
            grid: PlacementGrid::new(arena.cell_size, arena.placement_cells()),
            treasury: Treasury::new(arena.starting_gold),
            arena: arena.clone(),
            mobs: Vec::new(),
            projectiles: Vec::new(),
            next_mob_id: MobId::new(0),
            next_projectile_id: ProjectileId::new(0),
            clock: Duration::ZERO,
            tick_index: 0,
            outcome: Outcome::InProgress,
        })
    }

    fn is_over(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    fn allocate_mob_id(&mut self) -> MobId {
        let id = self.next_mob_id;
        self.next_mob_id = MobId::new(id.get().saturating_add(1));
        id
    }

    fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        id
    }

    fn spawn_mob(&mut self, spec: MobSpawnSpec, out_events: &mut Vec<Event>) {
        let Some(start) = self
            .arena
            .path(spec.path)
            .and_then(|path| path.points.first().copied())
        else {
            warn!(path = spec.path.get(), "spawn requested on unknown path");
            return;
        };
        let id = self.allocate_mob_id();
        self.mobs.push(Mob::spawn(id, spec, start, self.tick_index));
        debug!(
            mob = id.get(),
            archetype = spec.archetype.get(),
            health = spec.health,
            "mob spawned"
        );
        out_events.push(Event::MobSpawned {
            mob: id,
            archetype: spec.archetype,
            path: spec.path,
        });
    }

    fn advance(&mut self, out_events: &mut Vec<Event>) {
        let tick_index = self.tick_index;
        for mob in self.mobs.iter_mut() {
            if !mob.is_active(tick_index) {
                continue;
            }
            let Some(path) = self.arena.path(mob.path) else {
                continue;
            };
            if mob.advance(&path.points) == MobStep::Breached {
                warn!(mob = mob.id.get(), "mob breached the end of its path");
                out_events.push(Event::EnemyBreached { mob: mob.id });
                if self.outcome == Outcome::InProgress {
                    self.outcome = Outcome::Lost;
                    out_events.push(Event::GameOver);
                }
            }
        }
        self.mobs.retain(Mob::is_alive);

        if self.is_over() {
            return;
        }

        let bounds = self.arena.bounds;
        let threshold = self.arena.projectile.arrival_threshold;
        for projectile in self.projectiles.iter_mut() {
            if projectile.is_active(tick_index) {
                projectile.advance(&bounds, threshold);
            }
        }
    }

    fn fire_projectile(
        &mut self,
        emplacement: EmplacementId,
        target: MobId,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.grid.emplacements().get(emplacement) else {
            return;
        };
        if state.kind.fire_mode() != FireMode::Projectile || !state.ready_at(self.clock) {
            return;
        }
        let Some(mob) = self
            .mobs
            .iter()
            .find(|mob| mob.id == target && mob.is_active(self.tick_index))
        else {
            return;
        };
        if state.position.distance(mob.position) > state.range {
            return;
        }

        let origin = state.position;
        let destination = mob.position;
        let damage = state.damage;
        let id = self.allocate_projectile_id();
        self.projectiles.push(Projectile::launch(
            id,
            origin,
            destination,
            self.arena.projectile.speed,
            damage,
            self.tick_index,
        ));
        if let Some(state) = self.grid.emplacements_mut().get_mut(emplacement) {
            state.last_fired = self.clock;
        }
        out_events.push(Event::ShotFired {
            emplacement,
            projectile: id,
            target,
        });
    }

    fn generate_income(&mut self, emplacement: EmplacementId, out_events: &mut Vec<Event>) {
        let clock = self.clock;
        let Some(state) = self.grid.emplacements_mut().get_mut(emplacement) else {
            return;
        };
        if state.kind.fire_mode() != FireMode::Income || !state.ready_at(clock) {
            return;
        }
        state.last_fired = clock;
        let amount = Gold::from_rounded(state.damage);
        self.treasury.credit(amount);
        debug!(emplacement = emplacement.get(), %amount, "income generated");
        out_events.push(Event::MoneyGenerated {
            emplacement,
            amount,
        });
    }

    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let tick_index = self.tick_index;
        let reach = self.arena.mob_radius + self.arena.projectile.radius;
        for projectile in self.projectiles.iter_mut() {
            if !projectile.is_active(tick_index) {
                continue;
            }
            let Some(mob) = self.mobs.iter_mut().find(|mob| {
                mob.is_active(tick_index) && mob.position.distance(projectile.position) <= reach
            }) else {
                continue;
            };

            projectile.spent = true;
            let outcome = mob.take_damage(projectile.damage);
            if outcome == DamageOutcome::Ignored {
                continue;
            }
            out_events.push(Event::MobDamaged {
                mob: mob.id,
                projectile: projectile.id,
                amount: projectile.damage,
                remaining: mob.health,
            });
            if let DamageOutcome::Destroyed(reward) = outcome {
                self.treasury.credit(reward);
                info!(mob = mob.id.get(), %reward, "enemy destroyed");
                out_events.push(Event::EnemyDestroyed {
                    mob: mob.id,
                    reward,
                });
            }
        }

        for projectile in &self.projectiles {
            if projectile.expiring && !projectile.spent {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                });
            }
        }
        self.projectiles
            .retain(|projectile| !projectile.spent && !projectile.expiring);
        self.mobs.retain(Mob::is_alive);
    }

    fn place_emplacement(
        &mut self,
        kind: EmplacementKind,
        point: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        let cell = self.grid.cell_of(point);
        let stats = *self.arena.emplacements.stats(kind);
        match self.try_place(kind, cell, &stats) {
            Ok(emplacement) => {
                info!(
                    emplacement = emplacement.get(),
                    kind = kind.label(),
                    column = cell.column(),
                    row = cell.row(),
                    "emplacement placed"
                );
                out_events.push(Event::TowerPlaced {
                    emplacement,
                    kind,
                    cell,
                    cost: stats.cost,
                });
            }
            Err(reason) => {
                debug!(kind = kind.label(), ?reason, "placement rejected");
                out_events.push(Event::PlacementRejected { kind, cell, reason });
            }
        }
    }

    /// Funds are checked before the grid; the cost is debited only once the
    /// grid accepted the emplacement.
    fn try_place(
        &mut self,
        kind: EmplacementKind,
        cell: CellCoord,
        stats: &EmplacementStats,
    ) -> Result<EmplacementId, PlacementError> {
        if self.is_over() {
            return Err(PlacementError::SimulationOver);
        }
        if !self.treasury.can_afford(stats.cost) {
            return Err(PlacementError::InsufficientFunds);
        }
        let emplacement = self.grid.place(kind, cell, stats, self.clock)?;
        if !self.treasury.try_debit(stats.cost) {
            let _ = self.grid.remove(emplacement);
            return Err(PlacementError::InsufficientFunds);
        }
        Ok(emplacement)
    }

    fn upgrade_emplacement(&mut self, point: Vec2, out_events: &mut Vec<Event>) {
        let cell = self.grid.cell_of(point);
        let result = self.try_upgrade(cell);
        match result {
            Ok((emplacement, level, cost)) => {
                info!(emplacement = emplacement.get(), level, %cost, "emplacement upgraded");
                out_events.push(Event::TowerUpgraded {
                    emplacement,
                    level,
                    cost,
                });
            }
            Err(reason) => {
                debug!(?reason, "upgrade rejected");
                out_events.push(Event::UpgradeRejected { cell, reason });
            }
        }
    }

    fn try_upgrade(
        &mut self,
        cell: CellCoord,
    ) -> Result<(EmplacementId, u32, Gold), UpgradeError> {
        if self.is_over() {
            return Err(UpgradeError::SimulationOver);
        }
        let emplacement = self
            .grid
            .occupant(cell)
            .ok_or(UpgradeError::TargetMissing)?;
        let policy = self.arena.upgrades;
        let state = self
            .grid
            .emplacements_mut()
            .get_mut(emplacement)
            .ok_or(UpgradeError::TargetMissing)?;
        let cost = policy.cost_for(state.level);
        if !self.treasury.try_debit(cost) {
            return Err(UpgradeError::InsufficientFunds);
        }
        state.upgrade(&policy);
        state.invested = state.invested.saturating_add(cost);
        Ok((emplacement, state.level, cost))
    }

    fn sell_emplacement(&mut self, point: Vec2, out_events: &mut Vec<Event>) {
        let cell = self.grid.cell_of(point);
        let removed = if self.is_over() {
            Err(SaleError::SimulationOver)
        } else {
            self.grid
                .occupant(cell)
                .and_then(|emplacement| self.grid.remove(emplacement))
                .ok_or(SaleError::TargetMissing)
        };

        match removed {
            Ok(state) => {
                let refund = state.invested.scaled_down(self.arena.sell_ratio);
                self.treasury.credit(refund);
                info!(emplacement = state.id.get(), %refund, "emplacement sold");
                out_events.push(Event::TowerSold {
                    emplacement: state.id,
                    cell,
                    refund,
                });
            }
            Err(reason) => {
                debug!(?reason, "sale rejected");
                out_events.push(Event::SaleRejected { cell, reason });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { now } => {
            if world.is_over() {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = now;
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
                now,
            });
        }
        Command::Advance => {
            if !world.is_over() {
                world.advance(out_events);
            }
        }
        Command::SpawnMob { spec } => {
            if !world.is_over() {
                world.spawn_mob(spec, out_events);
            }
        }
        Command::FireProjectile {
            emplacement,
            target,
        } => {
            if !world.is_over() {
                world.fire_projectile(emplacement, target, out_events);
            }
        }
        Command::GenerateIncome { emplacement } => {
            if !world.is_over() {
                world.generate_income(emplacement, out_events);
            }
        }
        Command::ResolveCollisions => {
            if !world.is_over() {
                world.resolve_collisions(out_events);
            }
        }
        Command::PlaceEmplacement { kind, point } => {
            world.place_emplacement(kind, point, out_events);
        }
        Command::UpgradeEmplacement { point } => {
            world.upgrade_emplacement(point, out_events);
        }
        Command::SellEmplacement { point } => {
            world.sell_emplacement(point, out_events);
        }
        Command::AnnounceWaveCleared { wave } => {
            if !world.is_over() {
                info!(wave = wave.get(), "wave cleared");
                out_events.push(Event::WaveCleared { wave });
            }
        }
        Command::AnnounceVictory => {
            if !world.is_over() {
                world.outcome = Outcome::Won;
                info!("every wave cleared");
                out_events.push(Event::GameWon);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use lane_defence_core::{
        ArenaConfig, CellCoord, EmplacementSnapshot, EmplacementView, Gold, MobView, Outcome,
        PathId, ProjectileView,
    };

    use super::World;

    /// Captures a read-only view of the live mobs.
    #[must_use]
    pub fn mob_view(world: &World) -> MobView {
        MobView::from_snapshots(
            world
                .mobs
                .iter()
                .map(|mob| mob.snapshot(world.tick_index))
                .collect(),
        )
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Captures a read-only view of every emplacement.
    #[must_use]
    pub fn emplacement_view(world: &World) -> EmplacementView {
        EmplacementView::from_snapshots(
            world
                .grid
                .emplacements()
                .iter()
                .map(|state| state.snapshot(&world.arena.upgrades))
                .collect(),
        )
    }

    /// Number of mobs still alive.
    #[must_use]
    pub fn live_mob_count(world: &World) -> usize {
        world.mobs.len()
    }

    /// Gold currently held by the player.
    #[must_use]
    pub fn gold(world: &World) -> Gold {
        world.treasury.balance()
    }

    /// Terminal state of the run.
    #[must_use]
    pub fn outcome(world: &World) -> Outcome {
        world.outcome
    }

    /// Timestamp of the most recent tick.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Configuration the world was created from.
    #[must_use]
    pub fn arena(world: &World) -> &ArenaConfig {
        &world.arena
    }

    /// Waypoints of a configured path.
    #[must_use]
    pub fn path(world: &World, id: PathId) -> Option<&[Vec2]> {
        world.arena.path(id).map(|path| path.points.as_slice())
    }

    /// Centre of the cell containing `point`.
    #[must_use]
    pub fn snap_to_cell(world: &World, point: Vec2) -> Vec2 {
        world.grid.snap_to_cell(point)
    }

    /// Reports whether the cell containing `point` accepts a new emplacement.
    #[must_use]
    pub fn is_available(world: &World, point: Vec2) -> bool {
        world.grid.is_available(world.grid.cell_of(point))
    }

    /// Enumerates the cells that accept emplacements, occupied or not.
    #[must_use]
    pub fn placement_cells(world: &World) -> Vec<CellCoord> {
        world.grid.valid_cells().collect()
    }

    /// Retrieves the emplacement standing in the cell containing `point`.
    #[must_use]
    pub fn emplacement_at(world: &World, point: Vec2) -> Option<EmplacementSnapshot> {
        world
            .grid
            .occupant(world.grid.cell_of(point))
            .and_then(|id| world.grid.emplacements().get(id))
            .map(|state| state.snapshot(&world.arena.upgrades))
    }
}
