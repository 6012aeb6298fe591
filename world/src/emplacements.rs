//! Authoritative emplacement state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use lane_defence_core::{
    CellCoord, EmplacementId, EmplacementKind, EmplacementSnapshot, EmplacementStats, Gold,
    UpgradePolicy,
};

/// Snapshot of an emplacement stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EmplacementState {
    /// Identifier allocated by the world for the emplacement.
    pub(crate) id: EmplacementId,
    /// Kind of emplacement that was constructed.
    pub(crate) kind: EmplacementKind,
    /// Cell occupied by the emplacement.
    pub(crate) cell: CellCoord,
    /// Centre of the occupied cell.
    pub(crate) position: Vec2,
    pub(crate) range: f32,
    pub(crate) damage: f32,
    pub(crate) fire_interval: Duration,
    pub(crate) last_fired: Duration,
    /// Upgrade counter, starting at one.
    pub(crate) level: u32,
    /// Gold spent on construction and upgrades; drives the sale refund.
    pub(crate) invested: Gold,
}

impl EmplacementState {
    pub(crate) fn ready_at(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_fired) > self.fire_interval
    }

    /// Raises the level and improves damage, range and interval.
    ///
    /// Affordability is the caller's concern.
    pub(crate) fn upgrade(&mut self, policy: &UpgradePolicy) {
        self.level = self.level.saturating_add(1);
        self.damage *= policy.damage_factor;
        self.range *= policy.range_factor;
        self.fire_interval = self.fire_interval.mul_f32(policy.interval_factor);
    }

    pub(crate) fn snapshot(&self, policy: &UpgradePolicy) -> EmplacementSnapshot {
        EmplacementSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: self.position,
            range: self.range,
            damage: self.damage,
            fire_interval: self.fire_interval,
            last_fired: self.last_fired,
            level: self.level,
            upgrade_cost: policy.cost_for(self.level),
        }
    }
}

/// Registry that stores emplacements and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EmplacementRegistry {
    entries: BTreeMap<EmplacementId, EmplacementState>,
    next_emplacement_id: EmplacementId,
}

impl EmplacementRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_emplacement_id: EmplacementId::new(0),
        }
    }

    /// Registers a freshly built emplacement whose cooldown starts at `now`.
    pub(crate) fn insert(
        &mut self,
        kind: EmplacementKind,
        cell: CellCoord,
        position: Vec2,
        stats: &EmplacementStats,
        now: Duration,
    ) -> EmplacementId {
        let id = self.next_emplacement_id;
        self.next_emplacement_id = EmplacementId::new(id.get().saturating_add(1));
        let state = EmplacementState {
            id,
            kind,
            cell,
            position,
            range: stats.range,
            damage: stats.damage,
            fire_interval: stats.fire_interval(),
            last_fired: now,
            level: 1,
            invested: stats.cost,
        };
        let _ = self.entries.insert(id, state);
        id
    }

    pub(crate) fn remove(&mut self, id: EmplacementId) -> Option<EmplacementState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: EmplacementId) -> Option<&EmplacementState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EmplacementId) -> Option<&mut EmplacementState> {
        self.entries.get_mut(&id)
    }

    /// Finds the emplacement standing on `cell`.
    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<EmplacementId> {
        self.entries
            .values()
            .find(|state| state.cell == cell)
            .map(|state| state.id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &EmplacementState> {
        self.entries.values()
    }
}
