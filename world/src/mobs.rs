//! Mob state, path following and damage intake.

use glam::Vec2;
use lane_defence_core::{ArchetypeId, Gold, MobId, MobSnapshot, MobSpawnSpec, PathId};

/// Result of moving a mob by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MobStep {
    /// The mob is still travelling along its path.
    Travelling,
    /// The mob reached the end of its path.
    Breached,
}

/// Result of applying damage to a mob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// The mob survived the hit.
    Absorbed,
    /// The hit depleted the mob's health; its reward is due exactly once.
    Destroyed(Gold),
    /// The mob was already dead; nothing changed.
    Ignored,
}

#[derive(Clone, Debug)]
pub(crate) struct Mob {
    pub(crate) id: MobId,
    pub(crate) archetype: ArchetypeId,
    pub(crate) path: PathId,
    pub(crate) position: Vec2,
    pub(crate) path_index: usize,
    pub(crate) speed: f32,
    pub(crate) health: f32,
    pub(crate) reward: Gold,
    pub(crate) spawned_tick: u64,
    alive: bool,
}

impl Mob {
    pub(crate) fn spawn(id: MobId, spec: MobSpawnSpec, start: Vec2, spawned_tick: u64) -> Self {
        Self {
            id,
            archetype: spec.archetype,
            path: spec.path,
            position: start,
            path_index: 0,
            speed: spec.speed,
            health: spec.health,
            reward: spec.reward,
            spawned_tick,
            alive: true,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn is_active(&self, tick_index: u64) -> bool {
        self.alive && self.spawned_tick < tick_index
    }

    /// Moves the mob `speed` units along its current segment.
    ///
    /// The segment cursor advances once the mob is closer than `speed` to the
    /// segment's end. Reaching the final point marks the mob dead without a
    /// reward and reports a breach.
    pub(crate) fn advance(&mut self, points: &[Vec2]) -> MobStep {
        if !self.alive {
            return MobStep::Travelling;
        }
        let last_segment = points.len().saturating_sub(1);
        if self.path_index < last_segment {
            let start = points[self.path_index];
            let end = points[self.path_index + 1];
            let direction = (end - start).normalize_or_zero();
            self.position += direction * self.speed;

            if self.position.distance(end) < self.speed {
                self.path_index += 1;
            }
        }
        if self.path_index >= last_segment {
            self.alive = false;
            return MobStep::Breached;
        }
        MobStep::Travelling
    }

    /// Subtracts `amount` from the mob's health.
    pub(crate) fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.alive = false;
            return DamageOutcome::Destroyed(self.reward);
        }
        DamageOutcome::Absorbed
    }

    pub(crate) fn snapshot(&self, tick_index: u64) -> MobSnapshot {
        MobSnapshot {
            id: self.id,
            archetype: self.archetype,
            position: self.position,
            health: self.health,
            speed: self.speed,
            path_index: self.path_index,
            active: self.is_active(tick_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mob(speed: f32, health: f32) -> Mob {
        let spec = MobSpawnSpec {
            path: PathId::new(0),
            archetype: ArchetypeId::new(0),
            speed,
            health,
            reward: Gold::new(50),
        };
        Mob::spawn(MobId::new(0), spec, Vec2::ZERO, 0)
    }

    #[test]
    fn mob_follows_segments_in_order() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
        ];
        let mut mob = mob(2.0, 10.0);

        for _ in 0..4 {
            assert_eq!(mob.advance(&points), MobStep::Travelling);
        }
        assert_eq!(mob.position, Vec2::new(8.0, 0.0));
        assert_eq!(mob.path_index, 0);

        assert_eq!(mob.advance(&points), MobStep::Travelling);
        assert_eq!(mob.position, Vec2::new(10.0, 0.0));
        assert_eq!(mob.path_index, 1);

        assert_eq!(mob.advance(&points), MobStep::Travelling);
        assert_eq!(mob.position, Vec2::new(10.0, 2.0));
    }

    #[test]
    fn reaching_the_final_point_breaches_once() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0)];
        let mut mob = mob(1.0, 10.0);

        assert_eq!(mob.advance(&points), MobStep::Travelling);
        assert_eq!(mob.advance(&points), MobStep::Travelling);
        assert_eq!(mob.advance(&points), MobStep::Breached);
        assert!(!mob.is_alive());
        assert_eq!(mob.advance(&points), MobStep::Travelling);
    }

    #[test]
    fn damage_credits_reward_exactly_once() {
        let mut mob = mob(1.0, 100.0);

        assert_eq!(mob.take_damage(40.0), DamageOutcome::Absorbed);
        assert_eq!(mob.health, 60.0);
        assert_eq!(mob.take_damage(40.0), DamageOutcome::Absorbed);
        assert_eq!(mob.health, 20.0);
        assert_eq!(
            mob.take_damage(40.0),
            DamageOutcome::Destroyed(Gold::new(50))
        );
        assert_eq!(mob.take_damage(40.0), DamageOutcome::Ignored);
        assert_eq!(mob.health, -20.0);
    }

    #[test]
    fn freshly_spawned_mob_is_inactive_until_next_tick() {
        let mut mob = mob(1.0, 10.0);
        mob.spawned_tick = 4;
        assert!(!mob.is_active(4));
        assert!(mob.is_active(5));
    }
}
