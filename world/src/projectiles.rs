//! Projectile flight toward a fixed destination.

use glam::Vec2;
use lane_defence_core::{Bounds, ProjectileId, ProjectileSnapshot};

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec2,
    pub(crate) target: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) damage: f32,
    pub(crate) launched_tick: u64,
    pub(crate) expiring: bool,
    pub(crate) spent: bool,
}

impl Projectile {
    /// Launches a projectile whose velocity is fixed for its whole flight.
    pub(crate) fn launch(
        id: ProjectileId,
        origin: Vec2,
        target: Vec2,
        speed: f32,
        damage: f32,
        launched_tick: u64,
    ) -> Self {
        Self {
            id,
            position: origin,
            target,
            velocity: (target - origin).normalize_or_zero() * speed,
            damage,
            launched_tick,
            expiring: false,
            spent: false,
        }
    }

    pub(crate) fn is_active(&self, tick_index: u64) -> bool {
        !self.spent && self.launched_tick < tick_index
    }

    /// Moves the projectile by its velocity and flags it for removal once it
    /// arrives or leaves the playfield. A flagged projectile still collides
    /// during the tick it was flagged in.
    pub(crate) fn advance(&mut self, bounds: &Bounds, arrival_threshold: f32) {
        self.position += self.velocity;
        if self.position.distance(self.target) < arrival_threshold
            || !bounds.contains(self.position)
        {
            self.expiring = true;
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            velocity: self.velocity,
            damage: self.damage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Bounds {
        Bounds {
            width: 100.0,
            height: 100.0,
        }
    }

    #[test]
    fn velocity_is_normalized_direction_times_speed() {
        let projectile = Projectile::launch(
            ProjectileId::new(0),
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 40.0),
            5.0,
            20.0,
            0,
        );
        assert!((projectile.velocity - Vec2::new(3.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn projectile_expires_near_destination() {
        let mut projectile = Projectile::launch(
            ProjectileId::new(0),
            Vec2::new(0.0, 50.0),
            Vec2::new(30.0, 50.0),
            5.0,
            20.0,
            0,
        );
        for _ in 0..4 {
            projectile.advance(&bounds(), 10.0);
            assert!(!projectile.expiring);
        }
        projectile.advance(&bounds(), 10.0);
        assert!(projectile.expiring);
    }

    #[test]
    fn projectile_expires_outside_playfield() {
        let mut projectile = Projectile::launch(
            ProjectileId::new(0),
            Vec2::new(98.0, 50.0),
            Vec2::new(500.0, 50.0),
            5.0,
            20.0,
            0,
        );
        projectile.advance(&bounds(), 10.0);
        assert!(projectile.expiring);
    }

    #[test]
    fn projectile_fired_this_tick_is_inactive() {
        let projectile = Projectile::launch(
            ProjectileId::new(0),
            Vec2::ZERO,
            Vec2::ONE,
            5.0,
            1.0,
            7,
        );
        assert!(!projectile.is_active(7));
        assert!(projectile.is_active(8));
    }
}
