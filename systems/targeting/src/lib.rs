#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes emplacement targets from world snapshots.

use glam::Vec2;
use lane_defence_core::{
    EmplacementKind, EmplacementTarget, EmplacementView, MobId, MobSnapshot, MobView,
};

/// Policy deciding which mob in range an emplacement aims at.
pub trait TargetSelector {
    /// Picks a mob within `range` of `origin`, or `None` when no mob qualifies.
    ///
    /// Candidates are visited in identifier order; implementations keep the
    /// earliest candidate on ties.
    fn select<'a>(
        &self,
        origin: Vec2,
        range: f32,
        candidates: impl Iterator<Item = &'a MobSnapshot>,
    ) -> Option<MobId>;
}

/// Aims at the closest mob in range.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nearest;

impl TargetSelector for Nearest {
    fn select<'a>(
        &self,
        origin: Vec2,
        range: f32,
        candidates: impl Iterator<Item = &'a MobSnapshot>,
    ) -> Option<MobId> {
        let mut best: Option<(f32, MobId)> = None;
        for mob in candidates {
            let distance = origin.distance(mob.position);
            if distance > range {
                continue;
            }
            if best.map_or(true, |(closest, _)| distance < closest) {
                best = Some((distance, mob.id));
            }
        }
        best.map(|(_, id)| id)
    }
}

/// Aims at the mob in range with the most remaining health.
#[derive(Clone, Copy, Debug, Default)]
pub struct Healthiest;

impl TargetSelector for Healthiest {
    fn select<'a>(
        &self,
        origin: Vec2,
        range: f32,
        candidates: impl Iterator<Item = &'a MobSnapshot>,
    ) -> Option<MobId> {
        let mut best: Option<(f32, MobId)> = None;
        for mob in candidates {
            if origin.distance(mob.position) > range {
                continue;
            }
            if best.map_or(true, |(health, _)| mob.health > health) {
                best = Some((mob.health, mob.id));
            }
        }
        best.map(|(_, id)| id)
    }
}

/// Targeting policy of a kind, or `None` for kinds that never aim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Policy {
    /// See [`Nearest`].
    Nearest,
    /// See [`Healthiest`].
    Healthiest,
}

impl Policy {
    /// Policy used by the provided emplacement kind.
    #[must_use]
    pub const fn for_kind(kind: EmplacementKind) -> Option<Self> {
        match kind {
            EmplacementKind::Basic => Some(Self::Nearest),
            EmplacementKind::Sniper => Some(Self::Healthiest),
            EmplacementKind::Economy => None,
        }
    }

    fn select<'a>(
        self,
        origin: Vec2,
        range: f32,
        candidates: impl Iterator<Item = &'a MobSnapshot>,
    ) -> Option<MobId> {
        match self {
            Self::Nearest => Nearest.select(origin, range, candidates),
            Self::Healthiest => Healthiest.select(origin, range, candidates),
        }
    }
}

/// Emplacement targeting system that reuses a scratch buffer between ticks.
#[derive(Debug, Default)]
pub struct Targeting {
    candidates: Vec<MobSnapshot>,
}

impl Targeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes one target per aiming emplacement.
    ///
    /// The output buffer is cleared before populating it. Mobs spawned during
    /// the current tick are not eligible.
    pub fn handle(
        &mut self,
        emplacements: &EmplacementView,
        mobs: &MobView,
        out: &mut Vec<EmplacementTarget>,
    ) {
        out.clear();
        if emplacements.is_empty() || mobs.is_empty() {
            return;
        }

        self.candidates.clear();
        self.candidates
            .extend(mobs.iter().filter(|mob| mob.active).copied());
        if self.candidates.is_empty() {
            return;
        }

        for emplacement in emplacements.iter() {
            let Some(policy) = Policy::for_kind(emplacement.kind) else {
                continue;
            };
            let Some(mob) =
                policy.select(emplacement.position, emplacement.range, self.candidates.iter())
            else {
                continue;
            };
            out.push(EmplacementTarget {
                emplacement: emplacement.id,
                mob,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::ArchetypeId;

    fn mob(id: u32, x: f32, health: f32) -> MobSnapshot {
        MobSnapshot {
            id: MobId::new(id),
            archetype: ArchetypeId::new(0),
            position: Vec2::new(x, 0.0),
            health,
            speed: 1.0,
            path_index: 0,
            active: true,
        }
    }

    #[test]
    fn nearest_picks_closest_in_range() {
        let mobs = [mob(0, 120.0, 10.0), mob(1, 60.0, 10.0), mob(2, 200.0, 10.0)];
        assert_eq!(
            Nearest.select(Vec2::ZERO, 150.0, mobs.iter()),
            Some(MobId::new(1))
        );
    }

    #[test]
    fn nearest_keeps_first_on_ties() {
        let mobs = [mob(3, 50.0, 10.0), mob(4, -50.0, 10.0)];
        assert_eq!(
            Nearest.select(Vec2::ZERO, 150.0, mobs.iter()),
            Some(MobId::new(3))
        );
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let mobs = [mob(0, 150.0, 10.0)];
        assert_eq!(
            Nearest.select(Vec2::ZERO, 150.0, mobs.iter()),
            Some(MobId::new(0))
        );
        assert_eq!(Nearest.select(Vec2::ZERO, 149.9, mobs.iter()), None);
    }

    #[test]
    fn healthiest_ignores_distance_within_range() {
        let mobs = [mob(0, 10.0, 50.0), mob(1, 250.0, 120.0), mob(2, 400.0, 900.0)];
        assert_eq!(
            Healthiest.select(Vec2::ZERO, 300.0, mobs.iter()),
            Some(MobId::new(1))
        );
    }

    #[test]
    fn healthiest_keeps_first_on_ties() {
        let mobs = [mob(5, 10.0, 80.0), mob(6, 20.0, 80.0)];
        assert_eq!(
            Healthiest.select(Vec2::ZERO, 300.0, mobs.iter()),
            Some(MobId::new(5))
        );
    }

    #[test]
    fn economy_never_aims() {
        assert_eq!(Policy::for_kind(EmplacementKind::Economy), None);
        assert_eq!(
            Policy::for_kind(EmplacementKind::Sniper),
            Some(Policy::Healthiest)
        );
    }
}
